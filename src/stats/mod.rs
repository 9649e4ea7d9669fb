//! Parsing for the simulator statistics dump (stats.txt).
//!
//! The dump is split into one block per simulated segment, then each block's
//! `<name> <value> <unit...>` lines are collected into a [`FieldMap`].

pub mod block;
pub mod fields;

pub use block::{BlockSplitter, StatBlock};
pub use fields::{FieldExtractor, FieldMap};
