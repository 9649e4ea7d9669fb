//! Parsing for the workload operation log (one line per GEMM call).

pub mod parse;
pub mod row;

pub use parse::{DEFAULT_MARKER, OperationLogReader};
pub use row::OperationDescriptor;
