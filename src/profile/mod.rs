//! Profile layer: machine-profile JSON schema + validated in-memory constants.

pub mod machine;
pub mod presets;

pub use machine::Profile;
pub use presets::Preset;

use crate::Result;
use std::path::Path;

/// Command-line replacements for individual profile constants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub vector_width: Option<u32>,
    pub cpu_power_watts: Option<f64>,
}

/// Profile for one run: the file if given, else the preset, then the overrides.
///
/// Validation runs after the overrides, so an override cannot bypass it.
pub fn resolve(path: Option<&Path>, preset: Preset, overrides: Overrides) -> Result<Profile> {
    let mut profile = match path {
        Some(path) => Profile::from_file(path)?,
        None => preset.load()?,
    };
    if let Some(width) = overrides.vector_width {
        profile.vector_width = width;
    }
    if let Some(watts) = overrides.cpu_power_watts {
        profile.cpu_power_watts = watts;
    }
    profile.validate()?;
    Ok(profile)
}
