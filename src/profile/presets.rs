//! Profiles bundled for the machines the simulation configurations model.
//!
//! Vector widths and CPU power figures are assumptions (lane count for the
//! widest FP SIMD unit, nominal package power), not simulator outputs.

use crate::Result;
use crate::profile::machine::{Profile, ProfileSpec};
use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Default,
    SkylakeI3,
    #[value(name = "i7-11370h")]
    CoreI7,
    Exynos5422,
    PynqZ2,
    VegaAs4161,
    DarknetCpu,
}

impl Preset {
    fn json(self) -> &'static str {
        match self {
            Preset::Default => include_str!("../../profiles/default.json"),
            Preset::SkylakeI3 => include_str!("../../profiles/skylake-i3.json"),
            Preset::CoreI7 => include_str!("../../profiles/i7-11370h.json"),
            Preset::Exynos5422 => include_str!("../../profiles/exynos5422.json"),
            Preset::PynqZ2 => include_str!("../../profiles/pynq-z2.json"),
            Preset::VegaAs4161 => include_str!("../../profiles/vega-as4161.json"),
            Preset::DarknetCpu => include_str!("../../profiles/darknet-cpu.json"),
        }
    }

    pub fn load(self) -> Result<Profile> {
        ProfileSpec::from_json(self.json())
            .and_then(|spec| spec.validate_and_build())
            .with_context(|| format!("load bundled profile {:?}", self))
    }
}
