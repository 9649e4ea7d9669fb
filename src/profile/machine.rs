//! Machine profile JSON: configuration-level constants used by the deriver.
//!
//! JSON shape (every field optional, defaults shown):
//! {
//!   "name": "default",
//!   "vector_width": 4,              // FLOPs per vector FP instruction
//!   "cpu_power_watts": 50.0,        // assumed, not measured
//!   "sim_ticks_per_second": 1e12,   // simulator tick rate
//!   "l1_cache_kb": 32.0,            // assumed
//!   "l2_cache_kb": 256.0,           // assumed
//!   "l3_cache_mb": 3.0,             // assumed
//!   "counters": {
//!     "sim_seconds": "simSeconds",
//!     ...
//!   }
//! }
//!
//! Only configuration is validated here; counters and dimensions read from the
//! logs are taken as they are.

use crate::Result;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSpec {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub vector_width: Option<u32>,

    #[serde(default)]
    pub cpu_power_watts: Option<f64>,

    #[serde(default)]
    pub sim_ticks_per_second: Option<f64>,

    #[serde(default)]
    pub l1_cache_kb: Option<f64>,

    #[serde(default)]
    pub l2_cache_kb: Option<f64>,

    #[serde(default)]
    pub l3_cache_mb: Option<f64>,

    #[serde(default)]
    pub counters: CounterNamesSpec,
}

/// Counter names as they appear in profile JSON; missing entries fall back to
/// the gem5 names in [`CounterNames::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterNamesSpec {
    pub sim_seconds: Option<String>,
    pub scalar_fp_ops: Option<String>,
    pub vector_fp_ops: Option<String>,
    pub cpi: Option<String>,
    pub clock_period: Option<String>,
    pub avg_read_bandwidth: Option<String>,
    pub cpu_on_residency: Option<String>,
    pub rank_energy_suffix: Option<String>,
}

/// Names of the counters the deriver reads from each block.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterNames {
    pub sim_seconds: String,
    pub scalar_fp_ops: String,
    pub vector_fp_ops: String,
    pub cpi: String,
    pub clock_period: String,
    pub avg_read_bandwidth: String,
    pub cpu_on_residency: String,
    /// Matched as `...rank<i>.<suffix>` for every rank present.
    pub rank_energy_suffix: String,
}

impl Default for CounterNames {
    fn default() -> Self {
        Self {
            sim_seconds: "simSeconds".to_string(),
            scalar_fp_ops: "system.cpu.commitStats0.numFpInsts".to_string(),
            vector_fp_ops: "system.cpu.commitStats0.numVecInsts".to_string(),
            cpi: "system.cpu.cpi".to_string(),
            clock_period: "system.clk_domain.clock".to_string(),
            avg_read_bandwidth: "system.mem_ctrl.avgRdBWSys".to_string(),
            cpu_on_residency: "system.cpu.power_state.pwrStateResidencyTicks::ON".to_string(),
            rank_energy_suffix: "totalEnergy".to_string(),
        }
    }
}

/// Validated machine profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub vector_width: u32,
    pub cpu_power_watts: f64,
    pub sim_ticks_per_second: f64,
    pub l1_cache_kb: f64,
    pub l2_cache_kb: f64,
    pub l3_cache_mb: f64,
    pub counters: CounterNames,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            vector_width: 4,
            cpu_power_watts: 50.0,
            // gem5 ticks are picoseconds.
            sim_ticks_per_second: 1e12,
            l1_cache_kb: 32.0,
            l2_cache_kb: 256.0,
            l3_cache_mb: 3.0,
            counters: CounterNames::default(),
        }
    }
}

impl ProfileSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Fill defaults and check that every constant is usable.
    pub fn validate_and_build(&self) -> Result<Profile> {
        let d = Profile::default();
        let c = &self.counters;
        let dc = d.counters;

        let profile = Profile {
            name: self.name.clone().unwrap_or(d.name),
            vector_width: self.vector_width.unwrap_or(d.vector_width),
            cpu_power_watts: self.cpu_power_watts.unwrap_or(d.cpu_power_watts),
            sim_ticks_per_second: self.sim_ticks_per_second.unwrap_or(d.sim_ticks_per_second),
            l1_cache_kb: self.l1_cache_kb.unwrap_or(d.l1_cache_kb),
            l2_cache_kb: self.l2_cache_kb.unwrap_or(d.l2_cache_kb),
            l3_cache_mb: self.l3_cache_mb.unwrap_or(d.l3_cache_mb),
            counters: CounterNames {
                sim_seconds: c.sim_seconds.clone().unwrap_or(dc.sim_seconds),
                scalar_fp_ops: c.scalar_fp_ops.clone().unwrap_or(dc.scalar_fp_ops),
                vector_fp_ops: c.vector_fp_ops.clone().unwrap_or(dc.vector_fp_ops),
                cpi: c.cpi.clone().unwrap_or(dc.cpi),
                clock_period: c.clock_period.clone().unwrap_or(dc.clock_period),
                avg_read_bandwidth: c.avg_read_bandwidth.clone().unwrap_or(dc.avg_read_bandwidth),
                cpu_on_residency: c.cpu_on_residency.clone().unwrap_or(dc.cpu_on_residency),
                rank_energy_suffix: c.rank_energy_suffix.clone().unwrap_or(dc.rank_energy_suffix),
            },
        };

        profile.validate()?;
        Ok(profile)
    }
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.vector_width == 0 {
            bail!("profile {}: vector_width must be at least 1", self.name);
        }
        if !self.cpu_power_watts.is_finite() || self.cpu_power_watts < 0.0 {
            bail!(
                "profile {}: cpu_power_watts must be a finite non-negative number, got {}",
                self.name,
                self.cpu_power_watts
            );
        }
        if !self.sim_ticks_per_second.is_finite() || self.sim_ticks_per_second <= 0.0 {
            bail!(
                "profile {}: sim_ticks_per_second must be positive, got {}",
                self.name,
                self.sim_ticks_per_second
            );
        }
        for (field, size) in [
            ("l1_cache_kb", self.l1_cache_kb),
            ("l2_cache_kb", self.l2_cache_kb),
            ("l3_cache_mb", self.l3_cache_mb),
        ] {
            if !size.is_finite() || size < 0.0 {
                bail!("profile {}: {} must be non-negative, got {}", self.name, field, size);
            }
        }

        let c = &self.counters;
        for (field, value) in [
            ("sim_seconds", &c.sim_seconds),
            ("scalar_fp_ops", &c.scalar_fp_ops),
            ("vector_fp_ops", &c.vector_fp_ops),
            ("cpi", &c.cpi),
            ("clock_period", &c.clock_period),
            ("avg_read_bandwidth", &c.avg_read_bandwidth),
            ("cpu_on_residency", &c.cpu_on_residency),
            ("rank_energy_suffix", &c.rank_energy_suffix),
        ] {
            if value.trim().is_empty() {
                bail!("profile {}: counter name {} is empty", self.name, field);
            }
        }

        Ok(())
    }

    /// Load and validate a profile from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read profile file {}", path.display()))?;
        ProfileSpec::from_json(&text)
            .and_then(|spec| spec.validate_and_build())
            .with_context(|| format!("parse profile file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_yields_defaults() {
        let profile = ProfileSpec::from_json("{}").unwrap().validate_and_build().unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_partial_override() {
        let profile = ProfileSpec::from_json(
            r#"{ "name": "neon", "vector_width": 8, "counters": { "cpi": "system.cpu0.cpi" } }"#,
        )
        .unwrap()
        .validate_and_build()
        .unwrap();

        assert_eq!(profile.name, "neon");
        assert_eq!(profile.vector_width, 8);
        assert_eq!(profile.cpu_power_watts, 50.0);
        assert_eq!(profile.counters.cpi, "system.cpu0.cpi");
        assert_eq!(profile.counters.sim_seconds, "simSeconds");
    }

    #[test]
    fn test_rejects_unusable_constants() {
        for json in [
            r#"{ "vector_width": 0 }"#,
            r#"{ "cpu_power_watts": -1.0 }"#,
            r#"{ "sim_ticks_per_second": 0.0 }"#,
            r#"{ "l3_cache_mb": -3.0 }"#,
            r#"{ "counters": { "sim_seconds": "  " } }"#,
        ] {
            let spec = ProfileSpec::from_json(json).unwrap();
            assert!(spec.validate_and_build().is_err(), "accepted {}", json);
        }
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(ProfileSpec::from_json(r#"{ "vectorwidth": 4 }"#).is_err());
    }

    #[test]
    fn test_from_file_names_the_path() {
        let err = Profile::from_file(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/profile.json"));
    }
}
