//! Metrics model: combine one logged operation with one block of counters.
//!
//! Every column of [`DerivedMetricRow`] is always filled. Missing counters fall
//! back to the defaults named at each lookup, and every division by a zero
//! denominator yields 0.

use crate::log::OperationDescriptor;
use crate::profile::Profile;
use crate::stats::FieldMap;
use serde::Serialize;

/// Divisor used for the FLOP rate when the elapsed-time counter is missing.
pub const ELAPSED_EPSILON_SECONDS: f64 = 1e-9;

/// One report row. Field order is the column order of the emitted table, and the
/// serde names are its header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetricRow {
    #[serde(rename = "Layer")]
    pub layer: String,
    #[serde(rename = "M")]
    pub m: u64,
    #[serde(rename = "N")]
    pub n: u64,
    #[serde(rename = "K")]
    pub k: u64,

    /// Profile assumptions, not measured.
    #[serde(rename = "L1 Cache [kB]")]
    pub l1_cache_kb: f64,
    #[serde(rename = "L2 Cache [kB]")]
    pub l2_cache_kb: f64,
    #[serde(rename = "L3 Cache [MB]")]
    pub l3_cache_mb: f64,
    /// Simulator tick rate over the clock-period counter.
    #[serde(rename = "Memory Clock [MHz]")]
    pub memory_clock_mhz: f64,

    #[serde(rename = "Mean Runtime (RDTSC) [s]")]
    pub elapsed_seconds: f64,
    #[serde(rename = "Mean CPI")]
    pub cpi: f64,
    #[serde(rename = "Mean DP [MFLOP/s]")]
    pub mflop_rate: f64,
    #[serde(rename = "Memory Bandwidth [MB/s]")]
    pub memory_bandwidth_mbps: f64,
    #[serde(rename = "Energy [J]")]
    pub total_energy_j: f64,
    #[serde(rename = "Power [W]")]
    pub total_power_w: f64,
    /// FLOPs over MB/s. Kept for comparability with earlier reports; not FLOP/byte.
    #[serde(rename = "Operational Intensity")]
    pub operational_intensity: f64,
    #[serde(rename = "MaxFLOPS")]
    pub total_flops: f64,

    // Columns below extend the legacy table; new ones go at the end.
    #[serde(rename = "FLOP Rate [FLOP/s]")]
    pub flop_rate: f64,
    #[serde(rename = "DRAM Energy [J]")]
    pub dram_energy_j: f64,
    #[serde(rename = "CPU Energy [J]")]
    pub cpu_energy_j: f64,
}

/// Ordered rows, one per correlated (operation, block) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<DerivedMetricRow>,
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Sum of `...rank<i>.<suffix>` counters for every rank present in the block.
pub fn sum_rank_counters(fields: &FieldMap, suffix: &str) -> f64 {
    fields
        .iter()
        .filter(|(name, _)| is_rank_counter(name, suffix))
        .map(|(_, field)| field.value)
        .sum()
}

fn is_rank_counter(name: &str, suffix: &str) -> bool {
    let Some(path) = name
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };
    let segment = path.rsplit('.').next().unwrap_or(path);
    match segment.strip_prefix("rank") {
        Some(id) => !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Derive the metric row for one operation and its counters. Never fails.
pub fn derive_metrics(
    op: &OperationDescriptor,
    fields: &FieldMap,
    profile: &Profile,
) -> DerivedMetricRow {
    let c = &profile.counters;

    // FLOPs
    let scalar_fp_ops = fields.get_or_default(&c.scalar_fp_ops, 0.0);
    let vector_fp_ops = fields.get_or_default(&c.vector_fp_ops, 0.0);
    let total_flops = scalar_fp_ops + vector_fp_ops * f64::from(profile.vector_width);

    let elapsed_seconds = fields.get_or_default(&c.sim_seconds, ELAPSED_EPSILON_SECONDS);
    let flop_rate = safe_div(total_flops, elapsed_seconds);

    // Power uses the measured runtime only; a missing counter gives 0 W.
    let measured_seconds = fields.get_or_default(&c.sim_seconds, 0.0);

    let cpi = fields.get_or_default(&c.cpi, 0.0);

    // Clock
    let clock_period_ticks = fields.get_or_default(&c.clock_period, 1.0);
    let memory_clock_mhz = safe_div(profile.sim_ticks_per_second, clock_period_ticks) / 1e6;

    let memory_bandwidth_mbps = fields.get_or_default(&c.avg_read_bandwidth, 0.0) / 1e6;

    // Energy
    let dram_energy_j = sum_rank_counters(fields, &c.rank_energy_suffix);
    let cpu_on_ticks = fields.get_or_default(&c.cpu_on_residency, 0.0);
    let cpu_energy_j = safe_div(cpu_on_ticks, clock_period_ticks) * profile.cpu_power_watts;
    let total_energy_j = dram_energy_j + cpu_energy_j;
    let total_power_w = safe_div(total_energy_j, measured_seconds);

    DerivedMetricRow {
        layer: op.label(),
        m: op.m,
        n: op.n,
        k: op.k,
        l1_cache_kb: profile.l1_cache_kb,
        l2_cache_kb: profile.l2_cache_kb,
        l3_cache_mb: profile.l3_cache_mb,
        memory_clock_mhz,
        elapsed_seconds,
        cpi,
        mflop_rate: flop_rate / 1e6,
        memory_bandwidth_mbps,
        total_energy_j,
        total_power_w,
        operational_intensity: safe_div(total_flops, memory_bandwidth_mbps),
        total_flops,
        flop_rate,
        dram_energy_j,
        cpu_energy_j,
    }
}
