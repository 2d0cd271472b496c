use chrono::NaiveDate;
use serde::Serialize;

use epiflow_core::QuarantineLevel;

/// Per-zone derived view, recomputed on demand from the live compartments.
/// Compartment counts are rounded to whole people for display; the engine
/// keeps the real-valued state internally.
#[derive(Clone, Debug, Serialize)]
pub struct ZoneMetrics {
    pub id: String,
    pub name: String,
    pub population: u64,
    pub active_cases: u64,
    pub cumulative_cases: u64,
    /// Percent of population currently infectious, 3-decimal precision.
    pub prevalence: f64,
    pub risk_score: u32,
    pub quarantine: QuarantineLevel,
    /// Percent change of active cases against the prior day, one decimal.
    pub variation_24h: f64,
    pub susceptible: u64,
    pub exposed: u64,
    pub infectious: u64,
    pub removed: u64,
}

/// Aggregates across every zone.
#[derive(Clone, Debug, Serialize)]
pub struct GlobalMetrics {
    pub total_active_cases: u64,
    pub total_cases: u64,
    pub total_recovered: u64,
    /// Zones currently scoring above the high-risk threshold (70).
    pub high_risk_zones: usize,
    /// Percent change of total active cases against 7 days ago, one
    /// decimal; 0 until a week of history exists.
    pub case_trend: f64,
    pub day: u32,
}

/// One day-stamped entry of the simulation-wide history log.
#[derive(Clone, Debug, Serialize)]
pub struct DaySnapshot {
    pub day: u32,
    pub date: NaiveDate,
    pub total_active_cases: u64,
    pub zones: Vec<ZoneMetrics>,
}

/// Round to `decimals` places; metric fields carry fixed precision so equal
/// states always render identically.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_fixed_precision() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-0.04999, 1), -0.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
