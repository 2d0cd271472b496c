use std::f64::consts::PI;

use serde::Serialize;

use epiflow_core::QuarantineLevel;
use epiflow_mobility::MobilityMatrix;

use crate::metrics::DaySnapshot;
use crate::risk::HIGH_RISK_THRESHOLD;
use crate::zone::Zone;

/// Days of history required before any projection is attempted.
const HISTORY_WINDOW: usize = 7;
/// Fixed ±15 % band attached to every projection.
const CONFIDENCE_BAND: f64 = 0.15;
/// Fixed confidence reported for per-zone projections.
const ZONE_CONFIDENCE: f64 = 0.85;
/// Per-zone projections are capped at this share of the population.
const ZONE_FORECAST_CAP: f64 = 0.15;

/// Global 7/14-day case projections. `Default` is the documented zero
/// result returned while history is shorter than a week.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct GlobalForecast {
    pub cases_7d: u64,
    pub cases_14d: u64,
    pub confidence_interval: f64,
}

/// Short-horizon projection for a single zone, with its ±15 % band.
/// `Default` is the documented zero result under short history.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ZoneForecast {
    pub cases: u64,
    pub lower: u64,
    pub upper: u64,
    pub confidence: f64,
}

/// Project total active cases 7 and 14 days out.
///
/// A linear trend over the last week is perturbed by three heuristic
/// fluctuation factors (mobility volume, risk-zone share, and a weekly/
/// monthly seasonal cycle), each partly driven by oscillators keyed to the
/// day counter. The oscillators reproduce the reference behavior and make
/// no epidemiological claim; treat them as tunables.
pub(crate) fn global_forecast(
    history: &[DaySnapshot],
    zone_count: usize,
    matrix: &MobilityMatrix,
    risk_scores: &[u32],
    day: u32,
) -> GlobalForecast {
    if history.len() < HISTORY_WINDOW {
        return GlobalForecast::default();
    }

    let recent: Vec<f64> = history[history.len() - HISTORY_WINDOW..]
        .iter()
        .map(|snapshot| snapshot.total_active_cases as f64)
        .collect();
    let average_growth = (recent[HISTORY_WINDOW - 1] - recent[0]) / HISTORY_WINDOW as f64;
    let current = recent[HISTORY_WINDOW - 1];

    let mobility = mobility_impact(matrix, zone_count, day);
    let risk = risk_zones_impact(risk_scores, day);
    let seasonal = seasonal_factor(day);

    let fluctuation_7d = (mobility + risk + seasonal) / 3.0;
    let fluctuation_14d = (mobility * 0.8 + risk * 0.9 + seasonal * 1.1) / 3.0;

    let cases_7d = (current + average_growth * 7.0 * (1.0 + fluctuation_7d))
        .max(0.0)
        .round() as u64;
    let cases_14d = (current + average_growth * 14.0 * (1.0 + fluctuation_14d))
        .max(0.0)
        .round() as u64;

    GlobalForecast {
        cases_7d,
        cases_14d,
        confidence_interval: CONFIDENCE_BAND,
    }
}

/// Blend of normalized total mobility and a sinusoidal oscillation: heavy
/// movement can carry short-lived surges.
fn mobility_impact(matrix: &MobilityMatrix, zone_count: usize, day: u32) -> f64 {
    let average_flow = matrix.total_flow() / zone_count.max(1) as f64;
    let mobility_score = (average_flow / 5000.0).min(1.0);
    let oscillation = (day as f64 * 0.5).sin() * 0.2;

    (mobility_score - 0.5) * 0.6 + oscillation
}

/// Share of medium/high-risk zones plus a cosine component, clamped to
/// [-0.2, 0.4]: pressure can break either way once restrictions bite.
fn risk_zones_impact(risk_scores: &[u32], day: u32) -> f64 {
    if risk_scores.is_empty() {
        return 0.0;
    }
    let high = risk_scores
        .iter()
        .filter(|s| **s > HIGH_RISK_THRESHOLD)
        .count() as f64;
    let medium = risk_scores
        .iter()
        .filter(|s| **s > 40 && **s <= HIGH_RISK_THRESHOLD)
        .count() as f64;
    let ratio = (high * 2.0 + medium) / risk_scores.len() as f64;

    let base_impact = (ratio - 0.3) * 0.8;
    let cyclic = (day as f64 * 0.3).cos() * 0.3;

    (base_impact + cyclic).clamp(-0.2, 0.4)
}

/// Weekly sine cycle plus a slower monthly cosine, both keyed to the day
/// counter.
fn seasonal_factor(day: u32) -> f64 {
    let week_cycle = ((day % 7) as f64 * PI / 3.5).sin() * 0.1;
    let month_cycle = (day as f64 * 0.1).cos() * 0.15;

    week_cycle + month_cycle * 0.5
}

/// Project one zone's active cases 7 days out: linear trend plus the
/// mobility-import term, damped under severe/strict quarantine and capped
/// at 15 % of the population.
pub(crate) fn zone_forecast(
    zone: &Zone,
    quarantine: QuarantineLevel,
    daily_import: f64,
    history_days: usize,
) -> ZoneForecast {
    if history_days < HISTORY_WINDOW {
        return ZoneForecast::default();
    }

    let infectious = &zone.history.infectious;
    let window = &infectious[infectious.len().saturating_sub(HISTORY_WINDOW)..];
    let growth = (window[window.len() - 1] - window[0]) / HISTORY_WINDOW as f64;

    let projected = (zone.infectious + growth * 7.0 + daily_import * 7.0)
        * quarantine.forecast_damping();
    let projected = projected.clamp(0.0, zone.population * ZONE_FORECAST_CAP);

    ZoneForecast {
        cases: projected.round() as u64,
        lower: (projected * (1.0 - CONFIDENCE_BAND)).round() as u64,
        upper: (projected * (1.0 + CONFIDENCE_BAND)).round() as u64,
        confidence: ZONE_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use epiflow_core::ivory_coast_zones;

    fn snapshot(day: u32, total: u64) -> DaySnapshot {
        DaySnapshot {
            day,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            total_active_cases: total,
            zones: Vec::new(),
        }
    }

    fn grown_zone(infectious_by_day: &[f64]) -> Zone {
        let geography = ivory_coast_zones();
        let mut zone = Zone::from_geo(&geography[1], 0.0);
        for &i in infectious_by_day {
            zone.history.record(0.0, 0.0, i, 0.0);
            zone.infectious = i;
        }
        zone
    }

    #[test]
    fn test_global_forecast_zero_under_short_history() {
        let history: Vec<DaySnapshot> = (1..=6).map(|d| snapshot(d, 100 * d as u64)).collect();
        let forecast = global_forecast(&history, 30, &MobilityMatrix::new(), &[], 6);
        assert_eq!(forecast.cases_7d, 0);
        assert_eq!(forecast.cases_14d, 0);
        assert_eq!(forecast.confidence_interval, 0.0);
    }

    #[test]
    fn test_global_forecast_tracks_growth() {
        let history: Vec<DaySnapshot> = (1..=10).map(|d| snapshot(d, 100 * d as u64)).collect();
        let scores = vec![10u32; 30];
        let forecast = global_forecast(&history, 30, &MobilityMatrix::new(), &scores, 10);

        assert_eq!(forecast.confidence_interval, CONFIDENCE_BAND);
        // Growth is ~600/7 per day; even with the largest negative
        // fluctuation the projection stays above the current 1000 cases.
        assert!(forecast.cases_7d > 1000);
        assert!(forecast.cases_14d > 1000);
    }

    #[test]
    fn test_global_forecast_never_negative() {
        // Collapsing caseload with the most pessimistic factors still
        // floors at zero.
        let history: Vec<DaySnapshot> =
            (1..=10).map(|d| snapshot(d, 5000u64.saturating_sub(700 * d as u64))).collect();
        let forecast = global_forecast(&history, 30, &MobilityMatrix::new(), &[], 10);
        assert!(forecast.cases_14d <= forecast.cases_7d);
    }

    #[test]
    fn test_zone_forecast_zero_under_short_history() {
        let zone = grown_zone(&[100.0, 120.0]);
        let forecast = zone_forecast(&zone, QuarantineLevel::None, 0.0, 2);
        assert_eq!(forecast.cases, 0);
        assert_eq!(forecast.confidence, 0.0);
    }

    #[test]
    fn test_zone_forecast_band_ordering() {
        let zone = grown_zone(&[100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0]);
        let forecast = zone_forecast(&zone, QuarantineLevel::None, 5.0, 8);

        assert!(forecast.lower <= forecast.cases);
        assert!(forecast.cases <= forecast.upper);
        assert_eq!(forecast.confidence, ZONE_CONFIDENCE);
        assert!(forecast.cases > 450);
    }

    #[test]
    fn test_zone_forecast_quarantine_damping() {
        let trajectory = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0];
        let zone = grown_zone(&trajectory);

        let open = zone_forecast(&zone, QuarantineLevel::None, 0.0, 8);
        let severe = zone_forecast(&zone, QuarantineLevel::Severe, 0.0, 8);
        let strict = zone_forecast(&zone, QuarantineLevel::Strict, 0.0, 8);

        assert!(severe.cases < open.cases);
        assert!(strict.cases < severe.cases);
    }

    #[test]
    fn test_zone_forecast_population_cap() {
        let geography = ivory_coast_zones();
        let mut zone = Zone::from_geo(&geography[0], 0.0); // Plateau, pop 25 000
        for i in 0..10 {
            let cases = 2000.0 + i as f64 * 500.0;
            zone.history.record(0.0, 0.0, cases, 0.0);
            zone.infectious = cases;
        }

        let forecast = zone_forecast(&zone, QuarantineLevel::None, 50.0, 10);
        let cap = (zone.population * ZONE_FORECAST_CAP).round() as u64;
        assert_eq!(forecast.cases, cap);
    }
}
