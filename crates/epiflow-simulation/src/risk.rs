use std::collections::HashMap;

use serde::Serialize;

use epiflow_core::QuarantineLevel;
use epiflow_mobility::MobilityMatrix;

use crate::zone::Zone;

const PREVALENCE_CAP: f64 = 40.0;
const PREVALENCE_SCALE: f64 = 10_000.0;
const MOBILITY_CAP: f64 = 30.0;
const INFLOW_NORM: f64 = 10_000.0;
const CAPACITY_CAP: f64 = 30.0;

/// Risk score above which a zone counts as high-risk in global aggregates
/// and in the affluence factor below.
pub const HIGH_RISK_THRESHOLD: u32 = 70;

const TREND_WEIGHT: f64 = 0.35;
const AFFLUENCE_WEIGHT: f64 = 0.25;
const PROXIMITY_WEIGHT: f64 = 0.25;
const CAPACITY_WEIGHT: f64 = 0.15;
/// The proximity factor only wakes up within this many points of the next
/// quarantine threshold.
const PROXIMITY_WINDOW: f64 = 20.0;
/// Inbound flow from zones scoring above this feeds the affluence factor.
const RISKY_ORIGIN_THRESHOLD: u32 = 60;
const TREND_WINDOW: usize = 7;

/// Composite 0-100 risk index: prevalence (cap 40) + inbound mobility
/// (cap 30) + assumed health-capacity deficit from low centrality (cap 30).
pub fn risk_score(zone: &Zone, matrix: &MobilityMatrix) -> u32 {
    let prevalence_score = (zone.prevalence_ratio() * PREVALENCE_SCALE).min(PREVALENCE_CAP);
    let mobility_score = (matrix.inflow_total(&zone.id) / INFLOW_NORM * MOBILITY_CAP).min(MOBILITY_CAP);
    let capacity_score = (CAPACITY_CAP - zone.centrality / 100.0 * CAPACITY_CAP).max(0.0);

    let total = (prevalence_score + mobility_score + capacity_score).round() as u32;
    total.min(100)
}

/// Factor breakdown behind a transition estimate, each term in [0, 1].
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TransitionFactors {
    pub trend: f64,
    pub affluence: f64,
    pub proximity: f64,
    pub capacity: f64,
}

/// Likelihood (0-99 %) that a zone crosses into the next quarantine tier.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TransitionEstimate {
    pub probability: u32,
    pub factors: TransitionFactors,
}

/// Estimate the chance that `zone` reaches the next quarantine tier.
///
/// Zero-filled while fewer than seven days of history exist, and zero
/// probability once the zone already sits in the top tier. Otherwise a
/// weighted blend (35/25/25/15) of case trend, inbound flow from risky
/// origins, proximity to the next threshold, and capacity deficit, capped
/// at 99 %.
pub fn transition_probability(
    zone: &Zone,
    score: u32,
    matrix: &MobilityMatrix,
    all_scores: &HashMap<String, u32>,
) -> TransitionEstimate {
    if zone.history.len() < TREND_WINDOW {
        return TransitionEstimate::default();
    }
    if score >= QuarantineLevel::STRICT_THRESHOLD {
        return TransitionEstimate::default();
    }

    let factors = TransitionFactors {
        trend: trend_factor(zone),
        affluence: affluence_factor(zone, matrix, all_scores),
        proximity: proximity_factor(score),
        capacity: 1.0 - zone.centrality / 100.0,
    };

    let blended = TREND_WEIGHT * factors.trend
        + AFFLUENCE_WEIGHT * factors.affluence
        + PROXIMITY_WEIGHT * factors.proximity
        + CAPACITY_WEIGHT * factors.capacity;
    let probability = ((blended * 100.0).round() as u32).min(99);

    TransitionEstimate {
        probability,
        factors,
    }
}

/// Mean daily growth of I over the last week, normalized by the current
/// count and clamped to [0, 1]. Flat or shrinking zones contribute 0.
fn trend_factor(zone: &Zone) -> f64 {
    let infectious = &zone.history.infectious;
    let window = &infectious[infectious.len() - TREND_WINDOW..];
    let growth = (window[TREND_WINDOW - 1] - window[0]) / TREND_WINDOW as f64;

    let current = zone.infectious;
    if current <= 0.0 {
        return 0.0;
    }
    (growth / current).clamp(0.0, 1.0)
}

/// Share of the zone's inbound flow that originates from zones currently
/// scoring above the risky-origin threshold.
fn affluence_factor(
    zone: &Zone,
    matrix: &MobilityMatrix,
    all_scores: &HashMap<String, u32>,
) -> f64 {
    let inflows = matrix.inflows(&zone.id);
    let total: f64 = inflows.iter().map(|(_, volume)| volume).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let risky: f64 = inflows
        .iter()
        .filter(|(origin, _)| {
            all_scores
                .get(origin)
                .is_some_and(|s| *s > RISKY_ORIGIN_THRESHOLD)
        })
        .map(|(_, volume)| volume)
        .sum();

    risky / total
}

/// Linear ramp from 0 to 1 as the gap to the next threshold closes from 20
/// points to 0.
fn proximity_factor(score: u32) -> f64 {
    let next = if score < QuarantineLevel::MODERATE_THRESHOLD {
        QuarantineLevel::MODERATE_THRESHOLD
    } else if score < QuarantineLevel::SEVERE_THRESHOLD {
        QuarantineLevel::SEVERE_THRESHOLD
    } else {
        QuarantineLevel::STRICT_THRESHOLD
    };

    let gap = (next - score) as f64;
    if gap < PROXIMITY_WINDOW {
        (PROXIMITY_WINDOW - gap) / PROXIMITY_WINDOW
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use epiflow_core::ivory_coast_zones;

    fn test_zone(id: &str, population: f64, centrality: f64, infectious: f64) -> Zone {
        let geography = ivory_coast_zones();
        let mut zone = Zone::from_geo(&geography[0], 0.0);
        zone.id = id.to_owned();
        zone.population = population;
        zone.centrality = centrality;
        zone.susceptible = population - infectious;
        zone.infectious = infectious;
        zone
    }

    #[test]
    fn test_risk_score_bounds() {
        let empty = MobilityMatrix::new();
        let calm = test_zone("z", 100_000.0, 100.0, 0.0);
        assert_eq!(risk_score(&calm, &empty), 0);

        let mut flooded = MobilityMatrix::new();
        flooded.insert("other", "z", 1e9);
        let dire = test_zone("z", 100_000.0, 0.0, 100_000.0);
        assert_eq!(risk_score(&dire, &flooded), 100);
    }

    #[test]
    fn test_risk_score_monotone_in_prevalence() {
        let empty = MobilityMatrix::new();
        let mut last = 0;
        for infectious in [0.0, 50.0, 150.0, 400.0, 1000.0] {
            let zone = test_zone("z", 100_000.0, 50.0, infectious);
            let score = risk_score(&zone, &empty);
            assert!(score >= last, "{infectious} -> {score} < {last}");
            last = score;
        }
    }

    #[test]
    fn test_risk_score_monotone_in_inflow() {
        let zone = test_zone("z", 100_000.0, 50.0, 100.0);
        let mut last = 0;
        for inflow in [0.0, 1000.0, 4000.0, 9000.0, 20000.0] {
            let mut matrix = MobilityMatrix::new();
            matrix.insert("other", "z", inflow);
            let score = risk_score(&zone, &matrix);
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn test_risk_score_monotone_in_capacity_deficit() {
        let empty = MobilityMatrix::new();
        let mut last = 100;
        for centrality in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let zone = test_zone("z", 100_000.0, centrality, 100.0);
            let score = risk_score(&zone, &empty);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_transition_zero_without_history() {
        let zone = test_zone("z", 100_000.0, 50.0, 500.0);
        let estimate =
            transition_probability(&zone, 50, &MobilityMatrix::new(), &HashMap::new());
        assert_eq!(estimate.probability, 0);
        assert_eq!(estimate.factors.capacity, 0.0);
    }

    #[test]
    fn test_transition_zero_at_top_tier() {
        let mut zone = test_zone("z", 100_000.0, 50.0, 500.0);
        for _ in 0..10 {
            zone.history.record(0.0, 0.0, 500.0, 0.0);
        }
        let estimate =
            transition_probability(&zone, 90, &MobilityMatrix::new(), &HashMap::new());
        assert_eq!(estimate.probability, 0);
    }

    #[test]
    fn test_transition_blend_and_cap() {
        // Growing caseload, risky inbound flow, close to the next tier,
        // weak capacity: every factor engaged.
        let mut zone = test_zone("z", 100_000.0, 20.0, 700.0);
        for day in 0..10 {
            zone.history.record(0.0, 0.0, (day as f64) * 100.0, 0.0);
        }

        let mut matrix = MobilityMatrix::new();
        matrix.insert("hot", "z", 800.0);
        matrix.insert("calm", "z", 200.0);
        let mut scores = HashMap::new();
        scores.insert("hot".to_owned(), 75u32);
        scores.insert("calm".to_owned(), 10u32);

        let estimate = transition_probability(&zone, 55, &matrix, &scores);

        assert_relative_eq!(estimate.factors.affluence, 0.8);
        assert_relative_eq!(estimate.factors.proximity, 0.75);
        assert_relative_eq!(estimate.factors.capacity, 0.8);
        // trend: (900 - 300) / 7 days, over 700 current cases.
        assert_relative_eq!(estimate.factors.trend, 600.0 / 7.0 / 700.0, epsilon = 1e-12);
        assert!(estimate.probability <= 99);
        assert!(estimate.probability > 0);
    }

    #[test]
    fn test_proximity_ramp() {
        assert_relative_eq!(proximity_factor(10), 0.0); // gap 30
        assert_relative_eq!(proximity_factor(25), 0.25); // gap 15 to 40
        assert_relative_eq!(proximity_factor(59), 0.95); // gap 1 to 60
        assert_relative_eq!(proximity_factor(85 - 20), 0.0); // gap exactly 20
    }
}
