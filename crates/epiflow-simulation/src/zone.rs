use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use epiflow_core::{Coordinates, GeoZone};

/// Day-indexed compartment trajectories. Index 0 is the state at simulation
/// start; one entry is appended per simulated day and entries are never
/// pruned, so memory grows linearly with simulated days.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CompartmentHistory {
    pub susceptible: Vec<f64>,
    pub exposed: Vec<f64>,
    pub infectious: Vec<f64>,
    pub removed: Vec<f64>,
}

impl CompartmentHistory {
    pub fn len(&self) -> usize {
        self.infectious.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infectious.is_empty()
    }

    pub(crate) fn record(&mut self, s: f64, e: f64, i: f64, r: f64) {
        self.susceptible.push(s);
        self.exposed.push(e);
        self.infectious.push(i);
        self.removed.push(r);
    }
}

/// A zone's live SEIR state plus the static attributes the evaluators need.
///
/// Compartments are real-valued and clamped to be non-negative by the
/// engine; `population` stays fixed at the census value and serves as N in
/// the force-of-infection term.
#[derive(Clone, Debug)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub population: f64,
    pub centrality: f64,
    pub susceptible: f64,
    pub exposed: f64,
    pub infectious: f64,
    pub removed: f64,
    pub history: CompartmentHistory,
}

impl Zone {
    pub(crate) fn from_geo(geo: &GeoZone, initial_infectious: f64) -> Self {
        let population = geo.population as f64;
        let infectious = initial_infectious.min(population);
        let mut zone = Self {
            id: geo.id.clone(),
            name: geo.name.clone(),
            coordinates: geo.coordinates,
            population,
            centrality: geo.centrality,
            susceptible: population - infectious,
            exposed: 0.0,
            infectious,
            removed: 0.0,
            history: CompartmentHistory::default(),
        };
        zone.history.record(
            zone.susceptible,
            zone.exposed,
            zone.infectious,
            zone.removed,
        );
        zone
    }

    /// Infectious share of the population, in [0, 1].
    pub fn prevalence_ratio(&self) -> f64 {
        if self.population > 0.0 {
            self.infectious / self.population
        } else {
            0.0
        }
    }

    pub fn active_cases(&self) -> u64 {
        self.infectious.round() as u64
    }

    pub fn cumulative_cases(&self) -> u64 {
        (self.exposed + self.infectious + self.removed).round() as u64
    }
}

/// Which zones start infected, and how hard.
///
/// The reference policy seeds only the most populous zones so the epidemic
/// visibly propagates through the mobility network instead of flaring up
/// everywhere at once.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SeedingPolicy {
    /// How many of the most populous zones start with an outbreak.
    pub outbreak_zones: usize,
    /// Bounds of the seeded infectious share, sampled uniformly per zone.
    pub min_fraction: f64,
    pub max_fraction: f64,
}

impl Default for SeedingPolicy {
    fn default() -> Self {
        Self {
            outbreak_zones: 5,
            min_fraction: 0.008,
            max_fraction: 0.012,
        }
    }
}

/// Build the live zone set from geography, seeding the outbreak zones with
/// an infectious fraction drawn from `rng`.
pub(crate) fn seed_zones<R: Rng>(
    geography: &[GeoZone],
    policy: &SeedingPolicy,
    rng: &mut R,
) -> Vec<Zone> {
    let mut by_population: Vec<&GeoZone> = geography.iter().collect();
    by_population.sort_by(|a, b| b.population.cmp(&a.population));
    let outbreak: HashSet<&str> = by_population
        .iter()
        .take(policy.outbreak_zones)
        .map(|z| z.id.as_str())
        .collect();

    geography
        .iter()
        .map(|geo| {
            let seeded = if outbreak.contains(geo.id.as_str()) {
                let fraction = rng.random_range(policy.min_fraction..=policy.max_fraction);
                geo.population as f64 * fraction
            } else {
                0.0
            };
            Zone::from_geo(geo, seeded)
        })
        .collect()
}
