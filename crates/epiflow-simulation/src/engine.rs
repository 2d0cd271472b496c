use std::collections::{HashMap, VecDeque};

use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use epiflow_core::{
    validate_geography, GeoZone, GeographyError, ParameterError, ParameterUpdate, Parameters,
    QuarantineLevel,
};
use epiflow_mobility::{generate_with_quarantine, mobility_index, MobilityMatrix};

use crate::alerts::{self, Alert, AlertConfig, AlertPriority, ALERT_LOG_CAPACITY};
use crate::forecast::{self, GlobalForecast, ZoneForecast};
use crate::metrics::{round_to, DaySnapshot, GlobalMetrics, ZoneMetrics};
use crate::risk::{self, TransitionEstimate, HIGH_RISK_THRESHOLD};
use crate::zone::{seed_zones, SeedingPolicy, Zone};

/// Construction-time failures; everything past construction degrades to
/// well-defined values instead of erroring.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Geography(#[from] GeographyError),
    #[error(transparent)]
    Parameters(#[from] ParameterError),
}

/// Knobs that are fixed for the lifetime of a simulation instance.
#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    /// Calendar date mapped to day 0.
    pub start_date: NaiveDate,
    pub seeding: SeedingPolicy,
    pub alerts: AlertConfig,
    /// Seed for the engine RNG. `None` draws one from the OS; pin it for
    /// reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid calendar date"),
            seeding: SeedingPolicy::default(),
            alerts: AlertConfig::default(),
            rng_seed: None,
        }
    }
}

/// Outcome of one driver-facing [`Simulation::advance`] call.
#[derive(Clone, Debug)]
pub struct DayReport {
    pub metrics: Vec<ZoneMetrics>,
    /// Alerts that fired this day (the rolling log keeps the recent ones).
    pub alerts: Vec<Alert>,
    /// Current total flow as a percentage of the day-0 baseline.
    pub mobility_index: u8,
}

/// Metapopulation SEIR simulation over a fixed zone geography.
///
/// The engine owns all mutable state: zone compartments, the active
/// mobility matrix, the day counter, history and the alert log. It is
/// single-threaded and synchronous; callers serialize `step`/`reset`/
/// parameter updates. Per-zone and global history are never pruned, so
/// memory grows linearly with simulated days; callers running unbounded
/// simulations own any retention policy.
pub struct Simulation {
    geography: Vec<GeoZone>,
    zones: Vec<Zone>,
    params: Parameters,
    matrix: MobilityMatrix,
    baseline_matrix: MobilityMatrix,
    config: SimulationConfig,
    history: Vec<DaySnapshot>,
    alerts: VecDeque<Alert>,
    day: u32,
    rng: SmallRng,
}

impl Simulation {
    /// Build a simulation over `geography`, starting from `initial_matrix`
    /// and seeding the outbreak zones. Fails only on malformed geography or
    /// non-positive parameters.
    pub fn new(
        geography: Vec<GeoZone>,
        initial_matrix: MobilityMatrix,
        params: Parameters,
    ) -> Result<Self, SimulationError> {
        Self::with_config(geography, initial_matrix, params, SimulationConfig::default())
    }

    /// [`Simulation::new`] with a pinned RNG seed, for deterministic runs.
    pub fn with_rng_seed(
        geography: Vec<GeoZone>,
        initial_matrix: MobilityMatrix,
        params: Parameters,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        Self::with_config(
            geography,
            initial_matrix,
            params,
            SimulationConfig {
                rng_seed: Some(seed),
                ..Default::default()
            },
        )
    }

    pub fn with_config(
        geography: Vec<GeoZone>,
        initial_matrix: MobilityMatrix,
        params: Parameters,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        validate_geography(&geography)?;
        params.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let zones = seed_zones(&geography, &config.seeding, &mut rng);
        let seeded = zones.iter().filter(|z| z.infectious > 0.0).count();
        info!(
            "simulation initialized: {} zones, {} outbreak zones, start {}",
            zones.len(),
            seeded,
            config.start_date
        );

        Ok(Self {
            geography,
            zones,
            params,
            baseline_matrix: initial_matrix.clone(),
            matrix: initial_matrix,
            config,
            history: Vec::new(),
            alerts: VecDeque::new(),
            day: 0,
            rng,
        })
    }

    /// Advance every zone by exactly one day with a forward-Euler SEIR
    /// update plus mobility-imported infections, using the currently
    /// installed matrix and prior-day compartments throughout. Compartments
    /// are clamped at zero; the update never fails.
    pub fn step(&mut self) -> Vec<ZoneMetrics> {
        let imports = self.imported_cases();
        let params = self.params;

        for (zone, imported) in self.zones.iter_mut().zip(imports) {
            let n = zone.population;
            let new_exposed = params.beta * zone.susceptible * zone.infectious / n;
            let new_infectious = params.sigma * zone.exposed;
            let new_recovered = params.gamma * zone.infectious;

            zone.susceptible = (zone.susceptible - new_exposed).max(0.0);
            zone.exposed = (zone.exposed + new_exposed - new_infectious).max(0.0);
            zone.infectious =
                (zone.infectious + new_infectious - new_recovered + imported).max(0.0);
            zone.removed = (zone.removed + new_recovered).max(0.0);

            zone.history.record(
                zone.susceptible,
                zone.exposed,
                zone.infectious,
                zone.removed,
            );
        }

        self.day += 1;
        let metrics = self.metrics();
        let total_active_cases = metrics.iter().map(|m| m.active_cases).sum();
        debug!("day {}: {} active cases", self.day, total_active_cases);
        self.history.push(DaySnapshot {
            day: self.day,
            date: self.current_date(),
            total_active_cases,
            zones: metrics.clone(),
        });

        metrics
    }

    /// Daily driver sequence: step, evaluate alerts, regenerate the
    /// mobility matrix under the new quarantine levels.
    pub fn advance(&mut self) -> DayReport {
        let metrics = self.step();

        let fired = alerts::evaluate(
            &metrics,
            self.day,
            self.current_date(),
            &self.config.alerts,
            &mut self.rng,
        );
        for alert in &fired {
            if alert.priority == AlertPriority::Critical {
                warn!("{}", alert.message);
            }
        }
        self.alerts.extend(fired.iter().cloned());
        while self.alerts.len() > ALERT_LOG_CAPACITY {
            self.alerts.pop_front();
        }

        self.apply_mobility_feedback();

        DayReport {
            metrics,
            alerts: fired,
            mobility_index: self.mobility_index(),
        }
    }

    /// Feedback coupler: rebuild tomorrow's matrix from the gravity model
    /// and today's quarantine levels, and install it as the active matrix.
    /// The previous matrix is dropped whole, never mutated in place.
    pub fn apply_mobility_feedback(&mut self) {
        let levels: HashMap<String, QuarantineLevel> = self
            .zones
            .iter()
            .map(|zone| {
                let score = risk::risk_score(zone, &self.matrix);
                (zone.id.clone(), QuarantineLevel::from_risk(score))
            })
            .collect();

        let date = self.current_date() + Days::new(1);
        self.matrix = generate_with_quarantine(&self.geography, date, &levels);
    }

    /// Rebuild all zones from the original geography with a fresh outbreak,
    /// clear history and alerts, and restore the initial matrix. Parameters
    /// are kept. With a pinned RNG seed this reproduces construction
    /// exactly.
    pub fn reset(&mut self) {
        if let Some(seed) = self.config.rng_seed {
            self.rng = SmallRng::seed_from_u64(seed);
        }
        self.zones = seed_zones(&self.geography, &self.config.seeding, &mut self.rng);
        self.matrix = self.baseline_matrix.clone();
        self.history.clear();
        self.alerts.clear();
        self.day = 0;
        info!("simulation reset");
    }

    /// Partial parameter override between days. Rejected values leave the
    /// current parameters untouched.
    pub fn update_params(&mut self, update: ParameterUpdate) -> Result<(), SimulationError> {
        let mut next = self.params;
        update.apply(&mut next);
        next.validate()?;
        self.params = next;
        Ok(())
    }

    /// Per-zone derived view of the current compartment state.
    pub fn metrics(&self) -> Vec<ZoneMetrics> {
        self.zones
            .iter()
            .map(|zone| self.zone_metrics(zone))
            .collect()
    }

    fn zone_metrics(&self, zone: &Zone) -> ZoneMetrics {
        let risk_score = risk::risk_score(zone, &self.matrix);
        ZoneMetrics {
            id: zone.id.clone(),
            name: zone.name.clone(),
            population: zone.population as u64,
            active_cases: zone.active_cases(),
            cumulative_cases: zone.cumulative_cases(),
            prevalence: round_to(zone.prevalence_ratio() * 100.0, 3),
            risk_score,
            quarantine: QuarantineLevel::from_risk(risk_score),
            variation_24h: variation_24h(zone),
            susceptible: zone.susceptible.round() as u64,
            exposed: zone.exposed.round() as u64,
            infectious: zone.infectious.round() as u64,
            removed: zone.removed.round() as u64,
        }
    }

    /// Aggregates across all zones, including the 7-day case trend once a
    /// week of history exists.
    pub fn global_metrics(&self) -> GlobalMetrics {
        let total_active: f64 = self.zones.iter().map(|z| z.infectious).sum();
        let total: f64 = self
            .zones
            .iter()
            .map(|z| z.exposed + z.infectious + z.removed)
            .sum();
        let recovered: f64 = self.zones.iter().map(|z| z.removed).sum();
        let high_risk_zones = self
            .zones
            .iter()
            .filter(|z| risk::risk_score(z, &self.matrix) > HIGH_RISK_THRESHOLD)
            .count();

        let case_trend = if self.history.len() >= 7 {
            let week_ago = self.history[self.history.len() - 7].total_active_cases as f64;
            if week_ago > 0.0 {
                round_to((total_active.round() - week_ago) / week_ago * 100.0, 1)
            } else {
                0.0
            }
        } else {
            0.0
        };

        GlobalMetrics {
            total_active_cases: total_active.round() as u64,
            total_cases: total.round() as u64,
            total_recovered: recovered.round() as u64,
            high_risk_zones,
            case_trend,
            day: self.day,
        }
    }

    /// Global 7/14-day projection; the zero result until a week of history
    /// exists.
    pub fn forecast(&self) -> GlobalForecast {
        let scores: Vec<u32> = self
            .zones
            .iter()
            .map(|zone| risk::risk_score(zone, &self.matrix))
            .collect();
        forecast::global_forecast(
            &self.history,
            self.zones.len(),
            &self.matrix,
            &scores,
            self.day,
        )
    }

    /// 7-day projection for one zone; `None` for an unknown id, the zero
    /// result until a week of history exists.
    pub fn zone_forecast(&self, zone_id: &str) -> Option<ZoneForecast> {
        let zone = self.zones.iter().find(|z| z.id == zone_id)?;
        let score = risk::risk_score(zone, &self.matrix);
        let quarantine = QuarantineLevel::from_risk(score);
        let daily_import = self.daily_import_for(zone);

        Some(forecast::zone_forecast(
            zone,
            quarantine,
            daily_import,
            self.history.len(),
        ))
    }

    /// Likelihood that a zone crosses into the next quarantine tier;
    /// `None` for an unknown id.
    pub fn transition_probability(&self, zone_id: &str) -> Option<TransitionEstimate> {
        let zone = self.zones.iter().find(|z| z.id == zone_id)?;
        let scores: HashMap<String, u32> = self
            .zones
            .iter()
            .map(|z| (z.id.clone(), risk::risk_score(z, &self.matrix)))
            .collect();
        let score = scores.get(zone_id).copied().unwrap_or(0);

        Some(risk::transition_probability(
            zone,
            score,
            &self.matrix,
            &scores,
        ))
    }

    /// Current total flow as a percentage of the day-0 baseline.
    pub fn mobility_index(&self) -> u8 {
        mobility_index(&self.matrix, &self.baseline_matrix)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn current_date(&self) -> NaiveDate {
        self.config.start_date + Days::new(u64::from(self.day))
    }

    /// Day-stamped snapshots, one per completed step, oldest first.
    pub fn history(&self) -> &[DaySnapshot] {
        &self.history
    }

    /// Rolling log of the most recent alerts (capacity 10).
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn mobility_matrix(&self) -> &MobilityMatrix {
        &self.matrix
    }

    pub fn baseline_matrix(&self) -> &MobilityMatrix {
        &self.baseline_matrix
    }

    /// Externally-seeded infections per zone for one day, from prevalence
    /// at every origin weighted by inbound flow and the coupling
    /// coefficient.
    fn imported_cases(&self) -> Vec<f64> {
        let shares: Vec<(&str, f64)> = self
            .zones
            .iter()
            .map(|z| (z.id.as_str(), z.prevalence_ratio()))
            .collect();

        self.zones
            .iter()
            .map(|dest| {
                shares
                    .iter()
                    .filter(|(id, share)| *id != dest.id && *share > 0.0)
                    .map(|(id, share)| share * self.matrix.flow(id, &dest.id) * self.params.mu)
                    .sum()
            })
            .collect()
    }

    fn daily_import_for(&self, dest: &Zone) -> f64 {
        self.zones
            .iter()
            .filter(|origin| origin.id != dest.id)
            .map(|origin| {
                origin.prevalence_ratio() * self.matrix.flow(&origin.id, &dest.id) * self.params.mu
            })
            .sum()
    }
}

/// Percent change of rounded active cases against the prior day.
fn variation_24h(zone: &Zone) -> f64 {
    let infectious = &zone.history.infectious;
    if infectious.len() < 2 {
        return 0.0;
    }
    let previous = infectious[infectious.len() - 2].round();
    if previous <= 0.0 {
        return 0.0;
    }
    round_to((zone.infectious.round() - previous) / previous * 100.0, 1)
}
