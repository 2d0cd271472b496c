//! Metapopulation SEIR engine for the epiflow workspace.
//!
//! Each zone carries its own Susceptible→Exposed→Infectious→Removed
//! compartments, advanced one day at a time by forward Euler. Zones are
//! coupled by the mobility matrix: infectious prevalence at an origin,
//! weighted by inbound flow and the coupling coefficient, seeds cases at
//! the destination. Emergent quarantine levels feed back into the next
//! day's matrix, closing the loop between policy and spread.
//!
//! The engine is single-threaded and synchronous with no I/O of its own;
//! a driving application owns the instance and serializes calls to
//! [`Simulation::step`], [`Simulation::reset`] and parameter updates.
//! All randomness (outbreak seeding, alert sampling) flows through one
//! seedable RNG so runs can be pinned for tests.

pub mod alerts;
pub mod engine;
pub mod forecast;
pub mod metrics;
pub mod risk;
pub mod zone;

pub use alerts::{Alert, AlertConfig, AlertKind, AlertPriority};
pub use engine::{DayReport, Simulation, SimulationConfig, SimulationError};
pub use forecast::{GlobalForecast, ZoneForecast};
pub use metrics::{DaySnapshot, GlobalMetrics, ZoneMetrics};
pub use risk::{risk_score, transition_probability, TransitionEstimate, TransitionFactors};
pub use zone::{CompartmentHistory, SeedingPolicy, Zone};
