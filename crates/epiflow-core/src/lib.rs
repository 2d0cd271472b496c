//! Core data model for the epiflow metapopulation workspace.
//!
//! This crate holds everything the mobility generator and the simulation
//! engine agree on: the zone geography table, great-circle math,
//! epidemiological rate parameters, and the quarantine policy tiers derived
//! from risk scores. It performs no simulation itself.

pub mod error;
pub mod geo;
pub mod types;

pub use error::{GeographyError, ParameterError};
pub use geo::Coordinates;
pub use types::geography::{
    abidjan_cluster, ivory_coast_zones, top_central_zones, total_population, validate_geography,
    zone_by_id, zones_by_region, GeoZone, ABIDJAN_REGION,
};
pub use types::parameters::{ParameterUpdate, Parameters};
pub use types::policy::QuarantineLevel;
