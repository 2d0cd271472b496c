use thiserror::Error;

/// Errors raised while validating a zone geography table.
///
/// These are the only hard failures of the data model: a malformed geography
/// cannot produce a meaningful simulation, so it is rejected up front instead
/// of being guarded at every use site.
#[derive(Debug, Error)]
pub enum GeographyError {
    #[error("geography table is empty")]
    Empty,
    #[error("duplicate zone id '{0}'")]
    DuplicateId(String),
    #[error("zone '{id}': population must be greater than zero")]
    ZeroPopulation { id: String },
    #[error("zone '{id}': invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        id: String,
        latitude: f64,
        longitude: f64,
    },
    #[error("zone '{id}': centrality {value} outside the 0-100 range")]
    CentralityOutOfRange { id: String, value: f64 },
}

/// Errors raised while validating epidemiological parameters.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter '{name}' must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}
