use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete quarantine tier derived from a zone's current risk score.
///
/// A pure step function with no hysteresis: the tier is recomputed from the
/// score every day and nothing latches between days beyond what the risk
/// score itself carries through the compartment history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarantineLevel {
    #[default]
    None,
    Moderate,
    Severe,
    Strict,
}

impl QuarantineLevel {
    pub const STRICT_THRESHOLD: u32 = 85;
    pub const SEVERE_THRESHOLD: u32 = 60;
    pub const MODERATE_THRESHOLD: u32 = 40;

    pub fn from_risk(score: u32) -> Self {
        if score >= Self::STRICT_THRESHOLD {
            QuarantineLevel::Strict
        } else if score >= Self::SEVERE_THRESHOLD {
            QuarantineLevel::Severe
        } else if score >= Self::MODERATE_THRESHOLD {
            QuarantineLevel::Moderate
        } else {
            QuarantineLevel::None
        }
    }

    /// Multiplier applied to every mobility flow touching a zone at this
    /// tier when the matrix is regenerated.
    pub fn mobility_factor(self) -> f64 {
        match self {
            QuarantineLevel::None => 1.0,
            QuarantineLevel::Moderate => 0.7,
            QuarantineLevel::Severe => 0.3,
            QuarantineLevel::Strict => 0.05,
        }
    }

    /// Damping applied to a zone's short-term case forecast while movement
    /// restrictions are in force.
    pub fn forecast_damping(self) -> f64 {
        match self {
            QuarantineLevel::Severe => 0.8,
            QuarantineLevel::Strict => 0.6,
            _ => 1.0,
        }
    }

    pub fn is_restricted(self) -> bool {
        self != QuarantineLevel::None
    }
}

impl fmt::Display for QuarantineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuarantineLevel::None => "none",
            QuarantineLevel::Moderate => "moderate",
            QuarantineLevel::Severe => "severe",
            QuarantineLevel::Strict => "strict",
        };
        f.write_str(label)
    }
}
