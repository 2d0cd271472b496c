use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// Epidemiological rate parameters of the SEIR process.
///
/// Defaults are illustrative values in the COVID-19/dengue range, not a
/// calibrated fit.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Parameters {
    /// Transmission rate: contacts per day times infection probability.
    pub beta: f64,
    /// Incubation rate, the reciprocal of the mean latency in days.
    pub sigma: f64,
    /// Recovery rate, the reciprocal of the mean infectious period in days.
    pub gamma: f64,
    /// Mobility-to-infection coupling coefficient for imported cases.
    pub mu: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            beta: 0.35,
            sigma: 1.0 / 5.1,
            gamma: 1.0 / 14.0,
            mu: 1e-4,
        }
    }
}

impl Parameters {
    /// All four rates must be strictly positive.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [
            ("beta", self.beta),
            ("sigma", self.sigma),
            ("gamma", self.gamma),
            ("mu", self.mu),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParameterError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Partial override of [`Parameters`]; fields left unset keep their prior
/// values.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub beta: Option<f64>,
    pub sigma: Option<f64>,
    pub gamma: Option<f64>,
    pub mu: Option<f64>,
}

impl ParameterUpdate {
    pub fn apply(&self, params: &mut Parameters) {
        if let Some(beta) = self.beta {
            params.beta = beta;
        }
        if let Some(sigma) = self.sigma {
            params.sigma = sigma;
        }
        if let Some(gamma) = self.gamma {
            params.gamma = gamma;
        }
        if let Some(mu) = self.mu {
            params.mu = mu;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        Parameters::default().validate().unwrap();
    }

    #[test]
    fn test_non_positive_rates_rejected() {
        let flat = Parameters {
            gamma: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            flat.validate(),
            Err(ParameterError::NonPositive { name: "gamma", .. })
        ));

        let negative = Parameters {
            beta: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_partial_update_keeps_unset_fields() {
        let mut params = Parameters::default();
        let update = ParameterUpdate {
            beta: Some(0.5),
            ..Default::default()
        };
        update.apply(&mut params);

        assert_relative_eq!(params.beta, 0.5);
        assert_relative_eq!(params.sigma, 1.0 / 5.1);
        assert_relative_eq!(params.gamma, 1.0 / 14.0);
        assert_relative_eq!(params.mu, 1e-4);
    }
}
