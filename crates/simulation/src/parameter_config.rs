//! Declarations of the external parameters the scene understands.
//!
//! Numeric parameters are sensor readings with a declared range; live
//! parameters are unbounded knobs that take effect immediately (wind).

use serde::{Deserialize, Serialize};

use crate::config_error::ConfigError;
use crate::value_mapper::ValueMapper;

/// A sensor reading with a declared range and a starting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParameter {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl NumericParameter {
    pub fn unit(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            min: 0.0,
            max: 1.0,
            value,
        }
    }

    /// Mapping from the declared range onto [0, 1].
    pub fn normalizer(&self) -> Result<ValueMapper, ConfigError> {
        ValueMapper::new((self.min, self.max), (0.0, 1.0))
    }
}

/// A live control value, applied as soon as it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveParameter {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterConfig {
    pub numeric_parameters: Vec<NumericParameter>,
    pub live_parameters: Vec<LiveParameter>,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            numeric_parameters: vec![
                NumericParameter::unit("no2", 0.0),
                NumericParameter::unit("co", 0.0),
                NumericParameter::unit("pm10", 0.0),
            ],
            live_parameters: vec![LiveParameter {
                name: "windForce".to_string(),
                value: 1.0,
            }],
        }
    }
}

impl ParameterConfig {
    pub fn numeric(&self, name: &str) -> Option<&NumericParameter> {
        self.numeric_parameters.iter().find(|p| p.name == name)
    }

    pub fn live(&self, name: &str) -> Option<&LiveParameter> {
        self.live_parameters.iter().find(|p| p.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for p in &self.numeric_parameters {
            p.normalizer()?;
            if !p.value.is_finite() {
                return Err(ConfigError::InvalidSetting(format!(
                    "parameter '{}' has a non-finite value",
                    p.name
                )));
            }
        }
        for p in &self.live_parameters {
            if !p.value.is_finite() {
                return Err(ConfigError::InvalidSetting(format!(
                    "live parameter '{}' has a non-finite value",
                    p.name
                )));
            }
        }
        Ok(())
    }
}
