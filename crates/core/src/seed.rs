//! Reproducible description of a hatching run.
//!
//! A [`Seed`] captures everything needed to regenerate a set of flow lines:
//! field-source name, domain size, parameters, PRNG seed, and line budget.

use serde::{Deserialize, Serialize};

use crate::config::FlowConfig;
use crate::error::HatchError;

/// Reproducible description of a hatching run.
///
/// Two identical `Seed` values resolved against the same field registry
/// produce identical lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub field: String,
    pub width: f64,
    pub height: f64,
    pub params: serde_json::Value,
    pub seed: u64,
    /// Maximum number of lines to keep. `0` runs the generator dry.
    #[serde(default)]
    pub lines: usize,
}

impl Seed {
    /// Creates a new Seed with default params (`{}`) and no line limit.
    pub fn new(field: &str, width: f64, height: f64, seed: u64) -> Self {
        Self {
            field: field.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            lines: 0,
        }
    }

    /// Checks that the domain is finite and non-empty.
    pub fn validate(&self) -> Result<(), HatchError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(HatchError::InvalidDimensions);
        }
        Ok(())
    }

    /// Generator config from `params`, with the seed's own domain and PRNG
    /// seed taking precedence over any keys of the same name.
    pub fn to_config(&self) -> Result<FlowConfig, HatchError> {
        self.validate()?;
        let mut config = FlowConfig::from_json(&self.params)?;
        config.width = self.width;
        config.height = self.height;
        config.seed = self.seed;
        config.validate()?;
        Ok(config)
    }
}
