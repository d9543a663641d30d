//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the standard weights and thresholds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, ConfigResult};
use crate::report::RiskThresholds;
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub thresholds: RiskThresholds,
}

impl EngineConfig {
    /// Parse and validate a JSON config string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.scoring.validate()?;
        self.thresholds.validate()
    }
}
