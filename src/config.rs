use std::path::Path;

use log::warn;

use crate::ai::{BaselineConfig, MagnusConfig};
use crate::error::ConfigError;
use crate::training::{EvaluationConfig, TrainerConfig};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub magnus: MagnusConfig,
    pub baseline: BaselineConfig,
    pub training: TrainerConfig,
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.magnus;
        if m.simulations == 0 {
            return Err(ConfigError::Validation(
                "magnus.simulations must be >= 1".into(),
            ));
        }
        if !(m.exploration_c >= 0.0 && m.exploration_c.is_finite()) {
            return Err(ConfigError::Validation(
                "magnus.exploration_c must be a finite value >= 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&m.alpha) {
            return Err(ConfigError::Validation(
                "magnus.alpha must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&m.beta) {
            return Err(ConfigError::Validation(
                "magnus.beta must be in [0, 1]".into(),
            ));
        }
        if m.q_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "magnus.q_file must not be empty".into(),
            ));
        }

        if self.baseline.simulations == 0 {
            return Err(ConfigError::Validation(
                "baseline.simulations must be >= 1".into(),
            ));
        }
        if !(self.baseline.exploration_c >= 0.0 && self.baseline.exploration_c.is_finite()) {
            return Err(ConfigError::Validation(
                "baseline.exploration_c must be a finite value >= 0".into(),
            ));
        }

        if self.training.episodes == 0 {
            return Err(ConfigError::Validation(
                "training.episodes must be > 0".into(),
            ));
        }
        if self.training.metrics_window == 0 {
            return Err(ConfigError::Validation(
                "training.metrics_window must be > 0".into(),
            ));
        }

        if self.evaluation.games == 0 {
            return Err(ConfigError::Validation(
                "evaluation.games must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}
