//! Persistent deployment settings: tax rate, objective scaling, goal, storage.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::services::GoalConfig,
    ledger::{metrics::MAX_TAX_RATE, MetricsConfig},
    storage::csv_backend::DEFAULT_RETENTION,
    utils::write_atomic,
};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional directory for period files. Defaults to the application data directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            metrics: MetricsConfig::default(),
            goal: GoalConfig::default(),
            backup_retention: Self::default_backup_retention(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "FCFA".into()
    }

    pub fn default_backup_retention() -> usize {
        DEFAULT_RETENTION
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tax_rate = self.metrics.tax_rate;
        if !tax_rate.is_finite() || !(0.0..=MAX_TAX_RATE).contains(&tax_rate) {
            return Err(ConfigError::Invalid(format!(
                "tax_rate must be a fraction between 0 and {MAX_TAX_RATE}, got {tax_rate}"
            )));
        }
        if self.metrics.objective_floor == 0 {
            return Err(ConfigError::Invalid("objective_floor must be at least 1".into()));
        }
        if self.metrics.reference_spend == 0 {
            return Err(ConfigError::Invalid("reference_spend must be positive".into()));
        }
        Ok(())
    }

    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        self.data_root.clone().unwrap_or_else(|| base.to_path_buf())
    }
}

/// Loads and saves [`Config`] as `config.json` inside a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            config_path: base.join(CONFIG_FILE),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the stored configuration, or defaults when none was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config = if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.config_path, json.as_bytes())?;
        Ok(())
    }
}
