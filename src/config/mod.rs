//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::balance::BalanceOptions;
use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Balancing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancingConfig {
    /// Reject selections containing unknown identifiers
    #[serde(default)]
    pub strict_selection: bool,

    /// Append every successful split to the monitoring log
    #[serde(default = "default_log_results")]
    pub log_results: bool,
}

fn default_log_results() -> bool {
    true
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            strict_selection: false,
            log_results: default_log_results(),
        }
    }
}

impl BalancingConfig {
    pub fn options(&self) -> BalanceOptions {
        BalanceOptions {
            strict_selection: self.strict_selection,
        }
    }
}

/// Monitoring log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Entries kept in the rolling log
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Largest tolerated distance of pA from 0.5
    #[serde(default = "default_imbalance_threshold")]
    pub imbalance_threshold: f64,

    /// Player count expected in every logged split
    #[serde(default = "default_expected_players")]
    pub expected_players: usize,
}

fn default_max_entries() -> usize {
    10
}

fn default_imbalance_threshold() -> f64 {
    0.15
}

fn default_expected_players() -> usize {
    8
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            imbalance_threshold: default_imbalance_threshold(),
            expected_players: default_expected_players(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Roster file; defaults to `<data_dir>/roster.jsonl`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub balancing: BalancingConfig,

    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            roster_path: None,
            server: ServerConfig::default(),
            balancing: BalancingConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }

    /// Roster file to load.
    pub fn roster_path(&self) -> PathBuf {
        self.roster_path
            .clone()
            .unwrap_or_else(|| self.storage().roster_path())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.monitoring.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "Monitoring max_entries must be greater than 0".to_string(),
            ));
        }

        if self.monitoring.expected_players < 2 {
            return Err(ConfigError::ValidationError(
                "Monitoring expected_players must be at least 2".to_string(),
            ));
        }

        let threshold = self.monitoring.imbalance_threshold;
        if !(threshold > 0.0 && threshold <= 0.5) {
            return Err(ConfigError::ValidationError(format!(
                "Monitoring imbalance_threshold must be in (0, 0.5], got {}",
                threshold
            )));
        }

        Ok(())
    }
}
