//! Application configuration.
//!
//! Settings come from an optional TOML file, then the
//! `GROUP_GAMES_DATA_DIR` environment variable, then CLI flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GROUP_GAMES_DATA_DIR";

/// Runtime configuration for the group games tool.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for stored groups.
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    /// Group the CLI operates on.
    #[serde(default = "default_group_id")]
    group_id: String,

    /// Name given to the group when it is first created.
    #[serde(default = "default_group_name")]
    group_name: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_data_dir() -> PathBuf {
    PathBuf::from("group_games_data")
}

#[instrument]
fn default_group_id() -> String {
    "default".to_string()
}

#[instrument]
fn default_group_name() -> String {
    "Game night".to_string()
}

#[instrument]
fn default_log_filter() -> String {
    "warn,group_games=info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            group_id: default_group_id(),
            group_name: default_group_name(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(group_id = %config.group_id, data_dir = %config.data_dir.display(), "Config loaded");
        Ok(config)
    }

    /// Loads the file if given, otherwise defaults, then applies the
    /// environment override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `GROUP_GAMES_DATA_DIR` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => {
                debug!(%dir, "Data dir overridden from environment");
                self.with_data_dir(dir)
            }
            _ => self,
        }
    }

    /// Replaces the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Replaces the group id.
    pub fn with_group_id(mut self, id: impl Into<String>) -> Self {
        self.group_id = id.into();
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
