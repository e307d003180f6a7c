//! Configuration loading for the histories binary.
//!
//! All fields are required unless explicitly marked optional. The `[core]`
//! table falls back to the built-in field names and date formats. The file
//! path itself comes from `--config` or `HISTORIES_CONFIG` (see [`crate::cli`]).

use histories_core::HistoriesConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// JSON array of records, each naming its sheet via `opco` and `device_type`.
    pub records_path: PathBuf,
    /// Directory holding the LMDB preset environment.
    pub preset_store_path: PathBuf,
    pub preset_store_max_size_mb: usize,
    pub start_in_edit_mode: bool,
    /// Overrides the default tracing filter when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    #[serde(default)]
    pub core: HistoriesConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl AppConfig {
    /// Parse and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.records_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "records_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.preset_store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "preset_store_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.preset_store_max_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "preset_store_max_size_mb",
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "log_filter",
                    reason: "must not be empty when set".to_string(),
                });
            }
        }
        if let Err(e) = self.core.validate() {
            return Err(ConfigError::InvalidValue {
                field: "core",
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}
