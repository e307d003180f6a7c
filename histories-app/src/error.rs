//! Error types for the application layer.

use crate::config::ConfigError;
use histories_core::HistoriesError;
use histories_storage::LmdbPresetError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Snapshot error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] HistoriesError),
    #[error(transparent)]
    PresetStore(#[from] LmdbPresetError),
    #[error("Edit mode is off: {operation} is not allowed")]
    ReadOnly { operation: &'static str },
    #[error("No condition at position {index}")]
    NoSuchCondition { index: usize },
    #[error("Failed to initialise logging: {0}")]
    Telemetry(String),
}

impl AppError {
    pub fn is_read_only(&self) -> bool {
        matches!(self, AppError::ReadOnly { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;
