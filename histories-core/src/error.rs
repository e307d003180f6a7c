//! Error types for Created Histories operations

use crate::RecordId;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("Filter preset not found: {name}")]
    PresetNotFound { name: String },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Operator {operator} requires an operand")]
    MissingOperand { operator: String },

    #[error("Operator {operator} is not applicable to text field {field}")]
    OperatorTypeMismatch { operator: String, field: String },

    #[error("Invalid OOR serial entry '{entry}'")]
    InvalidSerialEntry { entry: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Created Histories errors.
#[derive(Debug, Clone, Error)]
pub enum HistoriesError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl HistoriesError {
    /// True when the error is a missing-preset lookup.
    pub fn is_preset_not_found(&self) -> bool {
        matches!(
            self,
            HistoriesError::Storage(StorageError::PresetNotFound { .. })
        )
    }
}

/// Result type alias for Created Histories operations.
pub type HistoriesResult<T> = Result<T, HistoriesError>;

// =============================================================================
// TESTS
// =============================================================================
