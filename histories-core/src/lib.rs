//! Created Histories Core - Records, Filters and Statistics
//!
//! Pure data types and pure functions for the device-history inventory:
//! the fixed field schema, record values, the multi-condition filter
//! evaluator, aggregate statistics and OOR serial parsing. No I/O and no
//! logging live here; storage and sessions build on top of this crate.

pub mod config;
pub mod error;
pub mod filter;
pub mod schema;
pub mod serial;
pub mod stats;
pub mod value;

pub use config::HistoriesConfig;
pub use error::{ConfigError, HistoriesError, HistoriesResult, StorageError, ValidationError};
pub use filter::{
    evaluate, matches, quick_search, Combinator, Condition, ConditionSet, FilterEvaluator,
    FilterOperator,
};
pub use schema::{DeviceType, FieldDescriptor, FieldSpec, FieldType, OpCo, Sheet, HISTORY_FIELDS};
pub use serial::{derive_quantity, quantity_from_range, OorSerials, SerialRange};
pub use stats::{rollup, summarize, summarize_with, DashboardTotals, Summary};
pub use value::{FieldValue, Record, RecordId};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
