//! Configuration types

use crate::schema::{FIELD_QTY, FIELD_UNIT_COST};
use crate::value::DEFAULT_DATE_FORMATS;
use crate::{ConfigError, HistoriesError, HistoriesResult};
use serde::{Deserialize, Serialize};

/// Core configuration: which fields feed the statistics and how text dates
/// are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoriesConfig {
    /// Field summed into `total_quantity`.
    pub quantity_field: String,
    /// Field multiplied by quantity into `total_value`.
    pub unit_cost_field: String,
    /// chrono format strings tried in order when reading a text date.
    pub date_formats: Vec<String>,
}

impl Default for HistoriesConfig {
    fn default() -> Self {
        Self {
            quantity_field: FIELD_QTY.to_string(),
            unit_cost_field: FIELD_UNIT_COST.to_string(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl HistoriesConfig {
    /// Validate the configuration.
    ///
    /// Validates:
    /// - quantity_field and unit_cost_field are non-empty
    /// - at least one date format, none blank
    pub fn validate(&self) -> HistoriesResult<()> {
        if self.quantity_field.trim().is_empty() {
            return Err(HistoriesError::Config(ConfigError::InvalidValue {
                field: "quantity_field".to_string(),
                value: self.quantity_field.clone(),
                reason: "quantity_field must not be empty".to_string(),
            }));
        }

        if self.unit_cost_field.trim().is_empty() {
            return Err(HistoriesError::Config(ConfigError::InvalidValue {
                field: "unit_cost_field".to_string(),
                value: self.unit_cost_field.clone(),
                reason: "unit_cost_field must not be empty".to_string(),
            }));
        }

        if self.date_formats.is_empty() {
            return Err(HistoriesError::Config(ConfigError::MissingRequired {
                field: "date_formats".to_string(),
            }));
        }

        if let Some(blank) = self.date_formats.iter().find(|f| f.trim().is_empty()) {
            return Err(HistoriesError::Config(ConfigError::InvalidValue {
                field: "date_formats".to_string(),
                value: blank.clone(),
                reason: "date formats must not be blank".to_string(),
            }));
        }

        Ok(())
    }
}
