//! Aggregate statistics over record sets.

use crate::value::Record;
use crate::HistoriesConfig;
use serde::{Deserialize, Serialize};

/// Per-sheet summary shown on the statistics dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub total_quantity: f64,
    pub total_value: f64,
    pub average_unit_cost: f64,
}

/// Dashboard totals across several sheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardTotals {
    pub total_records: usize,
    pub total_devices: f64,
    pub total_value: f64,
    /// Mean of the per-sheet averages that are above zero.
    pub average_unit_cost: f64,
}

/// Summarize records using the configured quantity and unit-cost fields.
///
/// Missing or unparseable numbers count as zero. `total_value` is the sum of
/// `quantity * unit_cost` per record, and the average is `total_value / count`
/// (zero for an empty input).
pub fn summarize_with(records: &[Record], config: &HistoriesConfig) -> Summary {
    let mut summary = Summary {
        count: records.len(),
        ..Summary::default()
    };
    for record in records {
        let qty = record.number(&config.quantity_field).unwrap_or(0.0);
        let unit_cost = record.number(&config.unit_cost_field).unwrap_or(0.0);
        summary.total_quantity += qty;
        summary.total_value += qty * unit_cost;
    }
    if summary.count > 0 {
        summary.average_unit_cost = summary.total_value / summary.count as f64;
    }
    summary
}

/// Summarize with the default `qty` / `unit_cost` fields.
pub fn summarize(records: &[Record]) -> Summary {
    summarize_with(records, &HistoriesConfig::default())
}

/// Roll per-sheet summaries up into dashboard totals.
pub fn rollup<'a>(summaries: impl IntoIterator<Item = &'a Summary>) -> DashboardTotals {
    let mut totals = DashboardTotals::default();
    let mut costs = Vec::new();
    for summary in summaries {
        totals.total_records += summary.count;
        totals.total_devices += summary.total_quantity;
        totals.total_value += summary.total_value;
        if summary.average_unit_cost > 0.0 {
            costs.push(summary.average_unit_cost);
        }
    }
    if !costs.is_empty() {
        totals.average_unit_cost = costs.iter().sum::<f64>() / costs.len() as f64;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_empty() {
        assert_eq!(
            summarize(&[]),
            Summary {
                count: 0,
                total_quantity: 0.0,
                total_value: 0.0,
                average_unit_cost: 0.0,
            }
        );
    }

    #[test]
    fn test_summarize_mixed_values() {
        let records = vec![
            Record::new().with("qty", 10i64).with("unit_cost", "$2.50"),
            Record::new().with("qty", "4").with("unit_cost", 5.0),
            Record::new().with("qty", "lots").with("unit_cost", 99.0),
            Record::new(),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_quantity, 14.0);
        assert_eq!(summary.total_value, 45.0);
        assert_eq!(summary.average_unit_cost, 11.25);
    }

    #[test]
    fn test_summarize_custom_fields() {
        let config = HistoriesConfig {
            quantity_field: "count".to_string(),
            unit_cost_field: "cost".to_string(),
            ..HistoriesConfig::default()
        };
        let records = vec![Record::new().with("count", 2i64).with("cost", "3")];
        let summary = summarize_with(&records, &config);
        assert_eq!(summary.total_value, 6.0);
    }

    #[test]
    fn test_rollup_ignores_zero_averages() {
        let a = Summary {
            count: 2,
            total_quantity: 10.0,
            total_value: 40.0,
            average_unit_cost: 20.0,
        };
        let b = Summary::default();
        let c = Summary {
            count: 1,
            total_quantity: 1.0,
            total_value: 10.0,
            average_unit_cost: 10.0,
        };
        let totals = rollup([&a, &b, &c]);
        assert_eq!(totals.total_records, 3);
        assert_eq!(totals.total_devices, 11.0);
        assert_eq!(totals.total_value, 50.0);
        assert_eq!(totals.average_unit_cost, 15.0);
    }

    #[test]
    fn test_rollup_of_nothing() {
        assert_eq!(rollup(std::iter::empty()), DashboardTotals::default());
    }
}
