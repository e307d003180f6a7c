//! Property-Based Tests for the Filter Evaluator
//!
//! Laws checked over arbitrary records and condition sets:
//! - identity: an empty set returns the input unchanged
//! - a single condition behaves the same under AND and OR
//! - idempotence: filtering twice equals filtering once
//! - AND is non-increasing and OR non-decreasing as conditions are added
//! - results are an order-preserving subsequence of the input

use histories_core::{evaluate, summarize, Condition, ConditionSet, Record, Summary};
use histories_test_utils::{
    arb_combinator, arb_condition, arb_condition_set, arb_field, arb_records,
};
use proptest::prelude::*;

fn is_subsequence(sub: &[Record], of: &[Record]) -> bool {
    let mut rest = of.iter();
    sub.iter().all(|item| rest.any(|candidate| candidate == item))
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_empty_set_is_identity(records in arb_records(), combinator in arb_combinator()) {
        let set = ConditionSet::new(combinator);
        prop_assert_eq!(evaluate(&records, &set), records);
    }

    #[test]
    fn prop_single_condition_and_or_agree(records in arb_records(), condition in arb_condition()) {
        let and = ConditionSet::all(vec![condition.clone()]);
        let or = ConditionSet::any(vec![condition]);
        prop_assert_eq!(evaluate(&records, &and), evaluate(&records, &or));
    }

    #[test]
    fn prop_idempotent(records in arb_records(), set in arb_condition_set()) {
        let once = evaluate(&records, &set);
        let twice = evaluate(&once, &set);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_result_is_ordered_subsequence(records in arb_records(), set in arb_condition_set()) {
        let result = evaluate(&records, &set);
        prop_assert!(result.len() <= records.len());
        prop_assert!(is_subsequence(&result, &records));
    }

    #[test]
    fn prop_and_is_monotone_non_increasing(
        records in arb_records(),
        conditions in prop::collection::vec(arb_condition(), 0..4),
        extra in arb_condition(),
    ) {
        let before = ConditionSet::all(conditions.clone());
        let after = ConditionSet::all(conditions).with(extra);
        prop_assert!(evaluate(&records, &after).len() <= evaluate(&records, &before).len());
    }

    #[test]
    fn prop_or_is_monotone_non_decreasing(
        records in arb_records(),
        conditions in prop::collection::vec(arb_condition(), 1..4),
        extra in arb_condition(),
    ) {
        let before = ConditionSet::any(conditions.clone());
        let after = ConditionSet::any(conditions).with(extra);
        prop_assert!(evaluate(&records, &after).len() >= evaluate(&records, &before).len());
    }

    #[test]
    fn prop_is_empty_partitions_records(records in arb_records(), field in arb_field()) {
        let empty = evaluate(&records, &ConditionSet::all(vec![Condition::is_empty(field.clone())]));
        let filled = evaluate(&records, &ConditionSet::all(vec![Condition::is_not_empty(field)]));
        prop_assert_eq!(empty.len() + filled.len(), records.len());
    }

    #[test]
    fn prop_summary_count_and_average(records in arb_records()) {
        let summary = summarize(&records);
        prop_assert_eq!(summary.count, records.len());
        if records.is_empty() {
            prop_assert_eq!(summary, Summary::default());
        } else {
            let expected = summary.total_value / records.len() as f64;
            prop_assert!((summary.average_unit_cost - expected).abs() < 1e-9);
        }
    }
}
