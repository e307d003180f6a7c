//! Created Histories Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for records, conditions and condition sets
//! - Fixtures for common sheets and seeded stores
//! - Assertions for filter results

// Re-export in-memory stores from their source crate
pub use histories_storage::{InMemoryPresetStore, InMemoryRecordStore, PresetManager};

// Re-export core types for convenience
pub use histories_core::{
    Combinator, Condition, ConditionSet, DeviceType, FieldDescriptor, FieldValue, FilterOperator,
    OpCo, Record, RecordId, Sheet,
};

use histories_storage::RecordStore;
use proptest::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

pub const OHIO_METERS: Sheet = Sheet::new(OpCo::Ohio, DeviceType::Meters);
pub const IM_METERS: Sheet = Sheet::new(OpCo::IndianaMichigan, DeviceType::Meters);
pub const OHIO_TRANSFORMERS: Sheet = Sheet::new(OpCo::Ohio, DeviceType::Transformers);
pub const IM_TRANSFORMERS: Sheet = Sheet::new(OpCo::IndianaMichigan, DeviceType::Transformers);

/// A meter purchase line with the fields most tests care about.
pub fn meter_record(dev_code: &str, status: &str, qty: i64, unit_cost: f64) -> Record {
    Record::new()
        .with("dev_code", dev_code)
        .with("status", status)
        .with("mfr", "Itron")
        .with("qty", qty)
        .with("unit_cost", unit_cost)
        .with("recv_date", "2024-02-01")
}

/// Record store seeded with a few lines on Ohio meters and I&M transformers.
pub fn seeded_record_store() -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    let rows = [
        (OHIO_METERS, meter_record("A100", "Active", 10, 12.5)),
        (OHIO_METERS, meter_record("A200", "Pending", 4, 30.0)),
        (OHIO_METERS, meter_record("B300", "Retired", 1, 0.0)),
        (IM_TRANSFORMERS, meter_record("T10", "Active", 2, 900.0)),
    ];
    for (sheet, record) in rows {
        store
            .insert(sheet, record)
            .expect("seeding an in-memory store cannot fail");
    }
    store
}

/// Fresh in-memory preset manager.
pub fn preset_manager() -> PresetManager<InMemoryPresetStore> {
    PresetManager::new(InMemoryPresetStore::new())
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Generate a field descriptor from the schema subset tests exercise.
pub fn arb_field() -> impl Strategy<Value = FieldDescriptor> {
    prop_oneof![
        Just(FieldDescriptor::text("status")),
        Just(FieldDescriptor::text("dev_code")),
        Just(FieldDescriptor::number("qty")),
        Just(FieldDescriptor::number("unit_cost")),
        Just(FieldDescriptor::date("recv_date")),
    ]
}

pub fn arb_operator() -> impl Strategy<Value = FilterOperator> {
    proptest::sample::select(FilterOperator::ALL.to_vec())
}

pub fn arb_combinator() -> impl Strategy<Value = Combinator> {
    prop_oneof![Just(Combinator::And), Just(Combinator::Or)]
}

/// Generate an operand: absent, text, a whole number or an ISO date.
pub fn arb_operand() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        2 => "[A-Za-z]{1,4}".prop_map(Some),
        2 => (0u32..200).prop_map(|n| Some(n.to_string())),
        1 => (2020i32..2026, 1u32..13, 1u32..28)
            .prop_map(|(y, m, d)| Some(format!("{:04}-{:02}-{:02}", y, m, d))),
    ]
}

/// Generate a condition; operands are sometimes absent to exercise the
/// malformed-condition path.
pub fn arb_condition() -> impl Strategy<Value = Condition> {
    (arb_field(), arb_operator(), arb_operand())
        .prop_map(|(field, operator, value)| Condition::new(field, operator, value))
}

pub fn arb_condition_set() -> impl Strategy<Value = ConditionSet> {
    (prop::collection::vec(arb_condition(), 0..4), arb_combinator()).prop_map(
        |(conditions, combinator)| ConditionSet {
            conditions,
            combinator,
        },
    )
}

/// Generate a record shaped like a sheet row, values kept as text the way
/// the import path delivers them. Includes lowercase statuses, blank codes,
/// non-numeric quantities and US-style dates.
pub fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec!["Active", "Pending", "Retired", "", "active"]),
        "[A-Z]{0,2}[0-9]{0,3}",
        prop_oneof![
            (0i64..150).prop_map(|n| n.to_string()),
            Just(String::new()),
            Just("n/a".to_string()),
        ],
        (0u32..500).prop_map(|n| format!("{}.25", n)),
        (2020i32..2026, 1u32..13, 1u32..28)
            .prop_map(|(y, m, d)| format!("{:02}/{:02}/{:04}", m, d, y)),
    )
        .prop_map(|(status, dev_code, qty, cost, recv)| {
            Record::new()
                .with("status", status)
                .with("dev_code", dev_code)
                .with("qty", qty)
                .with("unit_cost", cost)
                .with("recv_date", recv)
        })
}

pub fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..12)
}

/// Generate a preset name: non-blank, no surrounding whitespace.
pub fn arb_preset_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,15}".prop_map(|s| s.trim().to_string())
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Assert that every record's `field` renders as one of `expected`, in order.
pub fn assert_field_values(records: &[Record], field: &str, expected: &[&str]) {
    let actual: Vec<String> = records.iter().map(|r| r.text(field).into_owned()).collect();
    assert_eq!(actual, expected, "unexpected values for field {}", field);
}
