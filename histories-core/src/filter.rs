//! Multi-condition filter expressions and their evaluation.
//!
//! A [`ConditionSet`] is an ordered list of [`Condition`]s joined by a single
//! [`Combinator`]. Evaluation is best-effort: a malformed condition never
//! fails the pass, it simply matches nothing.

use crate::schema::{FieldDescriptor, FieldType};
use crate::value::{parse_date, parse_number, FieldValue, Record, DEFAULT_DATE_FORMATS};
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Case-insensitive substring
    Contains,
    /// Type-normalized equality
    Equals,
    /// Case-insensitive prefix
    StartsWith,
    /// Case-insensitive suffix
    EndsWith,
    /// Numeric or date ordering
    GreaterThan,
    /// Numeric or date ordering
    LessThan,
    /// Absent, null or whitespace-only
    IsEmpty,
    /// Negation of `IsEmpty`
    IsNotEmpty,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        FilterOperator::Contains,
        FilterOperator::Equals,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
        }
    }

    /// Human-facing label, as shown in the operator picker.
    pub fn label(self) -> &'static str {
        match self {
            FilterOperator::Contains => "Contains",
            FilterOperator::Equals => "Equals",
            FilterOperator::StartsWith => "Starts with",
            FilterOperator::EndsWith => "Ends with",
            FilterOperator::GreaterThan => "Greater than",
            FilterOperator::LessThan => "Less than",
            FilterOperator::IsEmpty => "Is empty",
            FilterOperator::IsNotEmpty => "Is not empty",
        }
    }

    pub fn requires_operand(self) -> bool {
        !matches!(self, FilterOperator::IsEmpty | FilterOperator::IsNotEmpty)
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, FilterOperator::GreaterThan | FilterOperator::LessThan)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ValidationError;

    /// Accepts either the snake_case name or the picker label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s || op.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "operator".to_string(),
                reason: format!("unknown operator '{}'", s),
            })
    }
}

/// How the conditions of a set are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    /// Every condition must match
    #[default]
    And,
    /// At least one condition must match
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

/// A single field/operator/value rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: FieldDescriptor,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Condition {
    pub fn new(field: FieldDescriptor, operator: FilterOperator, value: Option<String>) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// Condition with an operand.
    pub fn with_value(
        field: FieldDescriptor,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self::new(field, operator, Some(value.into()))
    }

    pub fn contains(field: FieldDescriptor, value: impl Into<String>) -> Self {
        Self::with_value(field, FilterOperator::Contains, value)
    }

    pub fn equals(field: FieldDescriptor, value: impl Into<String>) -> Self {
        Self::with_value(field, FilterOperator::Equals, value)
    }

    pub fn greater_than(field: FieldDescriptor, value: impl Into<String>) -> Self {
        Self::with_value(field, FilterOperator::GreaterThan, value)
    }

    pub fn less_than(field: FieldDescriptor, value: impl Into<String>) -> Self {
        Self::with_value(field, FilterOperator::LessThan, value)
    }

    pub fn is_empty(field: FieldDescriptor) -> Self {
        Self::new(field, FilterOperator::IsEmpty, None)
    }

    pub fn is_not_empty(field: FieldDescriptor) -> Self {
        Self::new(field, FilterOperator::IsNotEmpty, None)
    }

    /// Trimmed operand, `None` when absent or blank.
    pub fn operand(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Report why this condition can never match.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.operator.requires_operand() && self.operand().is_none() {
            return Err(ValidationError::MissingOperand {
                operator: self.operator.to_string(),
            });
        }
        if self.operator.is_ordering() && !self.field.field_type.is_ordered() {
            return Err(ValidationError::OperatorTypeMismatch {
                operator: self.operator.to_string(),
                field: self.field.name.clone(),
            });
        }
        Ok(())
    }
}

/// Ordered conditions sharing one combinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionSet {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub combinator: Combinator,
}

impl ConditionSet {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            conditions: Vec::new(),
            combinator,
        }
    }

    /// AND-combined set.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            combinator: Combinator::And,
        }
    }

    /// OR-combined set.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            combinator: Combinator::Or,
        }
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Remove the condition at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Condition> {
        (index < self.conditions.len()).then(|| self.conditions.remove(index))
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Number of conditions reported to the caller as "active filters".
    pub fn active_count(&self) -> usize {
        self.conditions.len()
    }

    /// Indices and reasons for every condition that can never match.
    pub fn malformed(&self) -> Vec<(usize, ValidationError)> {
        self.conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.validate().err().map(|e| (i, e)))
            .collect()
    }
}

/// Evaluates condition sets against records.
///
/// Holds the date formats used to read text values as dates; everything
/// else is a pure function of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEvaluator {
    date_formats: Vec<String>,
}

impl Default for FilterEvaluator {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FilterEvaluator {
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    pub fn from_config(config: &crate::HistoriesConfig) -> Self {
        Self::new(config.date_formats.clone())
    }

    /// Records satisfying `set`, in input order. An empty set passes everything.
    pub fn evaluate(&self, records: &[Record], set: &ConditionSet) -> Vec<Record> {
        if set.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|record| self.satisfies(record, set))
            .cloned()
            .collect()
    }

    /// Whether one record satisfies the whole set.
    pub fn satisfies(&self, record: &Record, set: &ConditionSet) -> bool {
        match set.combinator {
            Combinator::And => set.conditions.iter().all(|c| self.matches(record, c)),
            Combinator::Or => {
                set.is_empty() || set.conditions.iter().any(|c| self.matches(record, c))
            }
        }
    }

    /// Whether one record satisfies one condition.
    pub fn matches(&self, record: &Record, condition: &Condition) -> bool {
        if condition.validate().is_err() {
            return false;
        }
        let value = record.get(&condition.field.name);

        let operand = match condition.operator {
            FilterOperator::IsEmpty => return value.map_or(true, FieldValue::is_blank),
            FilterOperator::IsNotEmpty => return !value.map_or(true, FieldValue::is_blank),
            _ => match condition.operand() {
                Some(operand) => operand,
                None => return false,
            },
        };

        let field_type = condition.field.field_type;
        match condition.operator {
            FilterOperator::Contains => folded(value).contains(&operand.to_lowercase()),
            FilterOperator::StartsWith => folded(value).starts_with(&operand.to_lowercase()),
            FilterOperator::EndsWith => folded(value).ends_with(&operand.to_lowercase()),
            FilterOperator::Equals => self.equals(value, operand, field_type),
            FilterOperator::GreaterThan => {
                self.compare(value, operand, field_type) == Some(Ordering::Greater)
            }
            FilterOperator::LessThan => {
                self.compare(value, operand, field_type) == Some(Ordering::Less)
            }
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty => false,
        }
    }

    fn equals(&self, value: Option<&FieldValue>, operand: &str, field_type: FieldType) -> bool {
        let typed = match field_type {
            FieldType::Number => value
                .and_then(FieldValue::as_number)
                .zip(parse_number(operand))
                .map(|(a, b)| a == b),
            FieldType::Date => value
                .and_then(|v| v.as_date(&self.date_formats))
                .zip(parse_date(operand, &self.date_formats))
                .map(|(a, b)| a == b),
            FieldType::Text => None,
        };
        typed.unwrap_or_else(|| folded(value).trim() == operand.to_lowercase())
    }

    fn compare(
        &self,
        value: Option<&FieldValue>,
        operand: &str,
        field_type: FieldType,
    ) -> Option<Ordering> {
        let value = value?;
        match field_type {
            FieldType::Number => value.as_number()?.partial_cmp(&parse_number(operand)?),
            FieldType::Date => {
                Some(value.as_date(&self.date_formats)?.cmp(&parse_date(operand, &self.date_formats)?))
            }
            FieldType::Text => None,
        }
    }
}

fn folded(value: Option<&FieldValue>) -> String {
    value
        .map(|v| v.as_text().to_lowercase())
        .unwrap_or_default()
}

/// Evaluate with the default date formats.
pub fn evaluate(records: &[Record], set: &ConditionSet) -> Vec<Record> {
    FilterEvaluator::default().evaluate(records, set)
}

/// Match one condition with the default date formats.
pub fn matches(record: &Record, condition: &Condition) -> bool {
    FilterEvaluator::default().matches(record, condition)
}

/// Free-text search across every field of each record. A blank query
/// returns the input unchanged.
pub fn quick_search(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            record
                .iter()
                .any(|(_, v)| !v.is_blank() && v.as_text().to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cost() -> FieldDescriptor {
        FieldDescriptor::number("cost")
    }

    fn status() -> FieldDescriptor {
        FieldDescriptor::text("status")
    }

    fn statuses(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|s| Record::new().with("status", *s))
            .collect()
    }

    #[test]
    fn test_empty_set_is_identity() {
        let records = statuses(&["Active", "Retired"]);
        assert_eq!(evaluate(&records, &ConditionSet::default()), records);
        assert_eq!(evaluate(&records, &ConditionSet::new(Combinator::Or)), records);
    }

    #[test]
    fn test_greater_than_skips_blank_cost() {
        let records = vec![
            Record::new().with("cost", "10.00"),
            Record::new().with("cost", "20.00"),
            Record::new().with("cost", ""),
        ];
        let set = ConditionSet::all(vec![Condition::greater_than(cost(), "15")]);
        assert_eq!(evaluate(&records, &set), vec![Record::new().with("cost", "20.00")]);
    }

    #[test]
    fn test_or_of_equals_preserves_order() {
        let records = statuses(&["Active", "Pending", "Retired"]);
        let set = ConditionSet::any(vec![
            Condition::equals(status(), "Active"),
            Condition::equals(status(), "Pending"),
        ]);
        assert_eq!(evaluate(&records, &set), statuses(&["Active", "Pending"]));
    }

    #[test]
    fn test_and_requires_every_condition() {
        let records = vec![
            Record::new().with("status", "Active").with("mfr", "Itron"),
            Record::new().with("status", "Active").with("mfr", "Landis"),
        ];
        let set = ConditionSet::all(vec![
            Condition::equals(status(), "active"),
            Condition::contains(FieldDescriptor::text("mfr"), "TRO"),
        ]);
        let result = evaluate(&records, &set);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text("mfr"), "Itron");
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let record = Record::new().with("dev_code", "AB-1200X");
        let field = FieldDescriptor::text("dev_code");
        assert!(matches(&record, &Condition::contains(field.clone(), "b-12")));
        assert!(!matches(&record, &Condition::contains(field, "zz")));
    }

    #[test]
    fn test_contains_on_absent_field() {
        let record = Record::new();
        assert!(!matches(&record, &Condition::contains(status(), "a")));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let record = Record::new().with("po_number", "PO-2024-0017");
        let field = FieldDescriptor::text("po_number");
        let starts = Condition::with_value(field.clone(), FilterOperator::StartsWith, "po-2024");
        let ends = Condition::with_value(field.clone(), FilterOperator::EndsWith, "0017");
        let wrong = Condition::with_value(field, FilterOperator::StartsWith, "0017");
        assert!(matches(&record, &starts));
        assert!(matches(&record, &ends));
        assert!(!matches(&record, &wrong));
    }

    #[test]
    fn test_equals_numeric_not_lexical() {
        let record = Record::new().with("qty", "20.00");
        assert!(matches(&record, &Condition::equals(FieldDescriptor::number("qty"), "20")));
        let integer = Record::new().with("qty", 20i64);
        assert!(matches(&integer, &Condition::equals(FieldDescriptor::number("qty"), "20.0")));
        // As text the same values differ.
        assert!(!matches(&record, &Condition::equals(FieldDescriptor::text("qty"), "20")));
    }

    #[test]
    fn test_equals_numeric_falls_back_to_text() {
        let record = Record::new().with("qty", "N/A");
        assert!(matches(&record, &Condition::equals(FieldDescriptor::number("qty"), "n/a")));
    }

    #[test]
    fn test_date_comparisons() {
        let recv = FieldDescriptor::date("recv_date");
        let record = Record::new().with("recv_date", "03/15/2024");
        assert!(matches(&record, &Condition::greater_than(recv.clone(), "2024-01-01")));
        assert!(!matches(&record, &Condition::less_than(recv.clone(), "2024-01-01")));
        assert!(matches(&record, &Condition::equals(recv.clone(), "2024-03-15")));

        let typed = Record::new().with("recv_date", NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert!(matches(&typed, &Condition::less_than(recv.clone(), "2024-01-01")));

        let garbage = Record::new().with("recv_date", "soon");
        assert!(!matches(&garbage, &Condition::greater_than(recv.clone(), "2024-01-01")));
        assert!(!matches(&garbage, &Condition::less_than(recv, "2024-01-01")));
    }

    #[test]
    fn test_ordering_on_text_field_never_matches() {
        let record = Record::new().with("status", "b");
        let cond = Condition::greater_than(status(), "a");
        assert!(matches!(
            cond.validate(),
            Err(ValidationError::OperatorTypeMismatch { .. })
        ));
        assert!(!matches(&record, &cond));
    }

    #[test]
    fn test_missing_operand_never_matches() {
        let record = Record::new().with("status", "Active");
        let blank = Condition::with_value(status(), FilterOperator::Contains, "   ");
        let absent = Condition::new(status(), FilterOperator::Equals, None);
        assert!(!matches(&record, &blank));
        assert!(!matches(&record, &absent));
        assert!(matches!(
            absent.validate(),
            Err(ValidationError::MissingOperand { .. })
        ));
    }

    #[test]
    fn test_malformed_condition_does_not_abort_or() {
        let records = statuses(&["Active", "Retired"]);
        let set = ConditionSet::any(vec![
            Condition::greater_than(status(), "x"),
            Condition::equals(status(), "Retired"),
        ]);
        assert_eq!(evaluate(&records, &set), statuses(&["Retired"]));
        assert_eq!(set.malformed().len(), 1);
        assert_eq!(set.malformed()[0].0, 0);
    }

    #[test]
    fn test_is_empty_and_not_empty() {
        let records = vec![
            Record::new().with("notes1", "checked"),
            Record::new().with("notes1", "  "),
            Record::new().with("notes1", FieldValue::Null),
            Record::new(),
        ];
        let notes = FieldDescriptor::text("notes1");
        let empty = ConditionSet::all(vec![Condition::is_empty(notes.clone())]);
        let not_empty = ConditionSet::all(vec![Condition::is_not_empty(notes)]);
        assert_eq!(evaluate(&records, &empty).len(), 3);
        assert_eq!(evaluate(&records, &not_empty), vec![records[0].clone()]);
    }

    #[test]
    fn test_active_count_is_length() {
        let set = ConditionSet::all(vec![
            Condition::equals(status(), "Active"),
            Condition::new(status(), FilterOperator::Contains, None),
        ]);
        assert_eq!(set.active_count(), 2);
    }

    #[test]
    fn test_remove_condition() {
        let mut set = ConditionSet::all(vec![Condition::equals(status(), "Active")]);
        assert!(set.remove(3).is_none());
        assert!(set.remove(0).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_operator_from_str() {
        assert_eq!("starts_with".parse::<FilterOperator>().unwrap(), FilterOperator::StartsWith);
        assert_eq!("Is not empty".parse::<FilterOperator>().unwrap(), FilterOperator::IsNotEmpty);
        assert!("between".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_condition_set_serde_shape() {
        let set = ConditionSet::any(vec![Condition::greater_than(cost(), "15")]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["combinator"], "OR");
        assert_eq!(json["conditions"][0]["operator"], "greater_than");
        assert_eq!(json["conditions"][0]["field"]["field_type"], "number");
        let back: ConditionSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_quick_search_across_fields() {
        let records = vec![
            Record::new().with("dev_code", "X1").with("cid", "C-77"),
            Record::new().with("dev_code", "Y2").with("qty", 77i64),
            Record::new().with("dev_code", "Z3"),
        ];
        assert_eq!(quick_search(&records, "77").len(), 2);
        assert_eq!(quick_search(&records, "  ").len(), 3);
        assert_eq!(quick_search(&records, "z3"), vec![records[2].clone()]);
    }
}
