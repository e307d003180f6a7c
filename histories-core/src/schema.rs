//! Fixed device-history schema and sheet partitioning.
//!
//! The record layout is owned by the storage collaborator; this module only
//! describes it so the filter evaluator can pick comparison semantics per field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
}

impl FieldType {
    /// Whether ordering operators (`greater_than`, `less_than`) apply.
    pub fn is_ordered(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Date)
    }
}

/// Field name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }
}

/// Static schema entry: column name, display label, declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
        }
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.name, self.field_type)
    }
}

pub const FIELD_ID: &str = "id";
pub const FIELD_OPCO: &str = "opco";
pub const FIELD_DEVICE_TYPE: &str = "device_type";
pub const FIELD_BEG_SER: &str = "beg_ser";
pub const FIELD_END_SER: &str = "end_ser";
pub const FIELD_OOR_SERIAL: &str = "oor_serial";
pub const FIELD_QTY: &str = "qty";
pub const FIELD_UNIT_COST: &str = "unit_cost";

/// The twenty persisted inventory columns plus the OOR serial entry field,
/// in grid order.
pub const HISTORY_FIELDS: [FieldSpec; 21] = [
    FieldSpec::new(FIELD_ID, "ID", FieldType::Number),
    FieldSpec::new(FIELD_OPCO, "OpCo", FieldType::Text),
    FieldSpec::new(FIELD_DEVICE_TYPE, "Device Type", FieldType::Text),
    FieldSpec::new("status", "Status", FieldType::Text),
    FieldSpec::new("mfr", "MFR", FieldType::Text),
    FieldSpec::new("dev_code", "Dev Code", FieldType::Text),
    FieldSpec::new(FIELD_BEG_SER, "Beg Ser", FieldType::Text),
    FieldSpec::new(FIELD_END_SER, "End Ser", FieldType::Text),
    FieldSpec::new(FIELD_OOR_SERIAL, "OOR Serial", FieldType::Text),
    FieldSpec::new(FIELD_QTY, "Qty", FieldType::Number),
    FieldSpec::new("po_date", "PO Date", FieldType::Date),
    FieldSpec::new("po_number", "PO Number", FieldType::Text),
    FieldSpec::new("recv_date", "Recv Date", FieldType::Date),
    FieldSpec::new(FIELD_UNIT_COST, "Unit Cost", FieldType::Number),
    FieldSpec::new("cid", "CID", FieldType::Text),
    FieldSpec::new("me_number", "M.E. #", FieldType::Text),
    FieldSpec::new("pur_code", "Pur. Code", FieldType::Text),
    FieldSpec::new("est", "Est.", FieldType::Text),
    FieldSpec::new("use", "Use", FieldType::Text),
    FieldSpec::new("notes1", "Notes 1", FieldType::Text),
    FieldSpec::new("notes2", "Notes 2", FieldType::Text),
];

/// Look up a schema entry by column name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    HISTORY_FIELDS.iter().find(|spec| spec.name == name)
}

/// Descriptor for a column name. Unknown names are treated as text.
pub fn descriptor(name: &str) -> FieldDescriptor {
    field_spec(name)
        .map(FieldSpec::descriptor)
        .unwrap_or_else(|| FieldDescriptor::text(name))
}

/// Descriptors for every schema field, in grid order.
pub fn descriptors() -> Vec<FieldDescriptor> {
    HISTORY_FIELDS.iter().map(FieldSpec::descriptor).collect()
}

// ============================================================================
// SHEETS
// ============================================================================

/// Operating company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpCo {
    Ohio,
    #[serde(rename = "I&M")]
    IndianaMichigan,
}

impl OpCo {
    pub fn as_str(self) -> &'static str {
        match self {
            OpCo::Ohio => "Ohio",
            OpCo::IndianaMichigan => "I&M",
        }
    }

    /// Abbreviation used in workbook tab names.
    pub fn short_code(self) -> &'static str {
        match self {
            OpCo::Ohio => "OH",
            OpCo::IndianaMichigan => "I&M",
        }
    }
}

impl fmt::Display for OpCo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceType {
    Meters,
    Transformers,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Meters => "Meters",
            DeviceType::Transformers => "Transformers",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical partition of records by OpCo and device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sheet {
    pub opco: OpCo,
    pub device_type: DeviceType,
}

impl Sheet {
    pub const fn new(opco: OpCo, device_type: DeviceType) -> Self {
        Self { opco, device_type }
    }

    /// All sheets in navigation order.
    pub const ALL: [Sheet; 4] = [
        Sheet::new(OpCo::Ohio, DeviceType::Meters),
        Sheet::new(OpCo::IndianaMichigan, DeviceType::Meters),
        Sheet::new(OpCo::Ohio, DeviceType::Transformers),
        Sheet::new(OpCo::IndianaMichigan, DeviceType::Transformers),
    ];

    /// "Ohio - Meters"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.opco, self.device_type)
    }

    /// Workbook tab name, e.g. "OH - Meters".
    pub fn import_name(&self) -> String {
        format!("{} - {}", self.opco.short_code(), self.device_type)
    }

    /// Resolve a workbook tab name back to its sheet.
    pub fn from_import_name(name: &str) -> Option<Sheet> {
        let name = name.trim();
        Sheet::ALL
            .into_iter()
            .find(|sheet| sheet.import_name() == name)
    }

    /// Resolve a display name ("I&M - Transformers") back to its sheet.
    pub fn from_display_name(name: &str) -> Option<Sheet> {
        let name = name.trim();
        Sheet::ALL
            .into_iter()
            .find(|sheet| sheet.display_name() == name)
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.opco, self.device_type)
    }
}
