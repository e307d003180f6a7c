//! Created Histories Storage - Record and Preset Stores
//!
//! Defines the storage collaborators the core calls into: a record store
//! partitioned by sheet and a key-value store for named filter presets.
//! In-memory implementations live here; durable presets use LMDB.

pub mod lmdb;
pub mod presets;

pub use lmdb::{LmdbPresetError, LmdbPresetStore};
pub use presets::{FilterPreset, InMemoryPresetStore, PresetManager, PresetStore};

use histories_core::schema::{FIELD_DEVICE_TYPE, FIELD_ID, FIELD_OPCO};
use histories_core::{
    HistoriesResult, Record, RecordId, Sheet, StorageError, ValidationError,
};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// RECORD STORE TRAIT
// ============================================================================

/// Storage trait for device-history records.
pub trait RecordStore: Send + Sync {
    /// Records belonging to a sheet, newest id first.
    fn records_for(&self, sheet: Sheet) -> HistoriesResult<Vec<Record>>;

    /// Get a record by id.
    fn get(&self, id: RecordId) -> HistoriesResult<Option<Record>>;

    /// Insert a record into a sheet and return its new id.
    fn insert(&self, sheet: Sheet, record: Record) -> HistoriesResult<RecordId>;

    /// Replace the fields of an existing record. The record stays on its sheet.
    fn update(&self, id: RecordId, record: Record) -> HistoriesResult<()>;

    /// Delete a record.
    fn delete(&self, id: RecordId) -> HistoriesResult<()>;

    /// Delete every record on a sheet, returning how many were removed.
    fn clear_sheet(&self, sheet: Sheet) -> HistoriesResult<usize>;
}

// ============================================================================
// IN-MEMORY RECORD STORE
// ============================================================================

#[derive(Debug, Clone)]
struct StoredRecord {
    sheet: Sheet,
    record: Record,
}

#[derive(Debug, Default)]
struct RecordTable {
    rows: BTreeMap<RecordId, StoredRecord>,
    last_id: i64,
}

impl RecordTable {
    /// The id after the highest one handed out so far.
    fn next_id(&self) -> HistoriesResult<RecordId> {
        self.last_id.checked_add(1).map(RecordId).ok_or_else(|| {
            StorageError::InsertFailed {
                reason: "record id space exhausted".to_string(),
            }
            .into()
        })
    }
}

/// In-memory record store, used for snapshots and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    table: RwLock<RecordTable>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a flat snapshot. Each record names its sheet via
    /// its `opco` and `device_type` fields; existing ids are kept.
    pub fn from_snapshot(records: Vec<Record>) -> HistoriesResult<Self> {
        let store = Self::new();
        {
            let mut table = store.write()?;
            for record in records {
                let sheet = sheet_of(&record)?;
                let id = match record.id() {
                    Some(id) if id.0 < 1 => {
                        return Err(ValidationError::InvalidValue {
                            field: FIELD_ID.to_string(),
                            reason: format!("record id {} must be positive", id),
                        }
                        .into());
                    }
                    Some(id) => id,
                    None => table.next_id()?,
                };
                if table.rows.contains_key(&id) {
                    return Err(StorageError::InsertFailed {
                        reason: format!("duplicate record id {}", id),
                    }
                    .into());
                }
                table.last_id = table.last_id.max(id.0);
                table.rows.insert(id, StoredRecord {
                    sheet,
                    record: stamp(record, id, sheet),
                });
            }
        }
        Ok(store)
    }

    /// Every record across all sheets, ascending id.
    pub fn all_records(&self) -> HistoriesResult<Vec<Record>> {
        Ok(self.read()?.rows.values().map(|r| r.record.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> HistoriesResult<RwLockReadGuard<'_, RecordTable>> {
        self.table.read().map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> HistoriesResult<RwLockWriteGuard<'_, RecordTable>> {
        self.table.write().map_err(|_| StorageError::LockPoisoned.into())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn records_for(&self, sheet: Sheet) -> HistoriesResult<Vec<Record>> {
        let table = self.read()?;
        Ok(table
            .rows
            .values()
            .rev()
            .filter(|r| r.sheet == sheet)
            .map(|r| r.record.clone())
            .collect())
    }

    fn get(&self, id: RecordId) -> HistoriesResult<Option<Record>> {
        Ok(self.read()?.rows.get(&id).map(|r| r.record.clone()))
    }

    fn insert(&self, sheet: Sheet, record: Record) -> HistoriesResult<RecordId> {
        let mut table = self.write()?;
        let id = table.next_id()?;
        table.last_id = id.0;
        table.rows.insert(id, StoredRecord {
            sheet,
            record: stamp(record, id, sheet),
        });
        tracing::debug!(%id, sheet = %sheet, "record inserted");
        Ok(id)
    }

    fn update(&self, id: RecordId, record: Record) -> HistoriesResult<()> {
        let mut table = self.write()?;
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or(StorageError::RecordNotFound { id })?;
        stored.record = stamp(record, id, stored.sheet);
        tracing::debug!(%id, "record updated");
        Ok(())
    }

    fn delete(&self, id: RecordId) -> HistoriesResult<()> {
        let mut table = self.write()?;
        table
            .rows
            .remove(&id)
            .ok_or(StorageError::RecordNotFound { id })?;
        tracing::debug!(%id, "record deleted");
        Ok(())
    }

    fn clear_sheet(&self, sheet: Sheet) -> HistoriesResult<usize> {
        let mut table = self.write()?;
        let before = table.rows.len();
        table.rows.retain(|_, r| r.sheet != sheet);
        let removed = before - table.rows.len();
        tracing::debug!(sheet = %sheet, removed, "sheet cleared");
        Ok(removed)
    }
}

/// Force the identity and partition fields to agree with storage.
fn stamp(mut record: Record, id: RecordId, sheet: Sheet) -> Record {
    record.set(FIELD_ID, id.0);
    record.set(FIELD_OPCO, sheet.opco.as_str());
    record.set(FIELD_DEVICE_TYPE, sheet.device_type.as_str());
    record
}

/// Resolve the sheet a snapshot record belongs to.
fn sheet_of(record: &Record) -> HistoriesResult<Sheet> {
    let name = format!(
        "{} - {}",
        record.text(FIELD_OPCO).trim(),
        record.text(FIELD_DEVICE_TYPE).trim()
    );
    Sheet::from_display_name(&name).ok_or_else(|| {
        ValidationError::InvalidValue {
            field: format!("{}/{}", FIELD_OPCO, FIELD_DEVICE_TYPE),
            reason: format!("'{}' is not a known sheet", name),
        }
        .into()
    })
}

// ============================================================================
// TESTS
// ============================================================================
