//! JSON record snapshots.
//!
//! A snapshot is a flat JSON array of records; each one names its sheet via
//! `opco` and `device_type`. A missing file loads as an empty store.

use crate::error::AppResult;
use histories_core::Record;
use histories_storage::InMemoryRecordStore;
use std::path::Path;

pub fn load(path: &Path) -> AppResult<InMemoryRecordStore> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no record snapshot, starting empty");
        return Ok(InMemoryRecordStore::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<Record> = serde_json::from_str(&contents)?;
    let store = InMemoryRecordStore::from_snapshot(records)?;
    tracing::info!(path = %path.display(), records = store.len(), "record snapshot loaded");
    Ok(store)
}

pub fn save(path: &Path, store: &InMemoryRecordStore) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(&store.all_records()?)?;
    std::fs::write(path, contents)?;
    Ok(())
}
