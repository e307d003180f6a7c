//! LMDB-backed preset store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to keep filter presets in a
//! memory-mapped file that survives restarts. Keys are UTF-8 preset names,
//! values are the JSON-serialized [`FilterPreset`].
//!
//! LMDB provides ACID transactions: reads use read transactions, `put` and
//! `remove` each commit one write transaction.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use histories_core::{HistoriesError, HistoriesResult, StorageError};

use crate::presets::{FilterPreset, PresetStore};

/// Error type for LMDB preset store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbPresetError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbPresetError to HistoriesError.
impl From<LmdbPresetError> for HistoriesError {
    fn from(e: LmdbPresetError) -> Self {
        HistoriesError::Storage(StorageError::TransactionFailed {
            reason: e.to_string(),
        })
    }
}

/// Durable preset store.
///
/// # Example
///
/// ```ignore
/// use histories_storage::{LmdbPresetStore, PresetManager};
///
/// let presets = PresetManager::new(LmdbPresetStore::open("/var/lib/histories/presets", 16)?);
/// presets.save("HighCost", conditions, Combinator::And)?;
/// ```
pub struct LmdbPresetStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl std::fmt::Debug for LmdbPresetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbPresetStore")
            .field("path", &self.env.path())
            .finish()
    }
}

impl LmdbPresetStore {
    /// Open (creating if needed) a preset store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the LMDB
    /// environment or database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbPresetError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbPresetError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbPresetError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), "preset store opened");
        Ok(Self { env, db })
    }
}

impl PresetStore for LmdbPresetStore {
    fn put(&self, preset: &FilterPreset) -> HistoriesResult<()> {
        let value = serde_json::to_vec(preset)
            .map_err(|e| LmdbPresetError::Serialization(e.to_string()))?;

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, preset.name.as_bytes(), &value)
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;
        Ok(())
    }

    fn get(&self, name: &str) -> HistoriesResult<Option<FilterPreset>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        let bytes = self
            .db
            .get(&rtxn, name.as_bytes())
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        match bytes {
            Some(bytes) => {
                let preset = serde_json::from_slice(bytes)
                    .map_err(|e| LmdbPresetError::Deserialization(e.to_string()))?;
                Ok(Some(preset))
            }
            None => Ok(None),
        }
    }

    fn names(&self) -> HistoriesResult<Vec<String>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        let mut names = Vec::new();
        for entry in iter {
            let (key, _) = entry.map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;
            let name = String::from_utf8(key.to_vec())
                .map_err(|e| LmdbPresetError::Deserialization(e.to_string()))?;
            names.push(name);
        }
        // LMDB orders keys bytewise, which matches String ordering for UTF-8.
        Ok(names)
    }

    fn remove(&self, name: &str) -> HistoriesResult<bool> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, name.as_bytes())
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbPresetError::Transaction(e.to_string()))?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::PresetManager;
    use histories_core::{Combinator, Condition, ConditionSet, FieldDescriptor};
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbPresetStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbPresetStore::open(temp_dir.path(), 10).expect("store open should succeed");
        (store, temp_dir)
    }

    fn active_or_pending() -> Vec<Condition> {
        let status = FieldDescriptor::text("status");
        vec![
            Condition::equals(status.clone(), "Active"),
            Condition::equals(status, "Pending"),
        ]
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.get("nothing").expect("get should succeed").is_none());
    }

    #[test]
    fn test_save_and_load_through_manager() {
        let (store, _temp_dir) = create_test_store();
        let presets = PresetManager::new(store);
        presets
            .save("Open", active_or_pending(), Combinator::Or)
            .expect("save should succeed");

        let loaded = presets.load("Open").expect("load should succeed");
        assert_eq!(loaded, ConditionSet::any(active_or_pending()));
        assert!(presets.load("Missing").unwrap_err().is_preset_not_found());
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        {
            let presets = PresetManager::new(
                LmdbPresetStore::open(temp_dir.path(), 10).expect("store open should succeed"),
            );
            presets
                .save("Open", active_or_pending(), Combinator::Or)
                .expect("save should succeed");
        }

        let reopened = PresetManager::new(
            LmdbPresetStore::open(temp_dir.path(), 10).expect("store reopen should succeed"),
        );
        assert_eq!(reopened.list().expect("list should succeed"), vec!["Open"]);
        assert_eq!(
            reopened.load("Open").expect("load should succeed"),
            ConditionSet::any(active_or_pending())
        );
    }

    #[test]
    fn test_overwrite_and_remove() {
        let (store, _temp_dir) = create_test_store();
        let presets = PresetManager::new(store);
        presets
            .save("p", active_or_pending(), Combinator::Or)
            .expect("save should succeed");
        presets
            .save("p", vec![], Combinator::And)
            .expect("overwrite should succeed");
        assert_eq!(
            presets.load("p").expect("load should succeed"),
            ConditionSet::default()
        );

        presets.delete("p").expect("delete should succeed");
        assert!(presets.store().get("p").expect("get should succeed").is_none());
        assert!(!presets.store().remove("p").expect("remove should succeed"));
    }

    #[test]
    fn test_names_sorted() {
        let (store, _temp_dir) = create_test_store();
        let presets = PresetManager::new(store);
        for name in ["zeta", "Alpha", "beta"] {
            presets
                .save(name, vec![], Combinator::And)
                .expect("save should succeed");
        }
        assert_eq!(
            presets.list().expect("list should succeed"),
            vec!["Alpha", "beta", "zeta"]
        );
    }
}
