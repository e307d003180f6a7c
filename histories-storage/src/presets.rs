//! Named filter presets.
//!
//! [`PresetStore`] is a plain key-value collaborator keyed by preset name.
//! [`PresetManager`] layers the save/load/list/delete contract on top of any
//! store: names are trimmed and must be non-blank, saving over an existing
//! name replaces it, and loading a missing name is a `PresetNotFound` error.

use chrono::Utc;
use histories_core::{
    Combinator, Condition, ConditionSet, HistoriesResult, StorageError, Timestamp,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A named, persisted condition set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub name: String,
    pub conditions: ConditionSet,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Key-value persistence for presets.
pub trait PresetStore: Send + Sync {
    /// Insert or replace the preset stored under `preset.name`.
    fn put(&self, preset: &FilterPreset) -> HistoriesResult<()>;

    /// Get a preset by exact name.
    fn get(&self, name: &str) -> HistoriesResult<Option<FilterPreset>>;

    /// All stored names, ascending.
    fn names(&self) -> HistoriesResult<Vec<String>>;

    /// Remove a preset. Returns whether it existed.
    fn remove(&self, name: &str) -> HistoriesResult<bool>;
}

/// In-memory preset store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryPresetStore {
    presets: RwLock<BTreeMap<String, FilterPreset>>,
}

impl InMemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for InMemoryPresetStore {
    fn put(&self, preset: &FilterPreset) -> HistoriesResult<()> {
        let mut presets = self.presets.write().map_err(|_| StorageError::LockPoisoned)?;
        presets.insert(preset.name.clone(), preset.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> HistoriesResult<Option<FilterPreset>> {
        let presets = self.presets.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(presets.get(name).cloned())
    }

    fn names(&self) -> HistoriesResult<Vec<String>> {
        let presets = self.presets.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(presets.keys().cloned().collect())
    }

    fn remove(&self, name: &str) -> HistoriesResult<bool> {
        let mut presets = self.presets.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(presets.remove(name).is_some())
    }
}

/// Save/load/list/delete over a [`PresetStore`].
#[derive(Debug)]
pub struct PresetManager<S> {
    store: S,
}

impl<S: PresetStore> PresetManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save under `name`, replacing any preset already stored there.
    pub fn save(
        &self,
        name: &str,
        conditions: Vec<Condition>,
        combinator: Combinator,
    ) -> HistoriesResult<FilterPreset> {
        let name = normalize_name(name)?;
        let now = Utc::now();
        let created_at = self
            .store
            .get(&name)?
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let preset = FilterPreset {
            name,
            conditions: ConditionSet {
                conditions,
                combinator,
            },
            created_at,
            updated_at: now,
        };
        self.store.put(&preset)?;
        tracing::debug!(
            preset = %preset.name,
            conditions = preset.conditions.len(),
            combinator = %preset.conditions.combinator,
            "filter preset saved"
        );
        Ok(preset)
    }

    /// Save an existing condition set under `name`.
    pub fn save_set(&self, name: &str, set: &ConditionSet) -> HistoriesResult<FilterPreset> {
        self.save(name, set.conditions.clone(), set.combinator)
    }

    /// Load the condition set stored under `name`.
    pub fn load(&self, name: &str) -> HistoriesResult<ConditionSet> {
        let name = normalize_name(name)?;
        match self.store.get(&name)? {
            Some(preset) => Ok(preset.conditions),
            None => Err(StorageError::PresetNotFound { name }.into()),
        }
    }

    /// Load, falling back to an empty set when the preset is missing.
    /// Other errors still propagate.
    pub fn load_or_default(&self, name: &str) -> HistoriesResult<ConditionSet> {
        match self.load(name) {
            Err(e) if e.is_preset_not_found() => {
                tracing::warn!(preset = %name.trim(), "filter preset not found, using no filter");
                Ok(ConditionSet::default())
            }
            other => other,
        }
    }

    /// Preset names, ascending.
    pub fn list(&self) -> HistoriesResult<Vec<String>> {
        self.store.names()
    }

    /// Delete the preset stored under `name`.
    pub fn delete(&self, name: &str) -> HistoriesResult<()> {
        let name = normalize_name(name)?;
        if !self.store.remove(&name)? {
            return Err(StorageError::PresetNotFound { name }.into());
        }
        tracing::debug!(preset = %name, "filter preset deleted");
        Ok(())
    }
}

fn normalize_name(name: &str) -> HistoriesResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        }
        .into());
    }
    Ok(name.to_string())
}
