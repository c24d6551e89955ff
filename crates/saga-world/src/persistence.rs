//! Loading, saving and resetting the persisted world document.
//!
//! The document is stored as one JSON string under a single key. On load the
//! stored tree is merged over the canonical defaults (see [`crate::merge`]) so
//! documents written by older builds pick up new fields. Fields that still
//! cannot be decoded fall back to their defaults one by one, and a document
//! that is not JSON at all falls back entirely. Loading is never fatal.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use saga_common::{SagaError, SagaResult, SchemaVersion};
use saga_sim::WorldState;

use crate::merge::{reconcile, salvage};
use crate::store::KeyValueStore;

/// A root document that can be persisted.
pub trait PersistedState: Serialize + DeserializeOwned + Default {
    /// Schema version this build writes.
    const SCHEMA: SchemaVersion;

    /// Records the save time and current schema in the document metadata.
    fn stamp(&mut self, now: u64);

    /// Schema version recorded in the document, if any.
    fn schema(&self) -> Option<SchemaVersion>;
}

impl PersistedState for WorldState {
    const SCHEMA: SchemaVersion = SchemaVersion::WORLD_STATE;

    fn stamp(&mut self, now: u64) {
        self.meta.last_updated = now;
        self.meta.schema = Self::SCHEMA;
    }

    fn schema(&self) -> Option<SchemaVersion> {
        Some(self.meta.schema)
    }
}

/// Owns the root document and the store it lives in.
pub struct Persistence<T, S> {
    store: S,
    key: String,
    state: T,
}

impl<T: PersistedState, S: KeyValueStore> Persistence<T, S> {
    /// Opens the document under `key`, loading whatever is stored there.
    pub fn open(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = read_state(&store, &key);
        Self { store, key, state }
    }

    /// Reloads the document from the store, replacing the in-memory copy.
    pub fn load(&mut self) -> &mut T {
        self.state = read_state(&self.store, &self.key);
        &mut self.state
    }

    /// Stamps and writes the whole document.
    pub fn save(&mut self) -> SagaResult<()> {
        self.state.stamp(current_timestamp());
        let json =
            serde_json::to_string(&self.state).map_err(|e| SagaError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &json)?;
        debug!("Saved {} ({} bytes)", self.key, json.len());
        Ok(())
    }

    /// Discards stored data and persists fresh defaults.
    pub fn reset(&mut self) -> SagaResult<&mut T> {
        self.store.remove(&self.key)?;
        self.state = T::default();
        self.save()?;
        info!("Reset {} to defaults", self.key);
        Ok(&mut self.state)
    }

    /// Gets the in-memory document.
    #[must_use]
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Gets the in-memory document mutably. Changes are not durable until [`Self::save`].
    pub fn state_mut(&mut self) -> &mut T {
        &mut self.state
    }

    /// Gets the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gets the storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn read_state<T: PersistedState, S: KeyValueStore>(store: &S, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("No saved {key}, starting from defaults");
            return T::default();
        },
        Err(e) => {
            warn!("Failed to read {key}: {e}, using defaults");
            return T::default();
        },
    };

    let loaded: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Saved {key} is not valid JSON: {e}, using defaults");
            return T::default();
        },
    };

    let state = match decode_merged::<T>(key, loaded) {
        Ok(state) => state,
        Err(e) => {
            warn!("Saved {key} could not be reconciled: {e}, using defaults");
            return T::default();
        },
    };

    if let Some(found) = state.schema() {
        if !T::SCHEMA.can_read(&found) {
            warn!(
                "Saved {key} was written with schema {found}, this build writes {}; loading anyway",
                T::SCHEMA
            );
        } else if !T::SCHEMA.is_compatible_with(&found) {
            debug!("Saved {key} has schema {found}; fields this build doesn't know are kept as-is");
        }
    }
    info!("Loaded {key} ({} bytes)", raw.len());
    state
}

fn decode_merged<T: PersistedState>(key: &str, loaded: Value) -> Result<T, serde_json::Error> {
    let defaults = serde_json::to_value(T::default())?;
    let merged = reconcile(&defaults, loaded);
    match T::deserialize(&merged) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!("Saved {key} has unreadable fields ({e}), resetting only those");
            let accepts = |doc: &Value| T::deserialize(doc).is_ok();
            T::deserialize(&salvage(&defaults, merged, &accepts))
        },
    }
}

/// Current unix time in seconds, 0 if the clock is before the epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use saga_common::ScriptedRandom;

    #[test]
    fn test_missing_document_gives_defaults() {
        let persistence: Persistence<WorldState, _> = Persistence::open(MemoryStore::new(), "world");
        assert_eq!(persistence.state(), &WorldState::default());
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let store = MemoryStore::new();
        store.set("world", r#"{"time":{"year":5}}"#).expect("set");

        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        let state = persistence.state();
        assert_eq!(state.time.year, 5);
        assert_eq!(state.time.month, 1);
        assert_eq!(state.time.day, 1);
        assert_eq!(state.wars, WorldState::default().wars);
    }

    #[test]
    fn test_type_mismatch_falls_back_per_field() {
        let store = MemoryStore::new();
        store
            .set("world", r#"{"time":{"year":"five","month":4},"wars":[]}"#)
            .expect("set");

        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(persistence.state().time.year, 1);
        assert_eq!(persistence.state().time.month, 4);
        assert!(persistence.state().wars.active.is_empty());
    }

    #[test]
    fn test_undecodable_field_keeps_the_rest() {
        let store = MemoryStore::new();
        store
            .set(
                "world",
                r#"{"time":{"year":5,"month":3},"weather":{"current":"hail"},"wars":{"nextId":9}}"#,
            )
            .expect("set");

        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        let state = persistence.state();
        assert_eq!(state.time.year, 5);
        assert_eq!(state.time.month, 3);
        assert_eq!(state.wars.next_id, 9);
        assert_eq!(state.weather, WorldState::default().weather);
    }

    #[test]
    fn test_out_of_range_number_resets_only_that_field() {
        let store = MemoryStore::new();
        store.set("world", r#"{"time":{"year":5,"month":-1,"day":12}}"#).expect("set");

        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(persistence.state().time.year, 5);
        assert_eq!(persistence.state().time.month, 1);
        assert_eq!(persistence.state().time.day, 12);
    }

    #[test]
    fn test_corrupt_document_gives_defaults() {
        let store = MemoryStore::new();
        store.set("world", "{not json").expect("set");
        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(persistence.state(), &WorldState::default());
    }

    #[test]
    fn test_save_load_is_content_stable() {
        let store = MemoryStore::new();
        let mut persistence: Persistence<WorldState, _> = Persistence::open(store.clone(), "world");
        persistence.state_mut().init_all(&mut ScriptedRandom::default());
        let date = persistence.state().time.date();
        persistence.state_mut().wars.declare_war("Iron Pact", "Valmere", date);
        persistence.save().expect("save");
        let first = store.get("world").expect("get").expect("saved");

        let mut reopened: Persistence<WorldState, _> = Persistence::open(store.clone(), "world");
        assert_eq!(reopened.state(), persistence.state());
        assert!(reopened.state().meta.last_updated > 0);

        reopened.state_mut().meta.last_updated = persistence.state().meta.last_updated;
        let again = serde_json::to_string(reopened.state()).expect("serialize");
        assert_eq!(again, first);
    }

    #[test]
    fn test_unknown_keys_are_written_back() {
        let store = MemoryStore::new();
        store
            .set("world", r#"{"questLog":{"open":2},"time":{"year":2}}"#)
            .expect("set");
        let mut persistence: Persistence<WorldState, _> = Persistence::open(store.clone(), "world");
        persistence.save().expect("save");

        let raw = store.get("world").expect("get").expect("saved");
        let value: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["questLog"]["open"], 2);
        assert_eq!(value["time"]["year"], 2);
    }

    #[test]
    fn test_newer_major_schema_still_loads() {
        let store = MemoryStore::new();
        store
            .set(
                "world",
                r#"{"time":{"year":9},"meta":{"schema":{"major":2,"minor":0,"patch":0}}}"#,
            )
            .expect("set");
        let persistence: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(persistence.state().time.year, 9);
        assert_eq!(persistence.state().meta.schema.major, 2);
    }

    #[test]
    fn test_reset_replaces_stored_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        let mut persistence: Persistence<WorldState, _> = Persistence::open(store.clone(), "world");
        persistence.state_mut().time.year = 40;
        persistence.save().expect("save");

        persistence.reset().expect("reset");
        assert_eq!(persistence.state().time.year, 1);

        let reopened: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(reopened.state().time.year, 1);
        assert_eq!(reopened.state().meta.schema, SchemaVersion::WORLD_STATE);
    }

    #[test]
    fn test_load_discards_unsaved_changes() {
        let mut persistence: Persistence<WorldState, _> = Persistence::open(MemoryStore::new(), "world");
        persistence.state_mut().time.year = 7;
        assert_eq!(persistence.load().time.year, 1);
    }
}
