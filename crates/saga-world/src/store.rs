//! Durable string stores.
//!
//! The whole world lives under one key as a JSON string. [`MemoryStore`]
//! keeps it in process; [`FileStore`] keeps one file per key and writes
//! through a temp file and rename so a crash never leaves a torn document.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use saga_common::SagaError;

/// Errors that can occur in a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used as a storage name
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for SagaError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// A string-keyed store of string documents.
pub trait KeyValueStore: Send {
    /// Reads a document. `None` when the key has never been written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a document, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a document. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-process store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Gets the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `key`.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        Self::validate(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }

    fn validate(key: &str) -> StoreResult<()> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let final_path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let temp_path = self.temp_path(key);

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("world", "{}").expect("set");
        assert_eq!(other.get("world").expect("get").as_deref(), Some("{}"));
        assert_eq!(other.len(), 1);

        other.remove("world").expect("remove");
        other.remove("world").expect("remove twice");
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("saves"));

        assert_eq!(store.get("world").expect("get"), None);
        store.set("world", r#"{"time":{}}"#).expect("set");
        assert_eq!(
            store.get("world").expect("get").as_deref(),
            Some(r#"{"time":{}}"#)
        );
        assert!(!dir.path().join("saves").join("world.json.tmp").exists());

        store.set("world", "{}").expect("overwrite");
        assert_eq!(store.get("world").expect("get").as_deref(), Some("{}"));

        store.remove("world").expect("remove");
        assert_eq!(store.get("world").expect("get"), None);
        store.remove("world").expect("remove missing");
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        for key in ["", "../escape", ".hidden", "a/b", "white space"] {
            assert!(
                matches!(store.set(key, "{}"), Err(StoreError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_store_error_converts() {
        let err: SagaError = StoreError::InvalidKey("x/y".to_string()).into();
        assert!(matches!(err, SagaError::Store(_)));
    }
}
