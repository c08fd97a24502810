use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::PreferenceError;
use crate::traits::KeyValueStore;

/// `HashMap`-backed preference store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preference store persisted as a single JSON object on disk.
///
/// The file is read once when the store is opened and rewritten in full on
/// every `set`. Writes are sequential; the last writer wins. `set` performs
/// blocking file I/O under the lock and is meant for small local files.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    /// Open the store at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "preferences loaded");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut entries = self.entries.write().expect("lock poisoned");
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_vec_pretty(&next)?)?;
        *entries = next;
        debug!(key, value, "preference written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_get_set() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("mode").unwrap(), None);
        store.set("mode", "dark").unwrap();
        assert_eq!(store.get("mode").unwrap().as_deref(), Some("dark"));
        store.set("mode", "light").unwrap();
        assert_eq!(store.get("mode").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn json_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = JsonFileKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get("mode").unwrap(), None);
        store.set("mode", "dark").unwrap();

        let reopened = JsonFileKeyValueStore::open(&path).unwrap();
        assert_eq!(reopened.get("mode").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn json_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, b"[1, 2").unwrap();
        let err = JsonFileKeyValueStore::open(&path).unwrap_err();
        assert!(matches!(err, PreferenceError::Serialization(_)));
    }
}
