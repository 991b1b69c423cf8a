use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{PostitError, Result};

const STATE_FILE: &str = "state.json";

/// Opaque host key-value persistence.
pub trait KeyValueStore {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Replace the value under `key` and persist it.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Value under `key`, or `default` on a miss.
    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }
}

/// Volatile store, used for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a single JSON object in `<dir>/state.json`.
///
/// The directory and file are created on the first write; every `set` rewrites
/// the whole file through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    entries: BTreeMap<String, Value>,
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store in `dir`, loading existing state if present.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(STATE_FILE);

        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => map.into_iter().collect(),
                _ => {
                    return Err(PostitError::Storage(format!(
                        "{} does not contain a JSON object",
                        path.display()
                    )))
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened state file");
        Ok(Self { entries, path })
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_get_or_default_on_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.get_or("missing", json!([])), json!([]));
    }

    #[test]
    fn test_file_store_created_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".postit");
        let mut store = JsonFileStore::open(&dir).unwrap();
        assert!(!dir.exists());

        store.set("k", json!(["a"])).unwrap();
        assert!(dir.join("state.json").exists());
    }

    #[test]
    fn test_file_store_reopens_state() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(tmp.path()).unwrap();
        store.set("k", json!({"n": 1})).unwrap();

        let reopened = JsonFileStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.get("k"), Some(json!({"n": 1})));
    }

    #[test]
    fn test_file_store_rejects_non_object_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("state.json"), "[1,2]").unwrap();

        let result = JsonFileStore::open(tmp.path());
        assert!(matches!(result, Err(PostitError::Storage(_))));
    }
}
