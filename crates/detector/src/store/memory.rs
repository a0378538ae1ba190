//! In-memory state store implementation
//!
//! Used for testing and by harnesses that do not need durability.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::mpsc::Receiver;

use super::notify::ChangeHub;
use super::traits::{StateStore, StoreChange};

/// In-memory implementation of StateStore
///
/// A HashMap protected by an RwLock, plus the shared watcher fan-out.
pub struct InMemoryStateStore {
    values: RwLock<HashMap<String, Value>>,
    hub: ChangeHub,
}

impl InMemoryStateStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            hub: ChangeHub::new(),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let values = self.values.read().unwrap();
        let mut result = HashMap::new();
        for key in keys {
            if let Some(value) = values.get(*key) {
                result.insert((*key).to_string(), value.clone());
            }
        }
        Ok(result)
    }

    fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        {
            let mut values = self.values.write().unwrap();
            for (key, value) in &entries {
                if value.is_null() {
                    values.remove(key);
                } else {
                    values.insert(key.clone(), value.clone());
                }
            }
        }

        for (key, value) in entries {
            self.hub.notify(StoreChange { key, value });
        }
        Ok(())
    }

    fn watch(&self) -> Receiver<StoreChange> {
        self.hub.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;
    use crate::store::traits::{get_typed, set_typed};
    use serde_json::json;

    #[test]
    fn test_set_and_get_roundtrip() {
        let store = InMemoryStateStore::new();
        let mut entries = HashMap::new();
        entries.insert(keys::API_BASE.to_string(), json!("http://localhost:8000"));
        store.set(entries).unwrap();

        let values = store.get(&[keys::API_BASE]).unwrap();
        assert_eq!(values[keys::API_BASE], json!("http://localhost:8000"));
    }

    #[test]
    fn test_get_skips_absent_keys() {
        let store = InMemoryStateStore::new();
        let values = store.get(&[keys::API_BASE, keys::PREDICTION]).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_null_write_clears_key() {
        let store = InMemoryStateStore::new();
        set_typed(&store, keys::EXTRACTION, &"something").unwrap();

        let mut entries = HashMap::new();
        entries.insert(keys::EXTRACTION.to_string(), Value::Null);
        store.set(entries).unwrap();

        let values = store.get(&[keys::EXTRACTION]).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_last_writer_wins() {
        let store = InMemoryStateStore::new();
        set_typed(&store, keys::API_BASE, &"http://a").unwrap();
        set_typed(&store, keys::API_BASE, &"http://b").unwrap();

        let value: Option<String> = get_typed(&store, keys::API_BASE).unwrap();
        assert_eq!(value.as_deref(), Some("http://b"));
    }

    #[test]
    fn test_watch_sees_writes_and_clears() {
        let store = InMemoryStateStore::new();
        let rx = store.watch();

        set_typed(&store, keys::API_BASE, &"http://c").unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, keys::API_BASE);
        assert_eq!(change.value, json!("http://c"));

        let mut entries = HashMap::new();
        entries.insert(keys::API_BASE.to_string(), Value::Null);
        store.set(entries).unwrap();
        let change = rx.try_recv().unwrap();
        assert!(change.value.is_null());
    }
}
