//! State store trait definitions

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::mpsc;

/// A change notification emitted after a key is written
///
/// `value` is the new value, or `Value::Null` when the key was cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub key: String,
    pub value: Value,
}

/// Trait for shared key-value state storage
///
/// This trait abstracts over different backends (in-memory, sqlite) and
/// provides the get/set/watch contract every context relies on. Writing
/// `Value::Null` clears the key; cleared and absent keys are both simply
/// missing from `get` results.
pub trait StateStore: Send + Sync {
    /// Read the requested keys; only keys that are present appear in the
    /// returned map
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Write all entries, last-writer-wins, then notify watchers once per
    /// key
    fn set(&self, entries: HashMap<String, Value>) -> Result<()>;

    /// Subscribe to change notifications
    ///
    /// Delivery is best-effort; a watcher whose receiver is gone is
    /// dropped on the next notification.
    fn watch(&self) -> mpsc::Receiver<StoreChange>;
}

/// Read one key and deserialize it, treating absent keys as `None`
pub fn get_typed<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>> {
    let mut values = store.get(&[key])?;
    match values.remove(key) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Serialize and write one key
pub fn set_typed<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<()> {
    let mut entries = HashMap::new();
    entries.insert(key.to_string(), serde_json::to_value(value)?);
    store.set(entries)
}
