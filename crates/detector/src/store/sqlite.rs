//! SQLite-backed state store
//!
//! The durable backend that lets the controller rehydrate after teardown.

use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};
use serde_json::Value;
use std::collections::HashMap;

use super::notify::ChangeHub;
use super::traits::{StateStore, StoreChange};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Shared state, one JSON value per key
            CREATE TABLE state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        ),
    ])
}

/// SQLite-backed implementation of StateStore
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
    hub: ChangeHub,
}

impl SqliteStateStore {
    /// Open (or create) a state database at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open state db: {}", path.as_ref().display()))?;
        migrations()
            .to_latest(&mut conn)
            .context("Failed to run state db migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
            hub: ChangeHub::new(),
        })
    }

    /// Open an in-memory database, for tests
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        migrations()
            .to_latest(&mut conn)
            .context("Failed to run state db migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
            hub: ChangeHub::new(),
        })
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let conn = self.conn.lock().unwrap();
        let mut result = HashMap::new();
        for key in keys {
            let raw: Option<String> = conn
                .query_row("SELECT value FROM state WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
                .context("Failed to read state key")?;
            if let Some(raw) = raw {
                let value: Value = serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt state value for key {}", key))?;
                result.insert((*key).to_string(), value);
            }
        }
        Ok(result)
    }

    fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            for (key, value) in &entries {
                if value.is_null() {
                    conn.execute("DELETE FROM state WHERE key = ?1", params![key])
                        .context("Failed to clear state key")?;
                } else {
                    let raw = serde_json::to_string(value)?;
                    conn.execute(
                        "INSERT INTO state (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, raw],
                    )
                    .context("Failed to write state key")?;
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
