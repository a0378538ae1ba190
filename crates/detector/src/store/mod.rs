//! Shared durable key-value state
//!
//! The single source of truth that survives controller teardown. Any
//! context may read any key; write ownership is per-key by convention
//! (`apiBase` writable by all, `extraction`/`prediction` only by the
//! controller). Writes are last-writer-wins with no transactions.

pub mod keys;
mod memory;
mod notify;
mod sqlite;
mod traits;

pub use memory::InMemoryStateStore;
pub use sqlite::SqliteStateStore;
pub use traits::{StateStore, StoreChange, get_typed, set_typed};
