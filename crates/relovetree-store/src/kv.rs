//! SQLite-backed key-value storage for client-side state

use crate::{open_connection, StoreError};
use relovetree_domain::traits::{KeyValueStore, KvError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Durable key-value storage, the local counterpart of browser storage
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open (or create) the store at the given database path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
        })
    }

    /// In-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T, KvError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| KvError(StoreError::Poisoned.to_string()))?;
        f(&conn).map_err(|e| KvError(StoreError::from(e).to_string()))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
        })
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        tracing::trace!(key, "Removing key");
        self.with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?1", params![key]).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let kv = SqliteKvStore::in_memory().unwrap();

        assert_eq!(kv.get("a").unwrap(), None);
        kv.set("a", "1").unwrap();
        kv.set("a", "2").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("2"));

        kv.remove("a").unwrap();
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }
}
