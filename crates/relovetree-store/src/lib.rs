//! Relovetree Storage Layer
//!
//! SQLite implementations of the two storage collaborators:
//!
//! - [`SqliteTreeStore`]: the tree document store ([`TreeStore`])
//! - [`SqliteKvStore`]: durable per-profile key-value storage ([`KeyValueStore`])
//!
//! Both may point at the same database file; the schema is shared.
//!
//! # Examples
//!
//! ```no_run
//! use relovetree_store::{SqliteKvStore, SqliteTreeStore};
//!
//! let trees = SqliteTreeStore::open("relovetree.db").unwrap();
//! let kv = SqliteKvStore::open("relovetree.db").unwrap();
//! ```
//!
//! [`TreeStore`]: relovetree_domain::traits::TreeStore
//! [`KeyValueStore`]: relovetree_domain::traits::KeyValueStore

#![warn(missing_docs)]

mod kv;
mod trees;

pub use kv::SqliteKvStore;
pub use trees::SqliteTreeStore;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A previous holder of the connection panicked
    #[error("Connection lock poisoned")]
    Poisoned,
}

/// Open a connection and make sure the schema exists
pub(crate) fn open_connection<P: AsRef<Path>>(path: P) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(include_str!("schema.sql"))?;
    Ok(conn)
}
