//! SQLite-backed tree document store

use crate::{open_connection, StoreError};
use async_trait::async_trait;
use relovetree_domain::traits::{SyncWrite, TreeQuery, TreeStore};
use relovetree_domain::{ProvenanceRecord, Tree, TreeContent, TreeId, TreeStats, UserId, VersionMarker};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const TREE_COLUMNS: &str = "id, owner_id, title, content, likes, views, updated_at, provenance";

/// SQLite-based implementation of [`TreeStore`]
///
/// Content and provenance are stored as JSON text. The connection sits behind a
/// mutex so the store can be shared between tasks; no call holds the lock
/// across a suspension point.
pub struct SqliteTreeStore {
    conn: Mutex<Connection>,
}

/// Raw column values before JSON decoding
struct TreeRow {
    id: String,
    owner_id: String,
    title: String,
    content: String,
    likes: i64,
    views: i64,
    updated_at: String,
    provenance: Option<String>,
}

impl TreeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            likes: row.get(4)?,
            views: row.get(5)?,
            updated_at: row.get(6)?,
            provenance: row.get(7)?,
        })
    }

    fn into_tree(self) -> Result<Tree, StoreError> {
        let content: TreeContent = serde_json::from_str(&self.content)?;
        let provenance: Option<ProvenanceRecord> = self
            .provenance
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Tree {
            id: TreeId::new(self.id),
            owner_id: UserId::new(self.owner_id),
            title: self.title,
            content,
            stats: TreeStats {
                likes: self.likes.max(0) as u64,
                views: self.views.max(0) as u64,
            },
            updated_at: VersionMarker::new(self.updated_at),
            provenance,
        })
    }
}

impl SqliteTreeStore {
    /// Open (or create) a store at the given database path
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relovetree_store::SqliteTreeStore;
    ///
    /// let store = SqliteTreeStore::open("relovetree.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
        })
    }

    /// In-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn provenance_json(provenance: Option<&ProvenanceRecord>) -> Result<Option<String>, StoreError> {
        Ok(provenance.map(serde_json::to_string).transpose()?)
    }
}

#[async_trait]
impl TreeStore for SqliteTreeStore {
    type Error = StoreError;

    async fn get_tree(&self, id: &TreeId) -> Result<Option<Tree>, Self::Error> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                &format!("SELECT {} FROM trees WHERE id = ?1", TREE_COLUMNS),
                params![id.as_str()],
                TreeRow::from_row,
            )
            .optional()?
        };

        row.map(TreeRow::into_tree).transpose()
    }

    async fn put_tree(&self, tree: &Tree) -> Result<(), Self::Error> {
        let content = serde_json::to_string(&tree.content)?;
        let provenance = Self::provenance_json(tree.provenance.as_ref())?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO trees (id, owner_id, title, content, likes, views, updated_at, provenance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
             owner_id = excluded.owner_id, title = excluded.title, content = excluded.content,
             likes = excluded.likes, views = excluded.views, updated_at = excluded.updated_at,
             provenance = excluded.provenance",
            params![
                tree.id.as_str(),
                tree.owner_id.as_str(),
                &tree.title,
                content,
                tree.stats.likes as i64,
                tree.stats.views as i64,
                tree.updated_at.as_str(),
                provenance,
            ],
        )?;

        Ok(())
    }

    async fn apply_sync(&self, id: &TreeId, write: &SyncWrite) -> Result<bool, Self::Error> {
        let content = serde_json::to_string(&write.content)?;
        let provenance = Self::provenance_json(Some(&write.provenance))?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE trees SET content = ?1, provenance = ?2, updated_at = ?3 WHERE id = ?4",
            params![content, provenance, write.updated_at.as_str(), id.as_str()],
        )?;

        Ok(changed > 0)
    }

    async fn query_trees(&self, query: &TreeQuery) -> Result<Vec<Tree>, Self::Error> {
        let mut sql = format!("SELECT {} FROM trees WHERE 1=1", TREE_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(owner) = &query.owner {
            sql.push_str(" AND owner_id = ?");
            params.push(Box::new(owner.as_str().to_string()));
        }

        if query.clones_only {
            sql.push_str(" AND provenance IS NOT NULL");
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(&param_refs[..], TreeRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter().map(TreeRow::into_tree).collect()
    }

    async fn delete_tree(&self, id: &TreeId) -> Result<bool, Self::Error> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM trees WHERE id = ?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }
}
