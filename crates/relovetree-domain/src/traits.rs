//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the fork logic and infrastructure.
//! Implementations live in `relovetree-store` (storage) and in the front ends
//! (toasts and confirmation dialogs).

use crate::{ProvenanceRecord, Tree, TreeContent, TreeId, UserId, VersionMarker};
use async_trait::async_trait;
use thiserror::Error;

/// Document store holding trees
///
/// Implemented by the infrastructure layer (relovetree-store). Every call is a
/// suspension point; implementations must be safe to share between tasks.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Error type for store operations
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Get a tree by id
    async fn get_tree(&self, id: &TreeId) -> Result<Option<Tree>, Self::Error>;

    /// Insert or fully replace a tree
    async fn put_tree(&self, tree: &Tree) -> Result<(), Self::Error>;

    /// Replace a tree's content and provenance in a single write
    ///
    /// Returns `false` when the tree does not exist. A failed write must leave
    /// the previous content intact.
    async fn apply_sync(&self, id: &TreeId, write: &SyncWrite) -> Result<bool, Self::Error>;

    /// Query trees matching criteria
    async fn query_trees(&self, query: &TreeQuery) -> Result<Vec<Tree>, Self::Error>;

    /// Delete a tree, returning whether it existed
    async fn delete_tree(&self, id: &TreeId) -> Result<bool, Self::Error>;
}

/// Fields written by a sync
#[derive(Debug, Clone, PartialEq)]
pub struct SyncWrite {
    /// Full copy of the source content
    pub content: TreeContent,

    /// Refreshed provenance
    pub provenance: ProvenanceRecord,

    /// New version marker for the clone itself
    pub updated_at: VersionMarker,
}

/// Query criteria for listing trees
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    /// Only trees owned by this user
    pub owner: Option<UserId>,

    /// Only trees that carry provenance
    pub clones_only: bool,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl TreeQuery {
    /// All trees owned by `owner`
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }
}

/// Failure reported by a [`KeyValueStore`]
#[derive(Debug, Error)]
#[error("Key-value store error: {0}")]
pub struct KvError(pub String);

/// Per-profile durable key-value storage
///
/// Holds disposable client-side state (staleness cache, list preferences).
/// Calls are synchronous so that read-modify-write sequences never straddle a
/// suspension point.
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Action succeeded
    Success,
    /// Neutral information ("already up to date")
    Info,
    /// Something needs attention
    Warning,
    /// Action failed
    Error,
}

/// A non-blocking notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Severity
    pub kind: ToastKind,

    /// User-facing text
    pub message: String,
}

impl Toast {
    /// Build a toast
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Toasts and confirmation dialogs
pub trait Interaction: Send + Sync {
    /// Show a fire-and-forget notification
    fn toast(&self, toast: Toast);

    /// Ask a blocking yes/no question
    fn confirm(&self, message: &str) -> bool;
}
