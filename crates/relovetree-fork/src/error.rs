//! Error types for fork operations

use relovetree_domain::traits::KvError;
use relovetree_domain::{TreeId, UserId};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while checking, syncing or cloning trees
#[derive(Error, Debug)]
pub enum ForkError {
    /// The tree carries no provenance, so there is nothing to compare against
    #[error("Tree {0} is not a clone")]
    NotAClone(TreeId),

    /// The tree a clone was created from no longer exists
    #[error("Source tree {0} not found")]
    SourceMissing(TreeId),

    /// The clone itself does not exist
    #[error("Tree {0} not found")]
    CloneMissing(TreeId),

    /// Only the owner may overwrite a tree
    #[error("User {viewer} does not own tree {tree}")]
    NotOwner {
        /// Tree the action targeted
        tree: TreeId,
        /// User who attempted it
        viewer: UserId,
    },

    /// Backend or network failure while reading for a check
    #[error("Check failed: {0}")]
    Check(String),

    /// A check did not complete in time
    #[error("Check timed out after {0:?}")]
    Timeout(Duration),

    /// The overwrite step of a sync failed; the clone is unchanged
    #[error("Sync failed: {0}")]
    Sync(String),

    /// Any other store failure (clone creation, listing, deletion)
    #[error("Storage error: {0}")]
    Store(String),

    /// Persisting client-side state failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForkError {
    /// Transient failures that are safe to retry as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ForkError::Check(_) | ForkError::Timeout(_) | ForkError::Sync(_) | ForkError::Store(_)
        )
    }
}

impl From<KvError> for ForkError {
    fn from(e: KvError) -> Self {
        ForkError::Cache(e.0)
    }
}
