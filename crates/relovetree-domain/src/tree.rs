//! Tree documents, the unit that gets cloned and synced

use crate::{ProvenanceRecord, TreeContent, TreeId, UserId, VersionMarker};
use serde::{Deserialize, Serialize};

/// Engagement counters shown in list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeStats {
    /// Like count
    pub likes: u64,

    /// View count
    pub views: u64,
}

/// A love tree owned by one user
///
/// Trees created by cloning carry a [`ProvenanceRecord`]; trees created from
/// scratch do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    /// Stable identifier
    pub id: TreeId,

    /// Owning user, immutable after creation
    pub owner_id: UserId,

    /// Display name
    pub title: String,

    /// Nodes, edges and metadata
    pub content: TreeContent,

    /// Engagement counters
    #[serde(default)]
    pub stats: TreeStats,

    /// Refreshed on every write; this is the marker clones compare against
    pub updated_at: VersionMarker,

    /// Present only on clones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceRecord>,
}

impl Tree {
    /// Create a tree from scratch (no provenance)
    pub fn new(id: TreeId, owner_id: UserId, title: impl Into<String>, content: TreeContent) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            content,
            stats: TreeStats::default(),
            updated_at: VersionMarker::now(),
            provenance: None,
        }
    }

    /// Whether this tree was created by cloning another one
    pub fn is_clone(&self) -> bool {
        self.provenance.is_some()
    }

    /// Whether `user` owns this tree
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}
