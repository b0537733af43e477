//! Provenance tracking for cloned trees

use crate::{TreeId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque marker of "when a tree last changed"
///
/// Observed as an RFC 3339 timestamp string. Only ever compared for equality;
/// an empty marker means "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionMarker(String);

impl VersionMarker {
    /// Wrap a marker read from a tree
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// The explicit "unknown" marker
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Marker for a write happening now
    pub fn now() -> Self {
        Self(crate::time::now_rfc3339())
    }

    /// True for the "unknown" marker
    ///
    /// Only the empty string counts; a whitespace marker is a real value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw marker
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionMarker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where a cloned tree came from
///
/// `source_version_marker` is always a value read from the source tree when it
/// was captured, or explicitly empty when the source could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceRecord {
    /// Tree this clone was created from
    pub source_id: TreeId,

    /// Owner of the source at clone time (best effort, never re-verified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_owner_id: Option<UserId>,

    /// Source marker captured at the last clone or sync
    #[serde(default)]
    pub source_version_marker: VersionMarker,

    /// When the last clone or sync happened
    pub last_synced_at: VersionMarker,
}

impl ProvenanceRecord {
    /// Record provenance captured from a source read
    pub fn captured(
        source_id: TreeId,
        source_owner_id: Option<UserId>,
        source_version_marker: VersionMarker,
        last_synced_at: VersionMarker,
    ) -> Self {
        Self {
            source_id,
            source_owner_id,
            source_version_marker,
            last_synced_at,
        }
    }

    /// Provenance for a clone whose source marker could not be read
    pub fn unversioned(source_id: TreeId, source_owner_id: Option<UserId>, at: VersionMarker) -> Self {
        Self::captured(source_id, source_owner_id, VersionMarker::empty(), at)
    }

    /// Refresh after a successful sync
    pub fn synced(&mut self, observed: VersionMarker, at: VersionMarker) {
        self.source_version_marker = observed;
        self.last_synced_at = at;
    }
}
