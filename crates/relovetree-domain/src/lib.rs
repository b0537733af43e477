//! Relovetree Domain Layer
//!
//! Core value types for love trees (timelines of moments linked by edges) and the
//! fork/provenance model used when one user clones another user's tree.
//!
//! ## Key Concepts
//!
//! - **Tree**: a timeline owned by one user, optionally created as a clone
//! - **Provenance**: where a clone came from and the source's version marker at copy time
//! - **Version marker**: an opaque RFC 3339 string that changes whenever a tree is written
//! - **Staleness**: a clone is stale when the source's marker moved past the recorded one
//! - **List view state**: sort/filter/page preferences, mirrored into a URL query string
//!
//! ## Architecture
//!
//! Pure value types and trait boundaries only. Storage, caching and scheduling
//! live in `relovetree-store` and `relovetree-fork`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod ids;
pub mod list_view;
pub mod provenance;
pub mod staleness;
pub mod time;
pub mod traits;
pub mod tree;

// Re-exports for convenience
pub use content::{ContentSummary, Edge, Node, TreeContent};
pub use ids::{TreeId, UserId};
pub use list_view::{ListPage, ListViewState, PageSize, SortKey};
pub use provenance::{ProvenanceRecord, VersionMarker};
pub use staleness::{has_update, StalenessStatus};
pub use tree::{Tree, TreeStats};
