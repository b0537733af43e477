//! Creating clones and their provenance records

use crate::ForkError;
use relovetree_domain::traits::TreeStore;
use relovetree_domain::{ProvenanceRecord, Tree, TreeId, TreeStats, UserId, VersionMarker};
use std::sync::Arc;

/// What to do when the source cannot be re-read at clone time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvenancePolicy {
    /// Fail the clone
    #[default]
    Strict,
    /// Clone the caller's snapshot with an explicitly empty source marker
    AllowUnversioned,
}

/// Creates clones of other trees
pub struct CloneService<S> {
    store: Arc<S>,
}

impl<S: TreeStore> CloneService<S> {
    /// Create a clone service over a tree store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Clone the source tree with id `source_id` for `new_owner`
    ///
    /// The source is read once; its content and its version marker come from
    /// that same read.
    pub async fn clone_tree(&self, source_id: &TreeId, new_owner: &UserId) -> Result<Tree, ForkError> {
        let source = self
            .store
            .get_tree(source_id)
            .await
            .map_err(|e| ForkError::Check(e.to_string()))?
            .ok_or_else(|| ForkError::SourceMissing(source_id.clone()))?;

        let provenance = ProvenanceRecord::captured(
            source.id.clone(),
            Some(source.owner_id.clone()),
            source.updated_at.clone(),
            VersionMarker::now(),
        );
        self.store_clone(&source, new_owner, provenance).await
    }

    /// Clone a snapshot the caller already holds
    ///
    /// The source is re-read to capture its current marker. With
    /// [`ProvenancePolicy::AllowUnversioned`], a failed re-read falls back to
    /// the snapshot and an empty marker, so the clone reports an update on its
    /// first check.
    pub async fn clone_snapshot(
        &self,
        snapshot: &Tree,
        new_owner: &UserId,
        policy: ProvenancePolicy,
    ) -> Result<Tree, ForkError> {
        let reread = match self.store.get_tree(&snapshot.id).await {
            Ok(Some(source)) => Ok(source),
            Ok(None) => Err(ForkError::SourceMissing(snapshot.id.clone())),
            Err(e) => Err(ForkError::Check(e.to_string())),
        };

        match (reread, policy) {
            (Ok(source), _) => {
                let provenance = ProvenanceRecord::captured(
                    source.id.clone(),
                    Some(source.owner_id.clone()),
                    source.updated_at.clone(),
                    VersionMarker::now(),
                );
                self.store_clone(&source, new_owner, provenance).await
            }
            (Err(e), ProvenancePolicy::AllowUnversioned) => {
                tracing::warn!(source = %snapshot.id, "Cloning without a source marker: {}", e);
                let provenance = ProvenanceRecord::unversioned(
                    snapshot.id.clone(),
                    Some(snapshot.owner_id.clone()),
                    VersionMarker::now(),
                );
                self.store_clone(snapshot, new_owner, provenance).await
            }
            (Err(e), ProvenancePolicy::Strict) => Err(e),
        }
    }

    async fn store_clone(
        &self,
        source: &Tree,
        new_owner: &UserId,
        provenance: ProvenanceRecord,
    ) -> Result<Tree, ForkError> {
        let clone = Tree {
            id: TreeId::generate(),
            owner_id: new_owner.clone(),
            title: source.title.clone(),
            content: source.content.clone(),
            stats: TreeStats::default(),
            updated_at: VersionMarker::now(),
            provenance: Some(provenance),
        };

        self.store
            .put_tree(&clone)
            .await
            .map_err(|e| ForkError::Store(e.to_string()))?;

        tracing::info!(clone = %clone.id, source = %source.id, owner = %new_owner, "Tree cloned");
        Ok(clone)
    }
}
