//! Staleness checks: compare a clone's recorded source marker with the source

use crate::ForkError;
use relovetree_domain::traits::TreeStore;
use relovetree_domain::{has_update, ContentSummary, Tree, TreeId, UserId, VersionMarker};
use std::sync::Arc;
use std::time::Duration;

/// What the source looked like when it was checked
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    /// Source title
    pub title: String,

    /// Current owner of the source
    pub owner_id: UserId,

    /// Node/edge counts
    pub content: ContentSummary,
}

/// Result of a successful staleness check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// True when the source moved past the clone's recorded marker
    pub has_update: bool,

    /// Source marker observed by this check
    pub source_version_marker: VersionMarker,

    /// Short description of the source
    pub source_summary: SourceSummary,
}

/// A check outcome together with the source it was computed from
#[derive(Debug, Clone)]
pub(crate) struct Inspection {
    pub outcome: CheckOutcome,
    pub source: Tree,
}

/// Fetches a clone's source and decides whether the clone is stale
///
/// Checks are read-only: the clone is never modified and nothing is cached
/// here. Callers decide what to do with the outcome.
pub struct StalenessChecker<S> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S> Clone for StalenessChecker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
        }
    }
}

impl<S: TreeStore> StalenessChecker<S> {
    /// Create a checker that gives up on a single source read after `timeout`
    pub fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Check one clone against its source
    ///
    /// # Errors
    ///
    /// - [`ForkError::NotAClone`] when the tree has no provenance
    /// - [`ForkError::SourceMissing`] when the source was deleted
    /// - [`ForkError::Check`] / [`ForkError::Timeout`] on backend failures
    pub async fn check(&self, clone: &Tree) -> Result<CheckOutcome, ForkError> {
        self.inspect(clone).await.map(|inspection| inspection.outcome)
    }

    /// Load a clone by id, then check it
    pub async fn check_by_id(&self, clone_id: &TreeId) -> Result<(Tree, CheckOutcome), ForkError> {
        let clone = self.load(clone_id).await?;
        let outcome = self.check(&clone).await?;
        Ok((clone, outcome))
    }

    pub(crate) async fn load(&self, clone_id: &TreeId) -> Result<Tree, ForkError> {
        self.fetch(clone_id)
            .await?
            .ok_or_else(|| ForkError::CloneMissing(clone_id.clone()))
    }

    pub(crate) async fn inspect(&self, clone: &Tree) -> Result<Inspection, ForkError> {
        let Some(provenance) = clone.provenance.as_ref() else {
            tracing::warn!(tree = %clone.id, "Staleness check requested for a tree without provenance");
            return Err(ForkError::NotAClone(clone.id.clone()));
        };

        let source = self
            .fetch(&provenance.source_id)
            .await?
            .ok_or_else(|| ForkError::SourceMissing(provenance.source_id.clone()))?;

        let observed = source.updated_at.clone();
        let stale = has_update(&observed, &provenance.source_version_marker);

        tracing::debug!(
            clone = %clone.id,
            source = %source.id,
            recorded = %provenance.source_version_marker,
            observed = %observed,
            has_update = stale,
            "Checked clone against source"
        );

        let outcome = CheckOutcome {
            has_update: stale,
            source_version_marker: observed,
            source_summary: SourceSummary {
                title: source.title.clone(),
                owner_id: source.owner_id.clone(),
                content: source.content.summary(),
            },
        };

        Ok(Inspection { outcome, source })
    }

    async fn fetch(&self, id: &TreeId) -> Result<Option<Tree>, ForkError> {
        match tokio::time::timeout(self.timeout, self.store.get_tree(id)).await {
            Ok(result) => result.map_err(|e| ForkError::Check(e.to_string())),
            Err(_) => Err(ForkError::Timeout(self.timeout)),
        }
    }
}
