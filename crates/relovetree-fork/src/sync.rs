//! Overwrite a stale clone with its source's current content

use crate::cache::{lock_cache, SharedStatusCache};
use crate::checker::StalenessChecker;
use crate::ForkError;
use relovetree_domain::time::now_millis;
use relovetree_domain::traits::{Interaction, SyncWrite, TreeStore};
use relovetree_domain::{StalenessStatus, TreeId, UserId, VersionMarker};
use std::sync::Arc;

/// Prompt shown before a sync overwrites local content
pub const CONFIRM_SYNC: &str =
    "원본의 최신 내용으로 덮어씁니다. 이 트리에서 수정한 내용은 사라집니다. 계속할까요?";

/// How a sync request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The clone now mirrors the source at `marker`
    Synced {
        /// Source marker the clone was synced to
        marker: VersionMarker,
    },
    /// A fresh check found nothing to sync
    AlreadyUpToDate,
    /// The user declined the confirmation
    Declined,
}

/// Replaces a clone's content with its source's, after confirmation
///
/// The clone is always re-checked against the source first; a cached
/// `has_update` is never trusted. The overwrite is one store call carrying the
/// full source content and the refreshed provenance, so a failure leaves the
/// clone exactly as it was.
pub struct SyncExecutor<S> {
    store: Arc<S>,
    checker: StalenessChecker<S>,
    cache: SharedStatusCache,
    interaction: Arc<dyn Interaction>,
    viewer: UserId,
}

impl<S: TreeStore> SyncExecutor<S> {
    /// Create an executor acting on behalf of `viewer`
    pub fn new(
        store: Arc<S>,
        checker: StalenessChecker<S>,
        cache: SharedStatusCache,
        interaction: Arc<dyn Interaction>,
        viewer: UserId,
    ) -> Self {
        Self {
            store,
            checker,
            cache,
            interaction,
            viewer,
        }
    }

    /// Sync one clone
    ///
    /// # Errors
    ///
    /// - [`ForkError::CloneMissing`] / [`ForkError::NotOwner`] for a bad target
    /// - [`ForkError::NotAClone`] / [`ForkError::SourceMissing`] from the re-check
    /// - [`ForkError::Check`] / [`ForkError::Timeout`] when the re-check fails
    /// - [`ForkError::Sync`] when the overwrite fails; the clone is unchanged
    pub async fn sync(&self, clone_id: &TreeId) -> Result<SyncOutcome, ForkError> {
        let clone = self.checker.load(clone_id).await?;
        if !clone.is_owned_by(&self.viewer) {
            return Err(ForkError::NotOwner {
                tree: clone_id.clone(),
                viewer: self.viewer.clone(),
            });
        }

        let inspection = self.checker.inspect(&clone).await?;
        let observed = inspection.outcome.source_version_marker.clone();

        if !inspection.outcome.has_update {
            self.remember(clone_id, false, observed);
            return Ok(SyncOutcome::AlreadyUpToDate);
        }

        if !self.interaction.confirm(CONFIRM_SYNC) {
            self.remember(clone_id, true, observed);
            tracing::info!(clone = %clone_id, "Sync declined");
            return Ok(SyncOutcome::Declined);
        }

        let mut provenance = clone
            .provenance
            .clone()
            .ok_or_else(|| ForkError::NotAClone(clone_id.clone()))?;
        let synced_at = VersionMarker::now();
        provenance.synced(observed.clone(), synced_at.clone());

        let write = SyncWrite {
            content: inspection.source.content,
            provenance,
            updated_at: synced_at,
        };

        let written = self.store.apply_sync(clone_id, &write).await.map_err(|e| {
            tracing::error!(clone = %clone_id, "Sync write failed: {}", e);
            ForkError::Sync(e.to_string())
        })?;
        if !written {
            return Err(ForkError::CloneMissing(clone_id.clone()));
        }

        self.remember(clone_id, false, observed.clone());
        tracing::info!(clone = %clone_id, marker = %observed, "Clone synced with source");

        Ok(SyncOutcome::Synced { marker: observed })
    }

    /// Cache a result obtained during this sync
    fn remember(&self, clone_id: &TreeId, has_update: bool, observed: VersionMarker) {
        let mut cache = lock_cache(&self.cache);
        cache.put(clone_id.clone(), StalenessStatus::new(now_millis(), has_update, observed));
        if let Err(e) = cache.persist() {
            tracing::warn!("Could not persist status cache: {}", e);
        }
    }
}
