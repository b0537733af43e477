//! Owner console: user-initiated checks and syncs, each ending in one toast

use crate::cache::{lock_cache, SharedStatusCache, StatusCache};
use crate::checker::{CheckOutcome, StalenessChecker};
use crate::scheduler::{BatchReport, BatchScheduler, ViewRefresh};
use crate::sync::{SyncExecutor, SyncOutcome};
use crate::{ForkConfig, ForkError, ForkMetrics};
use relovetree_domain::time::now_millis;
use relovetree_domain::traits::{Interaction, KeyValueStore, Toast, ToastKind, TreeQuery, TreeStore};
use relovetree_domain::{ListPage, ListViewState, StalenessStatus, Tree, TreeId, UserId};
use std::sync::{Arc, Mutex, PoisonError};

/// User-facing toast texts
pub mod messages {
    /// Source has moved on
    pub const UPDATE_AVAILABLE: &str = "원본에 새로운 업데이트가 있습니다";
    /// Clone matches its source
    pub const UP_TO_DATE: &str = "최신 상태입니다";
    /// Sync found nothing to do
    pub const ALREADY_UP_TO_DATE: &str = "이미 최신 상태입니다";
    /// Source deleted
    pub const SOURCE_MISSING: &str = "원본을 찾을 수 없습니다";
    /// Tree has no provenance
    pub const NOT_A_CLONE: &str = "복제한 트리가 아닙니다";
    /// Tree does not exist
    pub const TREE_MISSING: &str = "트리를 찾을 수 없습니다";
    /// Viewer is not the owner
    pub const NOT_OWNER: &str = "내 트리만 동기화할 수 있습니다";
    /// Generic check failure
    pub const CHECK_FAILED: &str = "업데이트 확인에 실패했습니다. 잠시 후 다시 시도해 주세요";
    /// Generic sync failure
    pub const SYNC_FAILED: &str = "동기화에 실패했습니다. 잠시 후 다시 시도해 주세요";
    /// Sync succeeded
    pub const SYNCED: &str = "원본과 동기화했습니다";
    /// Sync declined
    pub const SYNC_CANCELLED: &str = "동기화를 취소했습니다";
    /// Nothing to check
    pub const NO_CLONES: &str = "확인할 복제 트리가 없습니다";
    /// Every clone has a fresh cached result
    pub const ALL_RECENT: &str = "모든 복제 트리를 최근에 확인했습니다";
    /// Tree deleted
    pub const DELETED: &str = "트리를 삭제했습니다";
    /// Deletion failed
    pub const DELETE_FAILED: &str = "트리를 삭제하지 못했습니다";
}

/// Badge shown next to a tree in a list, from cached data only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// Fresh cache entry says the source has an update
    UpdateAvailable,
    /// Fresh cache entry says the clone is current
    UpToDate,
    /// Clone with no fresh cache entry
    Unknown,
    /// Tree created from scratch
    Original,
}

/// Owner-facing operations over one viewer's trees
///
/// Every public action reports exactly one toast through the [`Interaction`].
pub struct OwnerConsole<S> {
    store: Arc<S>,
    viewer: UserId,
    checker: StalenessChecker<S>,
    scheduler: BatchScheduler<S>,
    executor: SyncExecutor<S>,
    cache: SharedStatusCache,
    interaction: Arc<dyn Interaction>,
    metrics: Mutex<ForkMetrics>,
}

impl<S: TreeStore + 'static> OwnerConsole<S> {
    /// Assemble a console for `viewer`
    pub fn new(
        store: Arc<S>,
        kv: Arc<dyn KeyValueStore>,
        viewer: UserId,
        config: ForkConfig,
        interaction: Arc<dyn Interaction>,
        refresh: Arc<dyn ViewRefresh>,
    ) -> Result<Self, ForkError> {
        config.validate()?;

        let cache = StatusCache::load(kv, viewer.clone(), config.status_ttl()).shared();
        let checker = StalenessChecker::new(Arc::clone(&store), config.check_timeout());
        let scheduler = BatchScheduler::with_refresh(checker.clone(), Arc::clone(&cache), config, refresh);
        let executor = SyncExecutor::new(
            Arc::clone(&store),
            checker.clone(),
            Arc::clone(&cache),
            Arc::clone(&interaction),
            viewer.clone(),
        );

        Ok(Self {
            store,
            viewer,
            checker,
            scheduler,
            executor,
            cache,
            interaction,
            metrics: Mutex::new(ForkMetrics::new()),
        })
    }

    /// The viewing user
    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// The scheduler driving background checks for this console
    pub fn scheduler(&self) -> &BatchScheduler<S> {
        &self.scheduler
    }

    /// All trees owned by the viewer
    pub async fn my_trees(&self) -> Result<Vec<Tree>, ForkError> {
        self.store
            .query_trees(&TreeQuery::owned_by(self.viewer.clone()))
            .await
            .map_err(|e| ForkError::Store(e.to_string()))
    }

    /// The viewer's trees filtered, sorted and paged by `state`
    pub async fn list(&self, state: &ListViewState) -> Result<ListPage, ForkError> {
        Ok(state.apply(&self.my_trees().await?))
    }

    /// Badge for a tree, from the cache alone
    pub fn badge(&self, tree: &Tree) -> Badge {
        if !tree.is_clone() {
            return Badge::Original;
        }
        match lock_cache(&self.cache).get(&tree.id) {
            Some(status) if status.has_update => Badge::UpdateAvailable,
            Some(_) => Badge::UpToDate,
            None => Badge::Unknown,
        }
    }

    /// The visible rows changed: schedule a debounced check of the stale ones
    pub fn view_changed(&self, visible: &[Tree]) {
        self.scheduler.trigger(visible.to_vec());
    }

    /// Check one clone now, bypassing the cache
    pub async fn check(&self, clone_id: &TreeId) -> Result<CheckOutcome, ForkError> {
        let result = self.checker.check_by_id(clone_id).await;
        self.count_check(&result);

        match result {
            Ok((_, outcome)) => {
                {
                    let mut cache = lock_cache(&self.cache);
                    cache.put(
                        clone_id.clone(),
                        StalenessStatus::new(
                            now_millis(),
                            outcome.has_update,
                            outcome.source_version_marker.clone(),
                        ),
                    );
                    if let Err(e) = cache.persist() {
                        tracing::warn!("Could not persist status cache: {}", e);
                    }
                }

                if outcome.has_update {
                    self.notify(ToastKind::Warning, messages::UPDATE_AVAILABLE);
                } else {
                    self.notify(ToastKind::Success, messages::UP_TO_DATE);
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(clone = %clone_id, "Check failed: {}", e);
                self.notify_error(&e, messages::CHECK_FAILED);
                Err(e)
            }
        }
    }

    /// Check every clone the viewer owns, ignoring cache freshness
    pub async fn check_all(&self) -> Result<BatchReport, ForkError> {
        self.check_owned(true).await
    }

    /// Check the viewer's clones that have no fresh cached result
    ///
    /// The batch size cap applies; clones past it are left for a later call.
    pub async fn check_stale(&self) -> Result<BatchReport, ForkError> {
        self.check_owned(false).await
    }

    async fn check_owned(&self, force: bool) -> Result<BatchReport, ForkError> {
        let trees = match self.my_trees().await {
            Ok(trees) => trees,
            Err(e) => {
                self.notify(ToastKind::Error, messages::CHECK_FAILED);
                return Err(e);
            }
        };

        let clones: Vec<Tree> = trees.into_iter().filter(Tree::is_clone).collect();
        if clones.is_empty() {
            self.notify(ToastKind::Info, messages::NO_CLONES);
            return Ok(BatchReport::default());
        }

        let report = self.scheduler.schedule_batch(clones, force).await;
        if report.is_empty() && report.skipped_in_flight == 0 {
            self.notify(ToastKind::Info, messages::ALL_RECENT);
            return Ok(report);
        }
        let (kind, message) = summarize(&report);
        self.notify(kind, &message);
        Ok(report)
    }

    /// Sync one clone with its source, after confirmation
    pub async fn sync(&self, clone_id: &TreeId) -> Result<SyncOutcome, ForkError> {
        match self.executor.sync(clone_id).await {
            Ok(outcome) => {
                match &outcome {
                    SyncOutcome::Synced { .. } => {
                        self.lock_metrics().syncs_completed += 1;
                        self.notify(ToastKind::Success, messages::SYNCED);
                    }
                    SyncOutcome::AlreadyUpToDate => {
                        self.notify(ToastKind::Info, messages::ALREADY_UP_TO_DATE)
                    }
                    SyncOutcome::Declined => self.notify(ToastKind::Info, messages::SYNC_CANCELLED),
                }
                Ok(outcome)
            }
            Err(e) => {
                self.notify_error(&e, messages::SYNC_FAILED);
                Err(e)
            }
        }
    }

    /// Delete one of the viewer's trees and drop its cached status
    pub async fn delete(&self, tree_id: &TreeId) -> Result<(), ForkError> {
        let result = self.delete_owned(tree_id).await;
        match &result {
            Ok(()) => {
                let mut cache = lock_cache(&self.cache);
                cache.invalidate(tree_id);
                if let Err(e) = cache.persist() {
                    tracing::warn!("Could not persist status cache: {}", e);
                }
                drop(cache);
                self.notify(ToastKind::Success, messages::DELETED);
            }
            Err(e) => self.notify_error(e, messages::DELETE_FAILED),
        }
        result
    }

    async fn delete_owned(&self, tree_id: &TreeId) -> Result<(), ForkError> {
        let tree = self
            .store
            .get_tree(tree_id)
            .await
            .map_err(|e| ForkError::Store(e.to_string()))?
            .ok_or_else(|| ForkError::CloneMissing(tree_id.clone()))?;
        if !tree.is_owned_by(&self.viewer) {
            return Err(ForkError::NotOwner {
                tree: tree_id.clone(),
                viewer: self.viewer.clone(),
            });
        }
        self.store
            .delete_tree(tree_id)
            .await
            .map_err(|e| ForkError::Store(e.to_string()))?;
        Ok(())
    }

    /// Counters from single checks, syncs and scheduled batches
    pub fn metrics(&self) -> ForkMetrics {
        let mut metrics = self.lock_metrics().clone();
        metrics.merge(&self.scheduler.metrics());
        metrics
    }

    fn count_check<T>(&self, result: &Result<(T, CheckOutcome), ForkError>) {
        let mut metrics = self.lock_metrics();
        metrics.checks_attempted += 1;
        match result {
            Ok((_, outcome)) => {
                metrics.checks_succeeded += 1;
                if outcome.has_update {
                    metrics.updates_found += 1;
                }
            }
            Err(ForkError::Timeout(_)) => {
                metrics.checks_failed += 1;
                metrics.checks_timed_out += 1;
            }
            Err(_) => metrics.checks_failed += 1,
        }
    }

    fn lock_metrics(&self) -> std::sync::MutexGuard<'_, ForkMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, kind: ToastKind, message: &str) {
        self.interaction.toast(Toast::new(kind, message));
    }

    fn notify_error(&self, error: &ForkError, fallback: &str) {
        match error {
            ForkError::SourceMissing(_) => self.notify(ToastKind::Error, messages::SOURCE_MISSING),
            ForkError::NotAClone(_) => self.notify(ToastKind::Warning, messages::NOT_A_CLONE),
            ForkError::CloneMissing(_) => self.notify(ToastKind::Error, messages::TREE_MISSING),
            ForkError::NotOwner { .. } => self.notify(ToastKind::Error, messages::NOT_OWNER),
            _ => self.notify(ToastKind::Error, fallback),
        }
    }
}

/// Toast for a forced batch
fn summarize(report: &BatchReport) -> (ToastKind, String) {
    let updates = report.updates.len();
    let failed = report.failures.len();
    let missing = report
        .failures
        .iter()
        .filter(|(_, e)| matches!(e, ForkError::SourceMissing(_)))
        .count();

    let mut message = format!(
        "업데이트 확인 완료: {}개 중 {}개 업데이트 있음",
        report.dispatched(),
        updates
    );
    if missing > 0 {
        message.push_str(&format!(", {}개 원본을 찾을 수 없음", missing));
    }
    if failed > missing {
        message.push_str(&format!(", {}개 확인 실패", failed - missing));
    }
    if report.deferred > 0 {
        message.push_str(&format!(", {}개는 다음에 확인", report.deferred));
    }
    if report.skipped_in_flight > 0 {
        message.push_str(&format!(", {}개 확인 중", report.skipped_in_flight));
    }

    let kind = if failed > 0 {
        ToastKind::Warning
    } else if updates > 0 {
        ToastKind::Info
    } else {
        ToastKind::Success
    };
    (kind, message)
}
