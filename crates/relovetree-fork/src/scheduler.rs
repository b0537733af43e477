//! Batched, rate-limited staleness checks for the trees visible in a list

use crate::cache::{lock_cache, SharedStatusCache};
use crate::checker::StalenessChecker;
use crate::{ForkConfig, ForkError, ForkMetrics};
use futures::future::join_all;
use relovetree_domain::time::now_millis;
use relovetree_domain::traits::TreeStore;
use relovetree_domain::{StalenessStatus, Tree, TreeId};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Hook invoked once after a batch that produced at least one result
pub trait ViewRefresh: Send + Sync {
    /// Re-render whatever shows staleness badges
    fn refresh(&self, report: &BatchReport);
}

/// Refresh hook that does nothing
pub struct NoRefresh;

impl ViewRefresh for NoRefresh {
    fn refresh(&self, _report: &BatchReport) {}
}

/// What one dispatch did
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Clones that were checked successfully
    pub checked: Vec<TreeId>,

    /// Subset of `checked` whose source has an update
    pub updates: Vec<TreeId>,

    /// Clones whose check failed; their cache entries were left untouched
    pub failures: Vec<(TreeId, ForkError)>,

    /// Clones whose result was dropped because a newer one (a sync, another
    /// check) reached the cache while this check ran
    pub superseded: Vec<TreeId>,

    /// Skipped because a fresh cached result existed
    pub skipped_cached: usize,

    /// Skipped because a check for the same clone was already running
    pub skipped_in_flight: usize,

    /// Skipped because the tree is not a clone
    pub skipped_not_clone: usize,

    /// Candidates left for a later dispatch by the batch size cap
    pub deferred: usize,
}

impl BatchReport {
    /// Number of checks that were started
    pub fn dispatched(&self) -> usize {
        self.checked.len() + self.failures.len() + self.superseded.len()
    }

    /// True when nothing needed checking
    pub fn is_empty(&self) -> bool {
        self.dispatched() == 0
    }
}

/// Pending debounced dispatch
struct Pending {
    handle: JoinHandle<Option<BatchReport>>,
    started: Arc<AtomicBool>,
}

struct SchedulerInner<S> {
    checker: StalenessChecker<S>,
    cache: SharedStatusCache,
    config: ForkConfig,
    refresh: Arc<dyn ViewRefresh>,
    in_flight: Mutex<HashSet<TreeId>>,
    pending: Mutex<Option<Pending>>,
    metrics: Mutex<ForkMetrics>,
}

/// Removes a clone id from the in-flight set when dropped, whatever happened
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<TreeId>>,
    id: TreeId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.id);
    }
}

/// A selected clone, marked in flight until dropped
struct Candidate<'a> {
    id: TreeId,
    revision: u64,
    _guard: InFlightGuard<'a>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coalesces staleness checks for many clones into bounded batches
///
/// One scheduler belongs to one list view session. It owns the in-flight set
/// and the debounce timer; nothing is shared through globals.
///
/// - A clone is a candidate when it has provenance, has no fresh cache entry
///   (unless forced) and is not already being checked.
/// - Each check re-reads the clone by id; the rows handed in only nominate
///   candidates. A result is cached only if the clone's cache entry did not
///   change while the check ran.
/// - At most `max_batch_size` candidates are checked per dispatch unless forced.
/// - Within a dispatch, `max_concurrency` workers pull from a shared queue.
/// - One failing check never affects its siblings.
/// - After a dispatch with at least one success the cache is persisted and the
///   [`ViewRefresh`] hook runs once.
///
/// # Examples
///
/// ```no_run
/// use relovetree_fork::{BatchScheduler, ForkConfig, StalenessChecker, StatusCache};
/// use relovetree_store::{SqliteKvStore, SqliteTreeStore};
/// use relovetree_domain::UserId;
/// use std::sync::Arc;
///
/// # async fn example(visible: Vec<relovetree_domain::Tree>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = ForkConfig::default();
/// let store = Arc::new(SqliteTreeStore::open("relovetree.db")?);
/// let kv = Arc::new(SqliteKvStore::open("relovetree.db")?);
/// let cache = StatusCache::load(kv, UserId::new("me"), config.status_ttl()).shared();
/// let checker = StalenessChecker::new(store, config.check_timeout());
/// let scheduler = BatchScheduler::new(checker, cache, config);
///
/// scheduler.trigger(visible);
/// if let Some(report) = scheduler.settle().await {
///     println!("{} updates", report.updates.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct BatchScheduler<S> {
    inner: Arc<SchedulerInner<S>>,
}

impl<S: TreeStore + 'static> BatchScheduler<S> {
    /// Create a scheduler without a refresh hook
    pub fn new(checker: StalenessChecker<S>, cache: SharedStatusCache, config: ForkConfig) -> Self {
        Self::with_refresh(checker, cache, config, Arc::new(NoRefresh))
    }

    /// Create a scheduler that calls `refresh` after productive batches
    pub fn with_refresh(
        checker: StalenessChecker<S>,
        cache: SharedStatusCache,
        config: ForkConfig,
        refresh: Arc<dyn ViewRefresh>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                checker,
                cache,
                config,
                refresh,
                in_flight: Mutex::new(HashSet::new()),
                pending: Mutex::new(None),
                metrics: Mutex::new(ForkMetrics::new()),
            }),
        }
    }

    /// Check the clones in `working_set` that need it, right now
    ///
    /// `force` ignores fresh cache entries and lifts the batch size cap, but a
    /// clone already being checked is still skipped.
    pub async fn schedule_batch(&self, working_set: Vec<Tree>, force: bool) -> BatchReport {
        self.inner.run_batch(working_set, force).await
    }

    /// Schedule a dispatch after the debounce window
    ///
    /// A trigger inside the window replaces the previous one; only the last
    /// working set of a burst is dispatched. A dispatch that already started
    /// runs to completion. Must be called within a Tokio runtime.
    pub fn trigger(&self, working_set: Vec<Tree>) {
        let mut pending = lock(&self.inner.pending);

        if let Some(previous) = pending.take() {
            if !previous.started.load(Ordering::SeqCst) {
                previous.handle.abort();
                tracing::trace!("Debounce timer reset");
            }
        }

        let inner = Arc::clone(&self.inner);
        let started = Arc::new(AtomicBool::new(false));
        let started_flag = Arc::clone(&started);
        let delay = self.inner.config.debounce();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            started_flag.store(true, Ordering::SeqCst);
            Some(inner.run_batch(working_set, false).await)
        });

        *pending = Some(Pending { handle, started });
    }

    /// Wait for the pending debounced dispatch, if there is one
    ///
    /// Returns `None` when nothing was pending.
    pub async fn settle(&self) -> Option<BatchReport> {
        let pending = lock(&self.inner.pending).take()?;
        pending.handle.await.ok().flatten()
    }

    /// Number of checks currently running
    pub fn in_flight_count(&self) -> usize {
        lock(&self.inner.in_flight).len()
    }

    /// Snapshot of this scheduler's counters
    pub fn metrics(&self) -> ForkMetrics {
        lock(&self.inner.metrics).clone()
    }

    /// The cache this scheduler writes into
    pub fn cache(&self) -> &SharedStatusCache {
        &self.inner.cache
    }
}

impl<S> Drop for BatchScheduler<S> {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.inner.pending).take() {
            pending.handle.abort();
        }
    }
}

impl<S: TreeStore> SchedulerInner<S> {
    /// Pick candidates and mark them in flight, in one critical section
    fn select<'a>(&'a self, working_set: Vec<Tree>, force: bool, report: &mut BatchReport) -> Vec<Candidate<'a>> {
        let now = now_millis();
        let mut in_flight = lock(&self.in_flight);
        let cache = lock_cache(&self.cache);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for tree in working_set {
            if !seen.insert(tree.id.clone()) {
                continue;
            }
            if !tree.is_clone() {
                report.skipped_not_clone += 1;
                continue;
            }
            if in_flight.contains(&tree.id) {
                report.skipped_in_flight += 1;
                continue;
            }
            if !force && cache.get_at(&tree.id, now).is_some() {
                report.skipped_cached += 1;
                continue;
            }
            candidates.push(tree);
        }

        if !force && candidates.len() > self.config.max_batch_size {
            report.deferred = candidates.len() - self.config.max_batch_size;
            candidates.truncate(self.config.max_batch_size);
        }

        candidates
            .into_iter()
            .map(|tree| {
                in_flight.insert(tree.id.clone());
                Candidate {
                    revision: cache.revision(&tree.id),
                    _guard: InFlightGuard {
                        set: &self.in_flight,
                        id: tree.id.clone(),
                    },
                    id: tree.id,
                }
            })
            .collect()
    }

    async fn run_batch(&self, working_set: Vec<Tree>, force: bool) -> BatchReport {
        let mut report = BatchReport::default();
        let selected = self.select(working_set, force, &mut report);

        tracing::debug!(
            candidates = selected.len(),
            skipped_cached = report.skipped_cached,
            skipped_in_flight = report.skipped_in_flight,
            deferred = report.deferred,
            force,
            "Selected staleness check candidates"
        );

        if selected.is_empty() {
            self.record(&report);
            return report;
        }

        let workers = self.config.max_concurrency.min(selected.len());
        let queue = Mutex::new(selected.into_iter().collect::<VecDeque<_>>());
        let results = Mutex::new(Vec::new());

        join_all((0..workers).map(|_| self.worker(&queue, &results))).await;

        for (id, result) in results.into_inner().unwrap_or_else(PoisonError::into_inner) {
            match result {
                Ok(None) => report.superseded.push(id),
                Ok(Some(has_update)) => {
                    if has_update {
                        report.updates.push(id.clone());
                    }
                    report.checked.push(id);
                }
                Err(e) => {
                    tracing::warn!(clone = %id, "Staleness check failed: {}", e);
                    report.failures.push((id, e));
                }
            }
        }

        if !report.checked.is_empty() {
            if let Err(e) = lock_cache(&self.cache).persist() {
                tracing::warn!("Could not persist status cache: {}", e);
            }
            self.refresh.refresh(&report);
        }

        tracing::info!(
            checked = report.checked.len(),
            updates = report.updates.len(),
            failed = report.failures.len(),
            "Staleness batch completed"
        );

        self.record(&report);
        report
    }

    /// Pull candidates from the shared queue until it is empty
    async fn worker(
        &self,
        queue: &Mutex<VecDeque<Candidate<'_>>>,
        results: &Mutex<Vec<(TreeId, Result<Option<bool>, ForkError>)>>,
    ) {
        loop {
            let next = lock(queue).pop_front();
            let Some(candidate) = next else {
                break;
            };

            let result = self.checker.check_by_id(&candidate.id).await.map(|(_, outcome)| {
                let status = StalenessStatus::new(now_millis(), outcome.has_update, outcome.source_version_marker);
                lock_cache(&self.cache)
                    .put_if_unchanged(candidate.id.clone(), status, candidate.revision)
                    .then_some(outcome.has_update)
            });

            lock(results).push((candidate.id.clone(), result));
        }
    }

    fn record(&self, report: &BatchReport) {
        let mut metrics = lock(&self.metrics);
        if !report.is_empty() {
            metrics.batches_dispatched += 1;
        }
        metrics.checks_attempted += report.dispatched();
        metrics.checks_succeeded += report.checked.len();
        metrics.checks_failed += report.failures.len();
        metrics.checks_timed_out += report
            .failures
            .iter()
            .filter(|(_, e)| matches!(e, ForkError::Timeout(_)))
            .count();
        metrics.updates_found += report.updates.len();
        metrics.results_superseded += report.superseded.len();
        metrics.skipped_cached += report.skipped_cached;
        metrics.skipped_in_flight += report.skipped_in_flight;
        metrics.skipped_not_clone += report.skipped_not_clone;
    }
}
