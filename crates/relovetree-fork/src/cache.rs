//! Per-viewer, persisted cache of staleness results
//!
//! The cache is a disposable view owned by the viewing user's profile. It is
//! never a source of truth: entries older than the TTL read as absent, and any
//! persisted entry that cannot be parsed is dropped.

use crate::ForkError;
use relovetree_domain::time::now_millis;
use relovetree_domain::traits::KeyValueStore;
use relovetree_domain::{StalenessStatus, TreeId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Storage key prefix; the viewer id is appended
pub const STATUS_KEY_PREFIX: &str = "relovetree:fork-status:";

/// A cache shared between the scheduler, the sync executor and the console
///
/// Every mutation and its persistence happen while the lock is held, so no
/// read-modify-write straddles a suspension point.
pub type SharedStatusCache = Arc<Mutex<StatusCache>>;

/// Lock a shared cache, recovering from poisoning (the cache is disposable)
pub fn lock_cache(cache: &SharedStatusCache) -> MutexGuard<'_, StatusCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Staleness results keyed by clone id, scoped to one viewing user
pub struct StatusCache {
    kv: Arc<dyn KeyValueStore>,
    viewer: UserId,
    ttl: Duration,
    entries: HashMap<TreeId, StalenessStatus>,
    removed: HashSet<TreeId>,
    revisions: HashMap<TreeId, u64>,
    base_revision: u64,
    next_revision: u64,
}

impl StatusCache {
    /// Load the cache persisted for `viewer`
    ///
    /// Unreadable storage or a corrupt blob yields an empty cache.
    pub fn load(kv: Arc<dyn KeyValueStore>, viewer: UserId, ttl: Duration) -> Self {
        let entries = read_entries(kv.as_ref(), &viewer);
        tracing::debug!(viewer = %viewer, entries = entries.len(), "Loaded status cache");

        Self {
            kv,
            viewer,
            ttl,
            entries,
            removed: HashSet::new(),
            revisions: HashMap::new(),
            base_revision: 0,
            next_revision: 1,
        }
    }

    /// Wrap into a [`SharedStatusCache`]
    pub fn shared(self) -> SharedStatusCache {
        Arc::new(Mutex::new(self))
    }

    /// Storage key for a viewer's cache
    pub fn storage_key(viewer: &UserId) -> String {
        format!("{}{}", STATUS_KEY_PREFIX, viewer)
    }

    /// The user whose view this cache holds
    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for a clone, if any
    pub fn get(&self, clone_id: &TreeId) -> Option<&StalenessStatus> {
        self.get_at(clone_id, now_millis())
    }

    /// Fresh entry for a clone as of `now` (milliseconds since epoch)
    pub fn get_at(&self, clone_id: &TreeId, now: u64) -> Option<&StalenessStatus> {
        self.entries
            .get(clone_id)
            .filter(|status| !status.is_expired(now, self.ttl))
    }

    /// Record a successful check result, replacing any previous entry
    pub fn put(&mut self, clone_id: TreeId, status: StalenessStatus) {
        self.removed.remove(&clone_id);
        self.bump(&clone_id);
        self.entries.insert(clone_id, status);
    }

    /// Record a check result unless the entry changed since `revision` was read
    ///
    /// A check that started before a sync or another check finished must not
    /// overwrite the newer result. Returns whether the status was stored.
    pub fn put_if_unchanged(&mut self, clone_id: TreeId, status: StalenessStatus, revision: u64) -> bool {
        if self.revision(&clone_id) != revision {
            tracing::debug!(clone = %clone_id, "Dropping superseded check result");
            return false;
        }
        self.put(clone_id, status);
        true
    }

    /// Change counter for a clone's entry
    ///
    /// Every put, invalidation or merged-in entry for the clone changes it, as
    /// does switching viewers.
    pub fn revision(&self, clone_id: &TreeId) -> u64 {
        self.revisions.get(clone_id).copied().unwrap_or(self.base_revision)
    }

    /// Forget a clone's entry (after deletion or re-sync)
    pub fn invalidate(&mut self, clone_id: &TreeId) {
        self.entries.remove(clone_id);
        self.bump(clone_id);
        self.removed.insert(clone_id.clone());
    }

    fn bump(&mut self, clone_id: &TreeId) {
        self.revisions.insert(clone_id.clone(), self.next_revision);
        self.next_revision += 1;
    }

    /// Number of entries held, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to storage
    ///
    /// The stored blob is re-read and merged first: for each clone the newer
    /// `checked_at` wins, and clones invalidated here since the last persist are
    /// dropped. Expired entries are pruned.
    pub fn persist(&mut self) -> Result<(), ForkError> {
        self.persist_at(now_millis())
    }

    fn persist_at(&mut self, now: u64) -> Result<(), ForkError> {
        let stored = read_entries(self.kv.as_ref(), &self.viewer);

        for (id, theirs) in stored {
            if self.removed.contains(&id) {
                continue;
            }
            match self.entries.get(&id) {
                Some(ours) if ours.checked_at >= theirs.checked_at => {}
                _ => {
                    self.bump(&id);
                    self.entries.insert(id, theirs);
                }
            }
        }

        let ttl = self.ttl;
        self.entries.retain(|_, status| !status.is_expired(now, ttl));

        let blob: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(id, status)| serde_json::to_value(status).map(|value| (id.to_string(), value)))
            .collect::<Result<_, _>>()
            .map_err(|e| ForkError::Cache(e.to_string()))?;

        let key = Self::storage_key(&self.viewer);
        let json = serde_json::Value::Object(blob).to_string();
        self.kv.set(&key, &json)?;
        self.removed.clear();

        tracing::debug!(viewer = %self.viewer, entries = self.entries.len(), "Persisted status cache");
        Ok(())
    }

    /// Persist the current viewer's entries, then load another viewer's
    pub fn switch_viewer(&mut self, viewer: UserId) -> Result<(), ForkError> {
        if viewer == self.viewer {
            return Ok(());
        }
        self.persist()?;
        self.entries = read_entries(self.kv.as_ref(), &viewer);
        self.removed.clear();
        self.revisions.clear();
        self.base_revision = self.next_revision;
        self.next_revision += 1;
        self.viewer = viewer;
        Ok(())
    }
}

/// Read and parse a viewer's blob; bad entries are skipped
fn read_entries(kv: &dyn KeyValueStore, viewer: &UserId) -> HashMap<TreeId, StalenessStatus> {
    let key = StatusCache::storage_key(viewer);
    let raw = match kv.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashMap::new(),
        Err(e) => {
            tracing::warn!(viewer = %viewer, "Could not read status cache: {}", e);
            return HashMap::new();
        }
    };

    let blob: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!(viewer = %viewer, "Discarding corrupt status cache: {}", e);
            return HashMap::new();
        }
    };

    blob.into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<StalenessStatus>(value) {
            Ok(status) => Some((TreeId::new(id), status)),
            Err(e) => {
                tracing::warn!(clone = %id, "Skipping unreadable status entry: {}", e);
                None
            }
        })
        .collect()
}
