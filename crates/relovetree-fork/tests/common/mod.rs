//! Shared test doubles for the fork integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use relovetree_domain::traits::{
    Interaction, KeyValueStore, KvError, SyncWrite, Toast, TreeQuery, TreeStore,
};
use relovetree_domain::{Node, ProvenanceRecord, Tree, TreeContent, TreeId, UserId, VersionMarker};
use relovetree_fork::{BatchReport, ViewRefresh};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

/// In-memory tree store with failure injection and read accounting
#[derive(Default)]
pub struct MockStore {
    trees: Mutex<HashMap<TreeId, Tree>>,
    failing: Mutex<HashSet<TreeId>>,
    hanging: Mutex<HashSet<TreeId>>,
    delay: Mutex<Option<Duration>>,
    fail_syncs: AtomicBool,
    reads: Mutex<HashMap<TreeId, usize>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    sync_writes: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tree: Tree) {
        lock(&self.trees).insert(tree.id.clone(), tree);
    }

    pub fn tree(&self, id: &TreeId) -> Option<Tree> {
        lock(&self.trees).get(id).cloned()
    }

    /// Simulate an edit of the source: new content and a new marker
    pub fn edit(&self, id: &TreeId, marker: &str, nodes: usize) {
        if let Some(tree) = lock(&self.trees).get_mut(id) {
            tree.updated_at = VersionMarker::new(marker);
            tree.content = content(nodes);
        }
    }

    pub fn remove(&self, id: &TreeId) {
        lock(&self.trees).remove(id);
    }

    /// Reads of `id` fail until healed
    pub fn fail(&self, id: &TreeId) {
        lock(&self.failing).insert(id.clone());
    }

    pub fn heal(&self, id: &TreeId) {
        lock(&self.failing).remove(id);
    }

    /// Reads of `id` never complete
    pub fn hang(&self, id: &TreeId) {
        lock(&self.hanging).insert(id.clone());
    }

    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn fail_syncs(&self, fail: bool) {
        self.fail_syncs.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self, id: &TreeId) -> usize {
        lock(&self.reads).get(id).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        lock(&self.reads).values().sum()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn sync_writes(&self) -> usize {
        self.sync_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TreeStore for MockStore {
    type Error = String;

    async fn get_tree(&self, id: &TreeId) -> Result<Option<Tree>, Self::Error> {
        *lock(&self.reads).entry(id.clone()).or_insert(0) += 1;

        let hanging = lock(&self.hanging).contains(id);
        if hanging {
            std::future::pending::<()>().await;
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let failing = lock(&self.failing).contains(id);
        if failing {
            return Err(format!("backend unavailable for {}", id));
        }
        Ok(lock(&self.trees).get(id).cloned())
    }

    async fn put_tree(&self, tree: &Tree) -> Result<(), Self::Error> {
        self.insert(tree.clone());
        Ok(())
    }

    async fn apply_sync(&self, id: &TreeId, write: &SyncWrite) -> Result<bool, Self::Error> {
        if self.fail_syncs.load(Ordering::SeqCst) {
            return Err("write rejected".to_string());
        }
        let mut trees = lock(&self.trees);
        let Some(tree) = trees.get_mut(id) else {
            return Ok(false);
        };
        tree.content = write.content.clone();
        tree.provenance = Some(write.provenance.clone());
        tree.updated_at = write.updated_at.clone();
        self.sync_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn query_trees(&self, query: &TreeQuery) -> Result<Vec<Tree>, Self::Error> {
        let mut trees: Vec<Tree> = lock(&self.trees)
            .values()
            .filter(|t| query.owner.as_ref().map_or(true, |owner| &t.owner_id == owner))
            .filter(|t| !query.clones_only || t.is_clone())
            .cloned()
            .collect();
        trees.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        if let Some(limit) = query.limit {
            trees.truncate(limit);
        }
        Ok(trees)
    }

    async fn delete_tree(&self, id: &TreeId) -> Result<bool, Self::Error> {
        Ok(lock(&self.trees).remove(id).is_some())
    }
}

/// Key-value store backed by a map
#[derive(Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn raw(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

/// Records toasts and answers confirmations with a fixed reply
pub struct RecordingInteraction {
    answer: bool,
    toasts: Mutex<Vec<Toast>>,
    prompts: AtomicUsize,
}

impl RecordingInteraction {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            toasts: Mutex::new(Vec::new()),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.toasts).clone()
    }

    pub fn last_toast(&self) -> Option<Toast> {
        lock(&self.toasts).last().cloned()
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Interaction for RecordingInteraction {
    fn toast(&self, toast: Toast) {
        lock(&self.toasts).push(toast);
    }

    fn confirm(&self, _message: &str) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Counts refresh hook invocations
#[derive(Default)]
pub struct CountingRefresh {
    calls: AtomicUsize,
}

impl CountingRefresh {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ViewRefresh for CountingRefresh {
    fn refresh(&self, _report: &BatchReport) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn content(nodes: usize) -> TreeContent {
    let mut content = TreeContent::default();
    for i in 0..nodes {
        content.nodes.push(Node::new(format!("n{}", i), format!("Moment {}", i)));
    }
    content
}

/// A tree created from scratch
pub fn original(id: &str, owner: &str, marker: &str) -> Tree {
    let mut tree = Tree::new(TreeId::new(id), UserId::new(owner), format!("Tree {}", id), content(2));
    tree.updated_at = VersionMarker::new(marker);
    tree
}

/// A clone of `source` that recorded `recorded` as the source marker
pub fn clone_with_marker(id: &str, owner: &str, source: &Tree, recorded: &str) -> Tree {
    let mut tree = original(id, owner, "2024-01-15T00:00:00Z");
    tree.content = source.content.clone();
    tree.provenance = Some(ProvenanceRecord::captured(
        source.id.clone(),
        Some(source.owner_id.clone()),
        VersionMarker::new(recorded),
        VersionMarker::new("2024-01-15T00:00:00Z"),
    ));
    tree
}

/// A clone of `source` that is in sync with it
pub fn clone_of(id: &str, owner: &str, source: &Tree) -> Tree {
    clone_with_marker(id, owner, source, source.updated_at.as_str())
}
