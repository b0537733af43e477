//! Staleness checker and status cache behaviour

mod common;

use common::{clone_of, clone_with_marker, original, MemoryKv, MockStore};
use relovetree_domain::time::now_millis;
use relovetree_domain::{StalenessStatus, TreeId, UserId, VersionMarker};
use relovetree_fork::{ForkError, StalenessChecker, StatusCache};
use std::sync::Arc;
use std::time::Duration;

const JAN: &str = "2024-01-01T00:00:00Z";
const FEB: &str = "2024-02-01T00:00:00Z";

fn checker(store: &Arc<MockStore>) -> StalenessChecker<MockStore> {
    StalenessChecker::new(Arc::clone(store), Duration::from_secs(10))
}

#[tokio::test]
async fn test_equal_markers_mean_no_update() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", JAN);
    let clone = clone_of("c1", "bob", &source);
    store.insert(source);

    let outcome = checker(&store).check(&clone).await.unwrap();
    assert!(!outcome.has_update);
    assert_eq!(outcome.source_version_marker.as_str(), JAN);
}

#[tokio::test]
async fn test_empty_recorded_marker_means_update() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", JAN);
    let clone = clone_with_marker("c1", "bob", &source, "");
    store.insert(source);

    let outcome = checker(&store).check(&clone).await.unwrap();
    assert!(outcome.has_update);
}

#[tokio::test]
async fn test_empty_source_marker_means_no_update() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", "");
    let clone = clone_with_marker("c1", "bob", &source, JAN);
    store.insert(source);

    let outcome = checker(&store).check(&clone).await.unwrap();
    assert!(!outcome.has_update);
}

#[tokio::test]
async fn test_source_moved_on() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", FEB);
    let clone = clone_with_marker("c1", "bob", &source, JAN);
    store.insert(source);
    store.insert(clone.clone());

    let outcome = checker(&store).check(&clone).await.unwrap();
    assert!(outcome.has_update);
    assert_eq!(outcome.source_version_marker.as_str(), FEB);
    assert_eq!(outcome.source_summary.title, "Tree src");
    assert_eq!(outcome.source_summary.content.node_count, 2);

    // Read-only
    assert_eq!(store.tree(&clone.id), Some(clone));
}

#[tokio::test]
async fn test_original_tree_is_not_a_clone() {
    let store = Arc::new(MockStore::new());
    let tree = original("t1", "alice", JAN);

    let result = checker(&store).check(&tree).await;
    assert!(matches!(result, Err(ForkError::NotAClone(id)) if id == tree.id));
}

#[tokio::test]
async fn test_deleted_source_is_reported_as_missing() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", JAN);
    let clone = clone_of("c1", "bob", &source);

    let result = checker(&store).check(&clone).await;
    assert!(matches!(result, Err(ForkError::SourceMissing(id)) if id == source.id));
}

#[tokio::test]
async fn test_backend_failure_is_a_check_error() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", JAN);
    let clone = clone_of("c1", "bob", &source);
    store.insert(source.clone());
    store.fail(&source.id);

    let result = checker(&store).check(&clone).await;
    assert!(matches!(result, Err(ForkError::Check(_))));
}

#[tokio::test(start_paused = true)]
async fn test_hung_source_read_times_out() {
    let store = Arc::new(MockStore::new());
    let source = original("src", "alice", JAN);
    let clone = clone_of("c1", "bob", &source);
    store.insert(source.clone());
    store.hang(&source.id);

    let result = StalenessChecker::new(Arc::clone(&store), Duration::from_secs(2))
        .check(&clone)
        .await;
    assert!(matches!(result, Err(ForkError::Timeout(d)) if d == Duration::from_secs(2)));
}

#[tokio::test]
async fn test_check_by_id_missing_clone() {
    let store = Arc::new(MockStore::new());

    let result = checker(&store).check_by_id(&TreeId::new("ghost")).await;
    assert!(matches!(result, Err(ForkError::CloneMissing(_))));
}

#[test]
fn test_cache_ttl_boundaries() {
    let kv = Arc::new(MemoryKv::default());
    let ttl = Duration::from_secs(300);
    let mut cache = StatusCache::load(kv, UserId::new("bob"), ttl);
    let now = now_millis();
    let ttl_ms = ttl.as_millis() as u64;

    cache.put(TreeId::new("expired"), StalenessStatus::new(now - ttl_ms - 1, true, VersionMarker::new(JAN)));
    cache.put(TreeId::new("fresh"), StalenessStatus::new(now - ttl_ms + 1, true, VersionMarker::new(JAN)));

    assert!(cache.get_at(&TreeId::new("expired"), now).is_none());
    assert!(cache.get_at(&TreeId::new("fresh"), now).is_some());
}

#[test]
fn test_cache_is_scoped_per_viewer() {
    let kv = Arc::new(MemoryKv::default());
    let ttl = Duration::from_secs(300);

    let mut alice = StatusCache::load(kv.clone(), UserId::new("alice"), ttl);
    alice.put(TreeId::new("c1"), StalenessStatus::new(now_millis(), true, VersionMarker::new(FEB)));
    alice.persist().unwrap();

    let bob = StatusCache::load(kv.clone(), UserId::new("bob"), ttl);
    assert!(bob.get(&TreeId::new("c1")).is_none());
    assert!(kv.raw("relovetree:fork-status:alice").is_some());
    assert!(kv.raw("relovetree:fork-status:bob").is_none());

    let reloaded = StatusCache::load(kv, UserId::new("alice"), ttl);
    assert!(reloaded.get(&TreeId::new("c1")).unwrap().has_update);
}

#[test]
fn test_switching_viewer_hides_previous_entries() {
    let kv = Arc::new(MemoryKv::default());
    let mut cache = StatusCache::load(kv, UserId::new("alice"), Duration::from_secs(300));
    cache.put(TreeId::new("c1"), StalenessStatus::new(now_millis(), false, VersionMarker::new(JAN)));

    cache.switch_viewer(UserId::new("bob")).unwrap();
    assert!(cache.get(&TreeId::new("c1")).is_none());

    cache.switch_viewer(UserId::new("alice")).unwrap();
    assert!(cache.get(&TreeId::new("c1")).is_some());
}
