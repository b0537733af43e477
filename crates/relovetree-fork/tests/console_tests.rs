//! Owner console toasts, badges, listing and preferences

mod common;

use common::{clone_of, clone_with_marker, original, MemoryKv, MockStore, RecordingInteraction};
use relovetree_domain::traits::ToastKind;
use relovetree_domain::{ListViewState, PageSize, SortKey, TreeId, UserId};
use relovetree_fork::console::messages;
use relovetree_fork::{
    Badge, ForkConfig, ForkError, ListPreferences, NoRefresh, OwnerConsole, SyncOutcome,
};
use std::sync::Arc;

const JAN: &str = "2024-01-01T00:00:00Z";
const FEB: &str = "2024-02-01T00:00:00Z";

struct Fixture {
    store: Arc<MockStore>,
    kv: Arc<MemoryKv>,
    interaction: Arc<RecordingInteraction>,
    console: OwnerConsole<MockStore>,
}

fn fixture(confirm: bool) -> Fixture {
    let store = Arc::new(MockStore::new());
    let kv = Arc::new(MemoryKv::default());
    let interaction = Arc::new(RecordingInteraction::new(confirm));
    let console = OwnerConsole::new(
        Arc::clone(&store),
        kv.clone(),
        UserId::new("bob"),
        ForkConfig::default(),
        interaction.clone(),
        Arc::new(NoRefresh),
    )
    .unwrap();

    Fixture {
        store,
        kv,
        interaction,
        console,
    }
}

/// bob owns: "fresh" (current clone), "stale" (behind its source), "mine" (original)
fn seed(store: &MockStore) {
    let current = original("src-a", "alice", JAN);
    let moved = original("src-b", "alice", FEB);
    store.insert(clone_of("fresh", "bob", &current));
    store.insert(clone_with_marker("stale", "bob", &moved, JAN));
    store.insert(original("mine", "bob", JAN));
    store.insert(original("theirs", "carol", JAN));
    store.insert(current);
    store.insert(moved);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ForkConfig {
        max_concurrency: 0,
        ..ForkConfig::default()
    };
    let result = OwnerConsole::new(
        Arc::new(MockStore::new()),
        Arc::new(MemoryKv::default()),
        UserId::new("bob"),
        config,
        Arc::new(RecordingInteraction::new(true)),
        Arc::new(NoRefresh),
    );
    assert!(matches!(result, Err(ForkError::Config(_))));
}

#[tokio::test]
async fn test_check_toasts() {
    let f = fixture(true);
    seed(&f.store);

    f.console.check(&TreeId::new("stale")).await.unwrap();
    let toast = f.interaction.last_toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Warning);
    assert_eq!(toast.message, messages::UPDATE_AVAILABLE);

    f.console.check(&TreeId::new("fresh")).await.unwrap();
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::UP_TO_DATE);

    assert_eq!(f.interaction.toasts().len(), 2);
}

#[tokio::test]
async fn test_check_with_deleted_source_says_so() {
    let f = fixture(true);
    seed(&f.store);
    f.store.remove(&TreeId::new("src-b"));

    let result = f.console.check(&TreeId::new("stale")).await;

    assert!(matches!(result, Err(ForkError::SourceMissing(_))));
    let toast = f.interaction.last_toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "원본을 찾을 수 없습니다");
}

#[tokio::test]
async fn test_check_failure_is_generic_and_not_cached() {
    let f = fixture(true);
    seed(&f.store);
    f.store.fail(&TreeId::new("src-b"));
    let stale = f.store.tree(&TreeId::new("stale")).unwrap();

    assert!(f.console.check(&stale.id).await.is_err());
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::CHECK_FAILED);
    assert_eq!(f.console.badge(&stale), Badge::Unknown);
    assert_eq!(f.console.metrics().checks_failed, 1);
}

#[tokio::test]
async fn test_badges_follow_the_cache() {
    let f = fixture(true);
    seed(&f.store);
    let tree = |id: &str| f.store.tree(&TreeId::new(id)).unwrap();

    assert_eq!(f.console.badge(&tree("mine")), Badge::Original);
    assert_eq!(f.console.badge(&tree("stale")), Badge::Unknown);

    f.console.check_all().await.unwrap();

    assert_eq!(f.console.badge(&tree("stale")), Badge::UpdateAvailable);
    assert_eq!(f.console.badge(&tree("fresh")), Badge::UpToDate);
}

#[tokio::test]
async fn test_check_all_summarises_in_one_toast() {
    let f = fixture(true);
    seed(&f.store);

    let report = f.console.check_all().await.unwrap();

    assert_eq!(report.checked.len(), 2);
    assert_eq!(report.updates, vec![TreeId::new("stale")]);
    let toasts = f.interaction.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Info);
    assert!(toasts[0].message.contains("2개 중 1개"));
}

#[tokio::test]
async fn test_check_stale_skips_recent_results_with_a_toast() {
    let f = fixture(true);
    seed(&f.store);

    let first = f.console.check_stale().await.unwrap();
    assert_eq!(first.checked.len(), 2);
    assert!(f.interaction.last_toast().unwrap().message.contains("2개 중 1개"));

    let second = f.console.check_stale().await.unwrap();
    assert!(second.is_empty());
    assert_eq!(second.skipped_cached, 2);
    assert_eq!(f.interaction.toasts().len(), 2);
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::ALL_RECENT);
    assert_eq!(f.store.reads(&TreeId::new("src-b")), 1);
}

#[tokio::test]
async fn test_check_all_without_clones() {
    let f = fixture(true);
    f.store.insert(original("mine", "bob", JAN));

    let report = f.console.check_all().await.unwrap();

    assert!(report.is_empty());
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::NO_CLONES);
}

#[tokio::test]
async fn test_sync_toasts() {
    let f = fixture(true);
    seed(&f.store);

    let outcome = f.console.sync(&TreeId::new("stale")).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::SYNCED);

    f.console.sync(&TreeId::new("stale")).await.unwrap();
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::ALREADY_UP_TO_DATE);

    assert_eq!(f.interaction.toasts().len(), 2);
    assert_eq!(f.console.metrics().syncs_completed, 1);
}

#[tokio::test]
async fn test_declined_sync_toast() {
    let f = fixture(false);
    seed(&f.store);

    let outcome = f.console.sync(&TreeId::new("stale")).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Declined);
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::SYNC_CANCELLED);
}

#[tokio::test]
async fn test_sync_of_someone_elses_tree() {
    let f = fixture(true);
    seed(&f.store);

    let result = f.console.sync(&TreeId::new("theirs")).await;

    assert!(matches!(result, Err(ForkError::NotOwner { .. })));
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::NOT_OWNER);
}

#[tokio::test]
async fn test_list_only_shows_own_trees() {
    let f = fixture(true);
    seed(&f.store);

    let mut state = ListViewState::default();
    state.set_sort(SortKey::NameAsc);
    let page = f.console.list(&state).await.unwrap();

    let ids: Vec<&str> = page.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["fresh", "mine", "stale"]);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_delete_drops_cached_status() {
    let f = fixture(true);
    seed(&f.store);
    f.console.check(&TreeId::new("stale")).await.unwrap();
    assert!(f.kv.raw("relovetree:fork-status:bob").unwrap().contains("stale"));

    f.console.delete(&TreeId::new("stale")).await.unwrap();

    assert!(f.store.tree(&TreeId::new("stale")).is_none());
    assert!(!f.kv.raw("relovetree:fork-status:bob").unwrap().contains("stale"));
    assert_eq!(f.interaction.last_toast().unwrap().message, messages::DELETED);

    let result = f.console.delete(&TreeId::new("theirs")).await;
    assert!(matches!(result, Err(ForkError::NotOwner { .. })));
    assert!(f.store.tree(&TreeId::new("theirs")).is_some());
}

#[test]
fn test_preferences_round_trip_per_viewer() {
    let kv = Arc::new(MemoryKv::default());
    let bob = ListPreferences::new(kv.clone(), UserId::new("bob"));
    let carol = ListPreferences::new(kv.clone(), UserId::new("carol"));

    let mut state = ListViewState::default();
    state.set_page_size(PageSize::Fifty);
    state.set_query("concert");
    bob.save(&state).unwrap();

    assert_eq!(bob.load(), state);
    assert_eq!(carol.load(), ListViewState::default());
    assert!(kv.raw("relovetree:list-prefs:bob").is_some());
}

#[test]
fn test_corrupt_preferences_load_as_defaults() {
    use relovetree_domain::traits::KeyValueStore;

    let kv = Arc::new(MemoryKv::default());
    kv.set("relovetree:list-prefs:bob", "{not json").unwrap();

    let prefs = ListPreferences::new(kv, UserId::new("bob"));
    assert_eq!(prefs.load(), ListViewState::default());
}

#[test]
fn test_url_state_wins_over_stored_state() {
    let kv = Arc::new(MemoryKv::default());
    let prefs = ListPreferences::new(kv, UserId::new("bob"));
    let mut stored = ListViewState::default();
    stored.set_sort(SortKey::ViewsDesc);
    prefs.save(&stored).unwrap();

    let from_url = prefs.resolve(Some("?sort=likes_desc&page=2"));
    assert_eq!(from_url.sort, SortKey::LikesDesc);
    assert_eq!(from_url.page, 2);

    assert_eq!(prefs.resolve(None), stored);
    assert_eq!(prefs.resolve(Some("?")), stored);

    prefs.clear().unwrap();
    assert_eq!(prefs.resolve(None), ListViewState::default());
}
