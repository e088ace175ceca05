use std::sync::Once;

use jam_core::{
    update, AppState, CacheKey, CollectionId, CollectionMeta, CoreSettings, Effect, Msg, Page,
    RecordRow,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jam_logging::initialize_for_tests);
}

fn collections() -> Vec<CollectionMeta> {
    vec![
        CollectionMeta {
            id: CollectionId::new("all"),
            name: "My List".to_string(),
        },
        CollectionMeta {
            id: CollectionId::new("liked"),
            name: "Liked Companies".to_string(),
        },
        CollectionMeta {
            id: CollectionId::new("other"),
            name: "Companies to Ignore List".to_string(),
        },
    ]
}

fn key(collection: &str, offset: u64, page_size: u64) -> CacheKey {
    CacheKey {
        collection_id: CollectionId::new(collection),
        offset,
        page_size,
    }
}

fn loaded(settings: CoreSettings) -> AppState {
    let (state, _) = update(
        AppState::with_settings(settings),
        Msg::CollectionsLoaded(collections()),
    );
    state
}

#[test]
fn collections_loaded_views_first_and_fetches_page() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CollectionsLoaded(collections()));

    assert_eq!(state.viewed_collection(), Some(&CollectionId::new("all")));
    assert_eq!(state.target_collection(), Some(&CollectionId::new("liked")));
    assert_eq!(effects, vec![Effect::FetchPage(key("all", 0, 25))]);

    let view = state.view();
    assert!(view.collections[0].viewed);
    assert!(view.collections[1].target);
}

#[test]
fn collections_requested_emits_fetch() {
    let (_, effects) = update(AppState::new(), Msg::CollectionsRequested);
    assert_eq!(effects, vec![Effect::FetchCollections]);
}

#[test]
fn switching_collection_resets_selection_and_offset() {
    init_logging();
    let state = loaded(CoreSettings::default());
    let (state, _) = update(state, Msg::PageChanged { offset: 25, page_size: 25 });
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![42]));
    let (state, _) = update(state, Msg::PageChanged { offset: 0, page_size: 25 });
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![3, 17]));
    assert_eq!(state.selection().to_vec(), vec![3, 17, 42]);

    let (state, effects) = update(state, Msg::CollectionSelected(CollectionId::new("other")));

    assert!(state.selection().is_empty());
    assert_eq!(state.window().offset, 0);
    assert_eq!(effects, vec![Effect::FetchPage(key("other", 0, 25))]);
}

#[test]
fn reselecting_viewed_collection_is_noop() {
    let state = loaded(CoreSettings::default());
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![3]));
    let (state, effects) = update(state, Msg::CollectionSelected(CollectionId::new("all")));
    assert!(effects.is_empty());
    assert_eq!(state.selection().to_vec(), vec![3]);
}

#[test]
fn page_change_keeps_selection_by_default() {
    let state = loaded(CoreSettings::default());
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![3]));
    let (state, effects) = update(state, Msg::PageChanged { offset: 25, page_size: 25 });

    assert_eq!(state.selection().to_vec(), vec![3]);
    assert_eq!(effects, vec![Effect::FetchPage(key("all", 25, 25))]);
}

#[test]
fn page_change_resets_selection_when_configured() {
    let state = loaded(CoreSettings {
        reset_selection_on_page_change: true,
        ..CoreSettings::default()
    });
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![3]));
    let (state, _) = update(state, Msg::PageChanged { offset: 0, page_size: 50 });
    assert!(state.selection().is_empty());
}

#[test]
fn zero_page_size_is_ignored() {
    let state = loaded(CoreSettings::default());
    let (state, effects) = update(state, Msg::PageChanged { offset: 0, page_size: 0 });
    assert!(effects.is_empty());
    assert_eq!(state.window().page_size, 25);
}

#[test]
fn stale_page_responses_are_dropped() {
    init_logging();
    let state = loaded(CoreSettings::default());
    let (state, _) = update(state, Msg::PageChanged { offset: 25, page_size: 25 });

    let page = |offset| Page {
        key: key("all", offset, 25),
        total: 60,
        rows: vec![RecordRow {
            id: offset + 1,
            name: "Acme".to_string(),
            liked: false,
        }],
    };

    let (state, _) = update(state, Msg::PageLoaded(page(0)));
    assert!(state.view().rows.is_empty());

    let (state, _) = update(state, Msg::PageLoaded(page(25)));
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![26]));
    let view = state.view();
    assert_eq!(view.total, Some(60));
    assert_eq!(view.rows[0].id, 26);
    assert!(view.rows[0].selected);
}

#[test]
fn toolbar_follows_selection_and_target() {
    let state = loaded(CoreSettings::default());
    let actions = state.view().actions;
    assert!(actions.add_all_to_target);
    assert!(!actions.add_to_target);

    let (state, _) = update(state, Msg::PageSelectionChanged(vec![1]));
    let actions = state.view().actions;
    assert!(actions.deselect_all);
    assert!(actions.add_to_target);
    assert!(actions.remove_from_target);
    assert!(!actions.add_all_to_target);

    let (state, _) = update(state, Msg::CollectionSelected(CollectionId::new("liked")));
    let (state, _) = update(state, Msg::PageSelectionChanged(vec![1]));
    let actions = state.view().actions;
    assert!(!actions.add_to_target);
    assert!(actions.remove_from_target);
}

#[test]
fn selection_changes_mark_state_dirty() {
    let mut state = loaded(CoreSettings::default());
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::PageSelectionChanged(vec![2]));
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::PageSelectionChanged(vec![2]));
    assert!(!state.consume_dirty());
}
