use jam_core::{update, AppState, Msg};

#[test]
fn idle_dashboard_ignores_actions_without_data() {
    let mut state = AppState::new();
    for msg in [
        Msg::DeselectAllClicked,
        Msg::PollTick,
        Msg::DismissFinishedClicked,
        Msg::SelectAllClicked,
        Msg::ClearCollectionClicked,
    ] {
        let (mut next, effects) = update(state.clone(), msg.clone());
        assert!(effects.is_empty(), "{msg:?} produced {effects:?}");
        assert!(!next.consume_dirty(), "{msg:?} marked the view dirty");
        assert_eq!(next, state);
        state = next;
    }
}
