use jam_logging::{jam_debug, jam_info, jam_warn};

use crate::{
    reconcile_page, AppState, CollectionId, Effect, MutationAction, MutationKind,
    MutationOutcome, Msg, Notice, PageWindow, TaskId,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CollectionsRequested => vec![Effect::FetchCollections],
        Msg::CollectionsLoaded(collections) => {
            let before = state.current_key();
            state.set_collections(collections);
            if state.target_collection().is_none() {
                jam_warn!(
                    "No collection named {:?}; bulk mutations are disabled",
                    state.settings().target_collection_name
                );
            }
            match state.current_key() {
                Some(key) if Some(&key) != before.as_ref() => vec![Effect::FetchPage(key)],
                _ => Vec::new(),
            }
        }
        Msg::CollectionsLoadFailed(message) => {
            vec![Effect::Notify(Notice::error(format!(
                "Failed to load collections: {message}"
            )))]
        }
        Msg::CollectionSelected(collection_id) => {
            if state.viewed_collection() == Some(&collection_id) {
                return (state, Vec::new());
            }
            jam_info!("Viewing collection {}", collection_id);
            state.switch_collection(collection_id);
            state.current_key().map(Effect::FetchPage).into_iter().collect()
        }
        Msg::PageChanged { offset, page_size } => {
            let window = PageWindow::new(offset, page_size);
            if window == state.window() || page_size == 0 {
                return (state, Vec::new());
            }
            state.set_window(window);
            state.current_key().map(Effect::FetchPage).into_iter().collect()
        }
        Msg::PageLoaded(page) => {
            if state.current_key().as_ref() == Some(&page.key) {
                state.set_page(page);
            } else {
                jam_debug!("Dropping page for stale key {:?}", page.key);
            }
            Vec::new()
        }
        Msg::PageLoadFailed { key, message } => {
            jam_warn!("Page load for {:?} failed: {}", key, message);
            vec![Effect::Notify(Notice::error(format!(
                "Failed to load companies: {message}"
            )))]
        }
        Msg::PageSelectionChanged(reported) => {
            let merged = reconcile_page(state.selection(), state.window(), &reported);
            state.set_selection(merged);
            Vec::new()
        }
        Msg::DeselectAllClicked => {
            state.clear_selection();
            Vec::new()
        }
        Msg::ModifyClicked(action) => modify_selection(&mut state, action),
        Msg::SelectAllClicked => select_all(&mut state),
        Msg::ClearCollectionClicked => match state.viewed_collection() {
            Some(collection) => vec![Effect::RequestClearCollection {
                collection: collection.clone(),
            }],
            None => Vec::new(),
        },
        Msg::MutationFinished { kind, result } => mutation_finished(&mut state, kind, result),
        Msg::PollTick => match state.tracker_mut().begin_poll() {
            Some(task_ids) => vec![Effect::PollTasks(task_ids)],
            None => Vec::new(),
        },
        Msg::TasksPolled(results) => {
            let outcome = state.tracker_mut().apply_poll(results);
            state.mark_dirty();
            let mut effects: Vec<Effect> = outcome
                .warnings
                .iter()
                .map(|warning| {
                    Effect::Notify(Notice::warning(format!(
                        "Could not refresh task {}: {}",
                        warning.task_id.short(),
                        warning.message
                    )))
                })
                .collect();
            // One refresh covers every change observed in this cycle.
            if !outcome.signals.is_empty() {
                let written: Vec<CollectionId> = outcome
                    .signals
                    .iter()
                    .filter_map(|signal| state.task_write(&signal.task_id).cloned())
                    .collect();
                effects.extend(refresh_pages(&state, &written));
            }
            if outcome.poll_again {
                if let Some(task_ids) = state.tracker_mut().begin_poll() {
                    effects.push(Effect::PollTasks(task_ids));
                }
            }
            effects
        }
        Msg::TaskDismissed(task_id) => dismiss(&mut state, |tracker| {
            tracker.untrack(&task_id);
        }),
        Msg::DismissFinishedClicked => dismiss(&mut state, |tracker| {
            tracker.dismiss_finished();
        }),
        Msg::Shutdown => vec![Effect::StopPolling],
    };

    (state, effects)
}

fn modify_selection(state: &mut AppState, action: MutationAction) -> Vec<Effect> {
    let Some(target) = state.target_collection().cloned() else {
        return Vec::new();
    };
    if state.selection().is_empty() {
        return Vec::new();
    }
    if action == MutationAction::Add && state.viewed_collection() == Some(&target) {
        return Vec::new();
    }
    vec![Effect::RequestMutation {
        target,
        record_ids: state.selection().to_vec(),
        action,
    }]
}

fn select_all(state: &mut AppState) -> Vec<Effect> {
    let (Some(source), Some(target)) = (
        state.viewed_collection().cloned(),
        state.target_collection().cloned(),
    ) else {
        return Vec::new();
    };
    if source == target {
        return Vec::new();
    }
    if state.select_all_busy(&source, &target) {
        jam_debug!("Select-all {} -> {} already running", source, target);
        return Vec::new();
    }
    state.select_all_sent(source.clone(), target.clone());
    vec![Effect::RequestSelectAll { source, target }]
}

fn mutation_finished(
    state: &mut AppState,
    kind: MutationKind,
    result: Result<MutationOutcome, String>,
) -> Vec<Effect> {
    if let MutationKind::SelectAll { source, target } = &kind {
        let task_id = match &result {
            Ok(MutationOutcome::InProgress(task_id)) => Some(task_id.clone()),
            _ => None,
        };
        state.select_all_answered(source, target, task_id);
    }

    let written = written_collection(state, &kind);
    match result {
        Ok(MutationOutcome::Completed) => {
            jam_info!("{:?} completed synchronously", kind);
            state.clear_selection();
            let mut effects = vec![Effect::Notify(Notice::info(completed_text(&kind)))];
            effects.extend(refresh_pages(state, written.as_slice()));
            effects
        }
        Ok(MutationOutcome::InProgress(task_id)) => {
            jam_info!("{:?} deferred to task {}", kind, task_id);
            state.clear_selection();
            if let Some(collection) = written {
                state.record_task_write(task_id.clone(), collection);
            }
            let notice = Effect::Notify(Notice::info(format!(
                "Task in progress. Task ID: {task_id}"
            )));
            let mut effects = track(state, task_id);
            effects.push(notice);
            effects
        }
        Err(message) => {
            jam_warn!("{:?} failed: {}", kind, message);
            vec![Effect::Notify(Notice::error(failed_text(&kind, &message)))]
        }
    }
}

fn track(state: &mut AppState, task_id: TaskId) -> Vec<Effect> {
    let was_empty = state.tracker().is_empty();
    let added = state.tracker_mut().track(task_id);
    state.mark_dirty();
    if added && was_empty {
        vec![Effect::StartPolling]
    } else {
        Vec::new()
    }
}

fn dismiss(state: &mut AppState, remove: impl FnOnce(&mut crate::TaskTracker)) -> Vec<Effect> {
    let before = state.tracker().len();
    remove(state.tracker_mut());
    if state.tracker().len() == before {
        return Vec::new();
    }
    state.forget_untracked_tasks();
    state.mark_dirty();
    if state.tracker().is_empty() {
        vec![Effect::StopPolling]
    } else {
        Vec::new()
    }
}

/// Collection whose membership a bulk request changes.
fn written_collection(state: &AppState, kind: &MutationKind) -> Option<CollectionId> {
    match kind {
        MutationKind::Modify(_) => state.target_collection().cloned(),
        MutationKind::SelectAll { target, .. } => Some(target.clone()),
        MutationKind::ClearCollection(collection) => Some(collection.clone()),
    }
}

/// Invalidates every collection a write may have changed, then reloads the
/// page on screen. Writes into the target collection change the `liked` flag
/// on rows of every collection.
fn refresh_pages(state: &AppState, written: &[CollectionId]) -> Vec<Effect> {
    let touches_target = state
        .target_collection()
        .is_some_and(|target| written.contains(target));
    let mut stale: Vec<CollectionId> = state
        .collections()
        .iter()
        .map(|meta| meta.id.clone())
        .filter(|id| {
            touches_target || written.contains(id) || state.viewed_collection() == Some(id)
        })
        .collect();
    for id in written.iter().chain(state.viewed_collection()) {
        if !stale.contains(id) {
            stale.push(id.clone());
        }
    }

    let mut effects: Vec<Effect> = stale.into_iter().map(Effect::InvalidateCollection).collect();
    effects.extend(state.current_key().map(Effect::FetchPage));
    effects
}

fn completed_text(kind: &MutationKind) -> String {
    match kind {
        MutationKind::Modify(MutationAction::Add) => {
            "Companies added to collection successfully!".to_string()
        }
        MutationKind::Modify(MutationAction::Remove) => {
            "Companies removed from collection successfully!".to_string()
        }
        MutationKind::SelectAll { .. } => "Companies added successfully!".to_string(),
        MutationKind::ClearCollection(_) => "Collection cleared.".to_string(),
    }
}

fn failed_text(kind: &MutationKind, message: &str) -> String {
    match kind {
        MutationKind::Modify(action) => format!(
            "Failed to {} companies {} collection: {message}",
            action.as_str(),
            match action {
                MutationAction::Add => "to",
                MutationAction::Remove => "from",
            }
        ),
        MutationKind::SelectAll { .. } => format!("Failed to add all companies: {message}"),
        MutationKind::ClearCollection(_) => format!("Failed to clear collection: {message}"),
    }
}
