use std::collections::HashMap;

use crate::view_model::{AppViewModel, AvailableActions, CollectionRowView, RecordRowView};
use crate::{
    CacheKey, CollectionId, CollectionMeta, Page, PageWindow, SelectionSet, TaskId, TaskTracker,
};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const DEFAULT_TARGET_COLLECTION: &str = "Liked Companies";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub page_size: u64,
    /// Name of the collection bulk mutations write into.
    pub target_collection_name: String,
    /// Clear the selection whenever the offset or page size changes. `true`
    /// is the strict per-page policy; the default keeps selections across
    /// pages of the same collection.
    pub reset_selection_on_page_change: bool,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            target_collection_name: DEFAULT_TARGET_COLLECTION.to_string(),
            reset_selection_on_page_change: false,
        }
    }
}

type SelectAllPair = (CollectionId, CollectionId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    settings: CoreSettings,
    collections: Vec<CollectionMeta>,
    viewed: Option<CollectionId>,
    target: Option<CollectionId>,
    window: PageWindow,
    page: Option<Page>,
    selection: SelectionSet,
    tracker: TaskTracker,
    select_all_awaiting: Vec<SelectAllPair>,
    select_all_tasks: HashMap<TaskId, SelectAllPair>,
    /// Collection each deferred mutation writes into.
    task_writes: HashMap<TaskId, CollectionId>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(CoreSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        let window = PageWindow::new(0, settings.page_size);
        Self {
            settings,
            collections: Vec::new(),
            viewed: None,
            target: None,
            window,
            page: None,
            selection: SelectionSet::new(),
            tracker: TaskTracker::new(),
            select_all_awaiting: Vec::new(),
            select_all_tasks: HashMap::new(),
            task_writes: HashMap::new(),
            dirty: false,
        }
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn collections(&self) -> &[CollectionMeta] {
        &self.collections
    }

    pub fn viewed_collection(&self) -> Option<&CollectionId> {
        self.viewed.as_ref()
    }

    pub fn target_collection(&self) -> Option<&CollectionId> {
        self.target.as_ref()
    }

    /// Cache key of the page currently on screen.
    pub fn current_key(&self) -> Option<CacheKey> {
        self.viewed.as_ref().map(|collection_id| CacheKey {
            collection_id: collection_id.clone(),
            offset: self.window.offset,
            page_size: self.window.page_size,
        })
    }

    pub fn view(&self) -> AppViewModel {
        let collections = self
            .collections
            .iter()
            .map(|meta| CollectionRowView {
                id: meta.id.clone(),
                name: meta.name.clone(),
                viewed: self.viewed.as_ref() == Some(&meta.id),
                target: self.target.as_ref() == Some(&meta.id),
            })
            .collect();
        let rows = self
            .page
            .as_ref()
            .map(|page| {
                page.rows
                    .iter()
                    .map(|row| RecordRowView {
                        id: row.id,
                        name: row.name.clone(),
                        liked: row.liked,
                        selected: self.selection.contains(row.id),
                    })
                    .collect()
            })
            .unwrap_or_default();

        AppViewModel {
            collections,
            offset: self.window.offset,
            page_size: self.window.page_size,
            total: self.page.as_ref().map(|page| page.total),
            rows,
            selection_count: self.selection.len(),
            actions: self.available_actions(),
            tasks: self.tracker.groups(),
            polling: !self.tracker.is_empty(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn available_actions(&self) -> AvailableActions {
        let has_selection = !self.selection.is_empty();
        let has_target = self.target.is_some();
        let viewing_other = self.viewed.is_some() && self.viewed != self.target;
        AvailableActions {
            deselect_all: has_selection,
            add_to_target: has_selection && has_target && viewing_other,
            remove_from_target: has_selection && has_target,
            add_all_to_target: !has_selection && has_target && viewing_other,
            clear_collection: self.viewed.is_some(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_collections(&mut self, collections: Vec<CollectionMeta>) {
        self.target = collections
            .iter()
            .find(|meta| meta.name == self.settings.target_collection_name)
            .map(|meta| meta.id.clone());
        let keep_viewed = self
            .viewed
            .as_ref()
            .is_some_and(|id| collections.iter().any(|meta| &meta.id == id));
        if !keep_viewed {
            self.viewed = None;
            if let Some(first) = collections.first() {
                self.switch_collection(first.id.clone());
            }
        }
        self.collections = collections;
        self.mark_dirty();
    }

    /// Selection does not follow the user across collections.
    pub(crate) fn switch_collection(&mut self, collection_id: CollectionId) {
        self.viewed = Some(collection_id);
        self.window.offset = 0;
        self.selection.clear();
        self.page = None;
        self.mark_dirty();
    }

    pub(crate) fn set_window(&mut self, window: PageWindow) {
        self.window = window;
        if self.settings.reset_selection_on_page_change {
            self.selection.clear();
        }
        self.mark_dirty();
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = Some(page);
        self.mark_dirty();
    }

    pub(crate) fn set_selection(&mut self, selection: SelectionSet) {
        if selection != self.selection {
            self.selection = selection;
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut TaskTracker {
        &mut self.tracker
    }

    /// A select-all is blocked while a previous one for the same pair is
    /// awaiting its response or its task has not finished.
    pub(crate) fn select_all_busy(&self, source: &CollectionId, target: &CollectionId) -> bool {
        let same = |pair: &SelectAllPair| &pair.0 == source && &pair.1 == target;
        if self.select_all_awaiting.iter().any(same) {
            return true;
        }
        self.select_all_tasks.iter().any(|(task_id, pair)| {
            same(pair)
                && self.tracker.contains(task_id)
                && self
                    .tracker
                    .record(task_id)
                    .map_or(true, |record| !record.state.is_terminal())
        })
    }

    pub(crate) fn select_all_sent(&mut self, source: CollectionId, target: CollectionId) {
        self.select_all_awaiting.push((source, target));
    }

    pub(crate) fn select_all_answered(
        &mut self,
        source: &CollectionId,
        target: &CollectionId,
        task_id: Option<TaskId>,
    ) {
        if let Some(pos) = self
            .select_all_awaiting
            .iter()
            .position(|(s, t)| s == source && t == target)
        {
            self.select_all_awaiting.remove(pos);
        }
        if let Some(task_id) = task_id {
            self.select_all_tasks
                .insert(task_id, (source.clone(), target.clone()));
        }
    }

    pub(crate) fn record_task_write(&mut self, task_id: TaskId, collection: CollectionId) {
        self.task_writes.insert(task_id, collection);
    }

    pub(crate) fn task_write(&self, task_id: &TaskId) -> Option<&CollectionId> {
        self.task_writes.get(task_id)
    }

    /// Drops bookkeeping for tasks no longer on the board.
    pub(crate) fn forget_untracked_tasks(&mut self) {
        let tracker = &self.tracker;
        self.select_all_tasks
            .retain(|task_id, _| tracker.contains(task_id));
        self.task_writes
            .retain(|task_id, _| tracker.contains(task_id));
    }
}
