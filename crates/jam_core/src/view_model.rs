use crate::{CollectionId, RecordId, TaskGroups};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub collections: Vec<CollectionRowView>,
    pub offset: u64,
    pub page_size: u64,
    /// Collection size reported with the last loaded page.
    pub total: Option<u64>,
    pub rows: Vec<RecordRowView>,
    pub selection_count: usize,
    pub actions: AvailableActions,
    pub tasks: TaskGroups,
    pub polling: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRowView {
    pub id: CollectionId,
    pub name: String,
    pub viewed: bool,
    pub target: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub id: RecordId,
    pub name: String,
    pub liked: bool,
    pub selected: bool,
}

/// Buttons the toolbar should offer right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvailableActions {
    pub deselect_all: bool,
    pub add_to_target: bool,
    pub remove_from_target: bool,
    pub add_all_to_target: bool,
    pub clear_collection: bool,
}
