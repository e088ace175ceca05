use crate::{
    CacheKey, CollectionId, CollectionMeta, MutationAction, MutationKind, MutationOutcome, Page,
    PollResult, RecordId, TaskId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard opened or user asked to reload the collection list.
    CollectionsRequested,
    /// Collection metadata arrived from the backend.
    CollectionsLoaded(Vec<CollectionMeta>),
    CollectionsLoadFailed(String),
    /// User picked a collection in the sidebar.
    CollectionSelected(CollectionId),
    /// User moved to another page or changed the page size.
    PageChanged { offset: u64, page_size: u64 },
    /// Page contents arrived from the cache or the backend.
    PageLoaded(Page),
    PageLoadFailed { key: CacheKey, message: String },
    /// Table widget reported which of its visible rows are checked.
    PageSelectionChanged(Vec<RecordId>),
    DeselectAllClicked,
    /// User asked to add/remove the selection to/from the target collection.
    ModifyClicked(MutationAction),
    /// User asked to add the whole viewed collection to the target collection.
    SelectAllClicked,
    /// User asked to empty the viewed collection.
    ClearCollectionClicked,
    /// Backend answered a bulk request.
    MutationFinished {
        kind: MutationKind,
        result: Result<MutationOutcome, String>,
    },
    /// Poll timer fired.
    PollTick,
    /// Status results for one poll cycle.
    TasksPolled(Vec<(TaskId, PollResult)>),
    /// User removed a task from the task board.
    TaskDismissed(TaskId),
    /// User cleared every finished task from the task board.
    DismissFinishedClicked,
    /// Dashboard view is being torn down.
    Shutdown,
}
