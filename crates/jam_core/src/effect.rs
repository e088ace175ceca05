use crate::{CacheKey, CollectionId, MutationAction, Notice, RecordId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchCollections,
    FetchPage(CacheKey),
    /// Drop every cached page of the collection so the next fetch goes to the
    /// backend.
    InvalidateCollection(CollectionId),
    RequestMutation {
        target: CollectionId,
        record_ids: Vec<RecordId>,
        action: MutationAction,
    },
    RequestSelectAll {
        source: CollectionId,
        target: CollectionId,
    },
    RequestClearCollection {
        collection: CollectionId,
    },
    /// Acquire the poll timer lease.
    StartPolling,
    /// Release the poll timer lease.
    StopPolling,
    PollTasks(Vec<TaskId>),
    Notify(Notice),
}
