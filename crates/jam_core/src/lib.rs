//! Dashboard core: pure state machine for task tracking, cross-page
//! selection and bulk-mutation orchestration.
mod effect;
mod msg;
mod selection;
mod state;
mod tasks;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use selection::{reconcile_page, SelectionSet};
pub use state::{AppState, CoreSettings, DEFAULT_PAGE_SIZE, DEFAULT_TARGET_COLLECTION};
pub use tasks::{
    MalformedStatus, PollOutcome, PollResult, PollWarning, Progress, StaleSignal, StatusReport,
    TaskGroups, TaskRecord, TaskRow, TaskState, TaskTracker,
};
pub use types::{
    CacheKey, CollectionId, CollectionMeta, MutationAction, MutationKind, MutationOutcome, Notice,
    NoticeLevel, Page, PageWindow, RecordId, RecordRow, TaskId,
};
pub use update::update;
pub use view_model::{AppViewModel, AvailableActions, CollectionRowView, RecordRowView};
