//! Dashboard engine: backend client, page cache and poll timer.
mod api;
mod cache;
mod engine;
mod poller;
mod types;

pub use api::{ApiSettings, DashboardApi, ReqwestApi};
pub use cache::PageCache;
pub use engine::{ChannelEventSink, EngineHandle, EngineSettings, EventSink};
pub use poller::PollLease;
pub use types::{
    ApiError, CollectionSummary, CompanyPayload, EngineEvent, ModifyAction, MutationRequest,
    MutationResponse, PageKey, PagePayload, TaskStatusPayload,
};
