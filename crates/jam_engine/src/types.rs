use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub collection_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyPayload {
    pub id: u64,
    pub company_name: String,
    #[serde(default)]
    pub liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagePayload {
    pub id: String,
    #[serde(default)]
    pub collection_name: String,
    pub companies: Vec<CompanyPayload>,
    pub total: u64,
}

/// `GET /tasks/{id}/status` body. Only `state` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TaskStatusPayload {
    pub state: String,
    #[serde(default)]
    pub current: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationResponse {
    Completed,
    InProgress { task_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifyAction {
    Add,
    Remove,
}

/// A bulk request as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    Modify {
        target: String,
        record_ids: Vec<u64>,
        action: ModifyAction,
    },
    SelectAll {
        source: String,
        target: String,
    },
    ClearCollection {
        collection: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub collection_id: String,
    pub offset: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The poll lease timer fired.
    PollDue,
    CollectionsLoaded(Result<Vec<CollectionSummary>, ApiError>),
    PageLoaded {
        key: PageKey,
        result: Result<PagePayload, ApiError>,
    },
    /// One poll cycle, one entry per requested task id.
    TaskStatuses(Vec<(String, Result<TaskStatusPayload, ApiError>)>),
    MutationFinished {
        request: MutationRequest,
        result: Result<MutationResponse, ApiError>,
    },
}
