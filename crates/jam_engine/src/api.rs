use std::time::Duration;

use jam_logging::jam_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    ApiError, CollectionSummary, ModifyAction, MutationResponse, PagePayload, TaskStatusPayload,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Backend operations the dashboard relies on.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_collections(&self) -> Result<Vec<CollectionSummary>, ApiError>;

    async fn fetch_page(
        &self,
        collection_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<PagePayload, ApiError>;

    async fn fetch_task_status(&self, task_id: &str) -> Result<TaskStatusPayload, ApiError>;

    async fn request_mutation(
        &self,
        target: &str,
        record_ids: &[u64],
        action: ModifyAction,
    ) -> Result<MutationResponse, ApiError>;

    async fn request_select_all(
        &self,
        source: &str,
        target: &str,
    ) -> Result<MutationResponse, ApiError>;

    async fn request_clear_collection(
        &self,
        collection_id: &str,
    ) -> Result<MutationResponse, ApiError>;
}

#[derive(Serialize)]
struct ModifyBody<'a> {
    company_ids: &'a [u64],
    action: ModifyAction,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(settings.base_url));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        jam_debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Malformed(err.to_string()))
    }
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestApi {
    async fn fetch_collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        self.send(Method::GET, self.endpoint(&["collections"]), None)
            .await
    }

    async fn fetch_page(
        &self,
        collection_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<PagePayload, ApiError> {
        let mut url = self.endpoint(&["collections", collection_id]);
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        self.send(Method::GET, url, None).await
    }

    async fn fetch_task_status(&self, task_id: &str) -> Result<TaskStatusPayload, ApiError> {
        self.send(
            Method::GET,
            self.endpoint(&["tasks", task_id, "status"]),
            None,
        )
        .await
    }

    async fn request_mutation(
        &self,
        target: &str,
        record_ids: &[u64],
        action: ModifyAction,
    ) -> Result<MutationResponse, ApiError> {
        let body = serde_json::to_vec(&ModifyBody {
            company_ids: record_ids,
            action,
        })
        .map_err(|err| ApiError::Malformed(err.to_string()))?;
        self.send(
            Method::POST,
            self.endpoint(&["collections", target, "modify_companies"]),
            Some(body),
        )
        .await
    }

    async fn request_select_all(
        &self,
        source: &str,
        target: &str,
    ) -> Result<MutationResponse, ApiError> {
        self.send(
            Method::POST,
            self.endpoint(&["collections", source, "select_all", target]),
            None,
        )
        .await
    }

    async fn request_clear_collection(
        &self,
        collection_id: &str,
    ) -> Result<MutationResponse, ApiError> {
        self.send(
            Method::DELETE,
            self.endpoint(&["collections", collection_id, "delete_all_associations"]),
            None,
        )
        .await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Transport(err.to_string())
}
