use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use futures_util::future::join_all;
use jam_logging::{jam_debug, jam_error, jam_info};
use tokio::sync::mpsc as async_mpsc;

use crate::cache::PageCache;
use crate::poller::PollLease;
use crate::{
    ApiError, ApiSettings, DashboardApi, EngineEvent, MutationRequest, MutationResponse, PageKey,
    ReqwestApi,
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Receives everything the engine reports. Called from the engine thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    FetchCollections,
    FetchPage(PageKey),
    InvalidateCollection(String),
    PollTasks(Vec<String>),
    Mutate(MutationRequest),
    StartPolling,
    StopPolling,
    Shutdown,
}

/// Runs every backend call on one current-thread runtime owned by a
/// background thread. Commands are fire-and-forget; results come back
/// through the [`EventSink`].
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        api: Arc<dyn DashboardApi>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name("jam-engine".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        jam_error!("Failed to start engine runtime: {}", err);
                        return;
                    }
                };
                runtime.block_on(run(settings, api, sink, cmd_rx));
            });
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                jam_error!("Failed to spawn engine thread: {}", err);
                None
            }
        };
        Self { cmd_tx, worker }
    }

    pub fn with_reqwest(
        settings: EngineSettings,
        api_settings: ApiSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ApiError> {
        let api = ReqwestApi::new(api_settings)?;
        Ok(Self::new(settings, Arc::new(api), sink))
    }

    pub fn fetch_collections(&self) {
        self.send(EngineCommand::FetchCollections);
    }

    pub fn fetch_page(&self, key: PageKey) {
        self.send(EngineCommand::FetchPage(key));
    }

    /// Drops every cached page of the collection.
    pub fn invalidate_collection(&self, collection_id: String) {
        self.send(EngineCommand::InvalidateCollection(collection_id));
    }

    pub fn poll_tasks(&self, task_ids: Vec<String>) {
        self.send(EngineCommand::PollTasks(task_ids));
    }

    pub fn mutate(&self, request: MutationRequest) {
        self.send(EngineCommand::Mutate(request));
    }

    pub fn start_polling(&self) {
        self.send(EngineCommand::StartPolling);
    }

    pub fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling);
    }

    /// Stops the poll timer, abandons in-flight requests and joins the thread.
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            jam_error!("Engine is not running; command dropped");
        }
    }

    fn stop_worker(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

async fn run(
    settings: EngineSettings,
    api: Arc<dyn DashboardApi>,
    sink: Arc<dyn EventSink>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
) {
    let cache = Arc::new(Mutex::new(PageCache::new()));
    let mut lease: Option<PollLease> = None;

    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::StartPolling => {
                if lease.is_none() {
                    lease = Some(PollLease::acquire(settings.poll_interval, sink.clone()));
                }
            }
            EngineCommand::StopPolling => {
                if let Some(lease) = lease.take() {
                    lease.release();
                }
            }
            EngineCommand::InvalidateCollection(collection_id) => {
                let dropped = cache
                    .lock()
                    .map(|mut cache| cache.invalidate_collection(&collection_id))
                    .unwrap_or(0);
                jam_debug!("Invalidated collection {} ({} cached pages)", collection_id, dropped);
            }
            EngineCommand::FetchPage(key) => {
                let api = api.clone();
                let sink = sink.clone();
                let cache = cache.clone();
                tokio::spawn(async move { fetch_page(api.as_ref(), &cache, sink.as_ref(), key).await });
            }
            EngineCommand::FetchCollections => {
                let api = api.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let result = api.fetch_collections().await;
                    sink.emit(EngineEvent::CollectionsLoaded(result));
                });
            }
            EngineCommand::PollTasks(task_ids) => {
                let api = api.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let results = poll_statuses(api.as_ref(), task_ids).await;
                    sink.emit(EngineEvent::TaskStatuses(results));
                });
            }
            EngineCommand::Mutate(request) => {
                let api = api.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let result = mutate(api.as_ref(), &request).await;
                    sink.emit(EngineEvent::MutationFinished { request, result });
                });
            }
            EngineCommand::Shutdown => break,
        }
    }

    drop(lease);
    jam_info!("Engine stopped");
}

async fn fetch_page(
    api: &dyn DashboardApi,
    cache: &Mutex<PageCache>,
    sink: &dyn EventSink,
    key: PageKey,
) {
    let cached = cache
        .lock()
        .ok()
        .and_then(|cache| cache.get(&key).cloned());
    if let Some(page) = cached {
        jam_debug!("Page cache hit for {:?}", key);
        sink.emit(EngineEvent::PageLoaded {
            key,
            result: Ok(page),
        });
        return;
    }

    let result = api
        .fetch_page(&key.collection_id, key.offset, key.page_size)
        .await;
    if let (Ok(page), Ok(mut cache)) = (&result, cache.lock()) {
        cache.insert(key.clone(), page.clone());
    }
    sink.emit(EngineEvent::PageLoaded { key, result });
}

/// Fetches every status concurrently; one failure does not stop the rest.
async fn poll_statuses(
    api: &dyn DashboardApi,
    task_ids: Vec<String>,
) -> Vec<(String, Result<crate::TaskStatusPayload, ApiError>)> {
    join_all(task_ids.into_iter().map(|task_id| async move {
        let result = api.fetch_task_status(&task_id).await;
        (task_id, result)
    }))
    .await
}

async fn mutate(
    api: &dyn DashboardApi,
    request: &MutationRequest,
) -> Result<MutationResponse, ApiError> {
    match request {
        MutationRequest::Modify {
            target,
            record_ids,
            action,
        } => api.request_mutation(target, record_ids, *action).await,
        MutationRequest::SelectAll { source, target } => {
            api.request_select_all(source, target).await
        }
        MutationRequest::ClearCollection { collection } => {
            api.request_clear_collection(collection).await
        }
    }
}
