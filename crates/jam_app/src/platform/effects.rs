use std::sync::{mpsc, Arc};

use jam_core::{
    CacheKey, CollectionId, CollectionMeta, Effect, MutationAction, MutationKind,
    MutationOutcome, Msg, Page, PollResult, RecordRow, StatusReport, TaskId,
};
use jam_engine::{
    ApiError, EngineEvent, EngineHandle, EventSink, ModifyAction, MutationRequest,
    MutationResponse, PageKey,
};
use jam_logging::{jam_debug, jam_info};

use super::app::AppEvent;
use super::config::DashboardConfig;
use super::ui;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &DashboardConfig, tx: mpsc::Sender<AppEvent>) -> anyhow::Result<Self> {
        let sink = Arc::new(MsgSink { tx });
        let engine =
            EngineHandle::with_reqwest(config.engine_settings(), config.api_settings(), sink)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchCollections => self.engine.fetch_collections(),
                Effect::FetchPage(key) => self.engine.fetch_page(page_key(&key)),
                Effect::InvalidateCollection(collection) => self
                    .engine
                    .invalidate_collection(collection.as_str().to_string()),
                Effect::RequestMutation {
                    target,
                    record_ids,
                    action,
                } => {
                    jam_info!(
                        "RequestMutation action={} target={} count={}",
                        action.as_str(),
                        target,
                        record_ids.len()
                    );
                    self.engine.mutate(MutationRequest::Modify {
                        target: target.as_str().to_string(),
                        record_ids,
                        action: modify_action(action),
                    });
                }
                Effect::RequestSelectAll { source, target } => {
                    jam_info!("RequestSelectAll source={} target={}", source, target);
                    self.engine.mutate(MutationRequest::SelectAll {
                        source: source.as_str().to_string(),
                        target: target.as_str().to_string(),
                    });
                }
                Effect::RequestClearCollection { collection } => {
                    jam_info!("RequestClearCollection collection={}", collection);
                    self.engine.mutate(MutationRequest::ClearCollection {
                        collection: collection.as_str().to_string(),
                    });
                }
                Effect::StartPolling => self.engine.start_polling(),
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::PollTasks(task_ids) => {
                    jam_debug!("PollTasks count={}", task_ids.len());
                    self.engine
                        .poll_tasks(task_ids.iter().map(|id| id.as_str().to_string()).collect());
                }
                Effect::Notify(notice) => ui::render::print_notice(&notice),
            }
        }
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

/// Feeds engine events back into the app loop as core messages.
struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event)));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PollDue => Msg::PollTick,
        EngineEvent::CollectionsLoaded(Ok(collections)) => Msg::CollectionsLoaded(
            collections
                .into_iter()
                .map(|summary| CollectionMeta {
                    id: CollectionId::new(summary.id),
                    name: summary.collection_name,
                })
                .collect(),
        ),
        EngineEvent::CollectionsLoaded(Err(err)) => Msg::CollectionsLoadFailed(err.to_string()),
        EngineEvent::PageLoaded { key, result } => {
            let key = cache_key(key);
            match result {
                Ok(payload) => Msg::PageLoaded(Page {
                    key,
                    total: payload.total,
                    rows: payload
                        .companies
                        .into_iter()
                        .map(|company| RecordRow {
                            id: company.id,
                            name: company.company_name,
                            liked: company.liked,
                        })
                        .collect(),
                }),
                Err(err) => Msg::PageLoadFailed {
                    key,
                    message: err.to_string(),
                },
            }
        }
        EngineEvent::TaskStatuses(results) => Msg::TasksPolled(
            results
                .into_iter()
                .map(|(task_id, result)| (TaskId::new(task_id), poll_result(result)))
                .collect(),
        ),
        EngineEvent::MutationFinished { request, result } => Msg::MutationFinished {
            kind: mutation_kind(request),
            result: result.map(mutation_outcome).map_err(|err| err.to_string()),
        },
    }
}

fn poll_result(result: Result<jam_engine::TaskStatusPayload, ApiError>) -> PollResult {
    match result {
        Ok(payload) => PollResult::Report(StatusReport {
            state: payload.state,
            current: payload.current,
            total: payload.total,
            status: payload.status,
        }),
        Err(err) => PollResult::Transport(err.to_string()),
    }
}

fn mutation_outcome(response: MutationResponse) -> MutationOutcome {
    match response {
        MutationResponse::Completed => MutationOutcome::Completed,
        MutationResponse::InProgress { task_id } => MutationOutcome::InProgress(TaskId::new(task_id)),
    }
}

fn mutation_kind(request: MutationRequest) -> MutationKind {
    match request {
        MutationRequest::Modify { action, .. } => MutationKind::Modify(match action {
            ModifyAction::Add => MutationAction::Add,
            ModifyAction::Remove => MutationAction::Remove,
        }),
        MutationRequest::SelectAll { source, target } => MutationKind::SelectAll {
            source: CollectionId::new(source),
            target: CollectionId::new(target),
        },
        MutationRequest::ClearCollection { collection } => {
            MutationKind::ClearCollection(CollectionId::new(collection))
        }
    }
}

fn modify_action(action: MutationAction) -> ModifyAction {
    match action {
        MutationAction::Add => ModifyAction::Add,
        MutationAction::Remove => ModifyAction::Remove,
    }
}

fn page_key(key: &CacheKey) -> PageKey {
    PageKey {
        collection_id: key.collection_id.as_str().to_string(),
        offset: key.offset,
        page_size: key.page_size,
    }
}

fn cache_key(key: PageKey) -> CacheKey {
    CacheKey {
        collection_id: CollectionId::new(key.collection_id),
        offset: key.offset,
        page_size: key.page_size,
    }
}
