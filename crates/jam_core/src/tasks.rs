//! Tracking of deferred backend tasks.
//!
//! The tracker keeps the outstanding task ids in insertion order together
//! with the last valid status seen for each. Poll results are compared per
//! id against that last status; every change yields a [`StaleSignal`].
use std::collections::HashMap;
use std::fmt;

use jam_logging::{jam_debug, jam_info, jam_warn};
use thiserror::Error;

use crate::TaskId;

/// Task state as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Progress,
    Success,
    Failure,
    /// Any token outside the known set (`RETRY`, `REVOKED`, ...).
    Unknown(String),
}

impl TaskState {
    pub fn parse(token: &str) -> Self {
        match token {
            "PENDING" => TaskState::Pending,
            "PROGRESS" => TaskState::Progress,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            other => TaskState::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending | TaskState::Progress)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => f.write_str("PENDING"),
            TaskState::Progress => f.write_str("PROGRESS"),
            TaskState::Success => f.write_str("SUCCESS"),
            TaskState::Failure => f.write_str("FAILURE"),
            TaskState::Unknown(token) => f.write_str(token),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

impl Progress {
    /// `None` when `total` is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.current as f64 / self.total as f64)
        }
    }
}

/// Raw status payload for one task, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub state: String,
    pub current: Option<u64>,
    pub total: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedStatus {
    #[error("state {state} reported without current/total")]
    MissingProgress { state: String },
    #[error("progress current {current} exceeds total {total}")]
    ProgressOverflow { current: u64, total: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub state: TaskState,
    pub progress: Option<Progress>,
    pub error_detail: Option<String>,
    pub status_text: Option<String>,
}

impl TaskRecord {
    pub fn from_report(id: TaskId, report: StatusReport) -> Result<Self, MalformedStatus> {
        let state = TaskState::parse(&report.state);
        let progress = match (report.current, report.total) {
            (Some(current), Some(total)) => Some(Progress { current, total }),
            _ => None,
        };

        if state == TaskState::Progress {
            match progress {
                None => {
                    return Err(MalformedStatus::MissingProgress {
                        state: report.state,
                    })
                }
                Some(Progress { current, total }) if current > total => {
                    return Err(MalformedStatus::ProgressOverflow { current, total })
                }
                Some(_) => {}
            }
        }

        let (error_detail, status_text) = if state == TaskState::Failure {
            (report.status, None)
        } else {
            (None, report.status)
        };

        Ok(Self {
            id,
            state,
            progress,
            error_detail,
            status_text,
        })
    }

    pub fn completion_ratio(&self) -> Option<f64> {
        self.progress.and_then(|p| p.ratio())
    }

    pub fn progress_percent(&self) -> Option<String> {
        self.completion_ratio()
            .map(|ratio| format!("{:.2}%", ratio * 100.0))
    }
}

/// What a single status fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Report(StatusReport),
    Transport(String),
}

/// A task changed state, so page data fetched earlier may be out of date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleSignal {
    pub task_id: TaskId,
    /// `None` for the first observation of a task.
    pub from: Option<TaskState>,
    pub to: TaskState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollWarning {
    pub task_id: TaskId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollOutcome {
    pub signals: Vec<StaleSignal>,
    pub warnings: Vec<PollWarning>,
    pub malformed: Vec<(TaskId, MalformedStatus)>,
    /// A tick was dropped during this cycle and a task tracked meanwhile has
    /// not been polled yet.
    pub poll_again: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskTracker {
    order: Vec<TaskId>,
    records: HashMap<TaskId, TaskRecord>,
    poll_in_flight: bool,
    tick_dropped: bool,
    cycles: u64,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.order.contains(task_id)
    }

    pub fn task_ids(&self) -> &[TaskId] {
        &self.order
    }

    pub fn poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }

    /// Number of poll results applied so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Last valid record for a task; `None` while it has never been polled.
    pub fn record(&self, task_id: &TaskId) -> Option<&TaskRecord> {
        self.records.get(task_id)
    }

    /// Returns `false` if the id was already tracked.
    pub fn track(&mut self, task_id: TaskId) -> bool {
        if self.contains(&task_id) {
            return false;
        }
        jam_info!("Tracking task {}", task_id);
        self.order.push(task_id);
        true
    }

    /// Returns `false` if the id was not tracked.
    pub fn untrack(&mut self, task_id: &TaskId) -> bool {
        let Some(pos) = self.order.iter().position(|id| id == task_id) else {
            return false;
        };
        self.order.remove(pos);
        self.records.remove(task_id);
        jam_info!("Stopped tracking task {}", task_id);
        true
    }

    /// Drops every task whose last known state is terminal.
    pub fn dismiss_finished(&mut self) -> Vec<TaskId> {
        let finished: Vec<TaskId> = self
            .order
            .iter()
            .filter(|id| {
                self.records
                    .get(*id)
                    .is_some_and(|record| record.state.is_terminal())
            })
            .cloned()
            .collect();
        for id in &finished {
            self.untrack(id);
        }
        finished
    }

    /// Opens a poll cycle. `None` when nothing is tracked or a cycle is
    /// already in flight; ticks in that case are dropped, never queued.
    pub fn begin_poll(&mut self) -> Option<Vec<TaskId>> {
        if self.order.is_empty() {
            return None;
        }
        if self.poll_in_flight {
            jam_debug!("Poll tick skipped, previous cycle still in flight");
            self.tick_dropped = true;
            return None;
        }
        self.poll_in_flight = true;
        Some(self.order.clone())
    }

    /// Closes the in-flight cycle and folds its results in, keyed by id.
    pub fn apply_poll(&mut self, results: Vec<(TaskId, PollResult)>) -> PollOutcome {
        self.poll_in_flight = false;
        self.cycles += 1;
        jam_logging::set_poll_cycle(self.cycles);

        let polled: Vec<TaskId> = results.iter().map(|(id, _)| id.clone()).collect();
        let mut outcome = PollOutcome::default();
        for (task_id, result) in results {
            if !self.contains(&task_id) {
                jam_debug!(
                    "cycle={} ignoring status for untracked task {}",
                    self.cycles,
                    task_id
                );
                continue;
            }
            let report = match result {
                PollResult::Report(report) => report,
                PollResult::Transport(message) => {
                    jam_warn!(
                        "cycle={} status fetch for task {} failed: {}",
                        self.cycles,
                        task_id,
                        message
                    );
                    outcome.warnings.push(PollWarning { task_id, message });
                    continue;
                }
            };
            let record = match TaskRecord::from_report(task_id.clone(), report) {
                Ok(record) => record,
                Err(err) => {
                    jam_warn!(
                        "cycle={} malformed status for task {}: {}",
                        self.cycles,
                        task_id,
                        err
                    );
                    outcome.malformed.push((task_id, err));
                    continue;
                }
            };

            let previous = self.records.get(&task_id).map(|r| r.state.clone());
            let changed = match &previous {
                Some(prev) => *prev != record.state,
                None => record.state != TaskState::Pending,
            };
            if changed {
                jam_info!(
                    "cycle={} task {} {} -> {}",
                    self.cycles,
                    task_id,
                    previous
                        .as_ref()
                        .map_or_else(|| "UNSEEN".to_string(), ToString::to_string),
                    record.state
                );
                outcome.signals.push(StaleSignal {
                    task_id: task_id.clone(),
                    from: previous,
                    to: record.state.clone(),
                });
            }
            self.records.insert(task_id, record);
        }

        if std::mem::take(&mut self.tick_dropped) {
            outcome.poll_again = self
                .order
                .iter()
                .any(|id| !polled.contains(id) && !self.records.contains_key(id));
        }
        outcome
    }

    /// Buckets every tracked task for display. Never cached.
    pub fn groups(&self) -> TaskGroups {
        let mut groups = TaskGroups::default();
        for id in &self.order {
            let record = self.records.get(id);
            let row = TaskRow {
                task_id: id.clone(),
                short_id: id.short(),
                state: record.map_or_else(|| "UNSEEN".to_string(), |r| r.state.to_string()),
                progress: record.and_then(TaskRecord::progress_percent),
                detail: record.and_then(|r| r.error_detail.clone().or(r.status_text.clone())),
            };
            match record.map(|r| &r.state) {
                None | Some(TaskState::Pending) | Some(TaskState::Progress) => {
                    groups.in_progress.push(row)
                }
                Some(TaskState::Failure) => groups.failed.push(row),
                Some(TaskState::Success) | Some(TaskState::Unknown(_)) => {
                    groups.completed.push(row)
                }
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskGroups {
    pub in_progress: Vec<TaskRow>,
    pub completed: Vec<TaskRow>,
    pub failed: Vec<TaskRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task_id: TaskId,
    pub short_id: String,
    pub state: String,
    pub progress: Option<String>,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{MalformedStatus, Progress, StatusReport, TaskRecord, TaskState};
    use crate::TaskId;

    fn report(state: &str, current: Option<u64>, total: Option<u64>) -> StatusReport {
        StatusReport {
            state: state.to_string(),
            current,
            total,
            status: None,
        }
    }

    #[test]
    fn unknown_tokens_do_not_fail_parsing() {
        assert_eq!(
            TaskState::parse("REVOKED"),
            TaskState::Unknown("REVOKED".to_string())
        );
        assert!(TaskState::parse("REVOKED").is_terminal());
        assert!(!TaskState::parse("PROGRESS").is_terminal());
    }

    #[test]
    fn progress_without_total_is_malformed() {
        let err = TaskRecord::from_report(TaskId::new("t"), report("PROGRESS", Some(3), None))
            .unwrap_err();
        assert_eq!(
            err,
            MalformedStatus::MissingProgress {
                state: "PROGRESS".to_string()
            }
        );
    }

    #[test]
    fn progress_past_total_is_malformed() {
        let err = TaskRecord::from_report(TaskId::new("t"), report("PROGRESS", Some(9), Some(3)))
            .unwrap_err();
        assert_eq!(
            err,
            MalformedStatus::ProgressOverflow {
                current: 9,
                total: 3
            }
        );
    }

    #[test]
    fn zero_total_has_no_ratio() {
        assert_eq!(Progress { current: 0, total: 0 }.ratio(), None);
        let record =
            TaskRecord::from_report(TaskId::new("t"), report("PROGRESS", Some(0), Some(0)))
                .unwrap();
        assert_eq!(record.completion_ratio(), None);
        assert_eq!(record.progress_percent(), None);
    }

    #[test]
    fn failure_status_becomes_error_detail() {
        let record = TaskRecord::from_report(
            TaskId::new("t"),
            StatusReport {
                state: "FAILURE".to_string(),
                current: Some(1),
                total: Some(1),
                status: Some("IntegrityError".to_string()),
            },
        )
        .unwrap();
        assert_eq!(record.error_detail.as_deref(), Some("IntegrityError"));
        assert_eq!(record.status_text, None);
    }
}
