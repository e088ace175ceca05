use std::sync::Arc;
use std::time::Duration;

use jam_logging::jam_debug;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink};

/// Keeps a zero or tiny configured interval from spinning.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle on the repeating poll timer.
///
/// The timer emits [`EngineEvent::PollDue`] immediately and then once per
/// interval until the lease is released or dropped. Late ticks are skipped,
/// not bunched up.
#[derive(Debug)]
pub struct PollLease {
    token: CancellationToken,
}

impl PollLease {
    /// Must be called from within a tokio runtime.
    pub fn acquire(interval: Duration, sink: Arc<dyn EventSink>) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => sink.emit(EngineEvent::PollDue),
                }
            }
            jam_debug!("Poll timer stopped");
        });
        jam_debug!("Poll timer started, interval {:?}", interval);
        Self { token }
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PollLease {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
