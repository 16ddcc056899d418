//! Incremental poller.
//!
//! One background task per open conversation. Every interval it asks the
//! backend for messages after the buffer's last id and appends whatever
//! comes back. Failed ticks are skipped; the next tick tries again.
//!
//! The task is owned by a [`Poller`] handle. Stopping (or dropping) the
//! handle cancels the timer and abandons any fetch still in flight, so no
//! request is issued and no result is applied afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use pawchat_shared::constants::MIN_POLL_INTERVAL_MS;
use pawchat_shared::PeerId;

use crate::api::ChatApi;
use crate::buffer::SharedBuffer;
use crate::events::AppendSource;

/// Lifecycle of a conversation's polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No peer resolved yet.
    Idle,
    /// Timer running.
    Polling,
    /// View torn down.
    Stopped,
}

/// Handle to a running poll task.
pub struct Poller {
    peer: PeerId,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `peer` into `buffer`. The first tick fires one full
    /// interval after this call. Intervals below the minimum are raised to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        api: Arc<dyn ChatApi>,
        peer: PeerId,
        buffer: Arc<SharedBuffer>,
        interval: Duration,
    ) -> Self {
        let interval = interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS));
        // Closing the view cancels the parent token and stops us too.
        let cancel = buffer.liveness().child_token();
        let task = tokio::spawn(poll_loop(api, peer, buffer, interval, cancel.clone()));

        info!(peer = %peer, interval_ms = interval.as_millis() as u64, "Poller started");
        Self {
            peer,
            cancel,
            task: Some(task),
        }
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(peer = %self.peer, "Poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    api: Arc<dyn ChatApi>,
    peer: PeerId,
    buffer: Arc<SharedBuffer>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        poll_once(api.as_ref(), peer, &buffer, &cancel).await;
    }
}

/// Run a single tick: fetch after the current cursor and append the result.
///
/// Returns the number of messages added. Errors are logged and swallowed.
pub(crate) async fn poll_once(
    api: &dyn ChatApi,
    peer: PeerId,
    buffer: &SharedBuffer,
    cancel: &CancellationToken,
) -> usize {
    let cursor = buffer.cursor();
    trace!(peer = %peer, cursor = %cursor, "Poll tick");

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return 0,
        result = api.fetch_after(peer, cursor) => result,
    };

    match result {
        Ok(messages) if messages.is_empty() => 0,
        Ok(messages) => {
            if cancel.is_cancelled() {
                return 0;
            }
            let received = messages.len();
            let added = buffer.append(messages, AppendSource::Poll);
            debug!(peer = %peer, cursor = %cursor, received, added, "Poll appended messages");
            added
        }
        Err(e) => {
            debug!(peer = %peer, cursor = %cursor, error = %e, "Poll tick failed, skipping");
            0
        }
    }
}
