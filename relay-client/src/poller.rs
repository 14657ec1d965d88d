//! Bounded delivery polling.
//!
//! After a send, a schedule of re-fetch attempts shortens the time until the
//! optimistic entry is replaced by its authoritative counterpart when the
//! push channel is slow, absent or unreliable. One handle per recipient: a
//! new send to the same recipient replaces the running schedule.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::fetcher::MessageFetcher;
use crate::session::SessionRegistry;

/// Owns one recipient's running schedule: the cancellation token is the
/// single source of truth for "this schedule is still live".
struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn cancel(&self) {
        self.token.cancel();
        self.task.abort();
    }
}

pub struct DeliveryPoller {
    fetcher: Arc<dyn MessageFetcher>,
    sessions: Arc<SessionRegistry>,
    handles: DashMap<String, PollHandle>,
    delays: Vec<Duration>,
}

impl DeliveryPoller {
    pub fn new(
        fetcher: Arc<dyn MessageFetcher>,
        sessions: Arc<SessionRegistry>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            fetcher,
            sessions,
            handles: DashMap::new(),
            delays: config.poll_delays.clone(),
        }
    }

    /// Start the schedule for a fresh send. A schedule still pending for the
    /// recipient is cancelled in the same swap, so at most one is ever live.
    pub fn start(&self, recipient: &str, correlation_id: &str) {
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_task(
            self.fetcher.clone(),
            self.sessions.clone(),
            recipient.to_string(),
            correlation_id.to_string(),
            self.delays.clone(),
            token.clone(),
        ));

        let handle = PollHandle { token, task };
        match self.handles.entry(recipient.to_string()) {
            Entry::Occupied(mut occupied) => {
                let old = occupied.insert(handle);
                old.cancel();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(handle);
            }
        }
    }

    /// Cancel the recipient's schedule, if any.
    pub fn cancel(&self, recipient: &str) {
        if let Some((_, handle)) = self.handles.remove(recipient) {
            handle.cancel();
        }
    }
}

async fn poll_task(
    fetcher: Arc<dyn MessageFetcher>,
    sessions: Arc<SessionRegistry>,
    recipient: String,
    correlation_id: String,
    delays: Vec<Duration>,
    token: CancellationToken,
) {
    let started = Instant::now();

    for delay in &delays {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep_until(started + *delay) => {}
        }

        let fetched = match fetcher.fetch_messages(&recipient).await {
            Ok(messages) => messages,
            Err(err) => {
                // a failed attempt is retried by the schedule, never shown
                debug!(error = %err, recipient = %recipient, "poll attempt failed");
                continue;
            }
        };
        if token.is_cancelled() {
            return;
        }

        let matched = fetched
            .iter()
            .any(|message| message.correlation_key() == correlation_id);
        sessions.on_possible_update(&recipient, fetched).await;
        if matched {
            debug!(
                recipient = %recipient,
                correlation_id = %correlation_id,
                "authoritative entry found"
            );
            return;
        }
    }

    // schedule exhausted without a match: one unconditional refresh
    if token.is_cancelled() {
        return;
    }
    if let Ok(fetched) = fetcher.fetch_messages(&recipient).await {
        if !token.is_cancelled() {
            sessions.on_possible_update(&recipient, fetched).await;
        }
    }
}
