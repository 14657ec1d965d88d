//! Push-channel subscription.
//!
//! When the channel works, status changes arrive without polling; when it is
//! absent or broken, the client degrades silently to polling-only. One
//! subscription per recipient, swapped like the poll handles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use relay_core::Result;
use relay_core::model::StatusUpdate;

use crate::fetcher::MessageFetcher;
use crate::session::SessionRegistry;

/// Receives the updates of one subscribed recipient.
#[async_trait]
pub trait PushEventSink: Send + Sync {
    async fn on_status_update(&self, update: StatusUpdate);
}

/// Subscription guard. Dropping it or calling `unsubscribe` stops delivery;
/// no callback runs after cancellation.
pub struct PushSubscription {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PushSubscription {
    pub fn unsubscribe(&self) {
        self.token.cancel();
        self.task.abort();
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub trait StatusPushChannel: Send + Sync {
    /// Install the listener for one recipient.
    fn subscribe(&self, recipient: &str, sink: Arc<dyn PushEventSink>) -> Result<PushSubscription>;
}

/// Push channel fed by the server-side status notifier.
pub struct BroadcastPushChannel {
    tx: broadcast::Sender<StatusUpdate>,
}

impl BroadcastPushChannel {
    pub fn new(tx: broadcast::Sender<StatusUpdate>) -> Self {
        Self { tx }
    }
}

impl StatusPushChannel for BroadcastPushChannel {
    fn subscribe(&self, recipient: &str, sink: Arc<dyn PushEventSink>) -> Result<PushSubscription> {
        let mut rx = self.tx.subscribe();
        let recipient = recipient.to_string();
        let token = CancellationToken::new();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    received = rx.recv() => match received {
                        Ok(update) => {
                            if update.recipient != recipient {
                                continue;
                            }
                            if task_token.is_cancelled() {
                                return;
                            }
                            sink.on_status_update(update).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "push channel lagged, updates dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
            }
        });

        Ok(PushSubscription { token, task })
    }
}

/// Degraded deployment: never delivers. DeliveryPoller is designed to be
/// sufficient on its own.
pub struct NoopPushChannel;

impl StatusPushChannel for NoopPushChannel {
    fn subscribe(
        &self,
        _recipient: &str,
        _sink: Arc<dyn PushEventSink>,
    ) -> Result<PushSubscription> {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            task_token.cancelled().await;
        });
        Ok(PushSubscription { token, task })
    }
}

/// The client-side handling of a pushed update: apply the matching and
/// monotonic-status rule; when no local entry matches, schedule exactly one
/// reconciliation fetch instead of discarding the event, covering the race
/// between send and subscription setup.
pub struct PushReconcileSink {
    sessions: Arc<SessionRegistry>,
    fetcher: Arc<dyn MessageFetcher>,
    catchup_delay: Duration,
}

impl PushReconcileSink {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        fetcher: Arc<dyn MessageFetcher>,
        catchup_delay: Duration,
    ) -> Self {
        Self {
            sessions,
            fetcher,
            catchup_delay,
        }
    }
}

#[async_trait]
impl PushEventSink for PushReconcileSink {
    async fn on_status_update(&self, update: StatusUpdate) {
        if self.sessions.apply_push_event(&update).await {
            return;
        }

        debug!(
            correlation_id = %update.correlation_id,
            recipient = %update.recipient,
            "push update matched no local entry, scheduling catch-up fetch"
        );
        let sessions = self.sessions.clone();
        let fetcher = self.fetcher.clone();
        let delay = self.catchup_delay;
        let recipient = update.recipient.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(messages) = fetcher.fetch_messages(&recipient).await {
                sessions.on_possible_update(&recipient, messages).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use relay_core::model::{DeliveryStatus, Message, SendReceipt};
    use relay_core::utils::current_millis;

    use crate::config::ClientConfig;

    struct CountingFetcher {
        calls: AtomicUsize,
        messages: Vec<Message>,
    }

    impl CountingFetcher {
        fn new(messages: Vec<Message>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                messages,
            }
        }
    }

    #[async_trait]
    impl MessageFetcher for CountingFetcher {
        async fn fetch_messages(&self, _recipient: &str) -> relay_core::Result<Vec<Message>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.messages.clone())
        }
    }

    fn sink_parts(messages: Vec<Message>) -> (Arc<SessionRegistry>, Arc<CountingFetcher>, PushReconcileSink) {
        let sessions = Arc::new(SessionRegistry::new(ClientConfig::default()));
        let fetcher = Arc::new(CountingFetcher::new(messages));
        let sink = PushReconcileSink::new(
            sessions.clone(),
            fetcher.clone(),
            Duration::from_millis(300),
        );
        (sessions, fetcher, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn subscribed_recipient_receives_its_updates_only() {
        let (tx, _guard_rx) = broadcast::channel(16);
        let channel = BroadcastPushChannel::new(tx.clone());
        let (sessions, _fetcher, sink) = sink_parts(Vec::new());

        sessions
            .record_send(
                "+15551234567",
                "hi",
                &SendReceipt {
                    correlation_id: "r1".to_string(),
                    status: DeliveryStatus::Received,
                    timestamp: current_millis(),
                },
            )
            .await;

        let subscription = channel
            .subscribe("+15551234567", Arc::new(sink))
            .unwrap();

        // an update for another recipient is ignored
        tx.send(StatusUpdate {
            correlation_id: "zz".to_string(),
            recipient: "+19990000000".to_string(),
            status: DeliveryStatus::Success,
        })
        .unwrap();
        tx.send(StatusUpdate {
            correlation_id: "r1".to_string(),
            recipient: "+15551234567".to_string(),
            status: DeliveryStatus::Success,
        })
        .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;

        let view = sessions.visible("+15551234567").await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].status, DeliveryStatus::Success);

        subscription.unsubscribe();
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_update_triggers_one_catchup_fetch() {
        let persisted = Message {
            id: "msg-9".to_string(),
            correlation_id: Some("r9".to_string()),
            recipient: "+15551234567".to_string(),
            text: "hello".to_string(),
            status: DeliveryStatus::Success,
            created_at: Utc::now(),
            last_event_ts: current_millis(),
        };
        let (sessions, fetcher, sink) = sink_parts(vec![persisted]);

        sink.on_status_update(StatusUpdate {
            correlation_id: "r9".to_string(),
            recipient: "+15551234567".to_string(),
            status: DeliveryStatus::Success,
        })
        .await;

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        let view = sessions.visible("+15551234567").await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "msg-9");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_subscription_stops_delivering() {
        let (tx, _guard_rx) = broadcast::channel(16);
        let channel = BroadcastPushChannel::new(tx.clone());
        let (sessions, _fetcher, sink) = sink_parts(Vec::new());

        sessions
            .record_send(
                "+15551234567",
                "hi",
                &SendReceipt {
                    correlation_id: "r1".to_string(),
                    status: DeliveryStatus::Received,
                    timestamp: current_millis(),
                },
            )
            .await;

        let subscription = channel
            .subscribe("+15551234567", Arc::new(sink))
            .unwrap();
        subscription.unsubscribe();

        tx.send(StatusUpdate {
            correlation_id: "r1".to_string(),
            recipient: "+15551234567".to_string(),
            status: DeliveryStatus::Success,
        })
        .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;

        let view = sessions.visible("+15551234567").await;
        assert_eq!(view[0].status, DeliveryStatus::Pending);
    }
}
