//! Message log domain service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use relay_core::error::{RelayError, Result};
use relay_core::model::{DeliveryStatus, Message, StatusEvent, StatusUpdate};
use relay_core::utils::{current_millis, new_message_id};

use crate::domain::model::IngestOutcome;
use crate::domain::repository::{MessageRepository, StatusNotifier};

/// Owns the merge semantics of the log: event application, listing, purging.
/// Parameter validation belongs to the application layer.
pub struct MessageLogDomainService {
    repo: Arc<dyn MessageRepository>,
    notifier: Option<Arc<dyn StatusNotifier>>,
}

impl MessageLogDomainService {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        notifier: Option<Arc<dyn StatusNotifier>>,
    ) -> Self {
        Self { repo, notifier }
    }

    /// Apply one delivery-status event. Discards are outcomes, not errors;
    /// only persistence problems fail the call.
    #[instrument(skip(self, event), fields(correlation_id = %event.correlation_id, status = %event.status))]
    pub async fn apply_status_event(&self, event: &StatusEvent) -> Result<IngestOutcome> {
        if event.correlation_id.trim().is_empty() {
            return Err(RelayError::Decode(
                "event is missing a correlation id".to_string(),
            ));
        }

        let outcome = self.repo.apply_event(event).await?;
        match &outcome {
            IngestOutcome::Inserted(message) => {
                debug!(message_id = %message.id, "inserted record from event")
            }
            IngestOutcome::Applied(message) => {
                debug!(message_id = %message.id, "advanced record status")
            }
            IngestOutcome::DiscardedTerminal => {
                debug!("discarded update for terminal record")
            }
            IngestOutcome::DiscardedSuperseded => debug!("discarded superseded event"),
        }

        if let Some(merged) = outcome.merged() {
            self.notify(merged).await;
        }
        Ok(outcome)
    }

    async fn notify(&self, merged: &Message) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let update = StatusUpdate {
            correlation_id: merged.correlation_key().to_string(),
            recipient: merged.recipient.clone(),
            status: merged.status,
        };
        if let Err(err) = notifier.publish(update).await {
            warn!(error = %err, "failed to publish status update");
        }
    }

    /// Create a record directly, bypassing the event stream. Used for
    /// messages born server-side without a prior send.
    #[instrument(skip(self, text))]
    pub async fn record_message(&self, recipient: &str, text: &str) -> Result<Message> {
        let message = Message {
            id: new_message_id(),
            correlation_id: None,
            recipient: recipient.to_string(),
            text: text.to_string(),
            status: DeliveryStatus::Received,
            created_at: Utc::now(),
            last_event_ts: current_millis(),
        };
        self.repo.insert_message(message).await
    }

    pub async fn list_messages(&self, recipient: &str) -> Result<Vec<Message>> {
        self.repo.find_by_recipient(recipient).await
    }

    pub async fn list_recipients(&self) -> Result<Vec<String>> {
        self.repo.list_recipients().await
    }

    #[instrument(skip(self))]
    pub async fn purge_recipient(&self, recipient: &str) -> Result<u64> {
        let deleted = self.repo.delete_by_recipient(recipient).await?;
        info!(recipient, deleted, "purged recipient messages");
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn purge_all(&self) -> Result<u64> {
        let deleted = self.repo.delete_all().await?;
        info!(deleted, "purged message log");
        Ok(deleted)
    }
}
