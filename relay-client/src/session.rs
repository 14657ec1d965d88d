//! Per-recipient session state.
//!
//! Holds the optimistic and persisted sets for every recipient and exposes
//! the single `on_possible_update` entry point used by both the poll and the
//! push path.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use relay_core::model::{DeliveryStatus, Message, SendReceipt, StatusUpdate};
use relay_core::utils::{millis_to_datetime, new_local_id};

use crate::config::ClientConfig;
use crate::reconciler;

#[derive(Default)]
struct SessionState {
    optimistic: Vec<Message>,
    persisted: Vec<Message>,
}

pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Mutex<SessionState>>>,
    config: ClientConfig,
}

impl SessionRegistry {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    fn session(&self, recipient: &str) -> Arc<Mutex<SessionState>> {
        self.sessions
            .entry(recipient.to_string())
            .or_default()
            .clone()
    }

    /// Fabricate the optimistic entry for a fresh send. It is shown
    /// immediately and replaced once the authoritative record is fetched.
    pub async fn record_send(&self, recipient: &str, text: &str, receipt: &SendReceipt) -> Message {
        let message = Message {
            id: new_local_id(),
            correlation_id: Some(receipt.correlation_id.clone()),
            recipient: recipient.to_string(),
            text: text.to_string(),
            status: DeliveryStatus::Pending,
            created_at: millis_to_datetime(receipt.timestamp).unwrap_or_else(Utc::now),
            last_event_ts: receipt.timestamp,
        };

        let session = self.session(recipient);
        let mut state = session.lock().await;
        state.optimistic.push(message.clone());
        message
    }

    /// Install a fresh authoritative list. Optimistic entries it supersedes
    /// are dropped so they cannot resurface.
    pub async fn on_possible_update(&self, recipient: &str, persisted: Vec<Message>) {
        let session = self.session(recipient);
        let mut state = session.lock().await;
        let keys: HashSet<String> = persisted
            .iter()
            .map(|m| m.correlation_key().to_string())
            .collect();
        state
            .optimistic
            .retain(|m| !keys.contains(m.correlation_key()));
        state.persisted = persisted;
    }

    /// Apply one pushed status change. Returns whether a local entry
    /// matched; an unmatched update is the caller's cue for a catch-up
    /// fetch.
    pub async fn apply_push_event(&self, update: &StatusUpdate) -> bool {
        let session = self.session(&update.recipient);
        let mut state = session.lock().await;
        if reconciler::apply_status(&mut state.persisted, &update.correlation_id, update.status) {
            return true;
        }
        reconciler::apply_status(&mut state.optimistic, &update.correlation_id, update.status)
    }

    /// The single visible, ordered message list for the recipient.
    pub async fn visible(&self, recipient: &str) -> Vec<Message> {
        let session = self.session(recipient);
        let state = session.lock().await;
        reconciler::reconcile(
            &state.persisted,
            &state.optimistic,
            self.config.stale_after,
            Utc::now(),
        )
    }
}
