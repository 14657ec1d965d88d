//! Client facade.
//!
//! Ties the sender, the poller, the push channel and the session registry
//! into the surface a UI talks to.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use relay_core::model::Message;

use crate::config::ClientConfig;
use crate::fetcher::MessageFetcher;
use crate::poller::DeliveryPoller;
use crate::push::{PushReconcileSink, PushSubscription, StatusPushChannel};
use crate::sender::{SendError, SmsSender};
use crate::session::SessionRegistry;

pub struct MessagingClient {
    sender: Arc<dyn SmsSender>,
    fetcher: Arc<dyn MessageFetcher>,
    push: Option<Arc<dyn StatusPushChannel>>,
    sessions: Arc<SessionRegistry>,
    poller: DeliveryPoller,
    subscriptions: DashMap<String, PushSubscription>,
    config: ClientConfig,
}

impl MessagingClient {
    pub fn new(
        sender: Arc<dyn SmsSender>,
        fetcher: Arc<dyn MessageFetcher>,
        push: Option<Arc<dyn StatusPushChannel>>,
        config: ClientConfig,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.clone()));
        let poller = DeliveryPoller::new(fetcher.clone(), sessions.clone(), &config);
        Self {
            sender,
            fetcher,
            push,
            sessions,
            poller,
            subscriptions: DashMap::new(),
            config,
        }
    }

    /// Send a message. The optimistic `PENDING` entry is visible
    /// immediately; the poll schedule replaces it with the authoritative
    /// record. A failure preserves the input for retry.
    pub async fn send(&self, recipient: &str, text: &str) -> Result<Message, Box<SendError>> {
        let receipt = match self.sender.send(recipient, text).await {
            Ok(receipt) => receipt,
            Err(source) => {
                return Err(Box::new(SendError {
                    recipient: recipient.to_string(),
                    text: text.to_string(),
                    source,
                }));
            }
        };

        let message = self.sessions.record_send(recipient, text, &receipt).await;
        self.poller.start(recipient, &receipt.correlation_id);
        Ok(message)
    }

    /// Select a conversation: install the push subscription (degrading
    /// silently to polling-only on failure) and refresh once.
    pub async fn open_conversation(&self, recipient: &str) {
        if let Some(push) = &self.push {
            let sink = Arc::new(PushReconcileSink::new(
                self.sessions.clone(),
                self.fetcher.clone(),
                self.config.push_catchup_delay,
            ));
            match push.subscribe(recipient, sink) {
                Ok(subscription) => match self.subscriptions.entry(recipient.to_string()) {
                    Entry::Occupied(mut occupied) => {
                        let old = occupied.insert(subscription);
                        old.unsubscribe();
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(subscription);
                    }
                },
                Err(err) => {
                    debug!(error = %err, recipient, "push subscription failed, polling only");
                }
            }
        }
        self.refresh(recipient).await;
    }

    /// Drop the conversation's subscription and any pending poll attempts.
    pub async fn close_conversation(&self, recipient: &str) {
        if let Some((_, subscription)) = self.subscriptions.remove(recipient) {
            subscription.unsubscribe();
        }
        self.poller.cancel(recipient);
    }

    /// One reconciliation fetch. A failure keeps the current view standing.
    pub async fn refresh(&self, recipient: &str) {
        match self.fetcher.fetch_messages(recipient).await {
            Ok(messages) => self.sessions.on_possible_update(recipient, messages).await,
            Err(err) => debug!(error = %err, recipient, "refresh failed"),
        }
    }

    /// The single visible, ordered message list for the recipient.
    pub async fn visible_messages(&self, recipient: &str) -> Vec<Message> {
        self.sessions.visible(recipient).await
    }
}
