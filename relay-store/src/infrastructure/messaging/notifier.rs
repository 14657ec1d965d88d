//! Status-update fan-out over a broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;

use relay_core::Result;
use relay_core::model::StatusUpdate;

use crate::domain::repository::StatusNotifier;

/// Server-side end of the push channel. Every successful merge is published
/// to all subscribed receivers; a lagging or absent subscriber never blocks
/// ingestion.
pub struct BroadcastStatusNotifier {
    tx: broadcast::Sender<StatusUpdate>,
}

impl BroadcastStatusNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.tx.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<StatusUpdate> {
        self.tx.clone()
    }
}

#[async_trait]
impl StatusNotifier for BroadcastStatusNotifier {
    async fn publish(&self, update: StatusUpdate) -> Result<()> {
        // send only fails when no receiver is subscribed, which is a valid
        // degraded deployment
        let _ = self.tx.send(update);
        Ok(())
    }
}
