//! Delivery-status event consumer.
//!
//! Receives from the event source, decodes, hands the event to the command
//! handler, and acknowledges only after the merge persisted. Malformed
//! payloads are acknowledged and skipped; persistence failures leave the
//! record unacknowledged so the stream redelivers it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use relay_core::Result;
use relay_core::model::StatusEvent;

use crate::application::commands::IngestStatusEventCommand;
use crate::application::handlers::StoreCommandHandler;
use crate::infrastructure::messaging::EventSource;
use crate::metrics::StoreMetrics;

pub struct DeliveryEventConsumer<S: EventSource> {
    source: S,
    handler: Arc<StoreCommandHandler>,
    metrics: Arc<StoreMetrics>,
    redelivery_backoff: Duration,
}

impl<S: EventSource> DeliveryEventConsumer<S> {
    pub fn new(
        source: S,
        handler: Arc<StoreCommandHandler>,
        metrics: Arc<StoreMetrics>,
        redelivery_backoff_ms: u64,
    ) -> Self {
        Self {
            source,
            handler,
            metrics,
            redelivery_backoff: Duration::from_millis(redelivery_backoff_ms),
        }
    }

    /// Consume until the stream ends.
    pub async fn run(&self) -> Result<()> {
        info!("delivery event consumer started");
        loop {
            let record = match self.source.recv().await {
                Ok(record) => record,
                Err(err) => {
                    info!(error = %err, "event stream ended");
                    return Ok(());
                }
            };
            self.process(record).await;
        }
    }

    async fn process(&self, record: S::Record) {
        let payload = self.source.payload(&record);
        let event: StatusEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                // retrying cannot fix malformed data
                warn!(error = %err, "discarding malformed event payload");
                self.metrics
                    .events_rejected_total
                    .with_label_values(&["DECODE_ERROR"])
                    .inc();
                self.ack(&record).await;
                return;
            }
        };

        match self
            .handler
            .handle_ingest(IngestStatusEventCommand { event })
            .await
        {
            Ok(_) => self.ack(&record).await,
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "event processing failed, scheduling redelivery");
                self.metrics.events_redelivered_total.inc();
                if let Err(nack_err) = self.source.nack(&record).await {
                    error!(error = %nack_err, "failed to return event for redelivery");
                }
                tokio::time::sleep(self.redelivery_backoff).await;
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "discarding unprocessable event");
                self.metrics
                    .events_rejected_total
                    .with_label_values(&[err.code()])
                    .inc();
                self.ack(&record).await;
            }
        }
    }

    async fn ack(&self, record: &S::Record) {
        if let Err(err) = self.source.ack(record).await {
            warn!(error = %err, "failed to acknowledge event");
        }
    }
}
