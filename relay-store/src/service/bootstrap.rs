//! Application bootstrap: wiring plus the ingestion daemon lifecycle.

use anyhow::Result;
use tracing::info;

use relay_core::config::RelayAppConfig;

use crate::infrastructure::messaging::EventSource;
use crate::interface::messaging::DeliveryEventConsumer;
use crate::metrics::REGISTRY;
use crate::service::wire;

pub struct ApplicationBootstrap;

impl ApplicationBootstrap {
    /// Run the store daemon until the stream ends or a shutdown signal
    /// arrives.
    pub async fn run(app_config: &RelayAppConfig) -> Result<()> {
        let context = wire::initialize(app_config);
        context.metrics.register(&REGISTRY)?;

        #[cfg(feature = "kafka")]
        if let Some(kafka) = context.config.kafka.clone() {
            let source = crate::infrastructure::messaging::KafkaEventSource::new(&kafka)?;
            let consumer = DeliveryEventConsumer::new(
                source,
                context.command_handler.clone(),
                context.metrics.clone(),
                context.config.redelivery_backoff_ms,
            );
            info!(topic = %kafka.topic, "store consuming from kafka");
            return Self::run_consumer(consumer).await;
        }

        let (publisher, consumer) = wire::in_process_consumer(&context);
        info!("store running with in-process event bus");
        // the publisher handle keeps the stream open for the daemon's
        // lifetime
        let _publisher = publisher;
        Self::run_consumer(consumer).await
    }

    async fn run_consumer<S: EventSource>(consumer: DeliveryEventConsumer<S>) -> Result<()> {
        tokio::select! {
            result = consumer.run() => {
                result?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
            }
        }
        info!("relay store stopped");
        Ok(())
    }
}
