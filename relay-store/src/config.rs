use relay_core::config::{KafkaClusterConfig, RelayAppConfig};

/// Store server configuration, derived from the application config.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backoff before an unacknowledged event is redelivered, in millis.
    pub redelivery_backoff_ms: u64,
    /// Present when the ingestor consumes from Kafka instead of the
    /// in-process bus.
    pub kafka: Option<KafkaClusterConfig>,
}

impl StoreConfig {
    pub fn from_app_config(app: &RelayAppConfig) -> Self {
        Self {
            redelivery_backoff_ms: app.store.redelivery_backoff_ms,
            kafka: app.kafka.clone(),
        }
    }
}
