//! Kafka event source.
//!
//! Manual offset commit is the acknowledge; a nack seeks the partition back
//! to the record's offset so the event is redelivered.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Message as _, OwnedMessage};
use rdkafka::{Offset, TopicPartitionList};
use tracing::{info, warn};

use relay_core::config::KafkaClusterConfig;
use relay_core::error::{RelayError, Result};

use super::EventSource;

pub struct KafkaEventSource {
    consumer: StreamConsumer,
}

impl KafkaEventSource {
    pub fn new(config: &KafkaClusterConfig) -> Result<Self> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("group.id", &config.consumer_group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest");
        if let Some(client_id) = &config.client_id {
            client_config.set("client.id", client_id);
        }

        let consumer: StreamConsumer = client_config.create().map_err(|err| {
            RelayError::StorageUnavailable(format!("failed to build kafka consumer: {err}"))
        })?;
        consumer.subscribe(&[&config.topic]).map_err(|err| {
            RelayError::StorageUnavailable(format!(
                "failed to subscribe to {}: {err}",
                config.topic
            ))
        })?;

        info!(
            bootstrap = %config.bootstrap_servers,
            group = %config.consumer_group,
            topic = %config.topic,
            "kafka event source ready"
        );
        Ok(Self { consumer })
    }
}

#[async_trait]
impl EventSource for KafkaEventSource {
    type Record = OwnedMessage;

    async fn recv(&self) -> Result<OwnedMessage> {
        let mut consecutive_errors = 0u32;
        loop {
            match self.consumer.recv().await {
                Ok(record) => return Ok(record.detach()),
                Err(err) => {
                    consecutive_errors += 1;
                    warn!(
                        error = %err,
                        consecutive_errors,
                        "error receiving from kafka"
                    );
                    let delay = if consecutive_errors < 10 {
                        Duration::from_millis(100)
                    } else {
                        Duration::from_secs(1)
                    };
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn payload<'a>(&self, record: &'a OwnedMessage) -> &'a [u8] {
        record.payload().unwrap_or_default()
    }

    async fn ack(&self, record: &OwnedMessage) -> Result<()> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                record.topic(),
                record.partition(),
                Offset::Offset(record.offset() + 1),
            )
            .map_err(|err| RelayError::Persist(format!("failed to build offset list: {err}")))?;
        self.consumer
            .commit(&offsets, CommitMode::Async)
            .map_err(|err| RelayError::Persist(format!("failed to commit offset: {err}")))?;
        Ok(())
    }

    async fn nack(&self, record: &OwnedMessage) -> Result<()> {
        self.consumer
            .seek(
                record.topic(),
                record.partition(),
                Offset::Offset(record.offset()),
                Duration::from_secs(5),
            )
            .map_err(|err| RelayError::Persist(format!("failed to seek for redelivery: {err}")))?;
        Ok(())
    }
}
