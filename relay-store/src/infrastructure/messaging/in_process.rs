//! In-process event bus with explicit acknowledge/redeliver semantics.
//!
//! Stands in for the external stream in tests and single-process
//! deployments while keeping the at-least-once contract: a record that is
//! never acknowledged comes back on the next receive.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use relay_core::error::{RelayError, Result};
use relay_core::model::StatusEvent;

use super::EventSource;

pub struct InProcessEventBus;

impl InProcessEventBus {
    pub fn channel() -> (EventPublisher, InProcessEventSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            EventPublisher { tx },
            InProcessEventSource {
                rx: Mutex::new(rx),
                redelivery: Mutex::new(VecDeque::new()),
            },
        )
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl EventPublisher {
    pub fn publish(&self, event: &StatusEvent) -> Result<()> {
        let payload =
            serde_json::to_vec(event).map_err(|err| RelayError::Decode(err.to_string()))?;
        self.publish_raw(payload)
    }

    pub fn publish_raw(&self, payload: Vec<u8>) -> Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| RelayError::StorageUnavailable("event stream closed".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct InProcessRecord {
    payload: Vec<u8>,
    pub attempt: u32,
}

pub struct InProcessEventSource {
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    redelivery: Mutex<VecDeque<InProcessRecord>>,
}

#[async_trait]
impl EventSource for InProcessEventSource {
    type Record = InProcessRecord;

    async fn recv(&self) -> Result<InProcessRecord> {
        if let Some(record) = self.redelivery.lock().await.pop_front() {
            return Ok(record);
        }
        let payload = self
            .rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| RelayError::StorageUnavailable("event stream closed".to_string()))?;
        Ok(InProcessRecord {
            payload,
            attempt: 0,
        })
    }

    fn payload<'a>(&self, record: &'a InProcessRecord) -> &'a [u8] {
        &record.payload
    }

    async fn ack(&self, _record: &InProcessRecord) -> Result<()> {
        Ok(())
    }

    async fn nack(&self, record: &InProcessRecord) -> Result<()> {
        self.redelivery.lock().await.push_back(InProcessRecord {
            payload: record.payload.clone(),
            attempt: record.attempt + 1,
        });
        Ok(())
    }
}
