//! Event stream port and adapters.

use async_trait::async_trait;

use relay_core::Result;

mod in_process;
#[cfg(feature = "kafka")]
mod kafka;
mod notifier;

pub use in_process::{EventPublisher, InProcessEventBus, InProcessEventSource, InProcessRecord};
#[cfg(feature = "kafka")]
pub use kafka::KafkaEventSource;
pub use notifier::BroadcastStatusNotifier;

/// At-least-once delivery-status stream.
///
/// `ack` commits a record after successful persistence; `nack` returns it to
/// the stream for redelivery. Transient consumption errors are retried
/// inside the source; an error from `recv` means the stream ended.
#[async_trait]
pub trait EventSource: Send + Sync {
    type Record: Send + Sync;

    async fn recv(&self) -> Result<Self::Record>;

    fn payload<'a>(&self, record: &'a Self::Record) -> &'a [u8];

    async fn ack(&self, record: &Self::Record) -> Result<()>;

    async fn nack(&self, record: &Self::Record) -> Result<()>;
}
