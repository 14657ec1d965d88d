use async_trait::async_trait;

use relay_core::Result;
use relay_core::model::{Message, Profile, StatusEvent, StatusUpdate};

use crate::domain::model::IngestOutcome;

/// Per-recipient message log.
///
/// `apply_event` is the atomic idempotent merge-upsert by correlation key:
/// implementations must run the merge policy under their per-key
/// serialization point so that concurrent events for the same key can
/// neither create two records nor silently drop a later transition.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn apply_event(&self, event: &StatusEvent) -> Result<IngestOutcome>;

    /// Direct record creation for messages born without a prior send
    /// (inbound messages, seeding).
    async fn insert_message(&self, message: Message) -> Result<Message>;

    /// Ascending by creation time; empty when the recipient is unknown.
    async fn find_by_recipient(&self, recipient: &str) -> Result<Vec<Message>>;

    /// Returns the number of removed messages; 0 is a valid result.
    async fn delete_by_recipient(&self, recipient: &str) -> Result<u64>;

    async fn delete_all(&self) -> Result<u64>;

    async fn list_recipients(&self) -> Result<Vec<String>>;
}

/// Profile storage, keyed by phone number.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, phone_number: &str) -> Result<Profile>;

    /// Fails with a conflict when a profile for the phone number exists.
    async fn create(&self, profile: Profile) -> Result<Profile>;

    /// Fails with not-found when no profile exists; preserves the creation
    /// time.
    async fn update(&self, phone_number: &str, name: String, avatar: String) -> Result<Profile>;
}

/// Publishes a status update after a successful merge. Feeds the push
/// channel; publish failures are logged by the caller, never surfaced as
/// ingest failures.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn publish(&self, update: StatusUpdate) -> Result<()>;
}
