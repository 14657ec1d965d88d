//! Command handler (orchestration layer): parameter validation, delegation
//! to the domain services, application-level metrics.

use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use relay_core::error::{RelayError, Result};
use relay_core::model::{Message, Profile};
use relay_core::utils::validate_recipient;

use crate::application::commands::{
    CreateProfileCommand, IngestStatusEventCommand, PurgeAllCommand, PurgeRecipientCommand,
    RecordMessageCommand, UpdateProfileCommand,
};
use crate::domain::model::IngestOutcome;
use crate::domain::service::{MessageLogDomainService, ProfileDomainService};
use crate::metrics::StoreMetrics;

pub struct StoreCommandHandler {
    log_service: Arc<MessageLogDomainService>,
    profile_service: Arc<ProfileDomainService>,
    metrics: Arc<StoreMetrics>,
}

impl StoreCommandHandler {
    pub fn new(
        log_service: Arc<MessageLogDomainService>,
        profile_service: Arc<ProfileDomainService>,
        metrics: Arc<StoreMetrics>,
    ) -> Self {
        Self {
            log_service,
            profile_service,
            metrics,
        }
    }

    #[instrument(skip(self, command), fields(correlation_id = %command.event.correlation_id))]
    pub async fn handle_ingest(&self, command: IngestStatusEventCommand) -> Result<IngestOutcome> {
        let start = Instant::now();
        let outcome = self.log_service.apply_status_event(&command.event).await?;

        self.metrics
            .ingest_duration_seconds
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .events_ingested_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        Ok(outcome)
    }

    pub async fn handle_record_message(&self, command: RecordMessageCommand) -> Result<Message> {
        validate_recipient(&command.recipient)?;
        let text = command.text.trim();
        if text.is_empty() {
            return Err(RelayError::Validation("text is required".to_string()));
        }
        self.log_service
            .record_message(command.recipient.trim(), text)
            .await
    }

    pub async fn handle_purge_recipient(&self, command: PurgeRecipientCommand) -> Result<u64> {
        validate_recipient(&command.recipient)?;
        self.log_service
            .purge_recipient(command.recipient.trim())
            .await
    }

    pub async fn handle_purge_all(&self, _command: PurgeAllCommand) -> Result<u64> {
        self.log_service.purge_all().await
    }

    pub async fn handle_create_profile(&self, command: CreateProfileCommand) -> Result<Profile> {
        validate_recipient(&command.phone_number)?;
        self.profile_service
            .create(command.phone_number.trim(), &command.name, &command.avatar)
            .await
    }

    pub async fn handle_update_profile(&self, command: UpdateProfileCommand) -> Result<Profile> {
        validate_recipient(&command.phone_number)?;
        self.profile_service
            .update(command.phone_number.trim(), &command.name, &command.avatar)
            .await
    }
}
