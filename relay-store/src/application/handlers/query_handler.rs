//! Query handler (read side): parameter validation and delegation only.

use std::sync::Arc;

use relay_core::Result;
use relay_core::model::{Message, Profile};
use relay_core::utils::validate_recipient;

use crate::application::queries::{GetProfileQuery, ListConversationsQuery, ListMessagesQuery};
use crate::domain::service::{MessageLogDomainService, ProfileDomainService};

pub struct StoreQueryHandler {
    log_service: Arc<MessageLogDomainService>,
    profile_service: Arc<ProfileDomainService>,
}

impl StoreQueryHandler {
    pub fn new(
        log_service: Arc<MessageLogDomainService>,
        profile_service: Arc<ProfileDomainService>,
    ) -> Self {
        Self {
            log_service,
            profile_service,
        }
    }

    /// An unknown recipient yields an empty list, not an error.
    pub async fn handle_list_messages(&self, query: ListMessagesQuery) -> Result<Vec<Message>> {
        validate_recipient(&query.recipient)?;
        self.log_service.list_messages(query.recipient.trim()).await
    }

    pub async fn handle_list_conversations(
        &self,
        _query: ListConversationsQuery,
    ) -> Result<Vec<String>> {
        self.log_service.list_recipients().await
    }

    /// Single-entity lookup: a missing profile is an explicit not-found.
    pub async fn handle_get_profile(&self, query: GetProfileQuery) -> Result<Profile> {
        validate_recipient(&query.phone_number)?;
        self.profile_service.get(query.phone_number.trim()).await
    }
}
