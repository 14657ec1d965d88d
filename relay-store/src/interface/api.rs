//! Typed read/admin surface over the store.
//!
//! HTTP framing belongs to the embedding server; this facade performs the
//! operation-to-handler mapping and produces the wire DTOs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use relay_core::Result;
use relay_core::model::{Message, Profile};

use crate::application::commands::{
    CreateProfileCommand, PurgeAllCommand, PurgeRecipientCommand, RecordMessageCommand,
    UpdateProfileCommand,
};
use crate::application::handlers::{StoreCommandHandler, StoreQueryHandler};
use crate::application::queries::{GetProfileQuery, ListConversationsQuery, ListMessagesQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

pub struct StatusReadApi {
    command_handler: Arc<StoreCommandHandler>,
    query_handler: Arc<StoreQueryHandler>,
}

impl StatusReadApi {
    pub fn new(
        command_handler: Arc<StoreCommandHandler>,
        query_handler: Arc<StoreQueryHandler>,
    ) -> Self {
        Self {
            command_handler,
            query_handler,
        }
    }

    /// `GET /recipients/{id}/messages`
    pub async fn list_messages(&self, recipient: &str) -> Result<Vec<Message>> {
        self.query_handler
            .handle_list_messages(ListMessagesQuery {
                recipient: recipient.to_string(),
            })
            .await
    }

    /// `GET /recipients`
    pub async fn list_conversations(&self) -> Result<Vec<String>> {
        self.query_handler
            .handle_list_conversations(ListConversationsQuery)
            .await
    }

    /// `DELETE /recipients/{id}/messages`
    pub async fn purge_recipient(&self, recipient: &str) -> Result<DeleteSummary> {
        let deleted_count = self
            .command_handler
            .handle_purge_recipient(PurgeRecipientCommand {
                recipient: recipient.to_string(),
            })
            .await?;
        Ok(DeleteSummary { deleted_count })
    }

    /// `DELETE /messages` (administrative)
    pub async fn purge_all(&self) -> Result<DeleteSummary> {
        let deleted_count = self
            .command_handler
            .handle_purge_all(PurgeAllCommand)
            .await?;
        Ok(DeleteSummary { deleted_count })
    }

    /// `POST /messages` (testing/inbound path)
    pub async fn record_message(&self, recipient: &str, text: &str) -> Result<Message> {
        self.command_handler
            .handle_record_message(RecordMessageCommand {
                recipient: recipient.to_string(),
                text: text.to_string(),
            })
            .await
    }

    /// `GET /profiles/{phoneNumber}`
    pub async fn get_profile(&self, phone_number: &str) -> Result<Profile> {
        self.query_handler
            .handle_get_profile(GetProfileQuery {
                phone_number: phone_number.to_string(),
            })
            .await
    }

    /// `POST /profiles`
    pub async fn create_profile(
        &self,
        phone_number: &str,
        name: &str,
        avatar: &str,
    ) -> Result<Profile> {
        self.command_handler
            .handle_create_profile(CreateProfileCommand {
                phone_number: phone_number.to_string(),
                name: name.to_string(),
                avatar: avatar.to_string(),
            })
            .await
    }

    /// `PUT /profiles/{phoneNumber}`
    pub async fn update_profile(
        &self,
        phone_number: &str,
        name: &str,
        avatar: &str,
    ) -> Result<Profile> {
        self.command_handler
            .handle_update_profile(UpdateProfileCommand {
                phone_number: phone_number.to_string(),
                name: name.to_string(),
                avatar: avatar.to_string(),
            })
            .await
    }
}
