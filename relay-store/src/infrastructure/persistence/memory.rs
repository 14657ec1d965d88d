//! In-process store implementations.
//!
//! The message map is keyed by correlation key; the entry API runs the merge
//! policy under the key's shard lock, which is the atomic conditional
//! find-and-update the repository contract requires. A database-backed
//! implementation would plug in behind the same traits.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use relay_core::error::{RelayError, Result};
use relay_core::model::{Message, Profile, StatusEvent};

use crate::domain::model::IngestOutcome;
use crate::domain::repository::{MessageRepository, ProfileRepository};
use crate::domain::service::merge::{self, DiscardReason, Resolution};

#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: DashMap<String, Message>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageStore {
    async fn apply_event(&self, event: &StatusEvent) -> Result<IngestOutcome> {
        match self.messages.entry(event.correlation_id.clone()) {
            Entry::Vacant(vacant) => {
                let message = merge::message_from_event(event);
                vacant.insert(message.clone());
                Ok(IngestOutcome::Inserted(message))
            }
            Entry::Occupied(mut occupied) => match merge::resolve(occupied.get(), event) {
                Resolution::Apply => {
                    let record = occupied.get_mut();
                    merge::apply_to(record, event);
                    Ok(IngestOutcome::Applied(record.clone()))
                }
                Resolution::Discard(DiscardReason::TerminalReached) => {
                    Ok(IngestOutcome::DiscardedTerminal)
                }
                Resolution::Discard(DiscardReason::Superseded) => {
                    Ok(IngestOutcome::DiscardedSuperseded)
                }
            },
        }
    }

    async fn insert_message(&self, message: Message) -> Result<Message> {
        match self.messages.entry(message.correlation_key().to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(message.clone());
                Ok(message)
            }
            Entry::Occupied(_) => Err(RelayError::AlreadyExists("message".to_string())),
        }
    }

    async fn find_by_recipient(&self, recipient: &str) -> Result<Vec<Message>> {
        let mut result: Vec<Message> = self
            .messages
            .iter()
            .filter(|entry| entry.value().recipient == recipient)
            .map(|entry| entry.value().clone())
            .collect();
        result.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn delete_by_recipient(&self, recipient: &str) -> Result<u64> {
        let before = self.messages.len();
        self.messages.retain(|_, message| message.recipient != recipient);
        Ok((before - self.messages.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let deleted = self.messages.len() as u64;
        self.messages.clear();
        Ok(deleted)
    }

    async fn list_recipients(&self) -> Result<Vec<String>> {
        let recipients: BTreeSet<String> = self
            .messages
            .iter()
            .map(|entry| entry.value().recipient.clone())
            .collect();
        Ok(recipients.into_iter().collect())
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, Profile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileStore {
    async fn get(&self, phone_number: &str) -> Result<Profile> {
        self.profiles
            .get(phone_number)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RelayError::NotFound("profile".to_string()))
    }

    async fn create(&self, profile: Profile) -> Result<Profile> {
        match self.profiles.entry(profile.phone_number.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(profile.clone());
                Ok(profile)
            }
            Entry::Occupied(_) => Err(RelayError::AlreadyExists("profile".to_string())),
        }
    }

    async fn update(&self, phone_number: &str, name: String, avatar: String) -> Result<Profile> {
        match self.profiles.entry(phone_number.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.name = name;
                record.avatar = avatar;
                record.updated_at = Utc::now();
                Ok(record.clone())
            }
            Entry::Vacant(_) => Err(RelayError::NotFound("profile".to_string())),
        }
    }
}
