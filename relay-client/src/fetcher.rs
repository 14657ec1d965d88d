//! Read-API client.

use async_trait::async_trait;

use relay_core::error::{RelayError, Result};
use relay_core::model::Message;

/// Fetch the authoritative message list of one recipient.
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    async fn fetch_messages(&self, recipient: &str) -> Result<Vec<Message>>;
}

/// HTTP client for the deployed read API.
pub struct HttpStatusFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatusFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MessageFetcher for HttpStatusFetcher {
    async fn fetch_messages(&self, recipient: &str) -> Result<Vec<Message>> {
        let url = format!("{}/recipients/{}/messages", self.base_url, recipient);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RelayError::StorageUnavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| RelayError::StorageUnavailable(err.to_string()))?;
        response
            .json::<Vec<Message>>()
            .await
            .map_err(|err| RelayError::Decode(err.to_string()))
    }
}
