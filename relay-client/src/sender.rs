//! Send entry point (external collaborator boundary).

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use relay_core::error::{RelayError, Result};
use relay_core::model::SendReceipt;

/// A failed send keeps the user's input so the caller can offer a retry.
#[derive(Debug, Error)]
#[error("send to {recipient} failed: {source}")]
pub struct SendError {
    pub recipient: String,
    pub text: String,
    #[source]
    pub source: RelayError,
}

/// The upstream gateway: accepts a send request and returns the correlation
/// id that joins the optimistic entry to its eventual authoritative record.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<SendReceipt>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendSmsRequest<'a> {
    recipient: &'a str,
    text: &'a str,
}

/// HTTP client for the deployed sender service.
pub struct HttpSmsSender {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSmsSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, recipient: &str, text: &str) -> Result<SendReceipt> {
        let url = format!("{}/send", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&SendSmsRequest { recipient, text })
            .send()
            .await
            .map_err(|err| RelayError::StorageUnavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| RelayError::StorageUnavailable(err.to_string()))?;
        response
            .json::<SendReceipt>()
            .await
            .map_err(|err| RelayError::Decode(err.to_string()))
    }
}
