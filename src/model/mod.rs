//! Domain model shared between the store server and the sync client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery lifecycle of a message.
///
/// `Pending` is client-local: it is fabricated at send time and never
/// assigned by the server. `Received` is the server's initial acceptance
/// state. `Success` and `Failed` are terminal and sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Received,
    Success,
    Failed,
}

impl DeliveryStatus {
    /// Terminal statuses must never be overwritten once set.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Success | DeliveryStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Received => "RECEIVED",
            DeliveryStatus::Success => "SUCCESS",
            DeliveryStatus::Failed => "FAILED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(DeliveryStatus::Pending),
            "RECEIVED" => Some(DeliveryStatus::Received),
            "SUCCESS" => Some(DeliveryStatus::Success),
            "FAILED" => Some(DeliveryStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in the per-recipient delivery log.
///
/// The optimistic (client-fabricated) and persisted representations of one
/// logical send share the same correlation key and collapse to a single
/// visible entry once merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Stable identifier, server-assigned once persisted.
    pub id: String,
    /// Join key returned by the sender at send time. Absent on messages
    /// created without a prior send, in which case `id` is the key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correlation_id: Option<String>,
    /// Phone number; the grouping key for a conversation.
    pub recipient: String,
    pub text: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    /// Last applied event time in unix millis. Store-internal ordering
    /// guard, not part of the wire shape.
    #[serde(skip)]
    pub last_event_ts: i64,
}

impl Message {
    pub fn correlation_key(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or(&self.id)
    }
}

/// Delivery-status event consumed from the bus.
///
/// The merge policy reads only `correlation_id`, `status` and `event_time`.
/// `recipient` and `text` are enrichment the sender publishes alongside, used
/// when the event arrives before any record for the send exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub correlation_id: String,
    pub status: DeliveryStatus,
    /// Event time in unix millis.
    pub event_time: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

/// Push-channel payload emitted after a successful merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub correlation_id: String,
    pub recipient: String,
    pub status: DeliveryStatus,
}

/// Synchronous response of the send entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub correlation_id: String,
    pub status: DeliveryStatus,
    /// Accept time in unix millis.
    pub timestamp: i64,
}

/// User profile, keyed by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub phone_number: String,
    pub name: String,
    /// URL or base64 encoded image.
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::Received,
            DeliveryStatus::Success,
            DeliveryStatus::Failed,
        ] {
            assert_eq!(DeliveryStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(DeliveryStatus::from_str("DELIVERED"), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(DeliveryStatus::Success.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(!DeliveryStatus::Pending.is_terminal());
        assert!(!DeliveryStatus::Received.is_terminal());
    }

    #[test]
    fn correlation_key_falls_back_to_id() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
        let mut message = Message {
            id: "msg-1".to_string(),
            correlation_id: Some("r1".to_string()),
            recipient: "+15551234567".to_string(),
            text: "hi".to_string(),
            status: DeliveryStatus::Received,
            created_at,
            last_event_ts: 0,
        };
        assert_eq!(message.correlation_key(), "r1");

        message.correlation_id = None;
        assert_eq!(message.correlation_key(), "msg-1");
    }

    #[test]
    fn message_wire_shape_is_camel_case() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
        let message = Message {
            id: "msg-1".to_string(),
            correlation_id: Some("r1".to_string()),
            recipient: "+15551234567".to_string(),
            text: "hi".to_string(),
            status: DeliveryStatus::Success,
            created_at,
            last_event_ts: 42,
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["correlationId"], "r1");
        assert_eq!(value["status"], "SUCCESS");
        assert!(value.get("createdAt").is_some());
        // store-internal field never leaves the process
        assert!(value.get("lastEventTs").is_none());
    }

    #[test]
    fn event_decodes_without_enrichment() {
        let event: StatusEvent = serde_json::from_str(
            r#"{"correlationId":"r1","status":"SUCCESS","eventTime":1700000001000}"#,
        )
        .unwrap();
        assert_eq!(event.correlation_id, "r1");
        assert_eq!(event.status, DeliveryStatus::Success);
        assert_eq!(event.recipient, None);
        assert_eq!(event.text, None);
    }
}
