//! Small shared helpers: time conversion, id generation, input validation.

use chrono::{DateTime, TimeZone, Utc};
use ulid::Ulid;
use uuid::Uuid;

use crate::error::RelayError;

pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

/// Server-assigned message identifier.
pub fn new_message_id() -> String {
    format!("msg-{}", Ulid::new())
}

/// Client-local identifier for an optimistic entry that has no correlation
/// id yet.
pub fn new_local_id() -> String {
    format!("local-{}", Uuid::new_v4())
}

/// Recipient identifiers are path segments on the read API; reject empty
/// values and path separators before they reach the store.
pub fn validate_recipient(recipient: &str) -> Result<(), RelayError> {
    let trimmed = recipient.trim();
    if trimmed.is_empty() {
        return Err(RelayError::Validation("recipient is required".to_string()));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(RelayError::Validation(
            "recipient must not contain path separators".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip() {
        let ms = 1_700_000_000_123;
        let dt = millis_to_datetime(ms).unwrap();
        assert_eq!(dt.timestamp_millis(), ms);
    }

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(new_message_id(), new_message_id());
        assert!(new_message_id().starts_with("msg-"));
        assert!(new_local_id().starts_with("local-"));
    }

    #[test]
    fn recipient_validation() {
        assert!(validate_recipient("+15551234567").is_ok());
        assert!(validate_recipient("").is_err());
        assert!(validate_recipient("   ").is_err());
        assert!(validate_recipient("+1555/123").is_err());
        assert!(validate_recipient("..\\x").is_err());
    }
}
