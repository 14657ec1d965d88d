//! Error taxonomy shared across the relay services.
//!
//! Each variant maps to a stable wire code; `is_retryable` drives the
//! acknowledge-or-redeliver decision in the event ingestor.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Malformed event payload. Retrying cannot fix it; the event is logged
    /// and acknowledged.
    #[error("malformed event payload: {0}")]
    Decode(String),

    /// Transient persistence failure. The event stays unacknowledged and is
    /// redelivered.
    #[error("persistence failure: {0}")]
    Persist(String),

    /// The storage layer is unreachable.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl RelayError {
    /// Stable machine-readable code for the wire surface.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Decode(_) => "DECODE_ERROR",
            RelayError::Persist(_) => "PERSIST_FAILURE",
            RelayError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            RelayError::NotFound(_) => "NOT_FOUND",
            RelayError::AlreadyExists(_) => "CONFLICT",
            RelayError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Whether the ingestor should leave the event unacknowledged and rely
    /// on stream redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::Persist(_) | RelayError::StorageUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RelayError::Decode("x".into()).code(), "DECODE_ERROR");
        assert_eq!(RelayError::Persist("x".into()).code(), "PERSIST_FAILURE");
        assert_eq!(
            RelayError::StorageUnavailable("x".into()).code(),
            "STORAGE_UNAVAILABLE"
        );
        assert_eq!(RelayError::NotFound("profile".into()).code(), "NOT_FOUND");
        assert_eq!(RelayError::AlreadyExists("profile".into()).code(), "CONFLICT");
        assert_eq!(RelayError::Validation("x".into()).code(), "VALIDATION_ERROR");
    }

    #[test]
    fn only_persistence_failures_are_retryable() {
        assert!(RelayError::Persist("x".into()).is_retryable());
        assert!(RelayError::StorageUnavailable("x".into()).is_retryable());
        assert!(!RelayError::Decode("x".into()).is_retryable());
        assert!(!RelayError::Validation("x".into()).is_retryable());
        assert!(!RelayError::NotFound("x".into()).is_retryable());
    }
}
