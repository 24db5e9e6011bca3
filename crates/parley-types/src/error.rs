//! Error taxonomy for the chat pipeline, one enum per component.
//!
//! Store and generation errors propagate unmodified from the component
//! that raised them through the orchestrator to the transport boundary,
//! which owns the mapping to caller-visible statuses.

use thiserror::Error;

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached at all.
    #[error("session store unreachable: {0}")]
    Unavailable(String),

    /// The store was reachable but a read was rejected or undecodable.
    #[error("session read failed: {0}")]
    ReadFailed(String),

    /// The store was reachable but an append/trim was rejected.
    #[error("session write failed: {0}")]
    WriteFailed(String),

    /// A stored entry was malformed; the session key has been deleted.
    #[error("corrupted session data cleared")]
    CorruptedSession,
}

/// Errors from the generation gateway.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend failed (transport error, non-success status, or an
    /// exhausted retry budget), with the underlying cause.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the admission gate.
///
/// The gate only fails closed on an explicit over-quota count; counting
/// infrastructure failures are absorbed (fail-open) and never surface here.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("too many requests")]
    RateExceeded,
}

/// Union of the component errors as seen by the orchestrator and the
/// transport boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("too many requests")]
    RateExceeded,
}

impl From<AdmissionError> for ChatError {
    fn from(_: AdmissionError) -> Self {
        ChatError::RateExceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "session store unreachable: connection refused"
        );
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Unavailable("HTTP 503".to_string());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_chat_error_is_transparent_for_store() {
        let err = ChatError::from(StoreError::CorruptedSession);
        assert_eq!(err.to_string(), "corrupted session data cleared");
    }

    #[test]
    fn test_admission_error_converts_to_rate_exceeded() {
        let err = ChatError::from(AdmissionError::RateExceeded);
        assert!(matches!(err, ChatError::RateExceeded));
    }
}
