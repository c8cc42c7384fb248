//! Webhook error types for Stripe webhook handling.
//!
//! Verification failures answer 400 so Stripe stops retrying a forged or
//! stale delivery; processing failures answer 500 so a genuine event is
//! delivered again.

use http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    /// Older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Further in the future than the allowed clock skew.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No member could be linked to the event yet.
    #[error("Member not found")]
    MemberNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl WebhookError {
    /// True for failures detected before the payload is trusted.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
        )
    }

    /// Returns true if Stripe should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::StorageError(_) | WebhookError::MemberNotFound
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_verification_failure() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::MemberNotFound => WebhookError::MemberNotFound,
            ErrorCode::CacheError => WebhookError::StorageError(err.message),
            _ => WebhookError::Database(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_answer_bad_request() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::ParseError("bad json".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{}", err);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn processing_failures_answer_internal_error() {
        for err in [
            WebhookError::MissingMetadata("member_id"),
            WebhookError::MissingField("subscription"),
            WebhookError::MemberNotFound,
            WebhookError::Database("connection lost".to_string()),
            WebhookError::StorageError("redis timeout".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{}", err);
        }
    }

    #[test]
    fn member_not_found_is_retryable() {
        assert!(WebhookError::MemberNotFound.is_retryable());
        assert!(!WebhookError::MissingMetadata("plan").is_retryable());
    }

    #[test]
    fn repository_errors_stay_retryable() {
        let err: WebhookError = DomainError::database("deadlock detected").into();
        assert!(matches!(err, WebhookError::Database(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_metadata_displays_field_name() {
        let err = WebhookError::MissingMetadata("member_id");
        assert_eq!(format!("{}", err), "Missing metadata: member_id");
    }
}
