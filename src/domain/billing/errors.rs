//! Billing error types.

use thiserror::Error;

use super::WebhookError;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors from billing operations.
#[derive(Debug, Clone, Error)]
pub enum BillingError {
    /// No price id is configured for the requested plan and period.
    #[error("Billing is not configured for {plan} ({period})")]
    Configuration { plan: String, period: String },

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The payment processor failed. The detail is for logs only.
    #[error("Payment provider error: {0}")]
    Upstream(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    InvalidState(String),

    #[error("Storage error: {0}")]
    Infrastructure(String),
}

impl BillingError {
    pub fn configuration(plan: impl ToString, period: impl ToString) -> Self {
        Self::Configuration {
            plan: plan.to_string(),
            period: period.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BillingError::Configuration { .. } => "CONFIGURATION_ERROR",
            BillingError::Webhook(e) if e.is_verification_failure() => "INVALID_SIGNATURE",
            BillingError::Webhook(_) => "WEBHOOK_PROCESSING_FAILED",
            BillingError::Upstream(_) => "UPSTREAM_ERROR",
            BillingError::NotFound(_) => "NOT_FOUND",
            BillingError::Validation(_) => "VALIDATION_FAILED",
            BillingError::InvalidState(_) => "INVALID_STATE",
            BillingError::Infrastructure(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::MemberNotFound => BillingError::NotFound("Member"),
            ErrorCode::SubscriptionNotFound => BillingError::NotFound("Subscription"),
            ErrorCode::ValidationFailed => BillingError::InvalidState(err.message),
            _ => BillingError::Infrastructure(err.message),
        }
    }
}
