//! Workflow error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors from opportunity and application operations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("You have already applied to this opportunity")]
    DuplicateApplication,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Storage error: {0}")]
    Infrastructure(String),
}

impl WorkflowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::Validation(_) => ErrorCode::ValidationFailed,
            WorkflowError::DuplicateApplication => ErrorCode::DuplicateApplication,
            WorkflowError::NotFound("Application") => ErrorCode::ApplicationNotFound,
            WorkflowError::NotFound("Member") => ErrorCode::MemberNotFound,
            WorkflowError::NotFound("Organization") => ErrorCode::OrganizationNotFound,
            WorkflowError::NotFound(_) => ErrorCode::OpportunityNotFound,
            WorkflowError::Forbidden(_) => ErrorCode::Forbidden,
            WorkflowError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            WorkflowError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateApplication => WorkflowError::DuplicateApplication,
            ErrorCode::ValidationFailed => {
                let field = err.details.get("field").cloned().unwrap_or_default();
                WorkflowError::Validation(ValidationError::invalid_format(field, err.message))
            }
            ErrorCode::OpportunityNotFound => WorkflowError::NotFound("Opportunity"),
            ErrorCode::ApplicationNotFound => WorkflowError::NotFound("Application"),
            ErrorCode::MemberNotFound => WorkflowError::NotFound("Member"),
            ErrorCode::OrganizationNotFound => WorkflowError::NotFound("Organization"),
            ErrorCode::Forbidden => WorkflowError::Forbidden(err.message),
            _ => WorkflowError::Infrastructure(err.message),
        }
    }
}
