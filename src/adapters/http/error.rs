//! HTTP error mapping shared by every router.
//!
//! Component errors convert into [`ApiError`], which owns the status code and
//! the JSON body `{ "error": <message>, "code": <CODE> }`. Storage, cache and
//! upstream failures are logged here and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{BillingError, WebhookError};
use crate::domain::foundation::{AuthError, DomainError, ErrorCode, ValidationError};
use crate::domain::workflow::WorkflowError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error that converts component errors to HTTP responses.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Authentication required")
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// Logs `detail` and answers 500 without it.
    pub fn internal(code: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let code = code.into();
        tracing::error!(code = %code, error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, INTERNAL_MESSAGE)
    }

    /// Logs `detail` and answers 503 without it.
    pub fn unavailable(code: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let code = code.into();
        tracing::warn!(code = %code, error = %detail, "Dependency unavailable");
        Self::new(StatusCode::SERVICE_UNAVAILABLE, code, UNAVAILABLE_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::DuplicateApplication
        | ErrorCode::AlreadyExists
        | ErrorCode::InvalidStateTransition => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        c if c.is_not_found() => StatusCode::NOT_FOUND,
        ErrorCode::CacheError | ErrorCode::UpstreamError => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn from_code(code: ErrorCode, message: String) -> ApiError {
    match status_for(code) {
        StatusCode::INTERNAL_SERVER_ERROR => ApiError::internal(code.to_string(), message),
        StatusCode::SERVICE_UNAVAILABLE => ApiError::unavailable(code.to_string(), message),
        status => ApiError::new(status, code.to_string(), message),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        from_code(err.code, err.message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(ErrorCode::ValidationFailed.to_string(), err.to_string())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        from_code(err.code(), err.to_string())
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        if err.is_verification_failure() {
            let code = match err {
                WebhookError::ParseError(_) => "INVALID_PAYLOAD",
                _ => "INVALID_SIGNATURE",
            };
            Self::bad_request(code, err.to_string())
        } else {
            Self::internal("WEBHOOK_PROCESSING_FAILED", err)
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let code = err.code();
        match err {
            BillingError::Webhook(inner) => inner.into(),
            BillingError::NotFound(_) => Self::not_found(code, err.to_string()),
            BillingError::Validation(_) | BillingError::InvalidState(_) => {
                Self::bad_request(code, err.to_string())
            }
            BillingError::Configuration { .. } => {
                tracing::error!(error = %err, "Price table is missing an entry");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
            BillingError::Upstream(_) => Self::unavailable(code, err),
            BillingError::Infrastructure(_) => Self::internal(code, err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_transient() {
            Self::unavailable("AUTH_UNAVAILABLE", err)
        } else {
            Self::unauthorized()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}
