//! Authentication types for the domain layer.
//!
//! A caller is identified by the identity provider's access token. Adapters
//! behind the `SessionValidator` and `TokenRefresher` ports turn tokens into
//! these types; nothing here knows which provider issued them.

use super::{MemberId, Timestamp};
use thiserror::Error;

/// Caller resolved from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject claim, also the member's primary key.
    pub id: MemberId,

    /// Email claim.
    pub email: String,

    /// Expiry of the access token the identity was read from.
    pub expires_at: Timestamp,
}

impl AuthenticatedUser {
    pub fn new(id: MemberId, email: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            id,
            email: email.into(),
            expires_at,
        }
    }

    /// Returns true when the token expires within `window_secs` of `now`.
    ///
    /// Already-expired tokens are also "expiring soon".
    pub fn expires_within(&self, now: Timestamp, window_secs: i64) -> bool {
        !self.expires_at.is_after(&now.plus_secs(window_secs))
    }
}

/// Token pair issued by the identity provider on refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthenticatedUser,
}

/// Authentication errors that can occur during token handling.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Signature is valid but `exp` has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The identity provider rejected the refresh token.
    #[error("Session refresh rejected")]
    RefreshRejected,

    /// The identity provider could not be reached or answered garbage.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::RefreshRejected
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
