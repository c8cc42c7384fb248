//! Mock authentication adapters for testing.
//!
//! These implement `SessionValidator` and `TokenRefresher` from in-memory
//! maps so router and middleware tests never need a real identity provider.
//!
//! ```ignore
//! let validator = MockSessionValidator::new().with_member("valid-token", member_id);
//! let user = validator.validate("valid-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, MemberId, SessionTokens, Timestamp};
use crate::ports::{SessionValidator, TokenRefresher};

/// Builds a user whose token is valid for an hour.
pub fn test_user(id: MemberId) -> AuthenticatedUser {
    AuthenticatedUser::new(
        id,
        format!("{}@test.example.com", id),
        Timestamp::now().plus_secs(3600),
    )
}

/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, Result<AuthenticatedUser, AuthError>>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a valid token for a member with default email and expiry.
    pub fn with_member(self, token: impl Into<String>, id: MemberId) -> Self {
        self.with_user(token, test_user(id))
    }

    /// Registers a token that validates as expired.
    pub fn with_expired(self, token: impl Into<String>) -> Self {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), Err(AuthError::TokenExpired));
        }
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        if let Ok(mut forced) = self.force_error.write() {
            *forced = Some(error);
        }
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), Ok(user));
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self.force_error.read().ok().and_then(|e| e.clone()) {
            return Err(error);
        }

        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(token).cloned())
            .unwrap_or(Err(AuthError::InvalidToken))
    }
}

/// Maps refresh tokens to the token pair the provider would issue.
#[derive(Debug, Default)]
pub struct MockTokenRefresher {
    grants: RwLock<HashMap<String, SessionTokens>>,
    calls: AtomicUsize,
}

impl MockTokenRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `refresh_token` and answers with a fresh pair for `id`.
    pub fn with_grant(
        self,
        refresh_token: impl Into<String>,
        new_access_token: impl Into<String>,
        id: MemberId,
    ) -> Self {
        let access_token = new_access_token.into();
        if let Ok(mut grants) = self.grants.write() {
            grants.insert(
                refresh_token.into(),
                SessionTokens {
                    refresh_token: format!("{}-rotated", access_token),
                    access_token,
                    user: test_user(id),
                },
            );
        }
        self
    }

    /// Number of refresh attempts seen.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for MockTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grants
            .read()
            .ok()
            .and_then(|grants| grants.get(refresh_token).cloned())
            .ok_or(AuthError::RefreshRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_validator_returns_user_for_registered_token() {
        let id = MemberId::new();
        let validator = MockSessionValidator::new().with_member("valid-token", id);

        let user = validator.validate("valid-token").await.unwrap();

        assert_eq!(user.id, id);
        assert!(user.email.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn mock_validator_returns_invalid_token_for_unknown() {
        let validator = MockSessionValidator::new();

        let result = validator.validate("unknown-token").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn mock_validator_reports_expired_tokens() {
        let validator = MockSessionValidator::new().with_expired("old");

        assert!(matches!(
            validator.validate("old").await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn mock_validator_with_error_forces_error() {
        let validator = MockSessionValidator::new()
            .with_member("valid-token", MemberId::new())
            .with_error(AuthError::service_unavailable("down"));

        let result = validator.validate("valid-token").await;

        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn mock_refresher_grants_known_tokens_and_counts_calls() {
        let id = MemberId::new();
        let refresher = MockTokenRefresher::new().with_grant("refresh-1", "access-2", id);

        let tokens = refresher.refresh("refresh-1").await.unwrap();
        let rejected = refresher.refresh("nope").await;

        assert_eq!(tokens.access_token, "access-2");
        assert_eq!(tokens.user.id, id);
        assert!(matches!(rejected, Err(AuthError::RefreshRejected)));
        assert_eq!(refresher.calls(), 2);
    }

    #[test]
    fn mock_validator_token_count_tracks_tokens() {
        let validator = MockSessionValidator::new()
            .with_member("t1", MemberId::new())
            .with_expired("t2");

        assert_eq!(validator.token_count(), 2);
    }
}
