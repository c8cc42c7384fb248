//! Token refresh port.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, SessionTokens};

/// Exchanges a refresh token for a new token pair at the identity provider.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// # Errors
    ///
    /// - `AuthError::RefreshRejected` when the provider refuses the token
    /// - `AuthError::ServiceUnavailable` on transport failures
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError>;
}
