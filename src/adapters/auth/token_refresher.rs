//! Refresh-token exchange against the identity provider's token endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, SessionTokens};
use crate::ports::{SessionValidator, TokenRefresher};

/// Identity provider endpoint settings.
#[derive(Clone)]
pub struct RefreshConfig {
    /// Base URL of the identity provider, without trailing slash.
    pub auth_url: String,

    /// Public API key sent as the `apikey` header.
    anon_key: SecretString,
}

impl RefreshConfig {
    pub fn new(auth_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            anon_key: SecretString::new(anon_key.into()),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/auth/v1/token?grant_type=refresh_token",
            self.auth_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Exchanges refresh tokens over HTTP, then validates the new access token
/// with the same validator the session gate uses.
pub struct HttpTokenRefresher {
    config: RefreshConfig,
    http_client: reqwest::Client,
    validator: Arc<dyn SessionValidator>,
}

impl HttpTokenRefresher {
    pub fn new(
        config: RefreshConfig,
        http_client: reqwest::Client,
        validator: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            config,
            http_client,
            validator,
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        let response = self
            .http_client
            .post(self.config.token_url())
            .header("apikey", self.config.anon_key.expose_secret())
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token refresh request failed");
                AuthError::service_unavailable(e.to_string())
            })?;

        let status = response.status();
        if status.is_client_error() {
            tracing::info!(status = %status, "Refresh token rejected");
            return Err(AuthError::RefreshRejected);
        }
        if !status.is_success() {
            tracing::error!(status = %status, "Token endpoint returned an error");
            return Err(AuthError::service_unavailable(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse token endpoint response");
            AuthError::service_unavailable(format!("invalid token response: {}", e))
        })?;

        let user = self.validator.validate(&body.access_token).await?;

        Ok(SessionTokens {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            user,
        })
    }
}

impl std::fmt::Debug for HttpTokenRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenRefresher")
            .field("auth_url", &self.config.auth_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_handles_trailing_slash() {
        let config = RefreshConfig::new("https://id.example.com/", "anon");
        assert_eq!(
            config.token_url(),
            "https://id.example.com/auth/v1/token?grant_type=refresh_token"
        );
    }

    #[test]
    fn refresher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTokenRefresher>();
    }
}
