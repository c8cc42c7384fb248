//! HS256 session token validation.
//!
//! The identity provider signs access tokens with a shared secret. This
//! adapter checks the signature, expiry and (optionally) audience, then maps
//! the `sub` and `email` claims onto an `AuthenticatedUser`.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, MemberId, Timestamp};
use crate::ports::SessionValidator;

/// Configuration for [`JwtSessionValidator`].
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,

    /// Expected `aud` claim. `None` skips the audience check.
    pub audience: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            audience: None,
            leeway_secs: 0,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

/// Claims read from the access token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    exp: i64,

    #[serde(default, skip_serializing_if = "Audience::is_none")]
    aud: Audience,
}

/// Audience can be a single string or array of strings in JWTs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    fn is_none(&self) -> bool {
        matches!(self, Audience::None)
    }

    fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == expected,
            Audience::Multiple(v) => v.iter().any(|s| s == expected),
        }
    }
}

/// Validates HS256 access tokens against the shared identity-provider secret.
pub struct JwtSessionValidator {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Access token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in access token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Access token rejected");
                    AuthError::InvalidToken
                }
            })?;
        let claims = data.claims;

        if let Some(expected) = &self.config.audience {
            if !claims.aud.contains(expected) {
                tracing::warn!(expected = %expected, "Audience mismatch after validation");
                return Err(AuthError::InvalidToken);
            }
        }

        let id = MemberId::parse_subject(&claims.sub).map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Subject is not a member id");
            AuthError::InvalidToken
        })?;

        let email = claims.email.ok_or_else(|| {
            tracing::warn!("Access token missing email claim");
            AuthError::InvalidToken
        })?;

        let expires_at = Timestamp::from_unix_secs(claims.exp).ok_or(AuthError::InvalidToken)?;

        Ok(AuthenticatedUser::new(id, email, expires_at))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Signs a token the way the identity provider does. Test support only.
#[cfg(test)]
fn issue_token(secret: &str, claims: &SessionClaims) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
