//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Identity provider settings: token verification and session refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret the identity provider signs access tokens with
    pub jwt_secret: String,

    /// Identity provider base URL (refresh endpoint lives under it)
    pub auth_url: String,

    /// Public API key sent with refresh requests
    pub anon_key: String,

    /// Expected `aud` claim; unchecked when absent
    pub audience: Option<String>,

    /// Allowed clock skew when checking `exp`
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,

    /// Refresh the session when the access token expires within this window
    #[serde(default = "default_refresh_window")]
    pub refresh_window_secs: i64,

    /// `Max-Age` of the session cookies
    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: i64,
}

impl AuthConfig {
    /// In production the identity provider must be reached over HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.auth_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUTH_URL"));
        }
        if self.anon_key.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ANON_KEY"));
        }
        if *environment == Environment::Production {
            if !self.auth_url.starts_with("https://") {
                return Err(ValidationError::AuthUrlMustBeHttps);
            }
            if self.jwt_secret.len() < 32 {
                return Err(ValidationError::WeakJwtSecret);
            }
        }
        if self.refresh_window_secs < 0 || self.refresh_window_secs >= self.session_max_age_secs {
            return Err(ValidationError::InvalidSessionWindow);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            auth_url: String::new(),
            anon_key: String::new(),
            audience: None,
            leeway_secs: default_leeway(),
            refresh_window_secs: default_refresh_window(),
            session_max_age_secs: default_session_max_age(),
        }
    }
}

fn default_leeway() -> u64 {
    30
}

fn default_refresh_window() -> i64 {
    300
}

fn default_session_max_age() -> i64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            auth_url: "https://auth.podium.test".to_string(),
            anon_key: "anon-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.refresh_window_secs, 300);
        assert_eq!(config.session_max_age_secs, 3600);
        assert!(config.audience.is_none());
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            ..valid()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_validation_missing_anon_key() {
        let config = AuthConfig {
            anon_key: String::new(),
            ..valid()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_http_allowed_outside_production() {
        let config = AuthConfig {
            auth_url: "http://localhost:54321".to_string(),
            ..valid()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::AuthUrlMustBeHttps)
        );
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..valid()
        };
        assert!(config.validate(&Environment::Staging).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        );
    }

    #[test]
    fn test_refresh_window_must_be_inside_session() {
        let config = AuthConfig {
            refresh_window_secs: 3600,
            ..valid()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidSessionWindow)
        );
    }
}
