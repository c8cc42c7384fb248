//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `TokenRefresher` ports:
//!
//! - `jwt_validator` - HS256 access-token validation
//! - `token_refresher` - refresh-token exchange over HTTP
//! - `mock` - Test implementations that don't require external services

mod jwt_validator;
mod mock;
mod token_refresher;

pub use jwt_validator::{JwtConfig, JwtSessionValidator};
pub use mock::{test_user, MockSessionValidator, MockTokenRefresher};
pub use token_refresher::{HttpTokenRefresher, RefreshConfig};
