//! HTTP middleware for axum.
//!
//! - `session` - Session gate, cookie refresh and the `RequireAuth` extractor

pub mod session;

pub use session::{
    cookie_value, session_cookie, session_gate, AuthRejection, RequireAuth, REFRESH_COOKIE,
    SESSION_COOKIE,
};
