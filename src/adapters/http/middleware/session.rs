//! Session gate middleware and the `RequireAuth` extractor.
//!
//! ```text
//! Request → session_gate ─ resolve identity (cookie or Bearer, refresh if near expiry)
//!                        ─ page decision (redirect to login / dashboard)
//!                        ─ inject AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth reads from extensions
//! ```
//!
//! Identity-provider failures resolve to an anonymous caller. API routes are
//! never redirected; they answer 401 through `RequireAuth`.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::{AppState, SessionSettings};
use crate::domain::foundation::{AuthError, AuthenticatedUser, SessionTokens, Timestamp};
use crate::domain::session::{decide, settle_onboarding, GateDecision};

pub const SESSION_COOKIE: &str = "podium_session";
pub const REFRESH_COOKIE: &str = "podium_refresh";

const REFRESH_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for a session cookie.
pub fn session_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn issued_cookies(tokens: &SessionTokens, settings: &SessionSettings) -> Vec<String> {
    vec![
        session_cookie(
            SESSION_COOKIE,
            &tokens.access_token,
            settings.max_age_secs,
            settings.secure_cookies,
        ),
        session_cookie(
            REFRESH_COOKIE,
            &tokens.refresh_token,
            REFRESH_COOKIE_MAX_AGE_SECS,
            settings.secure_cookies,
        ),
    ]
}

fn cleared_cookies(settings: &SessionSettings) -> Vec<String> {
    [SESSION_COOKIE, REFRESH_COOKIE]
        .iter()
        .map(|name| session_cookie(name, "", 0, settings.secure_cookies))
        .collect()
}

/// Caller identity plus cookies to write back on the response.
#[derive(Debug, Default)]
struct ResolvedSession {
    user: Option<AuthenticatedUser>,
    cookies: Vec<String>,
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> ResolvedSession {
    let settings = state.session;
    let access_token = cookie_value(headers, SESSION_COOKIE).or_else(|| bearer_token(headers));
    let refresh_token = cookie_value(headers, REFRESH_COOKIE);

    let current = match access_token {
        Some(token) => match state.session_validator.validate(token).await {
            Ok(user) => Some(user),
            Err(AuthError::TokenExpired) => None,
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Session validation unavailable");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        },
        None => None,
    };

    let needs_refresh = match &current {
        Some(user) => user.expires_within(Timestamp::now(), settings.refresh_window_secs),
        None => true,
    };

    let Some(refresh_token) = refresh_token.filter(|_| needs_refresh) else {
        return ResolvedSession {
            user: current,
            cookies: Vec::new(),
        };
    };

    match state.token_refresher.refresh(refresh_token).await {
        Ok(tokens) => {
            tracing::debug!(member_id = %tokens.user.id, "Session refreshed");
            ResolvedSession {
                cookies: issued_cookies(&tokens, &settings),
                user: Some(tokens.user),
            }
        }
        Err(e) if e.is_transient() => {
            tracing::warn!(error = %e, "Session refresh unavailable");
            ResolvedSession {
                user: current,
                cookies: Vec::new(),
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Refresh token rejected");
            ResolvedSession {
                cookies: if current.is_none() {
                    cleared_cookies(&settings)
                } else {
                    Vec::new()
                },
                user: current,
            }
        }
    }
}

async fn settle_profile_setup(state: &AppState, user: Option<&AuthenticatedUser>) -> GateDecision {
    let Some(user) = user else {
        return GateDecision::Allow;
    };
    let completed = match state.members.find_by_id(&user.id).await {
        Ok(member) => member.map(|m| m.onboarding_completed),
        Err(e) => {
            tracing::warn!(member_id = %user.id, error = %e, "Onboarding lookup failed");
            None
        }
    };
    settle_onboarding(completed)
}

fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Resolves the caller, applies page gating and forwards the request.
///
/// Refreshed or cleared cookies are appended to whatever response is
/// returned, redirects included.
pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = resolve_session(&state, request.headers()).await;
    let path = request.uri().path().to_string();

    let decision = match decide(&path, session.user.is_some()) {
        GateDecision::AllowUnlessOnboarded => {
            settle_profile_setup(&state, session.user.as_ref()).await
        }
        other => other,
    };

    let mut response = match decision.location() {
        Some(location) => {
            tracing::debug!(path = %path, location = %location, "Session gate redirect");
            redirect(location)
        }
        None => {
            if let Some(user) = session.user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
    };

    for cookie in session.cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Extractor that requires an authenticated caller.
///
/// Answers 401 JSON when the gate did not resolve an identity.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid session was presented.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => ApiError::unauthorized().into_response(),
        }
    }
}
