//! Top-level router: mounts every component under `/api` and wraps the
//! whole tree in the session gate.

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::billing::{billing_routes, webhook_routes};
use super::directory::{member_routes, organization_routes};
use super::error::ApiError;
use super::messaging::message_routes;
use super::middleware::session_gate;
use super::state::AppState;
use super::workflow::{application_routes, opportunity_routes};
use crate::config::ServerConfig;

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/members", member_routes())
        .nest("/organizations", organization_routes())
        .nest("/opportunities", opportunity_routes())
        .nest("/applications", application_routes())
        .nest("/messages", message_routes())
        .nest("/billing", billing_routes())
        .nest("/webhooks", webhook_routes())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found")
}

/// Application routes with the session gate applied, including to the
/// fallback so page paths are redirected even though no handler serves them.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .with_state(state)
}

/// Adds timeout, CORS and request tracing.
pub fn with_http_layers(router: Router, config: &ServerConfig) -> Router {
    router
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(&config.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("stripe-signature"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        // a wildcard origin is rejected alongside credentials
        tracing::warn!("No CORS origins configured, mirroring request origin");
        AllowOrigin::mirror_request()
    } else {
        tracing::info!(count = parsed.len(), "CORS origins configured");
        AllowOrigin::list(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::adapters::http::test_support::{call, expect_json, TestContext};
    use crate::domain::directory::MemberRole;

    #[tokio::test]
    async fn health_is_public() {
        let ctx = TestContext::new();

        let body = expect_json(
            call(ctx.app(), Method::GET, "/health", None, None).await,
            StatusCode::OK,
        )
        .await;

        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_404() {
        let ctx = TestContext::new();
        let (_, token) = ctx.member(MemberRole::Speaker).await;

        let body = expect_json(
            call(ctx.app(), Method::GET, "/api/nothing-here", Some(&token), None).await,
            StatusCode::NOT_FOUND,
        )
        .await;

        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn dashboard_redirects_anonymous_visitor() {
        let ctx = TestContext::new();

        let response = call(ctx.app(), Method::GET, "/dashboard/billing", None, None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login?redirect=/dashboard/billing"
        );
    }

    #[tokio::test]
    async fn signed_in_member_is_sent_from_login_to_dashboard() {
        let ctx = TestContext::new();
        let (_, token) = ctx.member(MemberRole::Speaker).await;

        let response = call(ctx.app(), Method::GET, "/auth/login", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn layered_router_still_serves_requests() {
        let ctx = TestContext::new();
        let config = ServerConfig {
            cors_origins: Some("https://podium.test".to_string()),
            ..ServerConfig::default()
        };
        let app = with_http_layers(ctx.app(), &config);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://podium.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://podium.test"
        );
    }

    #[test]
    fn invalid_origins_are_skipped() {
        let _layer = cors_layer(&["https://ok.test".to_string(), "bad\norigin".to_string()]);
    }
}
