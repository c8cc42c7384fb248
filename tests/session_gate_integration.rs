//! Session gate behaviour on the assembled application router.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use common::{read_json, set_cookies, Harness};
use podium::adapters::auth::MockTokenRefresher;
use podium::domain::directory::MemberRole;

async fn get_with_cookie(harness: &Harness, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    harness
        .app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn protected_pages_redirect_with_return_path() {
    let harness = Harness::new();

    let response = get_with_cookie(&harness, "/dashboard/messages", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/auth/login?redirect=/dashboard/messages"));
}

#[tokio::test]
async fn session_cookie_passes_the_gate() {
    let harness = Harness::new();
    let (_, token) = harness.member(MemberRole::Speaker, "Grace").await;
    let cookie = format!("podium_session={}", token);

    let page = get_with_cookie(&harness, "/dashboard", Some(&cookie)).await;
    assert_ne!(page.status(), StatusCode::FOUND);

    let me = get_with_cookie(&harness, "/api/members/me", Some(&cookie)).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(read_json(me).await["display_name"], "Grace");
}

#[tokio::test]
async fn onboarded_member_skips_profile_setup() {
    let harness = Harness::new();
    let (_, token) = harness.member(MemberRole::Organization, "Acme").await;

    let response = get_with_cookie(
        &harness,
        "/auth/profile-setup",
        Some(&format!("podium_session={}", token)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn refresh_cookie_restores_session_and_rotates_cookies() {
    let mut harness = Harness::new();
    let (member, _) = harness.member(MemberRole::Speaker, "Linus").await;
    harness.state.token_refresher =
        Arc::new(MockTokenRefresher::new().with_grant("refresh-1", "access-2", member.id));

    let response = get_with_cookie(
        &harness,
        "/api/members/me",
        Some("podium_session=expired; podium_refresh=refresh-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("podium_session=access-2;")));
    assert!(cookies.iter().any(|c| c.starts_with("podium_refresh=access-2-rotated;")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
}

#[tokio::test]
async fn rejected_refresh_clears_cookies_and_redirects() {
    let harness = Harness::new();

    let response = get_with_cookie(
        &harness,
        "/dashboard",
        Some("podium_session=expired; podium_refresh=revoked"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn webhook_endpoint_needs_no_session() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/webhooks/stripe")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    // rejected for the missing signature, not for the missing session
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
