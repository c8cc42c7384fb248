//! Axum routes for opportunities and applications.

use axum::{
    routing::{get, patch},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    change_application_status, create_opportunity, get_opportunity, list_my_applications,
    list_opportunities, list_opportunity_applications, submit_application,
    update_opportunity_status,
};

/// Mounted at `/api/opportunities`.
pub fn opportunity_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_opportunities).post(create_opportunity))
        .route("/:id", get(get_opportunity))
        .route("/:id/status", patch(update_opportunity_status))
        .route(
            "/:id/applications",
            get(list_opportunity_applications).post(submit_application),
        )
}

/// Mounted at `/api/applications`.
pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_applications))
        .route("/:id/status", patch(change_application_status))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::adapters::http::test_support::{call, expect_json, TestContext};
    use crate::domain::directory::MemberRole;

    fn opportunity_body(publish: bool) -> Value {
        json!({
            "title": "Rust in Production",
            "description": "A 40 minute talk on running Rust services",
            "starts_at": "2030-05-01T09:00:00Z",
            "format": "virtual",
            "topics": ["rust", "operations"],
            "compensation": { "kind": "paid", "amount_cents": 50000, "currency": "usd" },
            "publish": publish
        })
    }

    fn application_body() -> Value {
        json!({
            "cover_letter": "I have run Rust in production for five years.",
            "availability_confirmed": true
        })
    }

    async fn posted(ctx: &TestContext, token: &str) -> String {
        let body = expect_json(
            call(
                ctx.app(),
                Method::POST,
                "/api/opportunities",
                Some(token),
                Some(opportunity_body(true)),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        body["id"].as_str().unwrap().to_string()
    }

    async fn opportunity(ctx: &TestContext, token: &str, id: &str) -> Value {
        expect_json(
            call(
                ctx.app(),
                Method::GET,
                &format!("/api/opportunities/{}", id),
                Some(token),
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await
    }

    #[tokio::test]
    async fn organization_posts_open_opportunity() {
        let ctx = TestContext::new();
        let (poster, token) = ctx.member(MemberRole::Organization).await;

        let id = posted(&ctx, &token).await;
        let body = opportunity(&ctx, &token, &id).await;

        assert_eq!(body["status"], "open");
        assert_eq!(body["poster_id"], poster.id.to_string());
        assert_eq!(body["application_count"], 0);
    }

    #[tokio::test]
    async fn speakers_cannot_post() {
        let ctx = TestContext::new();
        let (_, token) = ctx.member(MemberRole::Speaker).await;

        let body = expect_json(
            call(
                ctx.app(),
                Method::POST,
                "/api/opportunities",
                Some(&token),
                Some(opportunity_body(true)),
            )
            .await,
            StatusCode::FORBIDDEN,
        )
        .await;

        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn second_application_is_rejected_as_duplicate() {
        let ctx = TestContext::new();
        let (_, poster_token) = ctx.member(MemberRole::Organization).await;
        let (_, speaker_token) = ctx.member(MemberRole::Speaker).await;
        let id = posted(&ctx, &poster_token).await;
        let uri = format!("/api/opportunities/{}/applications", id);

        expect_json(
            call(ctx.app(), Method::POST, &uri, Some(&speaker_token), Some(application_body())).await,
            StatusCode::CREATED,
        )
        .await;
        let body = expect_json(
            call(ctx.app(), Method::POST, &uri, Some(&speaker_token), Some(application_body())).await,
            StatusCode::BAD_REQUEST,
        )
        .await;

        assert_eq!(body["code"], "DUPLICATE_APPLICATION");
        assert_eq!(opportunity(&ctx, &poster_token, &id).await["application_count"], 1);
    }

    #[tokio::test]
    async fn organizations_cannot_apply() {
        let ctx = TestContext::new();
        let (_, poster_token) = ctx.member(MemberRole::Organization).await;
        let (_, other_token) = ctx.member(MemberRole::Organization).await;
        let id = posted(&ctx, &poster_token).await;

        let body = expect_json(
            call(
                ctx.app(),
                Method::POST,
                &format!("/api/opportunities/{}/applications", id),
                Some(&other_token),
                Some(application_body()),
            )
            .await,
            StatusCode::BAD_REQUEST,
        )
        .await;

        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn withdrawal_decrements_count() {
        let ctx = TestContext::new();
        let (_, poster_token) = ctx.member(MemberRole::Organization).await;
        let (_, speaker_token) = ctx.member(MemberRole::Speaker).await;
        let id = posted(&ctx, &poster_token).await;

        let application = expect_json(
            call(
                ctx.app(),
                Method::POST,
                &format!("/api/opportunities/{}/applications", id),
                Some(&speaker_token),
                Some(application_body()),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;

        let withdrawn = expect_json(
            call(
                ctx.app(),
                Method::PATCH,
                &format!("/api/applications/{}/status", application["id"].as_str().unwrap()),
                Some(&speaker_token),
                Some(json!({ "status": "withdrawn" })),
            )
            .await,
            StatusCode::OK,
        )
        .await;

        assert_eq!(withdrawn["status"], "withdrawn");
        assert_eq!(opportunity(&ctx, &poster_token, &id).await["application_count"], 0);
    }

    #[tokio::test]
    async fn poster_lists_applications_and_speaker_lists_own() {
        let ctx = TestContext::new();
        let (_, poster_token) = ctx.member(MemberRole::Organization).await;
        let (_, speaker_token) = ctx.member(MemberRole::Speaker).await;
        let id = posted(&ctx, &poster_token).await;
        let uri = format!("/api/opportunities/{}/applications", id);
        call(ctx.app(), Method::POST, &uri, Some(&speaker_token), Some(application_body())).await;

        let for_poster = expect_json(
            call(ctx.app(), Method::GET, &uri, Some(&poster_token), None).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(for_poster["total"], 1);

        let own = expect_json(
            call(ctx.app(), Method::GET, "/api/applications", Some(&speaker_token), None).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(own["items"][0]["opportunity_id"], id);

        let response = call(ctx.app(), Method::GET, &uri, Some(&speaker_token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn illegal_status_transition_is_bad_request() {
        let ctx = TestContext::new();
        let (_, token) = ctx.member(MemberRole::Organization).await;
        let id = posted(&ctx, &token).await;

        let body = expect_json(
            call(
                ctx.app(),
                Method::PATCH,
                &format!("/api/opportunities/{}/status", id),
                Some(&token),
                Some(json!({ "status": "draft" })),
            )
            .await,
            StatusCode::BAD_REQUEST,
        )
        .await;

        assert_eq!(body["code"], "INVALID_STATE_TRANSITION");
    }

    #[tokio::test]
    async fn page_size_above_limit_is_rejected() {
        let ctx = TestContext::new();
        let (_, token) = ctx.member(MemberRole::Speaker).await;

        let response = call(
            ctx.app(),
            Method::GET,
            "/api/opportunities?per_page=1000",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
