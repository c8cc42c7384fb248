//! Shared harness: the full router over in-memory storage and mocked
//! identity and payment providers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use podium::adapters::auth::{test_user, MockSessionValidator, MockTokenRefresher};
use podium::adapters::http::{app_router, AppState, SessionSettings};
use podium::adapters::memory::{
    InMemoryMemberRepository, InMemoryMessageRepository, InMemoryOrganizationRepository,
    InMemoryPaymentLedger, InMemorySubscriptionRepository, InMemoryWorkflowStore,
};
use podium::adapters::replay::InMemoryReplayGuard;
use podium::adapters::stripe::MockPaymentProvider;
use podium::domain::billing::{sign_payload, BillingPeriod, Plan, PriceTable, StripeWebhookVerifier};
use podium::domain::directory::{Member, MemberRole, Profile};
use podium::domain::foundation::{MemberId, Timestamp};

pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub struct Harness {
    pub state: AppState,
    pub sessions: Arc<MockSessionValidator>,
    pub payments: MockPaymentProvider,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_refresher(MockTokenRefresher::new())
    }

    pub fn with_refresher(refresher: MockTokenRefresher) -> Self {
        let sessions = Arc::new(MockSessionValidator::new());
        let payments = MockPaymentProvider::new();
        let workflow = Arc::new(InMemoryWorkflowStore::new());
        let prices = PriceTable::new()
            .with_price(Plan::Basic, BillingPeriod::Monthly, Some("price_basic_m".into()))
            .with_price(Plan::Premium, BillingPeriod::Yearly, Some("price_premium_y".into()));

        let state = AppState {
            members: Arc::new(InMemoryMemberRepository::new()),
            organizations: Arc::new(InMemoryOrganizationRepository::new()),
            opportunities: workflow.clone(),
            applications: workflow,
            messages: Arc::new(InMemoryMessageRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            payments: Arc::new(payments.clone()),
            replay_guard: Arc::new(InMemoryReplayGuard::new()),
            session_validator: sessions.clone(),
            token_refresher: Arc::new(refresher),
            webhook_verifier: StripeWebhookVerifier::new(WEBHOOK_SECRET),
            prices,
            app_base_url: "https://podium.example".to_string(),
            session: SessionSettings::default(),
        };

        Self {
            state,
            sessions,
            payments,
        }
    }

    pub fn app(&self) -> Router {
        app_router(self.state.clone())
    }

    /// Stores a member and registers `token-<id>` for it.
    pub async fn member(&self, role: MemberRole, name: &str) -> (Member, String) {
        let id = MemberId::new();
        let member = Member::create(
            id,
            format!("{}@podium.example", id),
            role,
            Profile {
                display_name: name.to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        self.state.members.save(&member).await.unwrap();

        let token = format!("token-{}", id);
        self.sessions.add_token(&token, test_user(id));
        (member, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.app().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let response = self.send(method, uri, token, body).await;
        assert_eq!(response.status(), expected, "unexpected status for {}", uri);
        read_json(response).await
    }

    /// Posts `payload` to the webhook endpoint signed with the test secret.
    pub async fn deliver_webhook(&self, payload: &str) -> Response {
        let signature = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .header("Stripe-Signature", signature)
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.app().oneshot(request).await.unwrap()
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}
