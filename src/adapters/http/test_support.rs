//! In-memory `AppState` and request helpers for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use super::router::app_router;
use super::state::{AppState, SessionSettings};
use crate::adapters::auth::{MockSessionValidator, MockTokenRefresher};
use crate::adapters::memory::{
    InMemoryMemberRepository, InMemoryMessageRepository, InMemoryOrganizationRepository,
    InMemoryPaymentLedger, InMemorySubscriptionRepository, InMemoryWorkflowStore,
};
use crate::adapters::replay::InMemoryReplayGuard;
use crate::adapters::stripe::MockPaymentProvider;
use crate::domain::billing::{BillingPeriod, Plan, PriceTable, StripeWebhookVerifier};
use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{MemberId, Timestamp};

pub const WEBHOOK_SECRET: &str = "whsec_router_test";

/// State plus handles on the mocks behind it.
pub struct TestContext {
    pub state: AppState,
    pub sessions: Arc<MockSessionValidator>,
    pub payments: MockPaymentProvider,
}

impl TestContext {
    pub fn new() -> Self {
        let sessions = Arc::new(MockSessionValidator::new());
        let payments = MockPaymentProvider::new();
        let store = Arc::new(InMemoryWorkflowStore::new());
        let state = AppState {
            members: Arc::new(InMemoryMemberRepository::new()),
            organizations: Arc::new(InMemoryOrganizationRepository::new()),
            opportunities: store.clone(),
            applications: store,
            messages: Arc::new(InMemoryMessageRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            payments: Arc::new(payments.clone()),
            replay_guard: Arc::new(InMemoryReplayGuard::new()),
            session_validator: sessions.clone(),
            token_refresher: Arc::new(MockTokenRefresher::new()),
            webhook_verifier: StripeWebhookVerifier::new(WEBHOOK_SECRET),
            prices: PriceTable::new()
                .with_price(Plan::Basic, BillingPeriod::Monthly, Some("price_basic_m".into())),
            app_base_url: "https://podium.test".to_string(),
            session: SessionSettings::default(),
        };
        Self {
            state,
            sessions,
            payments,
        }
    }

    /// Seeds a member and returns it with a bearer token that resolves to it.
    pub async fn member(&self, role: MemberRole) -> (Member, String) {
        let member = seed_member(&self.state, role).await;
        let token = format!("token-{}", member.id);
        self.sessions.add_token(&token, crate::adapters::auth::test_user(member.id));
        (member, token)
    }

    /// A token for an identity with no member record yet.
    pub fn identity(&self) -> (MemberId, String) {
        let id = MemberId::new();
        let token = format!("token-{}", id);
        self.sessions.add_token(&token, crate::adapters::auth::test_user(id));
        (id, token)
    }

    pub fn app(&self) -> Router {
        app_router(self.state.clone())
    }
}

pub fn test_state() -> AppState {
    TestContext::new().state
}

pub async fn seed_member(state: &AppState, role: MemberRole) -> Member {
    let id = MemberId::new();
    let member = Member::create(
        id,
        format!("{}@podium.test", id),
        role,
        Profile {
            display_name: format!("Member {}", &id.to_string()[..8]),
            ..Default::default()
        },
        Timestamp::now(),
    )
    .unwrap();
    state.members.save(&member).await.unwrap();
    member
}

pub async fn call(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the status and returns the JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    json_body(response).await
}
