//! HTTP handlers for subscriptions, checkout and the Stripe webhook.

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::billing::{
    CancelSubscriptionCommand, CreateCheckoutSessionCommand, CreateSetupSessionCommand,
    GetBillingOverviewQuery, HandleWebhookCommand, ReactivateSubscriptionCommand,
};
use crate::domain::foundation::SubscriptionId;

use super::dto::{
    BillingOverviewResponse, CheckoutRequest, CheckoutResponse, SetupResponse, WebhookAck,
};

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// GET /api/billing/subscription
pub async fn get_billing_overview(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state
        .billing_overview_handler()
        .handle(GetBillingOverviewQuery { member_id: user.id })
        .await?;
    Ok(Json(BillingOverviewResponse::from(overview)))
}

/// POST /api/billing/checkout
pub async fn create_checkout_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_checkout_session_handler()
        .handle(CreateCheckoutSessionCommand {
            member_id: user.id,
            plan: request.plan,
            period: request.period,
        })
        .await?;
    Ok(Json(CheckoutResponse::from(result)))
}

/// POST /api/billing/setup
pub async fn create_setup_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_setup_session_handler()
        .handle(CreateSetupSessionCommand { member_id: user.id })
        .await?;
    Ok(Json(SetupResponse::from(result)))
}

/// POST /api/billing/subscriptions/:id/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(subscription_id): Path<SubscriptionId>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .cancel_subscription_handler()
        .handle(CancelSubscriptionCommand {
            subscription_id,
            member_id: user.id,
        })
        .await?;
    Ok(Json(subscription))
}

/// POST /api/billing/subscriptions/:id/reactivate
pub async fn reactivate_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(subscription_id): Path<SubscriptionId>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .reactivate_subscription_handler()
        .handle(ReactivateSubscriptionCommand {
            subscription_id,
            member_id: user.id,
        })
        .await?;
    Ok(Json(subscription))
}

/// POST /api/webhooks/stripe
///
/// Unauthenticated; the signature over the raw body is the credential.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .webhook_handler()
        .handle(HandleWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;
    Ok(Json(WebhookAck { received: true }))
}
