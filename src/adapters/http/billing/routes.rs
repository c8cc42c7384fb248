//! Axum routes for billing and inbound webhooks.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    cancel_subscription, create_checkout_session, create_setup_session, get_billing_overview,
    reactivate_subscription, stripe_webhook,
};

/// Mounted at `/api/billing`.
///
/// - `GET /subscription` - Tier, latest subscription, recent payments
/// - `POST /checkout` - Hosted checkout for a plan and period
/// - `POST /setup` - Hosted payment-method setup
/// - `POST /subscriptions/:id/cancel` - Cancel at period end
/// - `POST /subscriptions/:id/reactivate` - Undo a scheduled cancellation
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_billing_overview))
        .route("/checkout", post(create_checkout_session))
        .route("/setup", post(create_setup_session))
        .route("/subscriptions/:id/cancel", post(cancel_subscription))
        .route("/subscriptions/:id/reactivate", post(reactivate_subscription))
}

/// Mounted at `/api/webhooks`.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}
