//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API. Every
//! call is a form-encoded POST authenticated with the secret key as the
//! basic-auth username. Webhook verification lives in the billing domain,
//! not here.
//!
//! ```ignore
//! let adapter = StripePaymentAdapter::new(StripeConfig::new(api_key), http_client);
//! let customer = adapter.create_customer(request).await?;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ports::{
    CreateCheckoutRequest, CreateCustomerRequest, CreateSetupRequest, Customer, HostedSession,
    PaymentError, PaymentErrorCode, PaymentProvider, ProviderSubscription,
};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the API. Overridden in tests.
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    id: String,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    #[serde(default)]
    canceled_at: Option<i64>,
    #[serde(default)]
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-success Stripe response onto a `PaymentError`.
fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status));

    let code = match status.as_u16() {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimitExceeded,
        400 | 402 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let mut error = PaymentError::new(code, message);
    if let Some(body) = parsed.map(|e| e.error) {
        if let Some(provider_code) = body.code.or(body.error_type) {
            error = error.with_provider_code(provider_code);
        }
    }
    error
}

fn customer_params(request: &CreateCustomerRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("email".to_string(), request.email.clone()),
        ("metadata[member_id]".to_string(), request.member_id.to_string()),
    ];
    if let Some(name) = &request.name {
        params.push(("name".to_string(), name.clone()));
    }
    params
}

fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("customer".to_string(), request.customer_id.clone()),
        ("line_items[0][price]".to_string(), request.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (key, value) in &request.metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
        params.push((
            format!("subscription_data[metadata][{}]", key),
            value.clone(),
        ));
    }
    params
}

fn setup_params(request: &CreateSetupRequest) -> Vec<(String, String)> {
    vec![
        ("mode".to_string(), "setup".to_string()),
        ("customer".to_string(), request.customer_id.clone()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ]
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, PaymentError> {
        let mut request = self
            .http_client
            .post(self.config.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Stripe request failed");
            PaymentError::network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &body);
            tracing::error!(
                operation,
                status = %status,
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe API error"
            );
            return Err(error);
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to parse Stripe response");
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let customer: StripeCustomer = self
            .post_form(
                "create_customer",
                "/v1/customers",
                &customer_params(&request),
                request.idempotency_key.as_deref(),
            )
            .await?;

        tracing::info!(
            member_id = %request.member_id,
            customer_id = %customer.id,
            "Created Stripe customer"
        );

        Ok(Customer {
            id: customer.id,
            email: customer.email.or(Some(request.email)),
        })
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<HostedSession, PaymentError> {
        let session: StripeSession = self
            .post_form(
                "create_checkout_session",
                "/v1/checkout/sessions",
                &checkout_params(&request),
                None,
            )
            .await?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Checkout session has no url"))?;

        Ok(HostedSession {
            id: session.id,
            url,
        })
    }

    async fn create_setup_session(
        &self,
        request: CreateSetupRequest,
    ) -> Result<HostedSession, PaymentError> {
        let session: StripeSession = self
            .post_form(
                "create_setup_session",
                "/v1/checkout/sessions",
                &setup_params(&request),
                None,
            )
            .await?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Setup session has no url"))?;

        Ok(HostedSession {
            id: session.id,
            url,
        })
    }

    async fn set_cancel_at_period_end(
        &self,
        subscription_id: &str,
        cancel_at_period_end: bool,
    ) -> Result<ProviderSubscription, PaymentError> {
        let params = vec![(
            "cancel_at_period_end".to_string(),
            cancel_at_period_end.to_string(),
        )];
        let sub: StripeSubscription = self
            .post_form(
                "set_cancel_at_period_end",
                &format!("/v1/subscriptions/{}", subscription_id),
                &params,
                None,
            )
            .await?;

        Ok(ProviderSubscription {
            id: sub.id,
            status: sub.status,
            cancel_at_period_end: sub.cancel_at_period_end,
            canceled_at: sub.canceled_at,
            current_period_end: sub.current_period_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::MemberId;

    fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn config_defaults_to_live_api() {
        let config = StripeConfig::new("sk_test_123");
        assert_eq!(config.url("/v1/customers"), "https://api.stripe.com/v1/customers");
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = StripeConfig::new("sk_test_123").with_base_url("http://localhost:12111/");
        assert_eq!(config.url("/v1/customers"), "http://localhost:12111/v1/customers");
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = StripeConfig::new("sk_live_secret");
        assert!(!format!("{:?}", config).contains("sk_live_secret"));
    }

    #[test]
    fn customer_params_carry_member_metadata() {
        let member_id = MemberId::new();
        let params = customer_params(&CreateCustomerRequest {
            member_id,
            email: "a@example.com".to_string(),
            name: Some("Ada".to_string()),
            idempotency_key: None,
        });

        assert_eq!(lookup(&params, "email"), Some("a@example.com"));
        assert_eq!(lookup(&params, "name"), Some("Ada"));
        assert_eq!(
            lookup(&params, "metadata[member_id]"),
            Some(member_id.to_string().as_str())
        );
    }

    #[test]
    fn checkout_params_use_subscription_mode_and_metadata() {
        let params = checkout_params(&CreateCheckoutRequest {
            customer_id: "cus_1".to_string(),
            price_id: "price_basic_monthly".to_string(),
            success_url: "https://app/s".to_string(),
            cancel_url: "https://app/c".to_string(),
            metadata: vec![("plan".to_string(), "basic".to_string())],
        });

        assert_eq!(lookup(&params, "mode"), Some("subscription"));
        assert_eq!(lookup(&params, "customer"), Some("cus_1"));
        assert_eq!(lookup(&params, "line_items[0][price]"), Some("price_basic_monthly"));
        assert_eq!(lookup(&params, "line_items[0][quantity]"), Some("1"));
        assert_eq!(lookup(&params, "metadata[plan]"), Some("basic"));
        assert_eq!(
            lookup(&params, "subscription_data[metadata][plan]"),
            Some("basic")
        );
    }

    #[test]
    fn setup_params_use_setup_mode() {
        let params = setup_params(&CreateSetupRequest {
            customer_id: "cus_1".to_string(),
            success_url: "s".to_string(),
            cancel_url: "c".to_string(),
        });
        assert_eq!(lookup(&params, "mode"), Some("setup"));
        assert!(lookup(&params, "line_items[0][price]").is_none());
    }

    #[test]
    fn error_response_maps_status_and_provider_code() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"resource_missing","message":"No such price"}}"#;

        let err = error_from_response(reqwest::StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.message, "No such price");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn error_response_without_json_body_is_provider_error() {
        let err = error_from_response(reqwest::StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert!(err.provider_code.is_none());
    }

    #[test]
    fn error_response_maps_auth_and_rate_limit() {
        assert_eq!(
            error_from_response(reqwest::StatusCode::UNAUTHORIZED, "").code,
            PaymentErrorCode::AuthenticationError
        );
        assert_eq!(
            error_from_response(reqwest::StatusCode::TOO_MANY_REQUESTS, "").code,
            PaymentErrorCode::RateLimitExceeded
        );
    }
}
