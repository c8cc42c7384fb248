//! Stripe webhook event envelope and the payload objects we read.
//!
//! Only fields used by reconciliation are captured; everything else in
//! Stripe's schema is ignored on deserialization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stripe webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Deserializes the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }
}

/// Event types reconciliation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    InvoicePaymentSucceeded,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    /// Acknowledged without processing.
    Other,
}

impl StripeEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Other => "other",
        }
    }
}

/// `checkout.session` object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// `subscription` object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub items: ObjectList<SubscriptionItem>,
}

impl SubscriptionObject {
    /// Price id of the first item.
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ObjectList<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

impl<T> Default for ObjectList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionItem {
    pub price: PriceRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceRef {
    pub id: String,
}

/// `invoice` object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceObject {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub charge: Option<String>,
    pub payment_intent: Option<String>,
    pub amount_paid: i64,
    pub currency: String,
    #[serde(default)]
    pub status_transitions: Option<InvoiceStatusTransitions>,
    pub created: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceStatusTransitions {
    pub paid_at: Option<i64>,
}

impl InvoiceObject {
    pub fn paid_at(&self) -> Option<i64> {
        self.status_transitions
            .as_ref()
            .and_then(|t| t.paid_at)
            .or(self.created)
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": { "object": {} }
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.parsed_type(), StripeEventType::CheckoutSessionCompleted);
        assert!(!event.livemode);
        assert!(event.api_version.is_none());
    }

    #[test]
    fn unhandled_types_parse_as_other() {
        assert_eq!(StripeEventType::parse("invoice.payment_failed"), StripeEventType::Other);
        assert_eq!(StripeEventType::parse("customer.created"), StripeEventType::Other);
    }

    #[test]
    fn handled_types_round_trip_through_str() {
        for t in [
            StripeEventType::CheckoutSessionCompleted,
            StripeEventType::InvoicePaymentSucceeded,
            StripeEventType::CustomerSubscriptionUpdated,
            StripeEventType::CustomerSubscriptionDeleted,
        ] {
            assert_eq!(StripeEventType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn subscription_object_exposes_first_price() {
        let event = StripeEventBuilder::new()
            .event_type("customer.subscription.updated")
            .object(json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "active",
                "cancel_at_period_end": true,
                "canceled_at": 1704067200,
                "current_period_start": 1704067200,
                "current_period_end": 1706745600,
                "items": { "object": "list", "data": [ { "id": "si_1", "price": { "id": "price_1", "product": "prod_1" } } ] }
            }))
            .build();

        let sub: SubscriptionObject = event.deserialize_object().unwrap();
        assert_eq!(sub.price_id(), Some("price_1"));
        assert!(sub.cancel_at_period_end);
    }

    #[test]
    fn invoice_paid_at_falls_back_to_created() {
        let invoice: InvoiceObject = serde_json::from_value(json!({
            "id": "in_1",
            "customer": "cus_1",
            "subscription": "sub_1",
            "charge": "ch_1",
            "payment_intent": "pi_1",
            "amount_paid": 2900,
            "currency": "usd",
            "created": 1704067200
        }))
        .unwrap();
        assert_eq!(invoice.paid_at(), Some(1704067200));
    }

    #[test]
    fn checkout_session_metadata_is_optional() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "id": "cs_1",
            "customer": "cus_1",
            "subscription": null
        }))
        .unwrap();
        assert!(session.metadata.is_empty());
        assert!(session.subscription.is_none());
    }
}
