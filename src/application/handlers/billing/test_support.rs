//! Fixtures shared by the billing handler tests.

use crate::domain::billing::{
    sign_payload, BillingPeriod, Plan, PriceTable, StripeWebhookVerifier,
};
use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{MemberId, Timestamp};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn member() -> Member {
    let id = MemberId::new();
    Member::create(
        id,
        format!("{}@speakers.test", id),
        MemberRole::Speaker,
        Profile {
            display_name: "Grace Hopper".to_string(),
            ..Default::default()
        },
        Timestamp::now(),
    )
    .unwrap()
}

/// Basic and Standard are priced; Premium is deliberately missing.
pub fn prices() -> PriceTable {
    PriceTable::new()
        .with_price(Plan::Basic, BillingPeriod::Monthly, Some("price_basic_monthly".into()))
        .with_price(Plan::Basic, BillingPeriod::Yearly, Some("price_basic_yearly".into()))
        .with_price(
            Plan::Standard,
            BillingPeriod::Monthly,
            Some("price_standard_monthly".into()),
        )
}

pub fn verifier() -> StripeWebhookVerifier {
    StripeWebhookVerifier::new(WEBHOOK_SECRET)
}

/// Signed `(payload, header)` for an event built from `object`.
pub fn signed_event(id: &str, event_type: &str, object: serde_json::Value) -> (Vec<u8>, String) {
    let payload = serde_json::json!({
        "id": id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": object },
    })
    .to_string();
    let header = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);
    (payload.into_bytes(), header)
}
