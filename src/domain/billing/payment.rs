//! Append-only payment ledger entry.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, PaymentId, SubscriptionId, Timestamp};

/// One successful invoice payment. The invoice id is unique in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub member_id: MemberId,
    pub subscription_id: Option<SubscriptionId>,
    pub stripe_invoice_id: String,
    pub stripe_charge_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    /// Minor currency units.
    pub amount_cents: i64,
    pub currency: String,
    pub paid_at: Timestamp,
    pub created_at: Timestamp,
}

/// Result of an insert-if-absent on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    AlreadyRecorded,
}
