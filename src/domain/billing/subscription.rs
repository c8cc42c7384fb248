//! Local mirror of a processor subscription.
//!
//! The processor is authoritative; webhooks overwrite this record. The only
//! local writes outside webhooks are the cancel / reactivate flags, set right
//! after the processor accepted the same change.

use serde::{Deserialize, Serialize};

use super::{BillingError, BillingPeriod, Plan};
use crate::domain::foundation::{text_enum, MemberId, SubscriptionId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
    Paused,
    Trialing,
    /// Not yet paid or not recognized. Grants no access.
    Incomplete,
}

text_enum!(SubscriptionStatus, "status", {
    Active => "active",
    Cancelled => "cancelled",
    PastDue => "past_due",
    Paused => "paused",
    Trialing => "trialing",
    Incomplete => "incomplete",
});

impl SubscriptionStatus {
    /// Maps a processor status string.
    ///
    /// Returns `None` for statuses this service does not know; callers fall
    /// back to [`SubscriptionStatus::Incomplete`].
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" | "unpaid" => Some(Self::PastDue),
            "canceled" | "incomplete_expired" => Some(Self::Cancelled),
            "paused" => Some(Self::Paused),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// Statuses that grant the plan's tier.
    pub fn has_access(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::PastDue
        )
    }
}

/// Subscription fields as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSubscriptionState {
    pub status: SubscriptionStatus,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<Timestamp>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub price_id: Option<String>,
    pub plan: Option<(Plan, BillingPeriod)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub member_id: MemberId,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: String,
    pub stripe_price_id: Option<String>,
    pub plan: Plan,
    pub period: BillingPeriod,
    pub status: SubscriptionStatus,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<Timestamp>,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// New active subscription from a completed checkout.
    pub fn from_checkout(
        member_id: MemberId,
        stripe_subscription_id: impl Into<String>,
        stripe_customer_id: impl Into<String>,
        plan: Plan,
        period: BillingPeriod,
        stripe_price_id: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            member_id,
            stripe_subscription_id: stripe_subscription_id.into(),
            stripe_customer_id: stripe_customer_id.into(),
            stripe_price_id,
            plan,
            period,
            status: SubscriptionStatus::Active,
            cancel_at_period_end: false,
            cancelled_at: None,
            current_period_start: now,
            current_period_end: now.add_days(period.days()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.status == SubscriptionStatus::Cancelled
    }

    pub fn has_access(&self) -> bool {
        self.status.has_access()
    }

    /// Flags the subscription to end at the close of the current period.
    pub fn schedule_cancellation(&mut self, now: Timestamp) -> Result<(), BillingError> {
        if self.is_terminated() {
            return Err(BillingError::InvalidState(
                "Subscription has already ended".to_string(),
            ));
        }
        self.cancel_at_period_end = true;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Clears a scheduled cancellation.
    pub fn reactivate(&mut self, now: Timestamp) -> Result<(), BillingError> {
        if self.is_terminated() {
            return Err(BillingError::InvalidState(
                "Subscription has already ended and cannot be reactivated".to_string(),
            ));
        }
        self.cancel_at_period_end = false;
        self.cancelled_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Overwrites local fields with what the processor reported.
    pub fn apply_provider_state(&mut self, state: ProviderSubscriptionState, now: Timestamp) {
        self.status = state.status;
        self.cancel_at_period_end = state.cancel_at_period_end;
        self.cancelled_at = if state.cancel_at_period_end || state.status == SubscriptionStatus::Cancelled {
            state.cancelled_at.or(self.cancelled_at).or(Some(now))
        } else {
            None
        };
        if let Some(start) = state.current_period_start {
            self.current_period_start = start;
        }
        if let Some(end) = state.current_period_end {
            self.current_period_end = end;
        }
        if state.price_id.is_some() {
            self.stripe_price_id = state.price_id;
        }
        if let Some((plan, period)) = state.plan {
            self.plan = plan;
            self.period = period;
        }
        self.updated_at = now;
    }

    /// Marks the subscription as ended by the processor.
    pub fn terminate(&mut self, ended_at: Option<Timestamp>, now: Timestamp) {
        self.status = SubscriptionStatus::Cancelled;
        self.cancel_at_period_end = false;
        self.cancelled_at = Some(ended_at.or(self.cancelled_at).unwrap_or(now));
        self.updated_at = now;
    }
}
