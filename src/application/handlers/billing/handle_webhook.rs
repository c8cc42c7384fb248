//! HandleWebhookHandler - Applies verified Stripe webhook events.
//!
//! Every write is keyed by a processor id (subscription id, invoice id), so a
//! redelivered event converges on the same rows. Nothing here calls the
//! processor back.

use std::sync::Arc;

use crate::domain::billing::{
    BillingPeriod, CheckoutSessionObject, InvoiceObject, Payment, Plan, PriceTable,
    ProviderSubscriptionState, RecordOutcome, StripeEvent, StripeEventType, StripeWebhookVerifier,
    Subscription, SubscriptionObject, SubscriptionStatus, WebhookError, MAX_EVENT_AGE_SECS,
};
use crate::domain::directory::{Member, SubscriptionTier};
use crate::domain::foundation::{MemberId, PaymentId, SubscriptionId, Timestamp};
use crate::ports::{MemberRepository, PaymentLedger, ReplayGuard, SubscriptionRepository};

/// Raw delivery as received over HTTP.
#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleWebhookResult {
    SubscriptionActivated {
        member_id: MemberId,
        subscription_id: SubscriptionId,
    },
    PaymentRecorded {
        invoice_id: String,
    },
    /// Invoice already in the ledger.
    PaymentAlreadyRecorded {
        invoice_id: String,
    },
    SubscriptionSynced {
        subscription_id: SubscriptionId,
        status: SubscriptionStatus,
    },
    SubscriptionTerminated {
        member_id: MemberId,
    },
    /// Event id processed within the replay window.
    Replayed,
    /// Acknowledged without changes.
    Ignored,
}

pub struct HandleWebhookHandler {
    verifier: StripeWebhookVerifier,
    replay_guard: Arc<dyn ReplayGuard>,
    members: Arc<dyn MemberRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn PaymentLedger>,
    prices: PriceTable,
}

impl HandleWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        replay_guard: Arc<dyn ReplayGuard>,
        members: Arc<dyn MemberRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn PaymentLedger>,
        prices: PriceTable,
    ) -> Self {
        Self {
            verifier,
            replay_guard,
            members,
            subscriptions,
            ledger,
            prices,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleWebhookCommand,
    ) -> Result<HandleWebhookResult, WebhookError> {
        let signature = cmd
            .signature
            .as_deref()
            .ok_or(WebhookError::MissingSignature)?;

        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected webhook delivery");
                e
            })?;

        match self.replay_guard.seen(&event.id).await {
            Ok(true) => {
                tracing::info!(event_id = %event.id, "Webhook replay acknowledged");
                return Ok(HandleWebhookResult::Replayed);
            }
            Ok(false) => {}
            Err(e) => {
                // processing below is idempotent per processor id
                tracing::warn!(event_id = %event.id, error = %e, "Replay guard unavailable");
            }
        }

        let result = match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.checkout_completed(&event).await?,
            StripeEventType::InvoicePaymentSucceeded => self.invoice_paid(&event).await?,
            StripeEventType::CustomerSubscriptionUpdated => {
                self.subscription_updated(&event).await?
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.subscription_deleted(&event).await?
            }
            StripeEventType::Other => {
                tracing::debug!(event_type = %event.event_type, "Unhandled webhook event type");
                HandleWebhookResult::Ignored
            }
        };

        if let Err(e) = self
            .replay_guard
            .remember(&event.id, MAX_EVENT_AGE_SECS as u64)
            .await
        {
            tracing::warn!(event_id = %event.id, error = %e, "Failed to record webhook event id");
        }

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            outcome = ?result,
            "Webhook processed"
        );
        Ok(result)
    }

    async fn checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleWebhookResult, WebhookError> {
        let session: CheckoutSessionObject = parse_object(event)?;

        let Some(stripe_subscription_id) = session.subscription.clone() else {
            tracing::debug!(session_id = %session.id, mode = ?session.mode, "Checkout without subscription");
            return Ok(HandleWebhookResult::Ignored);
        };
        let customer_id = session
            .customer
            .clone()
            .ok_or(WebhookError::MissingField("customer"))?;

        let member = self
            .member_for(session.metadata.get("member_id"), &customer_id)
            .await?;
        let plan: Plan = metadata_value(&session.metadata, "plan")?;
        let period: BillingPeriod = metadata_value(&session.metadata, "period")?;
        let price_id = self.prices.price_for(plan, period).map(str::to_string);

        let now = Timestamp::now();
        let subscription = match self
            .subscriptions
            .find_by_external_id(&stripe_subscription_id)
            .await?
        {
            // status stays whatever later events already recorded
            Some(mut existing) => {
                existing.member_id = member.id;
                existing.plan = plan;
                existing.period = period;
                if existing.stripe_price_id.is_none() {
                    existing.stripe_price_id = price_id;
                }
                existing.updated_at = now;
                existing
            }
            None => {
                self.supersede_live(&member.id, &stripe_subscription_id, now)
                    .await?;
                Subscription::from_checkout(
                    member.id,
                    stripe_subscription_id,
                    customer_id,
                    plan,
                    period,
                    price_id,
                    now,
                )
            }
        };

        let stored = self.subscriptions.upsert_by_external_id(&subscription).await?;
        if !stored.has_access() {
            tracing::info!(
                subscription = %stored.stripe_subscription_id,
                status = %stored.status,
                "Checkout completed for a subscription without access"
            );
            self.sync_tier(&member.id).await?;
            return Ok(HandleWebhookResult::SubscriptionSynced {
                subscription_id: stored.id,
                status: stored.status,
            });
        }
        self.members.set_tier(&member.id, stored.plan.tier()).await?;

        Ok(HandleWebhookResult::SubscriptionActivated {
            member_id: member.id,
            subscription_id: stored.id,
        })
    }

    async fn invoice_paid(&self, event: &StripeEvent) -> Result<HandleWebhookResult, WebhookError> {
        let invoice: InvoiceObject = parse_object(event)?;

        let subscription = match invoice.subscription.as_deref() {
            Some(external_id) => self.subscriptions.find_by_external_id(external_id).await?,
            None => None,
        };

        let by_customer = match invoice.customer.as_deref() {
            Some(customer_id) => self.members.find_by_stripe_customer_id(customer_id).await?,
            None => None,
        };
        let member_id = by_customer
            .map(|m| m.id)
            .or_else(|| subscription.as_ref().map(|s| s.member_id))
            .ok_or(WebhookError::MemberNotFound)?;

        let now = Timestamp::now();
        let payment = Payment {
            id: PaymentId::new(),
            member_id,
            subscription_id: subscription.map(|s| s.id),
            stripe_invoice_id: invoice.id.clone(),
            stripe_charge_id: invoice.charge.clone(),
            stripe_payment_intent_id: invoice.payment_intent.clone(),
            amount_cents: invoice.amount_paid,
            currency: invoice.currency.clone(),
            paid_at: invoice
                .paid_at()
                .and_then(Timestamp::from_unix_secs)
                .unwrap_or(now),
            created_at: now,
        };

        Ok(match self.ledger.record(&payment).await? {
            RecordOutcome::Inserted => HandleWebhookResult::PaymentRecorded {
                invoice_id: invoice.id,
            },
            RecordOutcome::AlreadyRecorded => HandleWebhookResult::PaymentAlreadyRecorded {
                invoice_id: invoice.id,
            },
        })
    }

    async fn subscription_updated(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleWebhookResult, WebhookError> {
        let object: SubscriptionObject = parse_object(event)?;
        let state = self.provider_state(&object);
        let now = Timestamp::now();

        let mut subscription = match self.subscriptions.find_by_external_id(&object.id).await? {
            Some(existing) => existing,
            None => {
                let Some(member) = self
                    .members
                    .find_by_stripe_customer_id(&object.customer)
                    .await?
                else {
                    tracing::debug!(subscription = %object.id, "Update for unknown customer");
                    return Ok(HandleWebhookResult::Ignored);
                };
                let plan = state.plan.or_else(|| {
                    let plan = object.metadata.get("plan")?.parse().ok()?;
                    let period = object.metadata.get("period")?.parse().ok()?;
                    Some((plan, period))
                });
                let Some((plan, period)) = plan else {
                    tracing::warn!(subscription = %object.id, "Update for subscription with unknown price");
                    return Ok(HandleWebhookResult::Ignored);
                };
                Subscription::from_checkout(
                    member.id,
                    object.id.clone(),
                    object.customer.clone(),
                    plan,
                    period,
                    state.price_id.clone(),
                    now,
                )
            }
        };

        subscription.apply_provider_state(state, now);
        let stored = self.subscriptions.upsert_by_external_id(&subscription).await?;

        let tier = if stored.has_access() {
            stored.plan.tier()
        } else {
            SubscriptionTier::Free
        };
        self.members.set_tier(&stored.member_id, tier).await?;

        Ok(HandleWebhookResult::SubscriptionSynced {
            subscription_id: stored.id,
            status: stored.status,
        })
    }

    async fn subscription_deleted(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleWebhookResult, WebhookError> {
        let object: SubscriptionObject = parse_object(event)?;
        let now = Timestamp::now();
        let ended_at = object
            .ended_at
            .or(object.canceled_at)
            .and_then(Timestamp::from_unix_secs);

        let member_id = match self.subscriptions.find_by_external_id(&object.id).await? {
            Some(mut subscription) => {
                subscription.terminate(ended_at, now);
                self.subscriptions.update(&subscription).await?;
                subscription.member_id
            }
            None => match self
                .members
                .find_by_stripe_customer_id(&object.customer)
                .await?
            {
                Some(member) => member.id,
                None => {
                    tracing::debug!(subscription = %object.id, "Deletion for unknown subscription");
                    return Ok(HandleWebhookResult::Ignored);
                }
            },
        };

        self.sync_tier(&member_id).await?;
        Ok(HandleWebhookResult::SubscriptionTerminated { member_id })
    }

    /// Sets the member's tier from their live subscription, or Free.
    async fn sync_tier(&self, member_id: &MemberId) -> Result<(), WebhookError> {
        let tier = match self.subscriptions.find_live_for_member(member_id).await? {
            Some(live) if live.has_access() => live.plan.tier(),
            _ => SubscriptionTier::Free,
        };
        self.members.set_tier(member_id, tier).await?;
        Ok(())
    }

    /// Ends a different live row of the member before a new one is stored.
    async fn supersede_live(
        &self,
        member_id: &MemberId,
        stripe_subscription_id: &str,
        now: Timestamp,
    ) -> Result<(), WebhookError> {
        let Some(mut previous) = self.subscriptions.find_live_for_member(member_id).await? else {
            return Ok(());
        };
        if previous.stripe_subscription_id == stripe_subscription_id {
            return Ok(());
        }
        tracing::warn!(
            member_id = %member_id,
            previous = %previous.stripe_subscription_id,
            replacement = %stripe_subscription_id,
            "Superseding live subscription"
        );
        previous.terminate(None, now);
        self.subscriptions.update(&previous).await?;
        Ok(())
    }

    /// Prefers the member named in checkout metadata, then the customer link.
    async fn member_for(
        &self,
        metadata_member: Option<&String>,
        customer_id: &str,
    ) -> Result<Member, WebhookError> {
        if let Some(id) = metadata_member.and_then(|raw| raw.parse::<MemberId>().ok()) {
            if let Some(member) = self.members.find_by_id(&id).await? {
                return Ok(member);
            }
        }
        self.members
            .find_by_stripe_customer_id(customer_id)
            .await?
            .ok_or(WebhookError::MemberNotFound)
    }

    fn provider_state(&self, object: &SubscriptionObject) -> ProviderSubscriptionState {
        let status = SubscriptionStatus::from_provider(&object.status).unwrap_or_else(|| {
            tracing::warn!(
                subscription = %object.id,
                status = %object.status,
                "Unmapped provider subscription status, treating as incomplete"
            );
            SubscriptionStatus::Incomplete
        });
        let price_id = object.price_id().map(str::to_string);

        ProviderSubscriptionState {
            status,
            cancel_at_period_end: object.cancel_at_period_end,
            cancelled_at: object.canceled_at.and_then(Timestamp::from_unix_secs),
            current_period_start: object.current_period_start.and_then(Timestamp::from_unix_secs),
            current_period_end: object.current_period_end.and_then(Timestamp::from_unix_secs),
            plan: price_id
                .as_deref()
                .and_then(|price| self.prices.plan_for_price(price)),
            price_id,
        }
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(e.to_string()))
}

fn metadata_value<T: std::str::FromStr>(
    metadata: &std::collections::HashMap<String, String>,
    key: &'static str,
) -> Result<T, WebhookError> {
    metadata
        .get(key)
        .and_then(|raw| raw.parse().ok())
        .ok_or(WebhookError::MissingMetadata(key))
}
