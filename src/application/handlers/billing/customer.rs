//! Customer resolution shared by the hosted checkout and setup flows.

use crate::domain::billing::BillingError;
use crate::domain::foundation::MemberId;
use crate::ports::{CreateCustomerRequest, MemberRepository, PaymentError, PaymentProvider};

/// Returns the member's processor customer id, creating it on first use.
///
/// A new customer id is stored on the member before the caller opens any
/// hosted session, so a retried request reuses it.
pub(super) async fn resolve_customer(
    members: &dyn MemberRepository,
    payments: &dyn PaymentProvider,
    member_id: &MemberId,
) -> Result<String, BillingError> {
    let member = members
        .find_by_id(member_id)
        .await?
        .ok_or(BillingError::NotFound("Member"))?;

    if let Some(customer_id) = member.stripe_customer_id {
        return Ok(customer_id);
    }

    let customer = payments
        .create_customer(CreateCustomerRequest {
            member_id: member.id,
            email: member.email.clone(),
            name: Some(member.profile.display_name.clone()),
            idempotency_key: Some(format!("customer-{}", member.id)),
        })
        .await
        .map_err(|e| upstream("create_customer", e))?;

    members
        .set_stripe_customer_id(&member.id, &customer.id)
        .await?;

    tracing::info!(
        member_id = %member.id,
        customer_id = %customer.id,
        "Created payment customer"
    );
    Ok(customer.id)
}

/// Logs a processor failure and hides its detail from callers.
pub(super) fn upstream(operation: &'static str, err: PaymentError) -> BillingError {
    tracing::error!(
        operation,
        code = %err.code,
        provider_code = ?err.provider_code,
        error = %err.message,
        "Payment provider call failed"
    );
    BillingError::Upstream(err.to_string())
}
