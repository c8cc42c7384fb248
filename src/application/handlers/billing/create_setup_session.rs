//! CreateSetupSessionHandler - Opens a hosted payment-method setup flow.

use std::sync::Arc;

use super::customer::{resolve_customer, upstream};
use crate::domain::billing::BillingError;
use crate::domain::foundation::MemberId;
use crate::ports::{CreateSetupRequest, MemberRepository, PaymentProvider};

#[derive(Debug, Clone)]
pub struct CreateSetupSessionCommand {
    pub member_id: MemberId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSetupSessionResult {
    pub session_id: String,
    pub setup_url: String,
}

pub struct CreateSetupSessionHandler {
    members: Arc<dyn MemberRepository>,
    payments: Arc<dyn PaymentProvider>,
    app_base_url: String,
}

impl CreateSetupSessionHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        payments: Arc<dyn PaymentProvider>,
        app_base_url: impl Into<String>,
    ) -> Self {
        Self {
            members,
            payments,
            app_base_url: app_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSetupSessionCommand,
    ) -> Result<CreateSetupSessionResult, BillingError> {
        let customer_id =
            resolve_customer(self.members.as_ref(), self.payments.as_ref(), &cmd.member_id)
                .await?;

        let session = self
            .payments
            .create_setup_session(CreateSetupRequest {
                customer_id,
                success_url: format!("{}/dashboard/billing?setup=success", self.app_base_url),
                cancel_url: format!("{}/dashboard/billing?setup=cancelled", self.app_base_url),
            })
            .await
            .map_err(|e| upstream("create_setup_session", e))?;

        tracing::info!(member_id = %cmd.member_id, session_id = %session.id, "Setup session created");

        Ok(CreateSetupSessionResult {
            session_id: session.id,
            setup_url: session.url,
        })
    }
}
