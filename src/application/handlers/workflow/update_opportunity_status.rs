//! UpdateOpportunityStatusHandler - Poster-driven status changes.

use std::sync::Arc;

use crate::domain::foundation::{MemberId, OpportunityId, Timestamp};
use crate::domain::workflow::{Opportunity, OpportunityStatus, WorkflowError};
use crate::ports::OpportunityRepository;

#[derive(Debug, Clone)]
pub struct UpdateOpportunityStatusCommand {
    pub opportunity_id: OpportunityId,
    pub actor_id: MemberId,
    pub status: OpportunityStatus,
}

pub struct UpdateOpportunityStatusHandler {
    opportunities: Arc<dyn OpportunityRepository>,
}

impl UpdateOpportunityStatusHandler {
    pub fn new(opportunities: Arc<dyn OpportunityRepository>) -> Self {
        Self { opportunities }
    }

    pub async fn handle(
        &self,
        cmd: UpdateOpportunityStatusCommand,
    ) -> Result<Opportunity, WorkflowError> {
        let mut opportunity = self
            .opportunities
            .find_by_id(&cmd.opportunity_id)
            .await?
            .filter(|o| o.is_visible_to(&cmd.actor_id))
            .ok_or(WorkflowError::NotFound("Opportunity"))?;

        if !opportunity.is_posted_by(&cmd.actor_id) {
            return Err(WorkflowError::Forbidden(
                "Only the poster can change this opportunity".to_string(),
            ));
        }

        let from = opportunity.status;
        opportunity
            .change_status(cmd.status, Timestamp::now())
            .map_err(|_| WorkflowError::InvalidTransition {
                from: from.to_string(),
                to: cmd.status.to_string(),
            })?;
        self.opportunities.update(&opportunity).await?;

        tracing::info!(
            opportunity_id = %opportunity.id,
            from = %from,
            to = %opportunity.status,
            "Opportunity status changed"
        );
        Ok(opportunity)
    }
}
