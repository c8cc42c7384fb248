//! ChangeApplicationStatusHandler - Accept, reject or withdraw.

use std::sync::Arc;

use crate::domain::foundation::{ApplicationId, MemberId, Timestamp};
use crate::domain::workflow::{Application, ApplicationStatus, WorkflowError};
use crate::ports::{ApplicationRepository, OpportunityRepository};

#[derive(Debug, Clone)]
pub struct ChangeApplicationStatusCommand {
    pub application_id: ApplicationId,
    pub actor_id: MemberId,
    pub status: ApplicationStatus,
}

/// The poster decides; the applicant may withdraw. Anyone else gets
/// not found.
pub struct ChangeApplicationStatusHandler {
    opportunities: Arc<dyn OpportunityRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ChangeApplicationStatusHandler {
    pub fn new(
        opportunities: Arc<dyn OpportunityRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            opportunities,
            applications,
        }
    }

    pub async fn handle(
        &self,
        cmd: ChangeApplicationStatusCommand,
    ) -> Result<Application, WorkflowError> {
        let mut application = self
            .applications
            .find_by_id(&cmd.application_id)
            .await?
            .ok_or(WorkflowError::NotFound("Application"))?;
        let opportunity = self
            .opportunities
            .find_by_id(&application.opportunity_id)
            .await?
            .ok_or(WorkflowError::NotFound("Opportunity"))?;

        if !opportunity.is_posted_by(&cmd.actor_id) && application.speaker_id != cmd.actor_id {
            return Err(WorkflowError::NotFound("Application"));
        }

        application.change_status(&cmd.actor_id, &opportunity.poster_id, cmd.status, Timestamp::now())?;
        self.applications.update_status(&application).await?;

        tracing::info!(
            application_id = %application.id,
            actor_id = %cmd.actor_id,
            status = %application.status,
            "Application status changed"
        );
        Ok(application)
    }
}
