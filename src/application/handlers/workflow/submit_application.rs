//! SubmitApplicationHandler - A speaker applies to an open opportunity.
//!
//! Duplicate detection is left to storage: the repository reports a unique
//! violation on the active (speaker, opportunity) pair, and the counter is
//! recomputed in the same write.

use std::sync::Arc;

use crate::domain::foundation::{MemberId, OpportunityId, Timestamp, ValidationError};
use crate::domain::workflow::{Application, ApplicationForm, WorkflowError};
use crate::ports::{ApplicationRepository, MemberRepository, OpportunityRepository};

#[derive(Debug, Clone)]
pub struct SubmitApplicationCommand {
    pub opportunity_id: OpportunityId,
    pub speaker_id: MemberId,
    pub form: ApplicationForm,
}

pub struct SubmitApplicationHandler {
    members: Arc<dyn MemberRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl SubmitApplicationHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        opportunities: Arc<dyn OpportunityRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            members,
            opportunities,
            applications,
        }
    }

    pub async fn handle(&self, cmd: SubmitApplicationCommand) -> Result<Application, WorkflowError> {
        let speaker = self
            .members
            .find_by_id(&cmd.speaker_id)
            .await?
            .ok_or(WorkflowError::NotFound("Member"))?;
        if !speaker.is_speaker() {
            return Err(ValidationError::invalid_format(
                "role",
                "Only speakers can apply to opportunities",
            )
            .into());
        }

        let now = Timestamp::now();
        let opportunity = self
            .opportunities
            .find_by_id(&cmd.opportunity_id)
            .await?
            .filter(|o| o.is_visible_to(&speaker.id))
            .ok_or(WorkflowError::NotFound("Opportunity"))?;
        if !opportunity.accepts_applications(now) {
            return Err(ValidationError::invalid_format(
                "opportunity",
                "This opportunity is not accepting applications",
            )
            .into());
        }

        let application = Application::submit(opportunity.id, speaker.id, cmd.form, now)?;
        self.applications.submit(&application).await?;

        tracing::info!(
            application_id = %application.id,
            opportunity_id = %opportunity.id,
            speaker_id = %speaker.id,
            "Application submitted"
        );
        Ok(application)
    }
}
