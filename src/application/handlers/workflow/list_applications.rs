//! Application listing queries.

use std::sync::Arc;

use crate::domain::foundation::{MemberId, OpportunityId, Page, PageResult};
use crate::domain::workflow::{Application, WorkflowError};
use crate::ports::{ApplicationRepository, OpportunityRepository};

#[derive(Debug, Clone)]
pub struct ListOpportunityApplicationsQuery {
    pub opportunity_id: OpportunityId,
    pub viewer_id: MemberId,
    pub page: Page,
}

/// Applications received for an opportunity. Poster only.
pub struct ListOpportunityApplicationsHandler {
    opportunities: Arc<dyn OpportunityRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ListOpportunityApplicationsHandler {
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
        query: ListOpportunityApplicationsQuery,
    ) -> Result<PageResult<Application>, WorkflowError> {
        let opportunity = self
            .opportunities
            .find_by_id(&query.opportunity_id)
            .await?
            .filter(|o| o.is_visible_to(&query.viewer_id))
            .ok_or(WorkflowError::NotFound("Opportunity"))?;
        if !opportunity.is_posted_by(&query.viewer_id) {
            return Err(WorkflowError::Forbidden(
                "Only the poster can list applications".to_string(),
            ));
        }

        Ok(self
            .applications
            .list_for_opportunity(&opportunity.id, query.page)
            .await?)
    }
}

#[derive(Debug, Clone)]
pub struct ListMyApplicationsQuery {
    pub speaker_id: MemberId,
    pub page: Page,
}

pub struct ListMyApplicationsHandler {
    applications: Arc<dyn ApplicationRepository>,
}

impl ListMyApplicationsHandler {
    pub fn new(applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { applications }
    }

    pub async fn handle(
        &self,
        query: ListMyApplicationsQuery,
    ) -> Result<PageResult<Application>, WorkflowError> {
        Ok(self
            .applications
            .list_for_speaker(&query.speaker_id, query.page)
            .await?)
    }
}
