//! Opportunity queries.

use std::sync::Arc;

use crate::domain::foundation::{MemberId, OpportunityId, Page, PageResult};
use crate::domain::workflow::{Opportunity, OpportunityFilter, WorkflowError};
use crate::ports::OpportunityRepository;

#[derive(Debug, Clone)]
pub struct GetOpportunityQuery {
    pub opportunity_id: OpportunityId,
    pub viewer_id: MemberId,
}

/// Drafts read as not found for anyone but the poster.
pub struct GetOpportunityHandler {
    opportunities: Arc<dyn OpportunityRepository>,
}

impl GetOpportunityHandler {
    pub fn new(opportunities: Arc<dyn OpportunityRepository>) -> Self {
        Self { opportunities }
    }

    pub async fn handle(&self, query: GetOpportunityQuery) -> Result<Opportunity, WorkflowError> {
        self.opportunities
            .find_by_id(&query.opportunity_id)
            .await?
            .filter(|o| o.is_visible_to(&query.viewer_id))
            .ok_or(WorkflowError::NotFound("Opportunity"))
    }
}

#[derive(Debug, Clone)]
pub struct ListOpportunitiesQuery {
    pub viewer_id: MemberId,
    pub filter: OpportunityFilter,
    pub page: Page,
}

pub struct ListOpportunitiesHandler {
    opportunities: Arc<dyn OpportunityRepository>,
}

impl ListOpportunitiesHandler {
    pub fn new(opportunities: Arc<dyn OpportunityRepository>) -> Self {
        Self { opportunities }
    }

    pub async fn handle(
        &self,
        query: ListOpportunitiesQuery,
    ) -> Result<PageResult<Opportunity>, WorkflowError> {
        Ok(self
            .opportunities
            .list(&query.filter, &query.viewer_id, query.page)
            .await?)
    }
}
