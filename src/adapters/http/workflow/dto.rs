//! Request bodies and query strings for opportunity and application endpoints.

use serde::Deserialize;

use crate::domain::foundation::{OrganizationId, Page, Timestamp, ValidationError};
use crate::domain::workflow::{
    ApplicationStatus, Compensation, EventFormat, NewOpportunity, OpportunityFilter,
    OpportunityStatus, Schedule,
};

/// POST /api/opportunities
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOpportunityRequest {
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub application_deadline: Option<Timestamp>,
    pub format: EventFormat,
    pub location: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub compensation: Compensation,
    /// Open immediately instead of saving a draft.
    #[serde(default)]
    pub publish: bool,
}

impl From<CreateOpportunityRequest> for NewOpportunity {
    fn from(request: CreateOpportunityRequest) -> Self {
        NewOpportunity {
            organization_id: request.organization_id,
            title: request.title,
            description: request.description,
            schedule: Schedule {
                starts_at: request.starts_at,
                ends_at: request.ends_at,
                application_deadline: request.application_deadline,
            },
            format: request.format,
            location: request.location,
            topics: request.topics,
            compensation: request.compensation,
            publish: request.publish,
        }
    }
}

/// Query string for GET /api/opportunities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOpportunitiesParams {
    pub status: Option<OpportunityStatus>,
    pub format: Option<EventFormat>,
    pub organization_id: Option<OrganizationId>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListOpportunitiesParams {
    pub fn into_parts(self) -> Result<(OpportunityFilter, Page), ValidationError> {
        let page = Page::from_query(self.page, self.per_page)?;
        let filter = OpportunityFilter {
            status: self.status,
            format: self.format,
            organization_id: self.organization_id,
            query: self.q,
        };
        Ok((filter, page))
    }
}

/// PATCH /api/opportunities/:id/status
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityStatusRequest {
    pub status: OpportunityStatus,
}

/// PATCH /api/applications/:id/status
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    pub fn page(self) -> Result<Page, ValidationError> {
        Page::from_query(self.page, self.per_page)
    }
}
