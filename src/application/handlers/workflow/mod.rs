//! Opportunity and application handlers.

mod change_application_status;
mod create_opportunity;
mod get_opportunity;
mod list_applications;
mod submit_application;
mod update_opportunity_status;

#[cfg(test)]
mod test_support;

pub use change_application_status::{ChangeApplicationStatusCommand, ChangeApplicationStatusHandler};
pub use create_opportunity::{CreateOpportunityCommand, CreateOpportunityHandler};
pub use get_opportunity::{
    GetOpportunityHandler, GetOpportunityQuery, ListOpportunitiesHandler, ListOpportunitiesQuery,
};
pub use list_applications::{
    ListMyApplicationsHandler, ListMyApplicationsQuery, ListOpportunityApplicationsHandler,
    ListOpportunityApplicationsQuery,
};
pub use submit_application::{SubmitApplicationCommand, SubmitApplicationHandler};
pub use update_opportunity_status::{UpdateOpportunityStatusCommand, UpdateOpportunityStatusHandler};
