//! Opportunity and application workflow.

mod application;
mod errors;
mod opportunity;

pub use application::{Application, ApplicationForm, ApplicationStatus};
pub use errors::WorkflowError;
pub use opportunity::{
    Compensation, EventFormat, NewOpportunity, Opportunity, OpportunityFilter, OpportunityStatus,
    Schedule,
};

#[cfg(test)]
pub(crate) use opportunity::tests::new_opportunity;
