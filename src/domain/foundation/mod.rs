//! Foundation module - Shared domain primitives.
//!
//! Identifiers, time, paging and error types used by every Podium component.

mod auth;
mod enum_text;
mod errors;
mod ids;
mod pagination;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, SessionTokens};
pub(crate) use enum_text::text_enum;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    ApplicationId, MemberId, MessageId, OpportunityId, OrganizationId, PaymentId,
    SubscriptionId,
};
pub use pagination::{Page, PageResult, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
