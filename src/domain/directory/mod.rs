//! Member and organization directory.

mod member;
mod organization;

pub use member::{Member, MemberFilter, MemberRole, MemberStatus, Profile, SubscriptionTier};
pub use organization::{
    authorize_role_grant, Organization, OrganizationDetails, OrganizationFilter,
    OrganizationMembership, OrganizationRole, OrganizationType,
};
