//! Member and organization directory handlers.

mod add_organization_member;
mod complete_profile_setup;
mod create_organization;
mod get_member;
mod get_organization;
mod update_profile;

#[cfg(test)]
mod test_support;

pub use add_organization_member::{AddOrganizationMemberCommand, AddOrganizationMemberHandler};
pub use complete_profile_setup::{CompleteProfileSetupCommand, CompleteProfileSetupHandler};
pub use create_organization::{CreateOrganizationCommand, CreateOrganizationHandler};
pub use get_member::{GetMemberHandler, GetMemberQuery, ListMembersHandler, ListMembersQuery};
pub use get_organization::{
    GetOrganizationHandler, GetOrganizationQuery, ListOrganizationsHandler,
    ListOrganizationsQuery, OrganizationView,
};
pub use update_profile::{UpdateProfileCommand, UpdateProfileHandler};
