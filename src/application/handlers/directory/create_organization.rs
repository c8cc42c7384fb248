//! CreateOrganizationHandler - Registers an organization with its creator as owner.

use std::sync::Arc;

use crate::domain::directory::{
    Organization, OrganizationDetails, OrganizationMembership, OrganizationRole,
};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Timestamp};
use crate::ports::{MemberRepository, OrganizationRepository};

#[derive(Debug, Clone)]
pub struct CreateOrganizationCommand {
    pub creator_id: MemberId,
    pub details: OrganizationDetails,
}

pub struct CreateOrganizationHandler {
    members: Arc<dyn MemberRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl CreateOrganizationHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            members,
            organizations,
        }
    }

    pub async fn handle(&self, cmd: CreateOrganizationCommand) -> Result<Organization, DomainError> {
        let creator = self
            .members
            .find_by_id(&cmd.creator_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;

        let now = Timestamp::now();
        let organization = Organization::create(cmd.details, now)?;
        let owner = OrganizationMembership {
            organization_id: organization.id,
            member_id: creator.id,
            role: OrganizationRole::Owner,
            joined_at: now,
        };
        self.organizations
            .create_with_owner(&organization, &owner)
            .await?;

        tracing::info!(
            organization_id = %organization.id,
            owner_id = %creator.id,
            "Organization created"
        );
        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMemberRepository, InMemoryOrganizationRepository};
    use crate::application::handlers::directory::test_support::seed_member;
    use crate::domain::directory::MemberRole;

    #[tokio::test]
    async fn creator_becomes_owner() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let organizations = Arc::new(InMemoryOrganizationRepository::new());
        let creator = seed_member(&members, MemberRole::Organization).await;

        let org = CreateOrganizationHandler::new(members.clone(), organizations.clone())
            .handle(CreateOrganizationCommand {
                creator_id: creator.id,
                details: OrganizationDetails {
                    name: "  Systems Summit ".to_string(),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(org.name, "Systems Summit");
        assert_eq!(
            organizations.role_of(&org.id, &creator.id).await.unwrap(),
            Some(OrganizationRole::Owner)
        );
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let creator = seed_member(&members, MemberRole::Organization).await;

        let err = CreateOrganizationHandler::new(members, Arc::new(InMemoryOrganizationRepository::new()))
            .handle(CreateOrganizationCommand {
                creator_id: creator.id,
                details: OrganizationDetails::default(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
