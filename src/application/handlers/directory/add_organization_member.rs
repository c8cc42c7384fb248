//! AddOrganizationMemberHandler - Grants or changes an organization role.

use std::sync::Arc;

use crate::domain::directory::{authorize_role_grant, OrganizationMembership, OrganizationRole};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, OrganizationId, Timestamp};
use crate::ports::{MemberRepository, OrganizationRepository};

#[derive(Debug, Clone)]
pub struct AddOrganizationMemberCommand {
    pub organization_id: OrganizationId,
    pub actor_id: MemberId,
    pub member_id: MemberId,
    pub role: OrganizationRole,
}

pub struct AddOrganizationMemberHandler {
    members: Arc<dyn MemberRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl AddOrganizationMemberHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            members,
            organizations,
        }
    }

    pub async fn handle(
        &self,
        cmd: AddOrganizationMemberCommand,
    ) -> Result<OrganizationMembership, DomainError> {
        self.organizations
            .find_by_id(&cmd.organization_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::OrganizationNotFound, "Organization not found")
            })?;

        let roster = self.organizations.members(&cmd.organization_id).await?;
        let role_in_roster = |id: &MemberId| {
            roster
                .iter()
                .find(|m| m.member_id == *id)
                .map(|m| m.role)
        };
        let owner_count = roster
            .iter()
            .filter(|m| m.role == OrganizationRole::Owner)
            .count();

        authorize_role_grant(
            role_in_roster(&cmd.actor_id),
            role_in_roster(&cmd.member_id),
            cmd.role,
            owner_count,
        )?;

        self.members
            .find_by_id(&cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;

        let membership = OrganizationMembership {
            organization_id: cmd.organization_id,
            member_id: cmd.member_id,
            role: cmd.role,
            joined_at: Timestamp::now(),
        };
        self.organizations.upsert_membership(&membership).await?;

        tracing::info!(
            organization_id = %cmd.organization_id,
            member_id = %cmd.member_id,
            role = %cmd.role,
            actor_id = %cmd.actor_id,
            "Organization role granted"
        );
        Ok(membership)
    }
}
