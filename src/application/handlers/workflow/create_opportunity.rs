//! CreateOpportunityHandler - Posts a new speaking opportunity.

use std::sync::Arc;

use crate::domain::directory::MemberRole;
use crate::domain::foundation::{MemberId, Timestamp};
use crate::domain::workflow::{NewOpportunity, Opportunity, WorkflowError};
use crate::ports::{MemberRepository, OpportunityRepository, OrganizationRepository};

#[derive(Debug, Clone)]
pub struct CreateOpportunityCommand {
    pub poster_id: MemberId,
    pub input: NewOpportunity,
}

/// Only organization-role members post. Posting on behalf of an
/// organization additionally needs an owner or admin membership there.
pub struct CreateOpportunityHandler {
    members: Arc<dyn MemberRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
}

impl CreateOpportunityHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        opportunities: Arc<dyn OpportunityRepository>,
    ) -> Self {
        Self {
            members,
            organizations,
            opportunities,
        }
    }

    pub async fn handle(&self, cmd: CreateOpportunityCommand) -> Result<Opportunity, WorkflowError> {
        let poster = self
            .members
            .find_by_id(&cmd.poster_id)
            .await?
            .ok_or(WorkflowError::NotFound("Member"))?;

        if poster.role != MemberRole::Organization {
            return Err(WorkflowError::Forbidden(
                "Only organization members can post opportunities".to_string(),
            ));
        }

        if let Some(org_id) = cmd.input.organization_id {
            self.organizations
                .find_by_id(&org_id)
                .await?
                .ok_or(WorkflowError::NotFound("Organization"))?;
            let role = self.organizations.role_of(&org_id, &poster.id).await?;
            if !role.map(|r| r.can_manage()).unwrap_or(false) {
                return Err(WorkflowError::Forbidden(
                    "Only owners and admins can post for this organization".to_string(),
                ));
            }
        }

        let opportunity = Opportunity::post(poster.id, cmd.input, Timestamp::now())?;
        self.opportunities.save(&opportunity).await?;

        tracing::info!(
            opportunity_id = %opportunity.id,
            poster_id = %poster.id,
            status = %opportunity.status,
            "Opportunity created"
        );
        Ok(opportunity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::workflow::test_support::Repos;
    use crate::domain::directory::{Organization, OrganizationDetails, OrganizationMembership, OrganizationRole};
    use crate::domain::workflow::{new_opportunity, OpportunityStatus};

    fn handler(repos: &Repos) -> CreateOpportunityHandler {
        CreateOpportunityHandler::new(
            repos.members.clone(),
            repos.organizations.clone(),
            repos.store.clone(),
        )
    }

    async fn organization_with(repos: &Repos, member_id: MemberId, role: OrganizationRole) -> Organization {
        let org = Organization::create(
            OrganizationDetails {
                name: "RustConf".to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        let owner = OrganizationMembership {
            organization_id: org.id,
            member_id,
            role,
            joined_at: Timestamp::now(),
        };
        repos.organizations.create_with_owner(&org, &owner).await.unwrap();
        org
    }

    #[tokio::test]
    async fn organization_member_posts_draft() {
        let repos = Repos::new();
        let poster = repos.member(MemberRole::Organization).await;

        let opp = handler(&repos)
            .handle(CreateOpportunityCommand {
                poster_id: poster.id,
                input: new_opportunity(false),
            })
            .await
            .unwrap();

        assert_eq!(opp.status, OpportunityStatus::Draft);
        assert!(repos.store.find_by_id(&opp.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn speakers_cannot_post() {
        let repos = Repos::new();
        let speaker = repos.member(MemberRole::Speaker).await;

        let err = handler(&repos)
            .handle(CreateOpportunityCommand {
                poster_id: speaker.id,
                input: new_opportunity(true),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn posting_for_organization_requires_manager_role() {
        let repos = Repos::new();
        let poster = repos.member(MemberRole::Organization).await;
        let org = organization_with(&repos, poster.id, OrganizationRole::Member).await;
        let mut input = new_opportunity(true);
        input.organization_id = Some(org.id);

        let err = handler(&repos)
            .handle(CreateOpportunityCommand {
                poster_id: poster.id,
                input,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn owner_posts_for_organization() {
        let repos = Repos::new();
        let poster = repos.member(MemberRole::Organization).await;
        let org = organization_with(&repos, poster.id, OrganizationRole::Owner).await;
        let mut input = new_opportunity(true);
        input.organization_id = Some(org.id);

        let opp = handler(&repos)
            .handle(CreateOpportunityCommand {
                poster_id: poster.id,
                input,
            })
            .await
            .unwrap();

        assert_eq!(opp.organization_id, Some(org.id));
    }

    #[tokio::test]
    async fn invalid_input_is_validation_error() {
        let repos = Repos::new();
        let poster = repos.member(MemberRole::Organization).await;
        let mut input = new_opportunity(true);
        input.title = "   ".to_string();

        let err = handler(&repos)
            .handle(CreateOpportunityCommand {
                poster_id: poster.id,
                input,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
