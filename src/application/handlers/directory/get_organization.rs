//! Organization queries.

use std::sync::Arc;

use crate::domain::directory::{Organization, OrganizationFilter, OrganizationMembership};
use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId, Page, PageResult};
use crate::ports::OrganizationRepository;

#[derive(Debug, Clone)]
pub struct GetOrganizationQuery {
    pub organization_id: OrganizationId,
}

/// Organization together with its roster.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationView {
    pub organization: Organization,
    pub members: Vec<OrganizationMembership>,
}

pub struct GetOrganizationHandler {
    organizations: Arc<dyn OrganizationRepository>,
}

impl GetOrganizationHandler {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    pub async fn handle(&self, query: GetOrganizationQuery) -> Result<OrganizationView, DomainError> {
        let organization = self
            .organizations
            .find_by_id(&query.organization_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::OrganizationNotFound, "Organization not found")
            })?;
        let members = self.organizations.members(&organization.id).await?;
        Ok(OrganizationView {
            organization,
            members,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOrganizationsQuery {
    pub filter: OrganizationFilter,
    pub page: Page,
}

pub struct ListOrganizationsHandler {
    organizations: Arc<dyn OrganizationRepository>,
}

impl ListOrganizationsHandler {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    pub async fn handle(
        &self,
        query: ListOrganizationsQuery,
    ) -> Result<PageResult<Organization>, DomainError> {
        self.organizations.list(&query.filter, query.page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrganizationRepository;
    use crate::domain::directory::{OrganizationDetails, OrganizationRole};
    use crate::domain::foundation::{MemberId, Timestamp};

    #[tokio::test]
    async fn view_includes_roster() {
        let repo = Arc::new(InMemoryOrganizationRepository::new());
        let org = Organization::create(
            OrganizationDetails {
                name: "Meetup Berlin".to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        let owner = OrganizationMembership {
            organization_id: org.id,
            member_id: MemberId::new(),
            role: OrganizationRole::Owner,
            joined_at: Timestamp::now(),
        };
        repo.create_with_owner(&org, &owner).await.unwrap();

        let view = GetOrganizationHandler::new(repo.clone())
            .handle(GetOrganizationQuery {
                organization_id: org.id,
            })
            .await
            .unwrap();
        assert_eq!(view.members, vec![owner]);

        let listed = ListOrganizationsHandler::new(repo)
            .handle(ListOrganizationsQuery {
                filter: OrganizationFilter {
                    query: Some("berlin".to_string()),
                    ..Default::default()
                },
                page: Page::default(),
            })
            .await
            .unwrap();
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn unknown_organization_is_not_found() {
        let err = GetOrganizationHandler::new(Arc::new(InMemoryOrganizationRepository::new()))
            .handle(GetOrganizationQuery {
                organization_id: OrganizationId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrganizationNotFound);
    }
}
