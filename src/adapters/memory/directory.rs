//! In-memory member and organization storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::directory::{
    Member, MemberFilter, Organization, OrganizationFilter, OrganizationMembership,
    OrganizationRole, SubscriptionTier,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, OrganizationId, Page, PageResult, Timestamp,
};
use crate::ports::{MemberRepository, OrganizationRepository};

#[derive(Debug, Default, Clone)]
pub struct InMemoryMemberRepository {
    members: Arc<RwLock<HashMap<MemberId, Member>>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify(
        &self,
        id: &MemberId,
        f: impl FnOnce(&mut Member) + Send,
    ) -> Result<(), DomainError> {
        let mut members = self.members.write().await;
        let member = members
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;
        f(member);
        member.updated_at = Timestamp::now();
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn save(&self, member: &Member) -> Result<(), DomainError> {
        self.members.write().await.insert(member.id, member.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        Ok(self.members.read().await.get(id).cloned())
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Member>, DomainError> {
        Ok(self
            .members
            .read()
            .await
            .values()
            .find(|m| m.stripe_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn set_stripe_customer_id(
        &self,
        id: &MemberId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        let customer_id = customer_id.to_string();
        self.modify(id, move |m| m.stripe_customer_id = Some(customer_id))
            .await
    }

    async fn set_tier(&self, id: &MemberId, tier: SubscriptionTier) -> Result<(), DomainError> {
        self.modify(id, move |m| m.tier = tier).await
    }

    async fn list(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<PageResult<Member>, DomainError> {
        let mut matching: Vec<Member> = self
            .members
            .read()
            .await
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PageResult::from_all(matching, page))
    }
}

#[derive(Debug, Default)]
struct OrganizationState {
    organizations: HashMap<OrganizationId, Organization>,
    memberships: Vec<OrganizationMembership>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryOrganizationRepository {
    state: Arc<RwLock<OrganizationState>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn create_with_owner(
        &self,
        organization: &Organization,
        owner: &OrganizationMembership,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.organizations.contains_key(&organization.id) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                "Organization already exists",
            ));
        }
        state
            .organizations
            .insert(organization.id, organization.clone());
        state.memberships.push(*owner);
        Ok(())
    }

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        Ok(self.state.read().await.organizations.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &OrganizationFilter,
        page: Page,
    ) -> Result<PageResult<Organization>, DomainError> {
        let mut matching: Vec<Organization> = self
            .state
            .read()
            .await
            .organizations
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(PageResult::from_all(matching, page))
    }

    async fn members(
        &self,
        id: &OrganizationId,
    ) -> Result<Vec<OrganizationMembership>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .iter()
            .filter(|m| m.organization_id == *id)
            .copied()
            .collect())
    }

    async fn role_of(
        &self,
        id: &OrganizationId,
        member_id: &MemberId,
    ) -> Result<Option<OrganizationRole>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .iter()
            .find(|m| m.organization_id == *id && m.member_id == *member_id)
            .map(|m| m.role))
    }

    async fn upsert_membership(
        &self,
        membership: &OrganizationMembership,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.organizations.contains_key(&membership.organization_id) {
            return Err(DomainError::new(
                ErrorCode::OrganizationNotFound,
                "Organization not found",
            ));
        }
        match state.memberships.iter_mut().find(|m| {
            m.organization_id == membership.organization_id && m.member_id == membership.member_id
        }) {
            Some(existing) => existing.role = membership.role,
            None => state.memberships.push(*membership),
        }
        Ok(())
    }
}
