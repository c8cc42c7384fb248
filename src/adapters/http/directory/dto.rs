//! Request and response bodies for member and organization endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::directory::{
    Member, MemberFilter, MemberRole, MemberStatus, Organization, OrganizationFilter,
    OrganizationMembership, OrganizationRole, OrganizationType, Profile, SubscriptionTier,
};
use crate::domain::foundation::{MemberId, Page, Timestamp, ValidationError};

use crate::application::handlers::directory::OrganizationView;

// ════════════════════════════════════════════════════════════════════════════════
// Members
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/members/me/profile-setup
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSetupRequest {
    pub role: MemberRole,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Member as shown to API callers.
///
/// `email` and `tier` are only present on the caller's own record.
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub role: MemberRole,
    #[serde(flatten)]
    pub profile: Profile,
    pub status: MemberStatus,
    pub onboarding_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SubscriptionTier>,
    pub created_at: Timestamp,
}

impl MemberResponse {
    pub fn public(member: Member) -> Self {
        Self {
            id: member.id,
            role: member.role,
            profile: member.profile,
            status: member.status,
            onboarding_completed: member.onboarding_completed,
            email: None,
            tier: None,
            created_at: member.created_at,
        }
    }

    pub fn own(member: Member) -> Self {
        let email = member.email.clone();
        let tier = member.tier;
        Self {
            email: Some(email),
            tier: Some(tier),
            ..Self::public(member)
        }
    }
}

/// Query string for GET /api/members.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMembersParams {
    pub role: Option<MemberRole>,
    pub topic: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListMembersParams {
    pub fn into_parts(self) -> Result<(MemberFilter, Page), ValidationError> {
        let page = Page::from_query(self.page, self.per_page)?;
        let filter = MemberFilter {
            role: self.role,
            topic: self.topic,
            query: self.q,
        };
        Ok((filter, page))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Organizations
// ════════════════════════════════════════════════════════════════════════════════

/// Query string for GET /api/organizations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrganizationsParams {
    #[serde(rename = "type")]
    pub organization_type: Option<OrganizationType>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListOrganizationsParams {
    pub fn into_parts(self) -> Result<(OrganizationFilter, Page), ValidationError> {
        let page = Page::from_query(self.page, self.per_page)?;
        let filter = OrganizationFilter {
            organization_type: self.organization_type,
            query: self.q,
        };
        Ok((filter, page))
    }
}

/// POST /api/organizations/:id/members
#[derive(Debug, Clone, Deserialize)]
pub struct AddOrganizationMemberRequest {
    pub member_id: MemberId,
    pub role: OrganizationRole,
}

/// Organization with its roster.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationDetailResponse {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<OrganizationMembership>,
}

impl From<OrganizationView> for OrganizationDetailResponse {
    fn from(view: OrganizationView) -> Self {
        Self {
            organization: view.organization,
            members: view.members,
        }
    }
}
