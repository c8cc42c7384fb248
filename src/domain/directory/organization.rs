//! Organization entity and its membership roster.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{text_enum, DomainError, MemberId, OrganizationId, Timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    Company,
    Conference,
    Association,
    University,
    Nonprofit,
    Other,
}

text_enum!(OrganizationType, "organization_type", {
    Company => "company",
    Conference => "conference",
    Association => "association",
    University => "university",
    Nonprofit => "nonprofit",
    Other => "other",
});

/// Role of a member inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    Owner,
    Admin,
    Member,
}

text_enum!(OrganizationRole, "role", {
    Owner => "owner",
    Admin => "admin",
    Member => "member",
});

impl OrganizationRole {
    /// Owners and admins manage the roster and post on behalf of the organization.
    pub fn can_manage(&self) -> bool {
        matches!(self, OrganizationRole::Owner | OrganizationRole::Admin)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    pub name: String,
    pub organization_type: Option<OrganizationType>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub organization_type: OrganizationType,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Organization {
    pub fn create(details: OrganizationDetails, now: Timestamp) -> Result<Self, ValidationError> {
        let name = details.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id: OrganizationId::new(),
            name,
            organization_type: details.organization_type.unwrap_or(OrganizationType::Other),
            description: details.description,
            location: details.location,
            website: details.website,
            size: details.size,
            industry: details.industry,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    pub organization_id: OrganizationId,
    pub member_id: MemberId,
    pub role: OrganizationRole,
    pub joined_at: Timestamp,
}

/// Checks a role grant against the acting member's role and the current roster.
///
/// Only owners and admins may change the roster, only owners may grant
/// `Owner`, and the last owner can never be demoted.
pub fn authorize_role_grant(
    actor_role: Option<OrganizationRole>,
    target_current_role: Option<OrganizationRole>,
    new_role: OrganizationRole,
    owner_count: usize,
) -> Result<(), DomainError> {
    let actor_role = match actor_role {
        Some(role) if role.can_manage() => role,
        _ => {
            return Err(DomainError::forbidden(
                "Only organization owners and admins can manage members",
            ))
        }
    };

    if new_role == OrganizationRole::Owner && actor_role != OrganizationRole::Owner {
        return Err(DomainError::forbidden("Only owners can grant the owner role"));
    }

    if target_current_role == Some(OrganizationRole::Owner) {
        if actor_role != OrganizationRole::Owner {
            return Err(DomainError::forbidden("Only owners can change another owner's role"));
        }
        if new_role != OrganizationRole::Owner && owner_count <= 1 {
            return Err(DomainError::validation(
                "role",
                "An organization must keep at least one owner",
            ));
        }
    }

    Ok(())
}

/// Filters for the organization directory.
#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    pub organization_type: Option<OrganizationType>,
    pub query: Option<String>,
}

impl OrganizationFilter {
    pub fn matches(&self, org: &Organization) -> bool {
        if let Some(t) = self.organization_type {
            if org.organization_type != t {
                return false;
            }
        }
        match &self.query {
            Some(q) => org.name.to_lowercase().contains(&q.to_lowercase()),
            None => true,
        }
    }
}
