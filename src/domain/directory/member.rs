//! Member entity.
//!
//! A member is created when profile setup completes after sign-up. Members are
//! never hard-deleted; `status` records suspension or deactivation instead.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{text_enum, MemberId, Timestamp, ValidationError};

/// Role chosen at profile setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Speaker,
    Organization,
}

/// Paid plan level mirrored from billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Standard,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Suspended,
    Deactivated,
}

text_enum!(MemberRole, "role", {
    Speaker => "speaker",
    Organization => "organization",
});

text_enum!(SubscriptionTier, "tier", {
    Free => "free",
    Basic => "basic",
    Standard => "standard",
    Premium => "premium",
});

text_enum!(MemberStatus, "status", {
    Active => "active",
    Suspended => "suspended",
    Deactivated => "deactivated",
});

impl SubscriptionTier {
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Trims text fields and rejects a blank display name.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.display_name = self.display_name.trim().to_string();
        if self.display_name.is_empty() {
            return Err(ValidationError::empty_field("display_name"));
        }
        if self.display_name.chars().count() > 120 {
            return Err(ValidationError::out_of_range(
                "display_name",
                1,
                120,
                self.display_name.chars().count() as i64,
            ));
        }
        if let Some(website) = &self.website {
            if !website.starts_with("http://") && !website.starts_with("https://") {
                return Err(ValidationError::invalid_format(
                    "website",
                    "must start with http:// or https://",
                ));
            }
        }
        self.topics = self
            .topics
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self.topics.dedup();
        Ok(self)
    }
}

/// Member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub email: String,
    pub role: MemberRole,
    pub profile: Profile,
    pub onboarding_completed: bool,
    pub tier: SubscriptionTier,
    pub stripe_customer_id: Option<String>,
    pub status: MemberStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Member {
    /// Creates a member at the end of profile setup.
    pub fn create(
        id: MemberId,
        email: impl Into<String>,
        role: MemberRole,
        profile: Profile,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        Ok(Self {
            id,
            email,
            role,
            profile: profile.normalized()?,
            onboarding_completed: true,
            tier: SubscriptionTier::Free,
            stripe_customer_id: None,
            status: MemberStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the profile fields.
    pub fn update_profile(&mut self, profile: Profile, now: Timestamp) -> Result<(), ValidationError> {
        self.profile = profile.normalized()?;
        self.updated_at = now;
        Ok(())
    }

    /// Re-running profile setup keeps the record and marks onboarding done.
    pub fn complete_setup(
        &mut self,
        role: MemberRole,
        profile: Profile,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        self.update_profile(profile, now)?;
        self.role = role;
        self.onboarding_completed = true;
        Ok(())
    }

    pub fn is_speaker(&self) -> bool {
        self.role == MemberRole::Speaker
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Filters for the member directory.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub role: Option<MemberRole>,
    pub topic: Option<String>,
    /// Case-insensitive match on display name or headline.
    pub query: Option<String>,
}

impl MemberFilter {
    /// In-memory evaluation of the filter; storage adapters push the same
    /// predicate into SQL.
    pub fn matches(&self, member: &Member) -> bool {
        if !member.is_active() {
            return false;
        }
        if let Some(role) = self.role {
            if member.role != role {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            let topic = topic.to_lowercase();
            if !member.profile.topics.iter().any(|t| *t == topic) {
                return false;
            }
        }
        if let Some(q) = &self.query {
            let q = q.to_lowercase();
            let in_name = member.profile.display_name.to_lowercase().contains(&q);
            let in_headline = member
                .profile
                .headline
                .as_deref()
                .map(|h| h.to_lowercase().contains(&q))
                .unwrap_or(false);
            if !in_name && !in_headline {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile {
            display_name: name.to_string(),
            headline: Some("Keynote speaker on Rust".to_string()),
            topics: vec![" Rust ".to_string(), "".to_string()],
            ..Default::default()
        }
    }

    fn speaker() -> Member {
        Member::create(
            MemberId::new(),
            "ada@example.com",
            MemberRole::Speaker,
            profile("Ada"),
            Timestamp::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_marks_onboarding_complete_on_free_tier() {
        let member = speaker();
        assert!(member.onboarding_completed);
        assert_eq!(member.tier, SubscriptionTier::Free);
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[test]
    fn profile_normalization_cleans_topics() {
        let member = speaker();
        assert_eq!(member.profile.topics, vec!["rust".to_string()]);
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let result = Member::create(
            MemberId::new(),
            "ada@example.com",
            MemberRole::Speaker,
            profile("   "),
            Timestamp::now(),
        );
        assert_eq!(result, Err(ValidationError::empty_field("display_name")));
    }

    #[test]
    fn website_without_scheme_is_rejected() {
        let mut p = profile("Ada");
        p.website = Some("example.com".to_string());
        assert!(p.normalized().is_err());
    }

    #[test]
    fn filter_matches_topic_and_query() {
        let member = speaker();
        let filter = MemberFilter {
            role: Some(MemberRole::Speaker),
            topic: Some("RUST".to_string()),
            query: Some("keynote".to_string()),
        };
        assert!(filter.matches(&member));

        let other = MemberFilter {
            role: Some(MemberRole::Organization),
            ..Default::default()
        };
        assert!(!other.matches(&member));
    }

    #[test]
    fn filter_hides_inactive_members() {
        let mut member = speaker();
        member.status = MemberStatus::Suspended;
        assert!(!MemberFilter::default().matches(&member));
    }

    #[test]
    fn enums_round_trip_through_text() {
        assert_eq!("premium".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Premium));
        assert_eq!(MemberRole::Organization.as_str(), "organization");
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }
}
