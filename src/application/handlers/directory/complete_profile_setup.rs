//! CompleteProfileSetupHandler - Creates the member record after sign-up.

use std::sync::Arc;

use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{AuthenticatedUser, DomainError, Timestamp};
use crate::ports::MemberRepository;

#[derive(Debug, Clone)]
pub struct CompleteProfileSetupCommand {
    pub user: AuthenticatedUser,
    pub role: MemberRole,
    pub profile: Profile,
}

/// Idempotent: a second setup call updates the existing record and keeps
/// its tier and processor customer.
pub struct CompleteProfileSetupHandler {
    members: Arc<dyn MemberRepository>,
}

impl CompleteProfileSetupHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, cmd: CompleteProfileSetupCommand) -> Result<Member, DomainError> {
        let now = Timestamp::now();
        let member = match self.members.find_by_id(&cmd.user.id).await? {
            Some(mut existing) => {
                existing.complete_setup(cmd.role, cmd.profile, now)?;
                existing
            }
            None => Member::create(cmd.user.id, cmd.user.email, cmd.role, cmd.profile, now)?,
        };

        self.members.save(&member).await?;
        tracing::info!(member_id = %member.id, role = %member.role, "Profile setup completed");
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberRepository;
    use crate::domain::directory::SubscriptionTier;
    use crate::domain::foundation::{ErrorCode, MemberId};

    fn user() -> AuthenticatedUser {
        AuthenticatedUser::new(MemberId::new(), "speaker@podium.test", Timestamp::now().plus_secs(3600))
    }

    fn profile(name: &str) -> Profile {
        Profile {
            display_name: name.to_string(),
            topics: vec!["Rust".to_string(), " wasm ".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_setup_creates_onboarded_member() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let handler = CompleteProfileSetupHandler::new(members.clone());
        let user = user();

        let member = handler
            .handle(CompleteProfileSetupCommand {
                user: user.clone(),
                role: MemberRole::Speaker,
                profile: profile("Ada"),
            })
            .await
            .unwrap();

        assert!(member.onboarding_completed);
        assert_eq!(member.email, "speaker@podium.test");
        assert_eq!(member.profile.topics, vec!["rust", "wasm"]);
        assert!(members.find_by_id(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn repeated_setup_keeps_tier() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let handler = CompleteProfileSetupHandler::new(members.clone());
        let user = user();
        let cmd = |name: &str| CompleteProfileSetupCommand {
            user: user.clone(),
            role: MemberRole::Organization,
            profile: profile(name),
        };

        handler.handle(cmd("First")).await.unwrap();
        members.set_tier(&user.id, SubscriptionTier::Premium).await.unwrap();
        let member = handler.handle(cmd("Second")).await.unwrap();

        assert_eq!(member.profile.display_name, "Second");
        assert_eq!(member.tier, SubscriptionTier::Premium);
    }

    #[tokio::test]
    async fn blank_display_name_is_rejected() {
        let handler = CompleteProfileSetupHandler::new(Arc::new(InMemoryMemberRepository::new()));

        let err = handler
            .handle(CompleteProfileSetupCommand {
                user: user(),
                role: MemberRole::Speaker,
                profile: profile("  "),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
