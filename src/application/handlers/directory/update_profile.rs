//! UpdateProfileHandler - Edits the caller's own profile.

use std::sync::Arc;

use crate::domain::directory::{Member, Profile};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Timestamp};
use crate::ports::MemberRepository;

#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub member_id: MemberId,
    pub profile: Profile,
}

pub struct UpdateProfileHandler {
    members: Arc<dyn MemberRepository>,
}

impl UpdateProfileHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, cmd: UpdateProfileCommand) -> Result<Member, DomainError> {
        let mut member = self
            .members
            .find_by_id(&cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;

        member.update_profile(cmd.profile, Timestamp::now())?;
        self.members.save(&member).await?;
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberRepository;
    use crate::domain::directory::MemberRole;

    #[tokio::test]
    async fn updates_own_profile() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let member = Member::create(
            MemberId::new(),
            "a@podium.test",
            MemberRole::Speaker,
            Profile {
                display_name: "Before".to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        members.save(&member).await.unwrap();

        let updated = UpdateProfileHandler::new(members.clone())
            .handle(UpdateProfileCommand {
                member_id: member.id,
                profile: Profile {
                    display_name: "After".to_string(),
                    headline: Some("Compiler engineer".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.profile.display_name, "After");
        let stored = members.find_by_id(&member.id).await.unwrap().unwrap();
        assert_eq!(stored.profile.headline.as_deref(), Some("Compiler engineer"));
    }

    #[tokio::test]
    async fn missing_member_is_not_found() {
        let err = UpdateProfileHandler::new(Arc::new(InMemoryMemberRepository::new()))
            .handle(UpdateProfileCommand {
                member_id: MemberId::new(),
                profile: Profile::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }
}
