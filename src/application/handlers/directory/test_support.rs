//! Fixtures shared by the directory handler tests.

use crate::adapters::memory::InMemoryMemberRepository;
use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{MemberId, Timestamp};
use crate::ports::MemberRepository;

pub async fn seed_member(repo: &InMemoryMemberRepository, role: MemberRole) -> Member {
    let id = MemberId::new();
    let member = Member::create(
        id,
        format!("{}@podium.test", id),
        role,
        Profile {
            display_name: "Organizer".to_string(),
            ..Default::default()
        },
        Timestamp::now(),
    )
    .unwrap();
    repo.save(&member).await.unwrap();
    member
}
