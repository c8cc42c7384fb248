//! Fixtures shared by the workflow handler tests.

use std::sync::Arc;

use crate::adapters::memory::{
    InMemoryMemberRepository, InMemoryOrganizationRepository, InMemoryWorkflowStore,
};
use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{MemberId, OpportunityId, Timestamp};
use crate::domain::workflow::{new_opportunity, ApplicationForm, Opportunity};
use crate::ports::{MemberRepository, OpportunityRepository};

pub struct Repos {
    pub members: Arc<InMemoryMemberRepository>,
    pub organizations: Arc<InMemoryOrganizationRepository>,
    pub store: Arc<InMemoryWorkflowStore>,
}

impl Repos {
    pub fn new() -> Self {
        Self {
            members: Arc::new(InMemoryMemberRepository::new()),
            organizations: Arc::new(InMemoryOrganizationRepository::new()),
            store: Arc::new(InMemoryWorkflowStore::new()),
        }
    }

    pub async fn member(&self, role: MemberRole) -> Member {
        let id = MemberId::new();
        let member = Member::create(
            id,
            format!("{}@podium.test", id),
            role,
            Profile {
                display_name: "Ada Lovelace".to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        self.members.save(&member).await.unwrap();
        member
    }

    /// Open opportunity posted by a fresh organization member.
    pub async fn open_opportunity(&self) -> Opportunity {
        let poster = self.member(MemberRole::Organization).await;
        let opp = Opportunity::post(poster.id, new_opportunity(true), Timestamp::now()).unwrap();
        self.store.save(&opp).await.unwrap();
        opp
    }

    pub async fn stored_opportunity(&self, id: &OpportunityId) -> Opportunity {
        OpportunityRepository::find_by_id(self.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn form() -> ApplicationForm {
    ApplicationForm {
        cover_letter: "I spoke about embedded Rust at two conferences last year.".to_string(),
        proposed_topic: Some("Async on microcontrollers".to_string()),
        availability_confirmed: true,
        requested_fee_cents: None,
    }
}
