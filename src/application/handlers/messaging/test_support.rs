//! Fixtures shared by the messaging handler tests.

use std::sync::Arc;

use super::SendMessageHandler;
use crate::adapters::memory::{
    InMemoryMemberRepository, InMemoryMessageRepository, InMemoryWorkflowStore,
};
use crate::domain::directory::{Member, MemberRole, Profile};
use crate::domain::foundation::{MemberId, Timestamp};
use crate::ports::MemberRepository;

pub struct Repos {
    pub members: Arc<InMemoryMemberRepository>,
    pub store: Arc<InMemoryWorkflowStore>,
    pub messages: Arc<InMemoryMessageRepository>,
}

impl Repos {
    pub fn new() -> Self {
        Self {
            members: Arc::new(InMemoryMemberRepository::new()),
            store: Arc::new(InMemoryWorkflowStore::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
        }
    }

    pub async fn member(&self) -> MemberId {
        let id = MemberId::new();
        let member = Member::create(
            id,
            format!("{}@podium.test", id),
            MemberRole::Speaker,
            Profile {
                display_name: "Correspondent".to_string(),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
        self.members.save(&member).await.unwrap();
        id
    }

    pub fn send_handler(&self) -> SendMessageHandler {
        SendMessageHandler::new(self.members.clone(), self.store.clone(), self.messages.clone())
    }
}
