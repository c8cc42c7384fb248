//! Mailbox queries.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, MessageId, Page, PageResult};
use crate::domain::messaging::{Folder, Message};
use crate::ports::MessageRepository;

#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub member_id: MemberId,
    pub folder: Folder,
    pub page: Page,
}

pub struct ListMessagesHandler {
    messages: Arc<dyn MessageRepository>,
}

impl ListMessagesHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, query: ListMessagesQuery) -> Result<PageResult<Message>, DomainError> {
        self.messages
            .list_folder(&query.member_id, query.folder, query.page)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct GetThreadQuery {
    pub thread_id: MessageId,
    pub member_id: MemberId,
}

/// Whole thread, oldest first. Participants only.
pub struct GetThreadHandler {
    messages: Arc<dyn MessageRepository>,
}

impl GetThreadHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, query: GetThreadQuery) -> Result<Vec<Message>, DomainError> {
        let thread = self.messages.thread(&query.thread_id).await?;
        let Some(root) = thread.first() else {
            return Err(DomainError::new(ErrorCode::MessageNotFound, "Thread not found"));
        };
        if !root.has_participant(&query.member_id) {
            return Err(DomainError::forbidden("Only thread participants can read it"));
        }
        Ok(thread)
    }
}

#[derive(Debug, Clone)]
pub struct UnreadCountQuery {
    pub member_id: MemberId,
}

pub struct UnreadCountHandler {
    messages: Arc<dyn MessageRepository>,
}

impl UnreadCountHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, query: UnreadCountQuery) -> Result<u64, DomainError> {
        self.messages.unread_count(&query.member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::messaging::test_support::Repos;
    use crate::application::handlers::messaging::SendMessageCommand;

    #[tokio::test]
    async fn folders_thread_and_unread_count() {
        let repos = Repos::new();
        let (alice, bob) = (repos.member().await, repos.member().await);
        let send = repos.send_handler();
        let root = send
            .handle(SendMessageCommand {
                sender_id: alice,
                recipient_id: Some(bob),
                parent_id: None,
                subject: None,
                body: "Hello".to_string(),
                opportunity_id: None,
            })
            .await
            .unwrap();
        send.handle(SendMessageCommand {
            sender_id: bob,
            recipient_id: None,
            parent_id: Some(root.id),
            subject: None,
            body: "Hi back".to_string(),
            opportunity_id: None,
        })
        .await
        .unwrap();

        let list = ListMessagesHandler::new(repos.messages.clone());
        let bob_inbox = list
            .handle(ListMessagesQuery {
                member_id: bob,
                folder: Folder::Inbox,
                page: Page::default(),
            })
            .await
            .unwrap();
        let bob_sent = list
            .handle(ListMessagesQuery {
                member_id: bob,
                folder: Folder::Sent,
                page: Page::default(),
            })
            .await
            .unwrap();
        assert_eq!(bob_inbox.total, 1);
        assert_eq!(bob_sent.total, 1);

        let thread = GetThreadHandler::new(repos.messages.clone())
            .handle(GetThreadQuery {
                thread_id: root.id,
                member_id: alice,
            })
            .await
            .unwrap();
        assert_eq!(thread.len(), 2);
        assert!(thread.iter().all(|m| m.thread_id == root.id));

        let unread = UnreadCountHandler::new(repos.messages.clone())
            .handle(UnreadCountQuery { member_id: alice })
            .await
            .unwrap();
        assert_eq!(unread, 1);
    }

    #[tokio::test]
    async fn thread_is_private_to_participants() {
        let repos = Repos::new();
        let (alice, bob) = (repos.member().await, repos.member().await);
        let root = repos
            .send_handler()
            .handle(SendMessageCommand {
                sender_id: alice,
                recipient_id: Some(bob),
                parent_id: None,
                subject: None,
                body: "Private".to_string(),
                opportunity_id: None,
            })
            .await
            .unwrap();

        let handler = GetThreadHandler::new(repos.messages.clone());
        let forbidden = handler
            .handle(GetThreadQuery {
                thread_id: root.id,
                member_id: MemberId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(forbidden.code, ErrorCode::Forbidden);

        let missing = handler
            .handle(GetThreadQuery {
                thread_id: MessageId::new(),
                member_id: alice,
            })
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::MessageNotFound);
    }
}
