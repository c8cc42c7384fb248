//! In-memory message storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, MessageId, Page, PageResult};
use crate::domain::messaging::{Folder, Message, MessageStatus};
use crate::ports::MessageRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<MessageId, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(&self, message: &Message) -> Result<(), DomainError> {
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn update_status(&self, message: &Message) -> Result<(), DomainError> {
        let mut messages = self.messages.write().await;
        let existing = messages
            .get_mut(&message.id)
            .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message not found"))?;
        existing.status = message.status;
        existing.read_at = message.read_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, DomainError> {
        Ok(self.messages.read().await.get(id).cloned())
    }

    async fn list_folder(
        &self,
        member: &MemberId,
        folder: Folder,
        page: Page,
    ) -> Result<PageResult<Message>, DomainError> {
        let mut matching: Vec<Message> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.in_folder(member, folder))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PageResult::from_all(matching, page))
    }

    async fn thread(&self, thread_id: &MessageId) -> Result<Vec<Message>, DomainError> {
        let mut thread: Vec<Message> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.thread_id == *thread_id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(thread)
    }

    async fn unread_count(&self, member: &MemberId) -> Result<u64, DomainError> {
        Ok(self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.recipient_id == *member && m.status == MessageStatus::Unread)
            .count() as u64)
    }
}
