//! UpdateMessageHandler - Mark read or archive.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, MessageId, Timestamp};
use crate::domain::messaging::Message;
use crate::ports::MessageRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    MarkRead,
    Archive,
}

#[derive(Debug, Clone)]
pub struct UpdateMessageCommand {
    pub message_id: MessageId,
    pub member_id: MemberId,
    pub action: MessageAction,
}

/// Recipient-only. Non-participants see not found.
pub struct UpdateMessageHandler {
    messages: Arc<dyn MessageRepository>,
}

impl UpdateMessageHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, cmd: UpdateMessageCommand) -> Result<Message, DomainError> {
        let mut message = self
            .messages
            .find_by_id(&cmd.message_id)
            .await?
            .filter(|m| m.has_participant(&cmd.member_id))
            .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message not found"))?;

        let now = Timestamp::now();
        match cmd.action {
            MessageAction::MarkRead => message.mark_read(&cmd.member_id, now)?,
            MessageAction::Archive => message.archive(&cmd.member_id, now)?,
        }
        self.messages.update_status(&message).await?;
        Ok(message)
    }
}
