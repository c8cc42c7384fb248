//! SendMessageHandler - Starts a thread or replies within one.

use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, MessageId, OpportunityId, Timestamp,
};
use crate::domain::messaging::Message;
use crate::ports::{MemberRepository, MessageRepository, OpportunityRepository};

#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub sender_id: MemberId,
    /// Required for a new thread; ignored on replies.
    pub recipient_id: Option<MemberId>,
    /// Set when replying.
    pub parent_id: Option<MessageId>,
    pub subject: Option<String>,
    pub body: String,
    pub opportunity_id: Option<OpportunityId>,
}

pub struct SendMessageHandler {
    members: Arc<dyn MemberRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl SendMessageHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        opportunities: Arc<dyn OpportunityRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            members,
            opportunities,
            messages,
        }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<Message, DomainError> {
        let now = Timestamp::now();
        let message = match cmd.parent_id {
            Some(parent_id) => {
                let parent = self
                    .messages
                    .find_by_id(&parent_id)
                    .await?
                    .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message not found"))?;
                Message::reply_to(&parent, cmd.sender_id, &cmd.body, now)?
            }
            None => {
                let recipient_id = cmd.recipient_id.ok_or_else(|| {
                    DomainError::validation("recipient_id", "A recipient is required")
                })?;
                let message = Message::new_thread(
                    cmd.sender_id,
                    recipient_id,
                    cmd.subject,
                    &cmd.body,
                    cmd.opportunity_id,
                    now,
                )?;
                self.members
                    .find_by_id(&recipient_id)
                    .await?
                    .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Recipient not found"))?;
                if let Some(opportunity_id) = &message.opportunity_id {
                    self.opportunities
                        .find_by_id(opportunity_id)
                        .await?
                        .ok_or_else(|| {
                            DomainError::new(ErrorCode::OpportunityNotFound, "Opportunity not found")
                        })?;
                }
                message
            }
        };

        self.messages.save(&message).await?;
        tracing::info!(
            message_id = %message.id,
            thread_id = %message.thread_id,
            sender_id = %message.sender_id,
            "Message sent"
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::messaging::test_support::Repos;

    fn new_thread(sender: MemberId, recipient: MemberId) -> SendMessageCommand {
        SendMessageCommand {
            sender_id: sender,
            recipient_id: Some(recipient),
            parent_id: None,
            subject: Some("Keynote slot".to_string()),
            body: "Would you be available in March?".to_string(),
            opportunity_id: None,
        }
    }

    #[tokio::test]
    async fn reply_is_addressed_to_other_participant() {
        let repos = Repos::new();
        let (alice, bob) = (repos.member().await, repos.member().await);
        let handler = repos.send_handler();

        let root = handler.handle(new_thread(alice, bob)).await.unwrap();
        let reply = handler
            .handle(SendMessageCommand {
                sender_id: bob,
                recipient_id: None,
                parent_id: Some(root.id),
                subject: None,
                body: "Yes, March works.".to_string(),
                opportunity_id: None,
            })
            .await
            .unwrap();

        assert_eq!(reply.thread_id, root.id);
        assert_eq!(reply.recipient_id, alice);
        assert_eq!(reply.subject.as_deref(), Some("Keynote slot"));
    }

    #[tokio::test]
    async fn outsiders_cannot_reply() {
        let repos = Repos::new();
        let (alice, bob, eve) = (repos.member().await, repos.member().await, repos.member().await);
        let handler = repos.send_handler();
        let root = handler.handle(new_thread(alice, bob)).await.unwrap();

        let err = handler
            .handle(SendMessageCommand {
                sender_id: eve,
                recipient_id: None,
                parent_id: Some(root.id),
                subject: None,
                body: "Hi".to_string(),
                opportunity_id: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn cannot_message_self() {
        let repos = Repos::new();
        let alice = repos.member().await;

        let err = repos
            .send_handler()
            .handle(new_thread(alice, alice))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let repos = Repos::new();
        let alice = repos.member().await;

        let err = repos
            .send_handler()
            .handle(new_thread(alice, MemberId::new()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }

    #[tokio::test]
    async fn blank_body_is_rejected() {
        let repos = Repos::new();
        let (alice, bob) = (repos.member().await, repos.member().await);
        let mut cmd = new_thread(alice, bob);
        cmd.body = "   ".to_string();

        let err = repos.send_handler().handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
