//! Direct messages between two members, grouped into threads.
//!
//! A thread is identified by its root message id. Replies inherit the
//! parent's thread and are addressed to the other participant.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    text_enum, DomainError, MemberId, MessageId, OpportunityId, Timestamp, ValidationError,
};

pub const MAX_BODY_CHARS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Unread,
    Read,
    Archived,
}

text_enum!(MessageStatus, "status", {
    Unread => "unread",
    Read => "read",
    Archived => "archived",
});

/// Mailbox view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Folder {
    #[default]
    Inbox,
    Sent,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: MessageId,
    pub parent_id: Option<MessageId>,
    pub sender_id: MemberId,
    pub recipient_id: MemberId,
    pub opportunity_id: Option<OpportunityId>,
    pub subject: Option<String>,
    pub body: String,
    pub status: MessageStatus,
    pub created_at: Timestamp,
    pub read_at: Option<Timestamp>,
}

fn validate_body(body: &str) -> Result<String, ValidationError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ValidationError::empty_field("body"));
    }
    let len = body.chars().count();
    if len > MAX_BODY_CHARS {
        return Err(ValidationError::out_of_range(
            "body",
            1,
            MAX_BODY_CHARS as i64,
            len as i64,
        ));
    }
    Ok(body.to_string())
}

impl Message {
    /// Starts a new thread.
    pub fn new_thread(
        sender_id: MemberId,
        recipient_id: MemberId,
        subject: Option<String>,
        body: &str,
        opportunity_id: Option<OpportunityId>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if sender_id == recipient_id {
            return Err(DomainError::validation("recipient_id", "Cannot message yourself"));
        }
        let body = validate_body(body)?;
        let id = MessageId::new();
        Ok(Self {
            id,
            thread_id: id,
            parent_id: None,
            sender_id,
            recipient_id,
            opportunity_id,
            subject: subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            body,
            status: MessageStatus::Unread,
            created_at: now,
            read_at: None,
        })
    }

    /// Replies to `parent`; only its participants may reply.
    pub fn reply_to(
        parent: &Message,
        sender_id: MemberId,
        body: &str,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if !parent.has_participant(&sender_id) {
            return Err(DomainError::forbidden("Only thread participants can reply"));
        }
        let body = validate_body(body)?;
        let recipient_id = parent.other_participant(&sender_id);
        Ok(Self {
            id: MessageId::new(),
            thread_id: parent.thread_id,
            parent_id: Some(parent.id),
            sender_id,
            recipient_id,
            opportunity_id: parent.opportunity_id,
            subject: parent.subject.clone(),
            body,
            status: MessageStatus::Unread,
            created_at: now,
            read_at: None,
        })
    }

    pub fn has_participant(&self, member: &MemberId) -> bool {
        self.sender_id == *member || self.recipient_id == *member
    }

    fn other_participant(&self, member: &MemberId) -> MemberId {
        if self.sender_id == *member {
            self.recipient_id
        } else {
            self.sender_id
        }
    }

    fn ensure_recipient(&self, member: &MemberId) -> Result<(), DomainError> {
        if self.recipient_id != *member {
            return Err(DomainError::forbidden("Only the recipient can change this message"));
        }
        Ok(())
    }

    /// Marks the message read. Archived messages stay archived.
    pub fn mark_read(&mut self, member: &MemberId, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_recipient(member)?;
        if self.status == MessageStatus::Unread {
            self.status = MessageStatus::Read;
            self.read_at = Some(now);
        }
        Ok(())
    }

    pub fn archive(&mut self, member: &MemberId, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_recipient(member)?;
        if self.read_at.is_none() {
            self.read_at = Some(now);
        }
        self.status = MessageStatus::Archived;
        Ok(())
    }

    /// Whether the message belongs in `folder` for `member`.
    pub fn in_folder(&self, member: &MemberId, folder: Folder) -> bool {
        match folder {
            Folder::Inbox => {
                self.recipient_id == *member && self.status != MessageStatus::Archived
            }
            Folder::Sent => self.sender_id == *member,
            Folder::Archived => {
                self.recipient_id == *member && self.status == MessageStatus::Archived
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn thread(from: MemberId, to: MemberId) -> Message {
        Message::new_thread(
            from,
            to,
            Some("Your keynote".to_string()),
            "Are you available in May?",
            None,
            Timestamp::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_thread_uses_own_id_as_thread() {
        let msg = thread(MemberId::new(), MemberId::new());
        assert_eq!(msg.thread_id, msg.id);
        assert_eq!(msg.status, MessageStatus::Unread);
    }

    #[test]
    fn cannot_message_self() {
        let me = MemberId::new();
        let err = Message::new_thread(me, me, None, "hi", None, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn blank_body_is_rejected() {
        let err =
            Message::new_thread(MemberId::new(), MemberId::new(), None, "  ", None, Timestamp::now())
                .unwrap_err();
        assert_eq!(err.details.get("field"), Some(&"body".to_string()));
    }

    #[test]
    fn reply_inherits_thread_and_flips_recipient() {
        let alice = MemberId::new();
        let bob = MemberId::new();
        let root = thread(alice, bob);
        let reply = Message::reply_to(&root, bob, "Yes, I am.", Timestamp::now()).unwrap();
        assert_eq!(reply.thread_id, root.id);
        assert_eq!(reply.parent_id, Some(root.id));
        assert_eq!(reply.recipient_id, alice);
        assert_eq!(reply.subject, root.subject);
    }

    #[test]
    fn outsiders_cannot_reply() {
        let root = thread(MemberId::new(), MemberId::new());
        let err = Message::reply_to(&root, MemberId::new(), "hello", Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn only_recipient_marks_read() {
        let alice = MemberId::new();
        let bob = MemberId::new();
        let mut msg = thread(alice, bob);
        assert!(msg.mark_read(&alice, Timestamp::now()).is_err());
        msg.mark_read(&bob, Timestamp::now()).unwrap();
        assert_eq!(msg.status, MessageStatus::Read);
        assert!(msg.read_at.is_some());
    }

    #[test]
    fn archived_message_moves_folders() {
        let alice = MemberId::new();
        let bob = MemberId::new();
        let mut msg = thread(alice, bob);
        assert!(msg.in_folder(&bob, Folder::Inbox));
        msg.archive(&bob, Timestamp::now()).unwrap();
        assert!(!msg.in_folder(&bob, Folder::Inbox));
        assert!(msg.in_folder(&bob, Folder::Archived));
        assert!(msg.in_folder(&alice, Folder::Sent));
    }
}
