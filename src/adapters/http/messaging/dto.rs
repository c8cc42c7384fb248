//! Request bodies and query strings for the messaging endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::messaging::SendMessageCommand;
use crate::domain::foundation::{MemberId, MessageId, OpportunityId, Page, ValidationError};
use crate::domain::messaging::Folder;

/// POST /api/messages
///
/// A new thread needs `recipient_id`; a reply names `parent_id` and the
/// recipient is derived from the parent.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Option<MemberId>,
    pub parent_id: Option<MessageId>,
    pub subject: Option<String>,
    pub body: String,
    pub opportunity_id: Option<OpportunityId>,
}

impl SendMessageRequest {
    pub fn into_command(self, sender_id: MemberId) -> SendMessageCommand {
        SendMessageCommand {
            sender_id,
            recipient_id: self.recipient_id,
            parent_id: self.parent_id,
            subject: self.subject,
            body: self.body,
            opportunity_id: self.opportunity_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListMessagesParams {
    pub folder: Option<Folder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListMessagesParams {
    pub fn into_parts(self) -> Result<(Folder, Page), ValidationError> {
        Ok((
            self.folder.unwrap_or_default(),
            Page::from_query(self.page, self.per_page)?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}
