//! Message repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberId, MessageId, Page, PageResult};
use crate::domain::messaging::{Folder, Message};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn save(&self, message: &Message) -> Result<(), DomainError>;

    /// Persists `status` and `read_at`.
    async fn update_status(&self, message: &Message) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, DomainError>;

    /// Messages in `folder` for `member`, newest first.
    async fn list_folder(
        &self,
        member: &MemberId,
        folder: Folder,
        page: Page,
    ) -> Result<PageResult<Message>, DomainError>;

    /// All messages of a thread, oldest first.
    async fn thread(&self, thread_id: &MessageId) -> Result<Vec<Message>, DomainError>;

    async fn unread_count(&self, member: &MemberId) -> Result<u64, DomainError>;
}
