//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_column, to_total};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, MessageId, OpportunityId, Page, PageResult, Timestamp,
};
use crate::domain::messaging::{Folder, Message};
use crate::ports::MessageRepository;

pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    thread_id: Uuid,
    parent_id: Option<Uuid>,
    sender_id: Uuid,
    recipient_id: Uuid,
    opportunity_id: Option<Uuid>,
    subject: Option<String>,
    body: String,
    status: String,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl TryFrom<MessageRow> for Message {
    type Error = DomainError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: MessageId::from_uuid(row.id),
            thread_id: MessageId::from_uuid(row.thread_id),
            parent_id: row.parent_id.map(MessageId::from_uuid),
            sender_id: MemberId::from_uuid(row.sender_id),
            recipient_id: MemberId::from_uuid(row.recipient_id),
            opportunity_id: row.opportunity_id.map(OpportunityId::from_uuid),
            subject: row.subject,
            body: row.body,
            status: parse_column("status", &row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            read_at: row.read_at.map(Timestamp::from_datetime),
        })
    }
}

const SELECT_MESSAGE: &str = r#"
    SELECT id, thread_id, parent_id, sender_id, recipient_id, opportunity_id,
           subject, body, status, created_at, read_at
    FROM messages
"#;

/// WHERE clause for a folder, with the member bound as `$1`.
fn folder_clause(folder: Folder) -> &'static str {
    match folder {
        Folder::Inbox => "WHERE recipient_id = $1 AND status <> 'archived'",
        Folder::Sent => "WHERE sender_id = $1",
        Folder::Archived => "WHERE recipient_id = $1 AND status = 'archived'",
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn save(&self, message: &Message) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, thread_id, parent_id, sender_id, recipient_id, opportunity_id,
                subject, body, status, created_at, read_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.thread_id.as_uuid())
        .bind(message.parent_id.map(|p| *p.as_uuid()))
        .bind(message.sender_id.as_uuid())
        .bind(message.recipient_id.as_uuid())
        .bind(message.opportunity_id.map(|o| *o.as_uuid()))
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.status.as_str())
        .bind(message.created_at.as_datetime())
        .bind(message.read_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save message", e))?;

        Ok(())
    }

    async fn update_status(&self, message: &Message) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE messages SET status = $2, read_at = $3 WHERE id = $1")
            .bind(message.id.as_uuid())
            .bind(message.status.as_str())
            .bind(message.read_at.map(|t| *t.as_datetime()))
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update message status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::MessageNotFound, "Message not found"));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, DomainError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_MESSAGE))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find message", e))?;

        row.map(Message::try_from).transpose()
    }

    async fn list_folder(
        &self,
        member: &MemberId,
        folder: Folder,
        page: Page,
    ) -> Result<PageResult<Message>, DomainError> {
        let clause = folder_clause(folder);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM messages {}", clause))
            .bind(member.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count messages", e))?;

        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "{} {} ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3",
            SELECT_MESSAGE, clause
        ))
        .bind(member.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list messages", e))?;

        let items = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }

    async fn thread(&self, thread_id: &MessageId) -> Result<Vec<Message>, DomainError> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "{} WHERE thread_id = $1 ORDER BY created_at ASC, id ASC",
            SELECT_MESSAGE
        ))
        .bind(thread_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load thread", e))?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn unread_count(&self, member: &MemberId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND status = 'unread'",
        )
        .bind(member.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count unread messages", e))?;

        Ok(to_total(count))
    }
}
