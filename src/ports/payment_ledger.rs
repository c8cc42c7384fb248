//! Payment ledger port.

use async_trait::async_trait;

use crate::domain::billing::{Payment, RecordOutcome};
use crate::domain::foundation::{DomainError, MemberId};

/// Append-only ledger keyed by external invoice id.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Inserts unless a row with the same invoice id exists.
    async fn record(&self, payment: &Payment) -> Result<RecordOutcome, DomainError>;

    /// Newest payments first.
    async fn recent_for_member(
        &self,
        member_id: &MemberId,
        limit: u32,
    ) -> Result<Vec<Payment>, DomainError>;
}
