//! Replay guard port for webhook deliveries.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Short-lived set of already-processed event ids.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    async fn seen(&self, event_id: &str) -> Result<bool, DomainError>;

    /// Remembers `event_id` for `ttl_secs`.
    async fn remember(&self, event_id: &str, ttl_secs: u64) -> Result<(), DomainError>;
}
