//! In-memory replay guard for tests and single-process runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::ReplayGuard;

#[derive(Debug, Default, Clone)]
pub struct InMemoryReplayGuard {
    /// Event id → expiry.
    entries: Arc<RwLock<HashMap<String, Timestamp>>>,
}

impl InMemoryReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReplayGuard for InMemoryReplayGuard {
    async fn seen(&self, event_id: &str) -> Result<bool, DomainError> {
        let now = Timestamp::now();
        Ok(self
            .entries
            .read()
            .await
            .get(event_id)
            .map(|expires_at| expires_at.is_after(&now))
            .unwrap_or(false))
    }

    async fn remember(&self, event_id: &str, ttl_secs: u64) -> Result<(), DomainError> {
        let now = Timestamp::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| expires_at.is_after(&now));
        entries.insert(event_id.to_string(), now.plus_secs(ttl_secs as i64));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remembered_ids_are_seen() {
        let guard = InMemoryReplayGuard::new();
        assert!(!guard.seen("evt_1").await.unwrap());
        guard.remember("evt_1", 300).await.unwrap();
        assert!(guard.seen("evt_1").await.unwrap());
        assert!(!guard.seen("evt_2").await.unwrap());
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let guard = InMemoryReplayGuard::new();
        guard.remember("evt_1", 0).await.unwrap();
        assert!(!guard.seen("evt_1").await.unwrap());
    }
}
