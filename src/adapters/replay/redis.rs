//! Redis-backed replay guard.
//!
//! Event ids are stored as `SET key 1 EX ttl`; presence means the delivery
//! was already processed.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::ReplayGuard;

const KEY_PREFIX: &str = "podium:webhook:seen:";

#[derive(Clone)]
pub struct RedisReplayGuard {
    conn: MultiplexedConnection,
}

impl RedisReplayGuard {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    fn key(event_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, event_id)
    }
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, e.to_string())
}

#[async_trait]
impl ReplayGuard for RedisReplayGuard {
    async fn seen(&self, event_id: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        conn.exists(Self::key(event_id)).await.map_err(cache_error)
    }

    async fn remember(&self, event_id: &str, ttl_secs: u64) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(event_id), 1_u8, ttl_secs)
            .await
            .map_err(cache_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(
            RedisReplayGuard::key("evt_123"),
            "podium:webhook:seen:evt_123"
        );
    }
}
