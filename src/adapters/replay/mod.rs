//! Replay guard adapters.

mod in_memory;
mod redis;

pub use self::redis::RedisReplayGuard;
pub use in_memory::InMemoryReplayGuard;
