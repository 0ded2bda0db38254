use std::fmt::Display;

use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// Keys for values stored through a [`KeyValueStore`]
///
/// Every key renders to a namespaced string so entries from different
/// concerns never collide inside one cache database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One write-only similarity telemetry record for a user's request
    SimilarityLog { user_id: i64, entry_id: Uuid },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::SimilarityLog { user_id, entry_id } => {
                write!(f, "simlog:{}:{}", user_id, entry_id)
            }
        }
    }
}

/// Injected key-value cache interface
///
/// The recommendation service never depends on a concrete cache product;
/// collaborators receive this trait and are wired to Redis in production or
/// to the in-memory store in tests and Redis-less deployments. Entries
/// expire after `ttl_secs` seconds.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key` with a time-to-live
    async fn set(&self, key: &CacheKey, value: String, ttl_secs: u64) -> AppResult<()>;

    /// Retrieves the value stored under `key`, or `None` when absent/expired
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>>;

    /// Removes the value stored under `key`, if any
    async fn del(&self, key: &CacheKey) -> AppResult<()>;
}
