use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::cache::{CacheKey, KeyValueStore};
use crate::error::AppResult;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process implementation of [`KeyValueStore`]
///
/// Used by tests and by deployments without a configured Redis URL. Expiry
/// is lazy: expired entries are dropped when read. An entry stored with a
/// zero TTL is visible to no subsequent read.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired, not yet evicted) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &CacheKey, value: String, ttl_secs: u64) -> AppResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let name = key.to_string();

        {
            let entries = self.entries.read().await;
            match entries.get(&name) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Entry exists but is past its TTL: evict it under the write lock
        self.entries.write().await.remove(&name);
        Ok(None)
    }

    async fn del(&self, key: &CacheKey) -> AppResult<()> {
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }
}
