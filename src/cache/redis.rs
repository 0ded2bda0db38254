use redis::{AsyncCommands, Client};

use crate::cache::{CacheKey, KeyValueStore};
use crate::error::AppResult;

/// Redis-backed implementation of [`KeyValueStore`]
///
/// Each operation opens a multiplexed connection from the shared client.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Creates a store from a Redis connection URL
    ///
    /// `Client::open` only validates the URL; the first command establishes
    /// the actual connection.
    pub fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &CacheKey, value: String, ttl_secs: u64) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key.to_string(), value, ttl_secs).await?;
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn del(&self, key: &CacheKey) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key.to_string()).await?;
        Ok(())
    }
}
