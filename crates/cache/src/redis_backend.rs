//! Redis implementation of the shared cache backend.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use std::time::Duration;

use maitre_core::cache::SharedCacheBackend;
use maitre_core::error::CacheError;

/// Shared cache tier backed by Redis.
pub struct RedisCacheBackend {
    client: Client,
}

impl RedisCacheBackend {
    /// Create a backend from a connection URL (`redis://[:pass@]host:port/`).
    ///
    /// Connecting is lazy; an unreachable server surfaces on first use as
    /// `CacheError::Unavailable`, which the tier absorbs.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Unavailable(format!("invalid cache URL: {e}")))?;
        Ok(Self { client })
    }

    async fn conn(&self) -> Result<MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Unavailable(format!("connection error: {e}")))
    }
}

#[async_trait]
impl SharedCacheBackend for RedisCacheBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Unavailable(format!("get error: {e}")))?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .set_ex(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| CacheError::Unavailable(format!("set error: {e}")))?;
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn
            .keys(pattern)
            .await
            .map_err(|e| CacheError::Unavailable(format!("keys error: {e}")))?;

        if keys.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn
            .del(&keys)
            .await
            .map_err(|e| CacheError::Unavailable(format!("del error: {e}")))?;
        Ok(removed)
    }
}
