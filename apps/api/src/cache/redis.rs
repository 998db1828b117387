//! Redis cache backend, selected with CACHE_BACKEND=redis. Entries are
//! JSON blobs under a per-user key with a server-side TTL matching the
//! service-level freshness window.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::cache::{CacheStore, CachedAnalysis, ANALYSIS_TTL_HOURS};

pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("invalid REDIS_URL")?;
        Ok(Self { client })
    }

    fn key(user_id: Uuid) -> String {
        format!("analysis:{user_id}")
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<CachedAnalysis>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(user_id)).await?;
        match raw {
            Some(json) => {
                let entry =
                    serde_json::from_str(&json).context("corrupt cached analysis payload")?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, user_id: Uuid, entry: CachedAnalysis) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(&entry)?;
        // SETEX replaces the value and TTL atomically; a concurrent refresh
        // for the same user simply last-write-wins.
        let ttl_seconds = (ANALYSIS_TTL_HOURS * 3600) as u64;
        let _: () = conn.set_ex(Self::key(user_id), payload, ttl_seconds).await?;
        Ok(())
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::key(user_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced_per_user() {
        let user = Uuid::new_v4();
        let key = RedisCacheStore::key(user);
        assert!(key.starts_with("analysis:"));
        assert!(key.contains(&user.to_string()));
    }
}
