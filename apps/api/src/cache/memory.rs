//! Default cache backend: a process-local map. Slot count is bounded only
//! by distinct active users; acceptable for now since entries are small and
//! per-user.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::{CacheStore, CachedAnalysis};

#[derive(Default)]
pub struct InMemoryCacheStore {
    slots: Arc<RwLock<HashMap<Uuid, CachedAnalysis>>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<CachedAnalysis>> {
        Ok(self.slots.read().await.get(&user_id).cloned())
    }

    async fn set(&self, user_id: Uuid, entry: CachedAnalysis) -> Result<()> {
        // Whole-slot insert under the write lock: concurrent refreshes for
        // the same user last-write-win without torn reads.
        self.slots.write().await.insert(user_id, entry);
        Ok(())
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<()> {
        self.slots.write().await.remove(&user_id);
        Ok(())
    }
}
