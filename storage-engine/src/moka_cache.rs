use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use purge::ports::CacheStore;
use shared::CacheError;
use std::fmt::Debug;
use std::time::Duration;

/// Moka-based cache implementation with TTL support
/// Provides lock-free, concurrent cache with optional size bounds and TTL
#[derive(Clone)]
pub struct MokaCache {
    cache: Cache<String, Bytes>,
}

impl MokaCache {
    /// Create a named Moka cache with optional capacity and default TTL
    pub fn new(name: &str, max_entries: Option<u64>, default_ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name(name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = default_ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub async fn put(&self, key: String, value: Bytes) {
        self.cache.insert(key, value).await;
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.cache.get(key).await
    }
}

#[async_trait]
impl CacheStore for MokaCache {
    async fn delete_keys(&self, keys: &[String]) -> Result<u64, CacheError> {
        let mut deleted = 0;
        for key in keys {
            // A repeated key finds nothing the second time round
            if self.cache.remove(key.as_str()).await.is_some() {
                deleted += 1;
            }
        }

        tracing::debug!("Deleted {} of {} requested key(s)", deleted, keys.len());
        Ok(deleted)
    }
}

impl Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
