//! Cache manager that dispatches to the configured backend.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::keys;
use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::redis::RedisCache;
use crate::cache::{AppCache, CacheError};
use crate::config::{CacheBackend, CacheConfig};
use crate::error::AppResult;

/// Cache-aside front of the configured backend.
///
/// Backend failures degrade to misses: they are logged at `warn` and the
/// wrapped computation runs as if the cache were disabled.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn AppCache>,
    default_ttl: u64,
}

impl CacheManager {
    /// Create a new cache manager with the given configuration.
    ///
    /// If caching is disabled, a NoOpCache is used.
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn AppCache> = if !config.enabled {
            Arc::new(NoOpCache)
        } else {
            match config.backend {
                CacheBackend::Memory => Arc::new(MemoryCache::new(&config.memory, config.ttl_seconds)),
                CacheBackend::Redis => {
                    Arc::new(RedisCache::new(&config.redis, config.ttl_seconds).await?)
                }
            }
        };

        Ok(Self::with_backend(backend, config.ttl_seconds))
    }

    pub fn with_backend(backend: Arc<dyn AppCache>, default_ttl: u64) -> Self {
        Self {
            backend,
            default_ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::with_backend(Arc::new(NoOpCache), 0)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Round-trips a sentinel read; used by the health endpoint.
    pub async fn ping(&self) -> bool {
        self.backend.get("health:ping").await.is_ok()
    }

    /// Return the cached value for `key`, or run `compute` and back-fill.
    ///
    /// The flag is true when the value came from the cache.
    pub async fn get_or_compute<T, Fut>(
        &self,
        key: &str,
        ttl_seconds: Option<u64>,
        compute: Fut,
    ) -> AppResult<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(value) = self.read(key).await {
            tracing::debug!(key, "cache hit");
            return Ok((value, true));
        }

        let value = compute.await?;
        self.write(key, &value, ttl_seconds.unwrap_or(self.default_ttl))
            .await;
        Ok((value, false))
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.backend.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: u64) {
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self.backend.set(key, bytes, Some(ttl)).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            tracing::warn!(key, error = %e, "cache remove failed");
        }
    }

    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        match self.backend.invalidate_pattern(pattern).await {
            Ok(removed) => {
                tracing::debug!(pattern, removed, "cache invalidated");
                removed
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "cache invalidation failed");
                0
            }
        }
    }

    /// Drop listings, searches and stats after a job write.
    pub async fn invalidate_jobs(&self) {
        for pattern in [keys::JOBS_PATTERN, keys::SEARCH_PATTERN, keys::STATS_PATTERN] {
            self.invalidate_pattern(pattern).await;
        }
    }

    /// Drop a user's cached data along with listings and searches.
    pub async fn invalidate_user(&self, user_id: i32) {
        self.invalidate_pattern(&keys::user_pattern(user_id)).await;
        for pattern in [keys::JOBS_PATTERN, keys::SEARCH_PATTERN] {
            self.invalidate_pattern(pattern).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::config::MemoryCacheConfig;
    use crate::error::AppError;

    fn memory_manager() -> CacheManager {
        CacheManager::with_backend(
            Arc::new(MemoryCache::new(&MemoryCacheConfig::default(), 300)),
            300,
        )
    }

    struct BrokenCache;

    #[async_trait]
    impl AppCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn set(&self, _: &str, _: Vec<u8>, _: Option<u64>) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn invalidate_pattern(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_returns_same_value() {
        let cache = memory_manager();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec!["Rust Engineer".to_string()])
        };

        let (first, from_cache) = cache.get_or_compute("k", None, compute()).await.unwrap();
        assert!(!from_cache);
        let (second, from_cache) = cache.get_or_compute("k", None, compute()).await.unwrap();
        assert!(from_cache);

        assert_eq!(first, second);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_through_to_compute() {
        let cache = CacheManager::with_backend(Arc::new(BrokenCache), 300);

        let (value, from_cache) = cache
            .get_or_compute("k", None, async { Ok::<_, AppError>(5_i64) })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert!(!from_cache);

        cache.invalidate_jobs().await;
        cache.invalidate_user(1).await;
    }

    #[tokio::test]
    async fn test_compute_error_is_not_cached() {
        let cache = memory_manager();

        let result: AppResult<(i64, bool)> = cache
            .get_or_compute("k", None, async {
                Err(AppError::BadRequest {
                    message: "boom".into(),
                })
            })
            .await;
        assert!(result.is_err());

        let (value, from_cache) = cache
            .get_or_compute("k", None, async { Ok::<_, AppError>(1_i64) })
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert!(!from_cache);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_recomputed() {
        let cache = memory_manager();
        cache
            .backend
            .set("k", b"not json".to_vec(), None)
            .await
            .unwrap();

        let (value, from_cache) = cache
            .get_or_compute("k", None, async { Ok::<_, AppError>(3_i64) })
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert!(!from_cache);
    }

    #[tokio::test]
    async fn test_job_invalidation_scope() {
        let cache = memory_manager();
        for key in ["jobs:{}:1:20:postedDate:desc", "search:{}:1:20", "stats:jobs", "user:7:saved"] {
            cache.backend.set(key, b"1".to_vec(), None).await.unwrap();
        }

        cache.invalidate_jobs().await;

        assert!(cache.backend.get("jobs:{}:1:20:postedDate:desc").await.unwrap().is_none());
        assert!(cache.backend.get("search:{}:1:20").await.unwrap().is_none());
        assert!(cache.backend.get("stats:jobs").await.unwrap().is_none());
        assert!(cache.backend.get("user:7:saved").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_user_invalidation_scope() {
        let cache = memory_manager();
        for key in ["user:7:saved", "user:8:saved", "jobs:detail:1", "stats:jobs"] {
            cache.backend.set(key, b"1".to_vec(), None).await.unwrap();
        }

        cache.invalidate_user(7).await;

        assert!(cache.backend.get("user:7:saved").await.unwrap().is_none());
        assert!(cache.backend.get("user:8:saved").await.unwrap().is_some());
        assert!(cache.backend.get("jobs:detail:1").await.unwrap().is_none());
        assert!(cache.backend.get("stats:jobs").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let cache = CacheManager::disabled();
        for _ in 0..2 {
            let (_, from_cache) = cache
                .get_or_compute("k", None, async { Ok::<_, AppError>(1_i64) })
                .await
                .unwrap();
            assert!(!from_cache);
        }
        assert_eq!(cache.backend_name(), "disabled");
    }
}
