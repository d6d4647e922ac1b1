//! AppCache trait definition.

use async_trait::async_trait;

use crate::cache::CacheError;

/// Byte-level cache operations shared by every backend.
///
/// Keys are plain strings; patterns passed to [`AppCache::invalidate_pattern`]
/// use Redis glob syntax (`*` and `?`).
#[async_trait]
pub trait AppCache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Set a value in the cache with optional TTL override.
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError>;

    /// Remove a value from the cache.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key matching `pattern`, returning how many were removed.
    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Backend name for health reporting.
    fn name(&self) -> &'static str;
}
