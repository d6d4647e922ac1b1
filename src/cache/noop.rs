//! NoOp cache implementation.
//!
//! Used when caching is disabled. All operations are no-ops.

use async_trait::async_trait;

use crate::cache::{AppCache, CacheError};

/// A cache that never stores anything, so every read is a miss.
///
/// Used when `cache.enabled = false` in configuration.
#[derive(Debug, Default)]
pub struct NoOpCache;

#[async_trait]
impl AppCache for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate_pattern(&self, _pattern: &str) -> Result<usize, CacheError> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
