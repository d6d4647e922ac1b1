//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// These never leave [`CacheManager`](super::CacheManager); callers only see
/// a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key pattern: {0}")]
    Pattern(String),
}
