//! Cache-aside layer with pluggable backends.
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"  # or "redis"
//! ttl_seconds = 300
//!
//! [cache.memory]
//! max_size = 10000
//!
//! [cache.redis]
//! url = "redis://127.0.0.1:6379"
//! pool_size = 4
//! connection_timeout = 5
//! key_prefix = "jobhub"
//! ```
//!
//! Services go through [`CacheManager::get_or_compute`], which never fails
//! because of the cache itself.

mod error;
pub mod keys;
mod manager;
mod memory;
mod noop;
mod redis;
mod traits;

pub use error::CacheError;
pub use manager::CacheManager;
pub use traits::AppCache;
