//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::CacheManager;
use crate::config::Settings;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: the pool, the cache backend and the settings are all
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct access to the database connection pool
    pub db_pool: AsyncDbPool,
    pub cache: CacheManager,
    pub settings: Arc<Settings>,
    /// When the process started serving, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Wires repositories and services on top of the pool and cache.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let cache = CacheManager::new(&settings.cache).await?;
    /// let state = AppState::new(pool, cache, Arc::new(settings));
    /// ```
    pub fn new(pool: AsyncDbPool, cache: CacheManager, settings: Arc<Settings>) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, cache.clone(), settings.jwt.clone());
        Self {
            services,
            db_pool: pool,
            cache,
            settings,
            started_at: Instant::now(),
        }
    }
}
