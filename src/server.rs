//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::background::AlertScheduler;
use crate::cache::CacheManager;
use crate::config::{CacheConfig, Environment, Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Applies pending migrations when `database.auto_migrate` is set
    /// 3. Initializes the connection pool and the cache
    /// 4. Starts the alert scheduler when enabled
    /// 5. Serves HTTP until Ctrl+C or SIGTERM, then stops the scheduler
    ///
    /// # Errors
    /// - Migration or connection pool initialization errors
    /// - Invalid alert schedule or CORS origin
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_configuration();

        if self.settings.database.auto_migrate {
            let applied = run_pending_migrations(&self.settings.database.url).await?;
            tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        }

        tracing::info!("Initializing database connection pool...");
        let pool = establish_async_connection_pool(&self.settings.database).await?;
        tracing::info!("Database connection pool initialized");

        let cache = init_cache(&self.settings.cache).await;
        let address = self.settings.server.address();
        let alerts_config = self.settings.alerts.clone();

        let state = AppState::new(pool, cache, Arc::new(self.settings));

        let scheduler = if alerts_config.enabled {
            let scheduler = AlertScheduler::new(&alerts_config, state.services.alerts.clone()).await?;
            scheduler.start().await?;
            tracing::info!(schedule = %alerts_config.schedule, "Alert scheduler started");
            Some(scheduler)
        } else {
            tracing::info!("Alert scheduler disabled");
            None
        };

        let router = create_router(state)?;
        tracing::info!("Router configured");

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(scheduler) = scheduler
            && let Err(e) = scheduler.stop().await
        {
            tracing::warn!(error = %e, "Alert scheduler did not stop cleanly");
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_configuration(&self) {
        let settings = &self.settings;
        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            build_version = %crate::pkg_version(),
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = %settings.server.port,
            request_timeout = %settings.server.request_timeout,
            keep_alive_timeout = %settings.server.keep_alive_timeout,
            cors_origin = %settings.cors.allowed_origin,
            "Server configuration loaded"
        );
        // Never log the URL, it carries credentials.
        tracing::info!(
            max_connections = %settings.database.max_connections,
            min_connections = %settings.database.min_connections,
            connection_timeout = %settings.database.connection_timeout,
            auto_migrate = %settings.database.auto_migrate,
            "Database configuration loaded"
        );
        tracing::info!(
            expiration_hours = %settings.jwt.expiration_hours,
            secret_configured = %(!settings.jwt.secret.is_empty()),
            "JWT configuration loaded"
        );
        tracing::info!(
            enabled = %settings.cache.enabled,
            backend = ?settings.cache.backend,
            ttl_seconds = %settings.cache.ttl_seconds,
            "Cache configuration loaded"
        );
    }
}

/// Builds the configured cache, degrading to no caching when the backend
/// cannot be reached so the API still serves from the database.
async fn init_cache(config: &CacheConfig) -> CacheManager {
    match CacheManager::new(config).await {
        Ok(cache) if cache.ping().await => {
            tracing::info!(backend = cache.backend_name(), "Cache initialized");
            cache
        }
        Ok(cache) => {
            tracing::warn!(
                backend = cache.backend_name(),
                "Cache backend unreachable, continuing without caching"
            );
            CacheManager::disabled()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cache unavailable, continuing without caching");
            CacheManager::disabled()
        }
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheBackend, RedisCacheConfig};

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_no_cache() {
        let config = CacheConfig {
            enabled: true,
            backend: CacheBackend::Redis,
            redis: RedisCacheConfig {
                url: "redis://127.0.0.1:1".to_string(),
                connection_timeout: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        let cache = init_cache(&config).await;
        assert_eq!(cache.backend_name(), CacheManager::disabled().backend_name());
    }
}
