//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    AlertsConfig, CacheBackend, CacheConfig, CorsConfig, DatabaseConfig, FileSettings, JwtConfig,
    LoggerSettings, ServerConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Minimum length of the token signing secret
const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Keep-alive timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CorsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.allowed_origin.trim();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                field: "cors.allowed_origin".to_string(),
                message: format!(
                    "Allowed origin '{}' must be an http:// or https:// URL.",
                    self.allowed_origin
                ),
            });
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a PostgreSQL connection string
    /// - Max and min connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl JwtConfig {
    /// Validate JWT configuration
    ///
    /// # Validation Rules
    /// - Secret must be at least 32 characters
    /// - Expiration must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret should be at least 32 characters for security",
            ));
        }

        if self.expiration_hours <= 0 {
            return Err(ConfigError::validation(
                "jwt.expiration_hours",
                "Token expiration must be positive",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()?;

        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.ttl_seconds == 0 {
            return Err(ConfigError::validation(
                "cache.ttl_seconds",
                "Cache TTL must be greater than 0 seconds.",
            ));
        }

        match self.backend {
            CacheBackend::Memory if self.memory.max_size == 0 => Err(ConfigError::validation(
                "cache.memory.max_size",
                "Memory cache size must be greater than 0.",
            )),
            CacheBackend::Redis if !self.redis.url.starts_with("redis") => {
                Err(ConfigError::validation(
                    "cache.redis.url",
                    "Redis URL must use the redis:// or rediss:// scheme.",
                ))
            }
            CacheBackend::Redis if self.redis.pool_size == 0 => Err(ConfigError::validation(
                "cache.redis.pool_size",
                "Redis pool size must be greater than 0.",
            )),
            _ => Ok(()),
        }
    }
}

impl AlertsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.schedule.split_whitespace().count() != 6 {
            return Err(ConfigError::ValidationError {
                field: "alerts.schedule".to_string(),
                message: format!(
                    "Invalid cron expression '{}'. Expected six fields: sec min hour day month weekday",
                    self.schedule
                ),
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.cors.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        self.cache.validate()?;
        self.alerts.validate()?;
        Ok(())
    }
}
