//! Embedded schema migrations.
//!
//! `MigrationHarness` is synchronous, so every helper opens a blocking
//! `PgConnection` on the blocking thread pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Names of migrations not yet applied.
pub async fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, "check pending migrations", |conn| {
        conn.pending_migrations(MIGRATIONS)
            .map(|pending| pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Apply every pending migration, returning the applied versions.
pub async fn run_pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, "run pending migrations", |conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.iter().map(|v| v.to_string()).collect())
    })
    .await
}

/// Revert the last `steps` migrations, returning the reverted versions.
pub async fn revert_migrations(database_url: &str, steps: u32) -> AppResult<Vec<String>> {
    if steps == 0 {
        return Err(AppError::validation(
            "rollback_steps",
            "Number of rollback steps must be greater than 0",
        ));
    }

    with_connection(database_url, "revert migrations", move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            match conn.revert_last_migration(MIGRATIONS) {
                Ok(version) => reverted.push(version.to_string()),
                Err(e) if reverted.is_empty() => return Err(e),
                // fewer applied migrations than requested
                Err(_) => break,
            }
        }
        Ok(reverted)
    })
    .await
}

async fn with_connection<T, F>(database_url: &str, operation: &'static str, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> diesel::migration::Result<T> + Send + 'static,
{
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: format!("establish connection ({operation})"),
            source: anyhow::anyhow!("Connection error: {}", e),
        })?;

        f(&mut conn).map_err(|e| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::anyhow!("Migration error: {}", e),
        })
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}
