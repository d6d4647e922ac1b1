//! `migrate`: apply, preview or roll back the embedded migrations.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        let url = self.config.database.url.as_str();

        match (dry_run, rollback) {
            (true, _) => {
                let pending = pending_migrations(url).await?;
                print_list(&pending, "No pending migrations, database is up to date", |n| {
                    format!("Found {n} pending migration(s):")
                });
            }
            (false, Some(steps)) => {
                println!("Rolling back {steps} migration(s)...");
                let reverted = revert_migrations(url, steps).await?;
                print_list(&reverted, "Nothing to roll back", |n| {
                    format!("✓ Rolled back {n} migration(s):")
                });
            }
            (false, None) => {
                let applied = run_pending_migrations(url).await?;
                print_list(&applied, "✓ No migrations to apply, database is up to date", |n| {
                    format!("✓ Applied {n} migration(s):")
                });
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

fn print_list(names: &[String], empty: &str, header: impl Fn(usize) -> String) {
    if names.is_empty() {
        println!("{empty}");
        return;
    }
    println!("{}", header(names.len()));
    for name in names {
        println!("  - {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_invalid_database_url_rejected_before_connecting() {
        let mut config = valid_settings();
        config.database.url = "mysql://localhost/jobhub".to_string();
        let handler = MigrateCommandHandler::new(config);

        let result = handler.execute(false, None).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_zero_rollback_steps_rejected() {
        let handler = MigrateCommandHandler::new(valid_settings());
        match handler.execute(false, Some(0)).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "rollback_steps"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
