//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;

/// Runs the selected command with merged, validated settings.
///
/// `serve` without `--dry-run` returns only after a graceful shutdown.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.command() {
        Commands::Serve { dry_run, .. } => ServeCommandHandler::new(settings).execute(dry_run).await,
        Commands::Migrate { dry_run, rollback } => {
            if let Some(steps) = rollback
                && steps > 10
            {
                tracing::warn!(steps, "rolling back a large number of migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run_returns() {
        let cli = Cli::try_parse_from(["jobhub", "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, valid_settings()).await.is_ok());
    }

    #[tokio::test]
    async fn test_migrate_errors_propagate() {
        let cli = Cli::try_parse_from(["jobhub", "migrate"]).unwrap();
        let mut settings = valid_settings();
        settings.database.url = String::new();

        let err = execute_command(&cli, settings).await.unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }
}
