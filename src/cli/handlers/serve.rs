//! `serve`: run the server, or only check the configuration.

use crate::config::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            for line in self.dry_run_report() {
                println!("{line}");
            }
            return Ok(());
        }
        Server::new(self.config).run().await
    }

    /// What a real start would use; settings were validated by the merger.
    fn dry_run_report(&self) -> Vec<String> {
        let alerts = if self.config.alerts.enabled {
            format!("enabled, schedule '{}'", self.config.alerts.schedule)
        } else {
            "disabled".to_string()
        };
        let cache = if self.config.cache.enabled {
            format!("{:?}, ttl {}s", self.config.cache.backend, self.config.cache.ttl_seconds)
        } else {
            "disabled".to_string()
        };

        vec![
            "✓ Configuration is valid".to_string(),
            format!("✓ Server would bind to: {}", self.config.server.address()),
            format!("✓ CORS origin: {}", self.config.cors.allowed_origin),
            format!("✓ Cache: {cache}"),
            format!("✓ Alert scheduler: {alerts}"),
            format!("✓ Log level: {}", self.config.logger.level),
            "Dry run completed successfully".to_string(),
        ]
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;

    #[test]
    fn test_dry_run_report_describes_settings() {
        let mut settings = valid_settings();
        settings.alerts.enabled = false;
        let handler = ServeCommandHandler::new(settings.clone());

        let report = handler.dry_run_report();
        assert!(report.contains(&format!(
            "✓ Server would bind to: {}",
            settings.server.address()
        )));
        assert!(report.contains(&"✓ Alert scheduler: disabled".to_string()));
        assert_eq!(handler.config(), &settings);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_start_server() {
        let handler = ServeCommandHandler::new(valid_settings());
        assert!(handler.execute(true).await.is_ok());
    }
}
