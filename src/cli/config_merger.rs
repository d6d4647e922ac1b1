//! Applies CLI overrides on top of file and environment configuration.
//!
//! Precedence, highest first: subcommand flags, global flags, `JOBHUB_*`
//! variables, configuration files.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads unvalidated settings for the file and environment chosen on
    /// the command line; validation happens after the overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        Ok(Self::new(loader.load_unvalidated()?))
    }

    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if let Some(level) = cli.global_log_level() {
            config.logger.level = level.as_str().to_string();
        }

        if let Commands::Serve {
            host,
            port,
            log_level,
            ..
        } = cli.command()
        {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;
    use clap::Parser;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(valid_settings()).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let merged = merge(&["jobhub"]).unwrap();
        assert_eq!(merged, valid_settings());
    }

    #[test]
    fn test_global_flags_set_log_level() {
        assert_eq!(merge(&["jobhub", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["jobhub", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let merged = merge(&["jobhub", "serve", "--host", "0.0.0.0", "--port", "8080"]).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_beats_global_flag() {
        let merged = merge(&["jobhub", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_merged_settings_are_validated() {
        let cli = Cli::try_parse_from(["jobhub", "serve"]).unwrap();
        let mut base = valid_settings();
        base.jwt.secret = String::new();

        let result = ConfigurationMerger::new(base).merge_cli_args(&cli);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_merger_keeps_base_config() {
        let merger = ConfigurationMerger::new(valid_settings());
        assert_eq!(merger.config(), &valid_settings());
    }
}
