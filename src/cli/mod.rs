//! Command-line interface: argument parsing, configuration merging and
//! command dispatch for `serve` and `migrate`.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;

/// Loads configuration for the chosen file and environment, then applies
/// the command-line overrides and validates the result.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli).context("Configuration error")?;
    merger
        .merge_cli_args(cli)
        .context("Configuration merge error")
}

pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;
    init_logger(logger_config).context("Logger initialization error")
}
