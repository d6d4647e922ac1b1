//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_rollback_steps,
};

/// Job listing search and tracking API server
#[derive(Parser, Debug)]
#[command(name = "jobhub")]
#[command(about = "Job listing search and tracking API server")]
#[command(long_about = "
Jobhub serves the job listing REST API: filtered search over postings,
saved jobs and applications per user, and job alerts evaluated on a cron
schedule.

EXAMPLES:
    # Start the server with the layered configuration in ./config
    jobhub serve

    # Listen on every interface
    jobhub serve --host 0.0.0.0 --port 8080

    # Single configuration file, production settings
    jobhub --config /etc/jobhub/jobhub.toml --env production serve

    # Check configuration without starting the server
    jobhub serve --dry-run

    # Apply, preview or roll back schema migrations
    jobhub migrate
    jobhub migrate --dry-run
    jobhub migrate --rollback 1
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute, `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Replaces the layered files under ./config (default.toml, the
    /// environment file and local.toml). JOBHUB_* variables still apply.
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (JOBHUB_APP_ENV)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server and the alert scheduler (default)
    Serve {
        /// Address to bind, e.g. 127.0.0.1 or 0.0.0.0
        #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
        host: Option<String>,

        /// TCP port to listen on (1-65535)
        #[arg(short, long, value_name = "PORT", value_parser = validate_port)]
        port: Option<u16>,

        /// Log level for this run, overrides --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database schema migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the most recent STEPS migrations (1-100)
        #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl Cli {
    /// The subcommand to run; a bare invocation serves with file settings.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        })
    }

    /// Log level implied by the global flags, if any.
    pub fn global_log_level(&self) -> Option<LogLevel> {
        if self.verbose {
            Some(LogLevel::Debug)
        } else if self.quiet {
            Some(LogLevel::Error)
        } else {
            None
        }
    }
}
