//! Layered configuration loading.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "JOBHUB_CONFIG_DIR";

/// Environment variable for a single configuration file
const CONFIG_FILE_ENV: &str = "JOBHUB_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "JOBHUB";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Loads [`Settings`] from layered sources.
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `JOBHUB_*` environment variables
///
/// When a single configuration file is selected, it replaces the three file
/// layers; environment variables still apply on top.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `JOBHUB_CONFIG_DIR`, `JOBHUB_CONFIG_FILE` and
    /// `JOBHUB_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `JOBHUB_CONFIG_DIR` and `JOBHUB_CONFIG_FILE`
    /// are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "JOBHUB_CONFIG_DIR and JOBHUB_CONFIG_FILE cannot both be set. \
                 Use JOBHUB_CONFIG_DIR for layered configuration or \
                 JOBHUB_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load a single file instead of the layered directory.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment read from `JOBHUB_APP_ENV`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load and validate settings from all sources.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings without validating them, for callers that apply further
    /// overrides first.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = match &self.config_file {
            Some(config_file) => add_file_source(Config::builder(), config_file, true)?,
            None => self.build_layered_config(Config::builder())?,
        };

        // JOBHUB_SERVER__PORT -> server.port
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let env_file = format!("{}.toml", self.environment.as_str());
        let builder = add_file_source(builder, &self.config_dir.join(env_file), false)?;
        add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    let Some(name) = path.to_str() else {
        return Err(ConfigError::file_not_found(format!(
            "Configuration path is not valid UTF-8: {}",
            path.display()
        )));
    };

    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
}
