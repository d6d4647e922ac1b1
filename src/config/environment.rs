//! Deployment environment, selects `config/{environment}.toml`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Environment variable holding the current environment
    pub const ENV_VAR: &'static str = "JOBHUB_APP_ENV";

    pub(crate) const ALL: [Environment; 4] = [
        Environment::Development,
        Environment::Test,
        Environment::Staging,
        Environment::Production,
    ];

    /// Reads `JOBHUB_APP_ENV`, falling back to development when unset or
    /// unrecognized.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    fn short_name(&self) -> Option<&'static str> {
        match self {
            Environment::Development => Some("dev"),
            Environment::Staging => Some("stage"),
            Environment::Production => Some("prod"),
            Environment::Test => None,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == wanted || env.short_name() == Some(wanted.as_str()))
            .ok_or_else(|| {
                ConfigError::EnvVarError(format!(
                    "Invalid environment '{}'. Valid values are: development, test, staging, production",
                    s
                ))
            })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
