//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::poll::BackoffPolicy;

/// Connection configuration derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "GANGWAY")]
pub struct ConnectConfig {
    /// Access token used to authenticate API calls. This value is required.
    pub token: String,
    /// Base URL of the codespaces API.
    #[ortho_config(default = "https://api.github.com".to_owned())]
    pub api_url: String,
    /// Soft budget, in seconds, for waiting on a codespace to start. Feeds
    /// the backoff policy's overall elapsed-time limit.
    #[ortho_config(default = 300_u64)]
    pub start_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl ConnectConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to gangway.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("gangway")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.token,
            &FieldMetadata {
                description: "API access token",
                env_var: "GANGWAY_TOKEN",
                toml_key: "token",
            },
        )?;
        Self::require_field(
            &self.api_url,
            &FieldMetadata {
                description: "API base URL",
                env_var: "GANGWAY_API_URL",
                toml_key: "api_url",
            },
        )?;
        if self.start_timeout_secs == 0 {
            return Err(ConfigError::MissingField(String::from(
                "start_timeout_secs must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Builds the backoff policy for readiness waits, honouring the
    /// configured timeout.
    #[must_use]
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_elapsed: Duration::from_secs(self.start_timeout_secs),
            ..BackoffPolicy::default()
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or invalid.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
