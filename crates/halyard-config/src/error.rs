//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded or read.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("config file {path} does not exist")]
    MissingFile {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("cannot read config file {path}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`HalyardConfig`](crate::HalyardConfig).
    #[error("bad TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file is not valid JSON for [`HalyardConfig`](crate::HalyardConfig).
    #[error("bad JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The `.env` file could not be parsed.
    #[error("bad .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A setting or vault key holds a value of the wrong shape.
    #[error("{field} has an invalid value: {reason}")]
    InvalidValue {
        /// Setting path (`service.name`) or vault key (`db-port`).
        field: String,
        /// What was expected.
        reason: String,
    },

    /// A `HALYARD__SECTION__KEY` variable could not be applied.
    #[error("environment variable {var} is invalid: {reason}")]
    EnvVar {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// The loaded configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// A required file is missing.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    /// Reading `path` failed.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `field` holds an unusable value.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The variable `var` could not be parsed.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// The configuration as a whole is inconsistent.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
