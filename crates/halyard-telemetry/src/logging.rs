//! Structured logging for Halyard.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and either
//! a JSON formatter (for log aggregation in the function's log stream) or a
//! human-readable one for local runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use halyard_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::default())?;
//!
//! tracing::info!(request_id = "abc", http.method = "GET", "Dispatching event");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(TelemetryError::InvalidConfig(format!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level (e.g., "info", "debug", "warn").
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub include_location: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name for log fields.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            include_location: false,
            include_target: true,
            service_name: "halyard".to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            include_location: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Checks that `level` names a level.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for anything but
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub fn validate(&self) -> TelemetryResult<()> {
        if is_known_level(&self.level) {
            Ok(())
        } else {
            Err(TelemetryError::InvalidConfig(format!(
                "unknown log level '{}'",
                self.level
            )))
        }
    }
}

/// Returns `true` if `level` is a plain level name.
#[must_use]
pub fn is_known_level(level: &str) -> bool {
    let level = level.trim();
    level.eq_ignore_ascii_case("off") || tracing::Level::from_str(level).is_ok()
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the level does not parse or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
    }

    tracing::debug!(service = %config.service_name, "Logging initialized");
    Ok(())
}

/// Creates an env filter from a string.
///
/// `RUST_LOG`-style directives are accepted, e.g. `"info,halyard_router=debug"`.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.span_events);
        assert!(config.include_location);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_known_levels() {
        for level in ["trace", "DEBUG", "info", "Warn", "error", "off"] {
            assert!(is_known_level(level), "{level}");
        }
        assert!(!is_known_level("verbose"));
        assert!(!is_known_level(""));
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let config = LogConfig {
            level: "loud".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "warn", "format": "pretty"}"#).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_target);
    }

    #[test]
    fn test_deserialize_rejects_unknown_field() {
        assert!(serde_json::from_str::<LogConfig>(r#"{"colour": true}"#).is_err());
    }

    #[test]
    fn test_create_env_filter_directives() {
        assert!(create_env_filter("info,halyard_router=debug").is_ok());
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
