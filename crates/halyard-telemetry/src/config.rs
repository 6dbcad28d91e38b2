//! Telemetry configuration.

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

/// Handler tracing settings.
///
/// `trace` is the default for routes that do not say otherwise; a route's own
/// flag always wins. `persist_response` is OR-ed with the route flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Whether routes are traced unless they opt out.
    pub trace: bool,

    /// Whether handler responses are attached to their subsegment.
    pub persist_response: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trace: true,
            persist_response: false,
        }
    }
}

/// What [`init_telemetry`](crate::init_telemetry) needs to start up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Deployment stage reported in the startup log line.
    pub environment: String,

    /// Handler tracing defaults.
    pub tracing: TraceConfig,

    /// Subscriber settings. `logging.service_name` names the function.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Telemetry for `service_name` with default tracing and logging.
    #[must_use]
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            logging: LogConfig {
                service_name: service_name.into(),
                ..LogConfig::default()
            },
            ..Self::default()
        }
    }

    /// The function name logs are tagged with.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.logging.service_name
    }

    /// Replaces the logging settings, keeping the current service name.
    #[must_use]
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        let service_name = std::mem::take(&mut self.logging.service_name);
        self.logging = LogConfig {
            service_name,
            ..logging
        };
        self
    }

    /// Sets the deployment stage.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            tracing: TraceConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.environment, "development");
        assert!(config.tracing.trace);
        assert!(!config.tracing.persist_response);
    }

    #[test]
    fn test_for_service() {
        let config = TelemetryConfig::for_service("orders").with_environment("production");
        assert_eq!(config.service_name(), "orders");
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn test_with_logging_keeps_service_name() {
        let config = TelemetryConfig::for_service("orders").with_logging(LogConfig {
            level: "debug".to_string(),
            service_name: "ignored".to_string(),
            ..LogConfig::default()
        });
        assert_eq!(config.service_name(), "orders");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_trace_config_rejects_unknown_fields() {
        let parsed: Result<TraceConfig, _> =
            serde_json::from_str(r#"{"trace": false, "sample_rate": 0.5}"#);
        assert!(parsed.is_err());

        let parsed: TraceConfig = serde_json::from_str(r#"{"trace": false}"#).unwrap();
        assert!(!parsed.trace);
        assert!(!parsed.persist_response);
    }
}
