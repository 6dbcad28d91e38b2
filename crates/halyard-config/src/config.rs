//! Main configuration types.
//!
//! This module provides the top-level [`HalyardConfig`] struct and its builder.

use halyard_telemetry::{LogConfig, LogFormat, TelemetryConfig, TraceConfig};
use serde::{Deserialize, Serialize};

use crate::{AuthorizationConfig, ConfigError, CorsConfig, ServiceConfig};

/// Complete Halyard function configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use halyard_config::HalyardConfig;
///
/// let config = HalyardConfig::default();
/// assert!(config.telemetry.trace);
/// assert!(config.cors.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HalyardConfig {
    /// Service identity.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,

    /// Handler tracing configuration.
    #[serde(default)]
    pub telemetry: TraceConfig,

    /// Authorization configuration.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// CORS headers.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl HalyardConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use halyard_config::{HalyardConfig, ServiceConfig};
    ///
    /// let config = HalyardConfig::builder()
    ///     .service(ServiceConfig {
    ///         name: "orders".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.service.name, "orders");
    /// ```
    #[must_use]
    pub fn builder() -> HalyardConfigBuilder {
        HalyardConfigBuilder::new()
    }

    /// Create a development configuration.
    ///
    /// Pretty debug logs and response persistence in traces.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            telemetry: TraceConfig {
                trace: true,
                persist_response: true,
            },
            ..Self::default()
        }
    }

    /// Create a production configuration.
    #[must_use]
    pub fn production() -> Self {
        Self {
            service: ServiceConfig {
                environment: "production".to_string(),
                ..ServiceConfig::default()
            },
            logging: LogConfig {
                format: LogFormat::Json,
                ..LogConfig::production()
            },
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The service name is empty
    /// - The log level is not a level name
    /// - The role cache is enabled with zero capacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "service.name",
                "must not be empty",
            ));
        }

        if !halyard_telemetry::logging::is_known_level(&self.logging.level) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {}", self.logging.level),
            ));
        }

        if self.authorization.enabled
            && self.authorization.cache_enabled()
            && self.authorization.cache_max_entries == 0
        {
            return Err(ConfigError::validation_error(
                "authorization.cache_max_entries must be positive when the role cache is enabled",
            ));
        }

        Ok(())
    }

    /// The settings [`halyard_telemetry::init_telemetry`] starts from.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            environment: self.service.environment.clone(),
            tracing: self.telemetry.clone(),
            logging: LogConfig {
                service_name: self.service.name.clone(),
                ..self.logging.clone()
            },
        }
    }

    /// Copies the service identity into the logging section.
    pub(crate) fn sync_service_name(&mut self) {
        self.logging.service_name.clone_from(&self.service.name);
    }
}

/// Builder for [`HalyardConfig`].
#[derive(Debug, Default)]
pub struct HalyardConfigBuilder {
    service: Option<ServiceConfig>,
    logging: Option<LogConfig>,
    telemetry: Option<TraceConfig>,
    authorization: Option<AuthorizationConfig>,
    cors: Option<CorsConfig>,
}

impl HalyardConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service section.
    #[must_use]
    pub fn service(mut self, config: ServiceConfig) -> Self {
        self.service = Some(config);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Set the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, config: TraceConfig) -> Self {
        self.telemetry = Some(config);
        self
    }

    /// Set the authorization section.
    #[must_use]
    pub fn authorization(mut self, config: AuthorizationConfig) -> Self {
        self.authorization = Some(config);
        self
    }

    /// Set the CORS section.
    #[must_use]
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> HalyardConfig {
        let mut config = HalyardConfig {
            service: self.service.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
            authorization: self.authorization.unwrap_or_default(),
            cors: self.cors.unwrap_or_default(),
        };
        config.sync_service_name();
        config
    }
}
