//! Typed configuration for Halyard functions.
//!
//! This crate covers two kinds of settings:
//! - [`HalyardConfig`]: how the framework behaves (logging, tracing,
//!   authorization, CORS), loaded in layers by [`ConfigLoader`]
//! - [`ConfigVault`]: free-form application settings read from prefixed
//!   environment variables through [`ConfigReader`]s
//!
//! # Overview
//!
//! [`HalyardConfig`] is made of these sections:
//!
//! - [`ServiceConfig`] - service name and environment
//! - [`LogConfig`](halyard_telemetry::LogConfig) - structured logging
//! - [`TraceConfig`](halyard_telemetry::TraceConfig) - handler subsegments
//! - [`AuthorizationConfig`] - role authorizer and its cache
//! - [`CorsConfig`] - CORS response headers
//!
//! Unknown fields are rejected in every section.
//!
//! # Example
//!
//! ```no_run
//! use halyard_config::{ConfigLoader, DEFAULT_ENV_PREFIX};
//!
//! # fn main() -> Result<(), halyard_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("halyard.toml")?
//!     .with_env_prefix(DEFAULT_ENV_PREFIX)
//!     .load()?;
//!
//! println!("Starting {}", config.service.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "orders"
//! environment = "production"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry]
//! trace = true
//! persist_response = false
//!
//! [authorization]
//! enabled = true
//! verify_claims = true
//! client_id = "5t2kq9orders"
//! cache_ttl_secs = 60
//!
//! [cors]
//! allow_origin = "https://app.example.com"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with variables named `PREFIX__SECTION__KEY`:
//!
//! - `HALYARD__SERVICE__NAME=orders`
//! - `HALYARD__LOGGING__LEVEL=debug`
//! - `HALYARD__AUTHORIZATION__CACHE_TTL_SECS=0`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;
mod vault;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::{parse_bool, ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::*;
pub use vault::{ConfigReader, ConfigVault, EnvironmentReader, DEFAULT_VAULT_PREFIX};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HalyardConfig::default();
        assert_eq!(config.service.name, "halyard-service");
        assert!(!config.authorization.enabled);
    }

    #[test]
    fn test_file_then_env_layers() {
        let config = ConfigLoader::new()
            .with_string(
                "[service]\nname = \"orders\"\n\n[logging]\nlevel = \"warn\"\n",
                "toml",
            )
            .unwrap()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .with_env_vars([("HALYARD__LOGGING__LEVEL", "error")])
            .load()
            .unwrap();

        assert_eq!(config.service.name, "orders");
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.logging.service_name, "orders");
    }
}
