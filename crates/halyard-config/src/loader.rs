//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, `.env` files and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use halyard_telemetry::LogFormat;

use crate::{ConfigError, HalyardConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "HALYARD";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. `.env` file
/// 4. Environment variables
///
/// # Example
///
/// ```no_run
/// use halyard_config::ConfigLoader;
///
/// # fn main() -> Result<(), halyard_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("halyard.toml")?
///     .with_dotenv()?
///     .with_env_prefix("HALYARD")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HalyardConfig,
    env_prefix: Option<String>,
    dotenv_vars: Vec<(String, String)>,
    env_vars: Option<Vec<(String, String)>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HalyardConfig::default(),
            env_prefix: None,
            dotenv_vars: Vec::new(),
            env_vars: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HalyardConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use halyard_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HalyardConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HalyardConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The file format (TOML or JSON) is chosen by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is not
    /// `"toml"` or `"json"`.
    ///
    /// # Example
    ///
    /// ```
    /// use halyard_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [service]
    ///     name = "orders"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.service.name, "orders");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `HALYARD__SERVICE__NAME=orders` or `HALYARD__CORS__ENABLED=false`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Read overrides from the given pairs instead of the process
    /// environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load `.env` from the working directory, if present.
    ///
    /// Its variables are applied before the process environment, so a real
    /// environment variable wins over the same key in `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv_iter() {
            Ok(iter) => self.collect_dotenv(iter),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific `.env`-format file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let iter = dotenvy::from_path_iter(path)?;
        self.collect_dotenv(iter)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies `.env` and environment variable overrides (if a prefix was
    /// set) and validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(self) -> Result<HalyardConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Finalize without validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse.
    pub fn load_unvalidated(mut self) -> Result<HalyardConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let dotenv = std::mem::take(&mut self.dotenv_vars);
            let process = self
                .env_vars
                .take()
                .unwrap_or_else(|| env::vars().collect());

            for (key, value) in dotenv.iter().chain(process.iter()) {
                if let Some(path) = strip_env_prefix(key, &prefix) {
                    self.apply_env_var(key, &path, value)?;
                }
            }
        }

        self.config.sync_service_name();
        Ok(self.config)
    }

    fn collect_dotenv<R: std::io::Read>(
        mut self,
        iter: dotenvy::Iter<R>,
    ) -> Result<Self, ConfigError> {
        for item in iter {
            self.dotenv_vars.push(item?);
        }
        Ok(self)
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<HalyardConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Apply a single environment variable
    fn apply_env_var(
        &mut self,
        key: &str,
        path: &[&str],
        value: &str,
    ) -> Result<(), ConfigError> {
        let config = &mut self.config;

        match path {
            // Service section
            ["SERVICE", "NAME"] => config.service.name = value.to_string(),
            ["SERVICE", "ENVIRONMENT"] => config.service.environment = value.to_string(),

            // Logging section
            ["LOGGING", "ENABLED"] => config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = value.parse::<LogFormat>().map_err(|_| {
                    ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")
                })?;
            }
            ["LOGGING", "SPAN_EVENTS"] => config.logging.span_events = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = bool_var(key, value)?;
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                config.logging.include_target = bool_var(key, value)?;
            }

            // Telemetry section
            ["TELEMETRY", "TRACE"] => config.telemetry.trace = bool_var(key, value)?,
            ["TELEMETRY", "PERSIST_RESPONSE"] => {
                config.telemetry.persist_response = bool_var(key, value)?;
            }

            // Authorization section
            ["AUTHORIZATION", "ENABLED"] => config.authorization.enabled = bool_var(key, value)?,
            ["AUTHORIZATION", "FETCH_FULL_PROFILE"] => {
                config.authorization.fetch_full_profile = bool_var(key, value)?;
            }
            ["AUTHORIZATION", "VERIFY_CLAIMS"] => {
                config.authorization.verify_claims = bool_var(key, value)?;
            }
            ["AUTHORIZATION", "CLIENT_ID"] => {
                config.authorization.client_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["AUTHORIZATION", "CACHE_TTL_SECS"] => {
                config.authorization.cache_ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["AUTHORIZATION", "CACHE_MAX_ENTRIES"] => {
                config.authorization.cache_max_entries = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            // CORS section
            ["CORS", "ENABLED"] => config.cors.enabled = bool_var(key, value)?,
            ["CORS", "ALLOW_HEADERS"] => config.cors.allow_headers = value.to_string(),
            ["CORS", "ALLOW_ORIGIN"] => config.cors.allow_origin = value.to_string(),
            ["CORS", "ALLOW_METHODS"] => config.cors.allow_methods = value.to_string(),

            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }
}

fn strip_env_prefix<'a>(key: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let rest = key.strip_prefix(prefix)?.strip_prefix("__")?;
    Some(rest.split("__").collect())
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

/// Parse a boolean from a string.
///
/// Accepts `true/1/yes/on` and `false/0/no/off`, case-insensitively.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.service.name, "halyard-service");
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.service.environment, "production");
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [service]
            name = "orders"

            [telemetry]
            persist_response = true

            [cors]
            allow_origin = "https://example.com"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.service.name, "orders");
        assert_eq!(config.logging.service_name, "orders");
        assert!(config.telemetry.persist_response);
        assert!(config.telemetry.trace);
        assert_eq!(config.cors.allow_origin, "https://example.com");
        assert_eq!(config.cors.allow_methods, "GET,POST,PUT,DELETE,OPTIONS");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"authorization": {"enabled": true, "client_id": "abc"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.authorization.enabled);
        assert_eq!(config.authorization.client_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_loader_rejects_unknown_section() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_loader_with_unsupported_format() {
        assert!(ConfigLoader::new().with_string("", "yaml").is_err());
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/halyard.toml");
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/halyard.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.service.name, "halyard-service");
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_loader_with_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .with_env_prefix("HALYARD")
            .with_env_vars([
                ("HALYARD__SERVICE__NAME", "from-env"),
                ("HALYARD__LOGGING__FORMAT", "pretty"),
                ("HALYARD__TELEMETRY__TRACE", "off"),
                ("HALYARD__AUTHORIZATION__ENABLED", "yes"),
                ("HALYARD__AUTHORIZATION__CACHE_TTL_SECS", "60"),
                ("HALYARD__CORS__ENABLED", "0"),
                ("HALYARD__UNKNOWN__KEY", "ignored"),
                ("OTHER__SERVICE__NAME", "not-mine"),
            ])
            .load()
            .unwrap();

        assert_eq!(config.service.name, "from-env");
        assert_eq!(config.logging.service_name, "from-env");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.telemetry.trace);
        assert!(config.authorization.enabled);
        assert_eq!(config.authorization.cache_ttl_secs, 60);
        assert!(!config.cors.enabled);
    }

    #[test]
    fn test_env_overrides_need_prefix() {
        let config = ConfigLoader::new()
            .with_env_vars([("HALYARD__SERVICE__NAME", "from-env")])
            .load()
            .unwrap();
        assert_eq!(config.service.name, "halyard-service");
    }

    #[test]
    fn test_env_bad_boolean() {
        let result = ConfigLoader::new()
            .with_env_prefix("HALYARD")
            .with_env_vars([("HALYARD__CORS__ENABLED", "maybe")])
            .load();
        assert!(matches!(
            result,
            Err(ConfigError::EnvVar { var, .. }) if var == "HALYARD__CORS__ENABLED"
        ));
    }

    #[test]
    fn test_env_bad_integer() {
        let result = ConfigLoader::new()
            .with_env_prefix("HALYARD")
            .with_env_vars([("HALYARD__AUTHORIZATION__CACHE_MAX_ENTRIES", "many")])
            .load();
        assert!(matches!(result, Err(ConfigError::EnvVar { .. })));
    }

    #[test]
    fn test_env_override_fails_validation() {
        let result = ConfigLoader::new()
            .with_env_prefix("HALYARD")
            .with_env_vars([("HALYARD__LOGGING__LEVEL", "shouty")])
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_dotenv_file_layer_below_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HALYARD__SERVICE__NAME=from-dotenv").unwrap();
        writeln!(file, "HALYARD__SERVICE__ENVIRONMENT=staging").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .with_env_prefix("HALYARD")
            .with_env_vars([("HALYARD__SERVICE__NAME", "from-env")])
            .load()
            .unwrap();

        assert_eq!(config.service.name, "from-env");
        assert_eq!(config.service.environment, "staging");
    }

    #[test]
    fn test_dotenv_file_missing() {
        let result = ConfigLoader::new().with_dotenv_file("/nonexistent/.env");
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_env_prefix("HALYARD")
            .with_env_vars(no_env())
            .load_unvalidated()
            .unwrap();
        assert_eq!(config, HalyardConfig::builder().build());
    }

    #[test]
    fn test_parse_bool() {
        for s in ["true", "True", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
        for s in ["false", "False", "0", "no", "OFF"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }
}
