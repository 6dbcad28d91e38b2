//! Key/value application settings.
//!
//! Unlike [`HalyardConfig`](crate::HalyardConfig), which configures the
//! framework, the vault holds free-form settings for the application itself
//! (table names, feature flags, endpoints). Values arrive as strings from
//! one or more [`ConfigReader`]s and are converted on access.
//!
//! # Example
//!
//! ```
//! use halyard_config::{ConfigVault, EnvironmentReader};
//!
//! let reader = EnvironmentReader::from_vars(
//!     "app",
//!     [("APP_TABLE_NAME", "users"), ("APP_PAGE_SIZE", "25")],
//! );
//! let mut vault = ConfigVault::new();
//! vault.register_reader(&reader);
//!
//! assert_eq!(vault.get_str("table-name"), Some("users"));
//! assert_eq!(vault.get_int("page-size").unwrap(), Some(25));
//! assert_eq!(vault.get_int("missing").unwrap(), None);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::env;

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::parse_bool;

/// Default prefix for [`EnvironmentReader`].
pub const DEFAULT_VAULT_PREFIX: &str = "app";

/// A source of string settings.
pub trait ConfigReader {
    /// Reads one setting.
    fn read(&self, key: &str) -> Option<String>;

    /// Reads several settings. Missing keys are left out.
    fn read_many(&self, keys: &[&str]) -> HashMap<String, String> {
        keys.iter()
            .filter_map(|key| self.read(key).map(|value| ((*key).to_string(), value)))
            .collect()
    }

    /// Reads every setting this source holds.
    fn read_all(&self) -> HashMap<String, String>;
}

/// Reads prefixed environment variables.
///
/// A variable `APP_DB_HOST` is exposed under the key `db-host`: the prefix
/// and its separator are dropped, the rest is lower-cased and `_` becomes
/// `-`. Lookups map the other way, so `read("db-host")` reads `APP_DB_HOST`.
#[derive(Debug, Clone)]
pub struct EnvironmentReader {
    prefix: String,
    snapshot: Option<HashMap<String, String>>,
}

impl EnvironmentReader {
    /// Reads the process environment under `prefix`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
            snapshot: None,
        }
    }

    /// Reads from a fixed set of variables instead of the process
    /// environment.
    #[must_use]
    pub fn from_vars<I, K, V>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.to_lowercase(),
            snapshot: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// The prefix, lower-cased.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Maps a setting key to its variable name.
    #[must_use]
    pub fn variable_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.replace('-', "_")).to_uppercase()
    }

    /// Maps a variable name to its setting key, if it carries the prefix.
    #[must_use]
    pub fn setting_key(&self, variable: &str) -> Option<String> {
        let lower = variable.to_lowercase();
        let rest = lower.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.replace('_', "-"))
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.snapshot {
            Some(vars) => vars.get(name).cloned(),
            None => env::var(name).ok(),
        }
    }

    fn variables(&self) -> Vec<(String, String)> {
        match &self.snapshot {
            Some(vars) => vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            None => env::vars().collect(),
        }
    }
}

impl Default for EnvironmentReader {
    fn default() -> Self {
        Self::new(DEFAULT_VAULT_PREFIX)
    }
}

impl ConfigReader for EnvironmentReader {
    fn read(&self, key: &str) -> Option<String> {
        self.lookup(&self.variable_name(key))
    }

    fn read_all(&self) -> HashMap<String, String> {
        self.variables()
            .into_iter()
            .filter_map(|(name, value)| self.setting_key(&name).map(|key| (key, value)))
            .collect()
    }
}

/// Typed access to settings gathered from readers.
///
/// Readers are merged in registration order; a later reader overrides an
/// earlier one on the same key.
#[derive(Debug, Clone, Default)]
pub struct ConfigVault {
    values: HashMap<String, String>,
}

impl ConfigVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vault over the default environment reader.
    #[must_use]
    pub fn from_env() -> Self {
        let mut vault = Self::new();
        vault.register_reader(&EnvironmentReader::default());
        vault
    }

    /// Merges everything `reader` holds.
    pub fn register_reader(&mut self, reader: &dyn ConfigReader) {
        self.values.extend(reader.read_all());
    }

    /// Sets one value directly.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of settings held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no settings are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The raw string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The value as an integer.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if the value is not an integer.
    pub fn get_int(&self, key: &str) -> ConfigResult<Option<i64>> {
        self.parse_with(key, "expected integer", |s| s.trim().parse().ok())
    }

    /// The value as a float.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if the value is not a number.
    pub fn get_float(&self, key: &str) -> ConfigResult<Option<f64>> {
        self.parse_with(key, "expected number", |s| s.trim().parse().ok())
    }

    /// The value as a boolean (`true/1/yes/on`, `false/0/no/off`).
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if the value is not a boolean.
    pub fn get_bool(&self, key: &str) -> ConfigResult<Option<bool>> {
        self.parse_with(key, "expected boolean", parse_bool)
    }

    /// The value as a JSON object.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if the value is not a JSON object.
    pub fn get_json(&self, key: &str) -> ConfigResult<Option<Map<String, Value>>> {
        self.parse_with(key, "expected JSON object", |s| {
            match serde_json::from_str(s) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        })
    }

    /// The value as a set of comma-separated items.
    ///
    /// Items are trimmed and empty items dropped.
    #[must_use]
    pub fn get_set(&self, key: &str) -> Option<BTreeSet<String>> {
        self.get_str(key).map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    fn parse_with<T>(
        &self,
        key: &str,
        expected: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> ConfigResult<Option<T>> {
        let Some(raw) = self.get_str(key) else {
            return Ok(None);
        };
        parse(raw)
            .map(Some)
            .ok_or_else(|| ConfigError::invalid_value(key, format!("{expected}, got '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> EnvironmentReader {
        EnvironmentReader::from_vars(
            "app",
            [
                ("APP_TESTVAR", "1"),
                ("APP_DB_HOST", "db.internal"),
                ("APP_RATIO", "0.25"),
                ("APP_DEBUG", "on"),
                ("APP_LIMITS", r#"{"max": 10}"#),
                ("APP_REGIONS", "eu-west-1, us-east-1,,eu-west-1"),
                ("OTHER_VALUE", "x"),
                ("APPLE", "not-prefixed"),
            ],
        )
    }

    fn vault() -> ConfigVault {
        let mut vault = ConfigVault::new();
        vault.register_reader(&reader());
        vault
    }

    #[test]
    fn test_key_normalization() {
        let reader = reader();
        assert_eq!(reader.variable_name("db-host"), "APP_DB_HOST");
        assert_eq!(reader.setting_key("APP_DB_HOST").as_deref(), Some("db-host"));
        assert_eq!(reader.setting_key("APPLE"), None);
        assert_eq!(reader.setting_key("APP_"), None);
    }

    #[test]
    fn test_read() {
        let reader = reader();
        assert_eq!(reader.read("db-host").as_deref(), Some("db.internal"));
        assert_eq!(reader.read("missing"), None);
    }

    #[test]
    fn test_read_many_skips_missing() {
        let values = reader().read_many(&["testvar", "db-host", "nope"]);
        assert_eq!(values.len(), 2);
        assert_eq!(values["testvar"], "1");
    }

    #[test]
    fn test_read_all_only_prefixed() {
        let all = reader().read_all();
        assert_eq!(all.len(), 6);
        assert!(all.contains_key("db-host"));
        assert!(!all.contains_key("value"));
    }

    #[test]
    fn test_typed_getters() {
        let vault = vault();
        assert_eq!(vault.get_str("testvar"), Some("1"));
        assert_eq!(vault.get_int("testvar").unwrap(), Some(1));
        assert_eq!(vault.get_float("ratio").unwrap(), Some(0.25));
        assert_eq!(vault.get_float("testvar").unwrap(), Some(1.0));
        assert_eq!(vault.get_bool("debug").unwrap(), Some(true));
        assert_eq!(vault.get_json("limits").unwrap().unwrap()["max"], 10);
    }

    #[test]
    fn test_get_set() {
        let regions = vault().get_set("regions").unwrap();
        assert_eq!(
            regions.into_iter().collect::<Vec<_>>(),
            vec!["eu-west-1", "us-east-1"]
        );
    }

    #[test]
    fn test_missing_keys_are_none() {
        let vault = vault();
        assert_eq!(vault.get_str("nope"), None);
        assert_eq!(vault.get_int("nope").unwrap(), None);
        assert_eq!(vault.get_bool("nope").unwrap(), None);
        assert_eq!(vault.get_set("nope"), None);
    }

    #[test]
    fn test_malformed_values_error() {
        let vault = vault();
        assert!(matches!(
            vault.get_int("db-host"),
            Err(ConfigError::InvalidValue { field, .. }) if field == "db-host"
        ));
        assert!(vault.get_bool("ratio").is_err());
        assert!(vault.get_json("regions").is_err());
    }

    #[test]
    fn test_later_reader_wins() {
        let mut vault = vault();
        vault.register_reader(&EnvironmentReader::from_vars(
            "svc",
            [("SVC_TESTVAR", "2")],
        ));
        assert_eq!(vault.get_int("testvar").unwrap(), Some(2));
        assert!(vault.contains("db-host"));
    }

    #[test]
    fn test_custom_prefix_case_insensitive() {
        let reader = EnvironmentReader::from_vars("MyApp", [("MYAPP_MODE", "fast")]);
        assert_eq!(reader.prefix(), "myapp");
        assert_eq!(reader.read("mode").as_deref(), Some("fast"));
    }
}
