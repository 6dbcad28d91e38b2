//! Configuration schema types.
//!
//! This module defines the sections owned by this crate. The `logging` and
//! `telemetry` sections reuse [`LogConfig`](halyard_telemetry::LogConfig) and
//! [`TraceConfig`](halyard_telemetry::TraceConfig).

use serde::{Deserialize, Serialize};

/// Service identity.
///
/// # Example
///
/// ```
/// use halyard_config::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.environment, "development");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name, used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
        }
    }
}

fn default_service_name() -> String {
    "halyard-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Authorization configuration.
///
/// Applies to routes registered with `authorization = true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Enable the role authorizer.
    #[serde(default)]
    pub enabled: bool,

    /// Fetch whole profiles instead of only roles.
    #[serde(default)]
    pub fetch_full_profile: bool,

    /// Check `exp`, `aud` and `client_id` before looking up roles.
    #[serde(default)]
    pub verify_claims: bool,

    /// Expected `aud` / `client_id` claim.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Role cache time-to-live in seconds. Zero disables the cache.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Maximum number of users in the role cache.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fetch_full_profile: false,
            verify_claims: false,
            client_id: None,
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl AuthorizationConfig {
    /// Returns `true` if role caching is on.
    #[must_use]
    pub const fn cache_enabled(&self) -> bool {
        self.cache_ttl_secs > 0
    }
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    10_000
}

/// CORS headers added to responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Add CORS headers to responses that allow it.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `Access-Control-Allow-Headers` value.
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,

    /// `Access-Control-Allow-Origin` value.
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    /// `Access-Control-Allow-Methods` value.
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_headers: default_allow_headers(),
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_allow_headers() -> String {
    "content-type,x-amz-date,authorization,x-api-key,x-amz-security-token".to_string()
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_methods() -> String {
    "GET,POST,PUT,DELETE,OPTIONS".to_string()
}
