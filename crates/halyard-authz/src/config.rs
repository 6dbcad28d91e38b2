//! Configuration for the role authorizer.

use crate::cache::CacheConfig;

/// Configuration for [`RoleAuthorizer`](crate::RoleAuthorizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Expected `aud` / `client_id` claim. `None` skips the comparison.
    pub client_id: Option<String>,
    /// Whether to check `exp`, `aud` and `client_id` before looking up roles.
    pub verify_claims: bool,
    /// Whether to fetch the whole profile rather than only roles.
    ///
    /// A route can override this with a `fetch_full_profile` entry in its
    /// authorization context.
    pub fetch_full_profile: bool,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
    /// Role cache settings.
    pub cache: CacheConfig,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            verify_claims: false,
            fetch_full_profile: false,
            leeway_secs: 0,
            cache: CacheConfig::default(),
        }
    }
}

impl AuthorizerConfig {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Enable or disable claim verification.
    #[must_use]
    pub const fn with_verify_claims(mut self, verify: bool) -> Self {
        self.verify_claims = verify;
        self
    }

    /// Enable or disable full-profile fetching.
    #[must_use]
    pub const fn with_fetch_full_profile(mut self, fetch: bool) -> Self {
        self.fetch_full_profile = fetch;
        self
    }

    /// Set the `exp` leeway.
    #[must_use]
    pub const fn with_leeway_secs(mut self, leeway: u64) -> Self {
        self.leeway_secs = leeway;
        self
    }

    /// Set the cache configuration.
    #[must_use]
    pub const fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Create a production configuration.
    ///
    /// Claims are verified and roles are cached for a minute.
    #[must_use]
    pub fn production() -> Self {
        Self {
            verify_claims: true,
            cache: CacheConfig::production(),
            ..Self::default()
        }
    }

    /// Create a development configuration.
    #[must_use]
    pub fn development() -> Self {
        Self {
            leeway_secs: 60,
            cache: CacheConfig::development(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthorizerConfig::default();
        assert!(!config.verify_claims);
        assert!(!config.fetch_full_profile);
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_builder() {
        let config = AuthorizerConfig::new()
            .with_client_id("client-1")
            .with_verify_claims(true)
            .with_fetch_full_profile(true)
            .with_cache(CacheConfig::disabled());
        assert_eq!(config.client_id.as_deref(), Some("client-1"));
        assert!(config.verify_claims);
        assert!(config.fetch_full_profile);
        assert!(!config.cache.is_enabled());
    }

    #[test]
    fn test_presets() {
        assert!(AuthorizerConfig::production().verify_claims);
        assert_eq!(AuthorizerConfig::development().leeway_secs, 60);
    }
}
