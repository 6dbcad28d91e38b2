//! Building the role authorizer from configuration.

use std::time::Duration;

use halyard_authz::{AuthStorage, AuthorizerConfig, CacheConfig, RoleAuthorizer};
use halyard_config::AuthorizationConfig;

/// Translates the `[authorization]` section into authorizer settings.
///
/// A zero `cache_ttl_secs` disables the role cache.
#[must_use]
pub fn authorizer_config(config: &AuthorizationConfig) -> AuthorizerConfig {
    let cache = if config.cache_enabled() {
        CacheConfig {
            max_entries: config.cache_max_entries,
            ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    } else {
        CacheConfig::disabled()
    };

    let authorizer = AuthorizerConfig::new()
        .with_verify_claims(config.verify_claims)
        .with_fetch_full_profile(config.fetch_full_profile)
        .with_cache(cache);

    match &config.client_id {
        Some(client_id) => authorizer.with_client_id(client_id),
        None => authorizer,
    }
}

/// Creates a [`RoleAuthorizer`] over `storage`, or `None` when
/// authorization is disabled.
///
/// # Example
///
/// ```
/// use halyard::role_authorizer;
/// use halyard_authz::InMemoryAuthStorage;
/// use halyard_config::AuthorizationConfig;
///
/// let disabled = AuthorizationConfig::default();
/// assert!(role_authorizer(InMemoryAuthStorage::new(), &disabled).is_none());
///
/// let enabled = AuthorizationConfig { enabled: true, ..Default::default() };
/// assert!(role_authorizer(InMemoryAuthStorage::new(), &enabled).is_some());
/// ```
pub fn role_authorizer<S: AuthStorage>(
    storage: S,
    config: &AuthorizationConfig,
) -> Option<RoleAuthorizer<S>> {
    config
        .enabled
        .then(|| RoleAuthorizer::with_config(storage, authorizer_config(config)))
}
