//! Role-based authorizer.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use halyard_core::{AuthContext, Authorizer, JwtToken, ServiceResult};

use crate::cache::RoleCache;
use crate::config::AuthorizerConfig;
use crate::error::{AuthzError, AuthzResult};
use crate::storage::AuthStorage;
use crate::verifier::{verify_claims, TokenVerifier};

/// Authorization-context key that overrides
/// [`AuthorizerConfig::fetch_full_profile`] per route.
pub const FETCH_FULL_PROFILE: &str = "fetch_full_profile";

/// Grants access when the token's subject holds every required role.
///
/// The flow for one request:
///
/// 1. Require a token.
/// 2. Verify its signature when a [`TokenVerifier`] is attached. The token
///    must then carry its raw form, and the rest of the flow reads the
///    verified claims instead of the event's.
/// 3. Verify `exp` / `aud` / `client_id`, when enabled.
/// 4. Look up the user named by `sub`: the full profile, or only the roles
///    through the [`RoleCache`].
/// 5. Deny if any required role is missing.
///
/// On success the full profile (as a JSON document) becomes the request
/// context's profile. A roles-only lookup yields no profile.
///
/// # Example
///
/// ```
/// use halyard_authz::{InMemoryAuthStorage, RoleAuthorizer, SimpleUserProfile};
/// use halyard_core::{Authorizer, JwtToken};
///
/// let storage = InMemoryAuthStorage::with_profiles([
///     SimpleUserProfile::new("u-1").with_roles(["admin"]),
/// ]);
/// let authorizer = RoleAuthorizer::new(storage);
///
/// let token = JwtToken::from_value(serde_json::json!({ "sub": "u-1" })).unwrap();
/// let roles = vec!["admin".to_owned()];
/// assert!(authorizer.authorize(&roles, Some(&token), None).is_ok());
/// ```
#[derive(Debug)]
pub struct RoleAuthorizer<S> {
    storage: S,
    config: AuthorizerConfig,
    cache: RoleCache,
    verifier: Option<TokenVerifier>,
}

impl<S: AuthStorage> RoleAuthorizer<S> {
    /// Creates an authorizer with the default configuration.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, AuthorizerConfig::default())
    }

    /// Creates an authorizer with the given configuration.
    pub fn with_config(storage: S, config: AuthorizerConfig) -> Self {
        let cache = RoleCache::new(config.cache.clone());
        Self {
            storage,
            config,
            cache,
            verifier: None,
        }
    }

    /// Attaches a signature verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: TokenVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    /// Returns the role cache.
    pub const fn cache(&self) -> &RoleCache {
        &self.cache
    }

    /// Returns the backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Stores a profile and drops the user's cached roles.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn put_user_profile(&self, profile: &crate::SimpleUserProfile) -> AuthzResult<()> {
        self.storage.put_user_profile(profile)?;
        self.cache.invalidate(&profile.user_id);
        Ok(())
    }

    /// Runs the authorization flow, reporting the precise failure.
    ///
    /// # Errors
    ///
    /// Any [`AuthzError`]; the [`Authorizer`] impl maps these onto service
    /// errors.
    pub fn check(
        &self,
        roles: &[String],
        token: Option<&JwtToken>,
        auth_context: Option<&AuthContext>,
    ) -> AuthzResult<Option<Value>> {
        let token = token.ok_or(AuthzError::TokenMissing)?;

        // With a verifier attached, only the verified claims are trusted.
        let verified;
        let token = match &self.verifier {
            Some(verifier) => {
                let raw = token.raw().ok_or_else(|| {
                    AuthzError::InvalidToken("no encoded token to verify".into())
                })?;
                verified = verifier.verify(raw)?;
                &verified
            }
            None => token,
        };

        if self.config.verify_claims {
            verify_claims(
                token,
                self.config.client_id.as_deref(),
                chrono::Utc::now().timestamp(),
                self.config.leeway_secs,
            )?;
        }

        let user_id = token.sub().ok_or(AuthzError::MissingSubject)?;

        let fetch_full_profile = auth_context
            .and_then(|ctx| ctx.get(FETCH_FULL_PROFILE))
            .and_then(Value::as_bool)
            .unwrap_or(self.config.fetch_full_profile);

        let (user_roles, profile) = if fetch_full_profile {
            let profile = self.storage.get_user_profile(user_id)?;
            (profile.roles.clone(), Some(profile.to_document()))
        } else {
            (self.roles_for(user_id)?, None)
        };

        let missing: Vec<String> = roles
            .iter()
            .filter(|role| !user_roles.contains(role.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            warn!(user_id, missing = ?missing, "Authorization denied");
            return Err(AuthzError::MissingRoles { missing });
        }

        debug!(user_id, roles = ?roles, "Authorization granted");
        Ok(profile)
    }

    fn roles_for(&self, user_id: &str) -> AuthzResult<BTreeSet<String>> {
        if let Some(roles) = self.cache.get(user_id) {
            return Ok(roles);
        }
        let roles = self.storage.get_user_roles(user_id)?;
        self.cache.insert(user_id, &roles);
        Ok(roles)
    }
}

impl<S: AuthStorage> Authorizer for RoleAuthorizer<S> {
    fn authorize(
        &self,
        roles: &[String],
        token: Option<&JwtToken>,
        auth_context: Option<&AuthContext>,
    ) -> ServiceResult<Option<Value>> {
        Ok(self.check(roles, token, auth_context)?)
    }
}
