//! Profile storage.
//!
//! [`AuthStorage`] is the seam to whatever table holds user profiles.
//! [`InMemoryAuthStorage`] keeps documents in a map and backs tests and
//! local runs.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::{AuthzError, AuthzResult};
use crate::profile::SimpleUserProfile;

/// Lookup and persistence of user profiles.
pub trait AuthStorage: Send + Sync + 'static {
    /// Fetches the full profile for `user_id`.
    ///
    /// # Errors
    ///
    /// [`AuthzError::UserNotFound`] if there is no profile, or a storage
    /// error.
    fn get_user_profile(&self, user_id: &str) -> AuthzResult<SimpleUserProfile>;

    /// Fetches only the roles for `user_id`.
    ///
    /// The default reads the full profile.
    ///
    /// # Errors
    ///
    /// Same as [`get_user_profile`](Self::get_user_profile).
    fn get_user_roles(&self, user_id: &str) -> AuthzResult<BTreeSet<String>> {
        self.get_user_profile(user_id).map(|p| p.roles)
    }

    /// Creates or replaces a profile.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    fn put_user_profile(&self, profile: &SimpleUserProfile) -> AuthzResult<()>;
}

impl<S: AuthStorage> AuthStorage for std::sync::Arc<S> {
    fn get_user_profile(&self, user_id: &str) -> AuthzResult<SimpleUserProfile> {
        (**self).get_user_profile(user_id)
    }

    fn get_user_roles(&self, user_id: &str) -> AuthzResult<BTreeSet<String>> {
        (**self).get_user_roles(user_id)
    }

    fn put_user_profile(&self, profile: &SimpleUserProfile) -> AuthzResult<()> {
        (**self).put_user_profile(profile)
    }
}

/// Profile storage held in memory, keyed by user ID.
///
/// Profiles are stored as documents, the way a key-value table would hold
/// them, so a malformed document surfaces as [`AuthzError::InvalidProfile`].
#[derive(Debug, Default)]
pub struct InMemoryAuthStorage {
    documents: RwLock<HashMap<String, Value>>,
}

impl InMemoryAuthStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage seeded with profiles.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = SimpleUserProfile>) -> Self {
        let documents = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p.to_document()))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Stores a raw document under `user_id`.
    pub fn put_document(&self, user_id: impl Into<String>, document: Value) {
        self.documents.write().insert(user_id.into(), document);
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl AuthStorage for InMemoryAuthStorage {
    fn get_user_profile(&self, user_id: &str) -> AuthzResult<SimpleUserProfile> {
        let documents = self.documents.read();
        let doc = documents
            .get(user_id)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;
        SimpleUserProfile::from_document(doc)
    }

    fn get_user_roles(&self, user_id: &str) -> AuthzResult<BTreeSet<String>> {
        let documents = self.documents.read();
        let doc = documents
            .get(user_id)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        match doc.get("roles") {
            None | Some(Value::Null) => Ok(BTreeSet::new()),
            Some(roles) => serde_json::from_value(roles.clone())
                .map_err(|e| AuthzError::InvalidProfile(format!("roles: {e}"))),
        }
    }

    fn put_user_profile(&self, profile: &SimpleUserProfile) -> AuthzResult<()> {
        debug!(user_id = %profile.user_id, "Storing user profile");
        self.put_document(profile.user_id.clone(), profile.to_document());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let storage = InMemoryAuthStorage::new();
        let profile = SimpleUserProfile::new("u-1")
            .with_email("a@example.com")
            .with_roles(["admin"]);
        storage.put_user_profile(&profile).unwrap();

        assert_eq!(storage.get_user_profile("u-1").unwrap(), profile);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_unknown_user() {
        let storage = InMemoryAuthStorage::new();
        let err = storage.get_user_roles("ghost").unwrap_err();
        assert!(matches!(err, AuthzError::UserNotFound { user_id } if user_id == "ghost"));
    }

    #[test]
    fn test_roles_only_tolerates_partial_document() {
        let storage = InMemoryAuthStorage::new();
        storage.put_document("u-2", serde_json::json!({ "roles": ["ops"] }));

        assert_eq!(
            storage.get_user_roles("u-2").unwrap(),
            BTreeSet::from(["ops".to_owned()])
        );
        assert!(matches!(
            storage.get_user_profile("u-2"),
            Err(AuthzError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_document_without_roles() {
        let storage = InMemoryAuthStorage::new();
        storage.put_document("u-3", serde_json::json!({ "userId": "u-3" }));
        assert!(storage.get_user_roles("u-3").unwrap().is_empty());
    }

    #[test]
    fn test_seeded_profiles() {
        let storage = InMemoryAuthStorage::with_profiles([
            SimpleUserProfile::new("a"),
            SimpleUserProfile::new("b"),
        ]);
        assert_eq!(storage.len(), 2);
        assert!(!storage.is_empty());
    }
}
