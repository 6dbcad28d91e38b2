//! User profiles.
//!
//! Profiles are persisted as JSON documents with camelCase keys:
//!
//! ```json
//! {
//!   "userId": "1234",
//!   "email": "jane@example.com",
//!   "givenName": "Jane",
//!   "familyName": "Doe",
//!   "roles": ["admin", "billing"]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthzError, AuthzResult};

/// A basic user profile: identity, names, e-mail and roles.
///
/// # Example
///
/// ```
/// use halyard_authz::SimpleUserProfile;
///
/// let profile = SimpleUserProfile::new("u-1")
///     .with_email("jane@example.com")
///     .with_roles(["admin"]);
///
/// let doc = profile.to_document();
/// assert_eq!(doc["userId"], "u-1");
///
/// let back = SimpleUserProfile::from_document(&doc).unwrap();
/// assert_eq!(back, profile);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleUserProfile {
    /// The user ID (the token's `sub`).
    pub user_id: String,
    /// E-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Roles assigned to the user.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl SimpleUserProfile {
    /// Creates a profile with only a user ID.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Sets the e-mail address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the given and family names.
    #[must_use]
    pub fn with_names(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.given_name = Some(given.into());
        self.family_name = Some(family.into());
        self
    }

    /// Replaces the roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Parses a stored document.
    pub fn from_document(doc: &Value) -> AuthzResult<Self> {
        Self::deserialize(doc).map_err(|e| AuthzError::InvalidProfile(e.to_string()))
    }

    /// Produces the document to store.
    #[must_use]
    pub fn to_document(&self) -> Value {
        serde_json::json!({
            "userId": self.user_id,
            "email": self.email,
            "givenName": self.given_name,
            "familyName": self.family_name,
            "roles": self.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_document_camel_case() {
        let doc = serde_json::json!({
            "userId": "u-9",
            "familyName": "Doe",
            "givenName": "John",
            "roles": ["reader", "writer", "reader"],
        });
        let profile = SimpleUserProfile::from_document(&doc).unwrap();
        assert_eq!(profile.user_id, "u-9");
        assert_eq!(profile.family_name.as_deref(), Some("Doe"));
        assert_eq!(profile.email, None);
        assert_eq!(profile.roles.len(), 2);
        assert!(profile.has_role("writer"));
    }

    #[test]
    fn test_missing_roles_is_empty_set() {
        let doc = serde_json::json!({ "userId": "u-1" });
        let profile = SimpleUserProfile::from_document(&doc).unwrap();
        assert!(profile.roles.is_empty());
    }

    #[test]
    fn test_null_optional_fields() {
        let doc = serde_json::json!({ "userId": "u-1", "email": null });
        let profile = SimpleUserProfile::from_document(&doc).unwrap();
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_missing_user_id_is_invalid() {
        let doc = serde_json::json!({ "email": "x@example.com" });
        let err = SimpleUserProfile::from_document(&doc).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidProfile(_)));
    }

    #[test]
    fn test_to_document_keys() {
        let doc = SimpleUserProfile::new("u-2")
            .with_names("Ada", "Lovelace")
            .with_roles(["b", "a"])
            .to_document();
        assert_eq!(doc["givenName"], "Ada");
        assert_eq!(doc["familyName"], "Lovelace");
        assert_eq!(doc["roles"], serde_json::json!(["a", "b"]));
        assert_eq!(doc["email"], Value::Null);
    }
}
