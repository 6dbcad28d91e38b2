//! Error types for the authorization crate.

use halyard_core::ServiceError;
use thiserror::Error;

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Errors that can occur during authorization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// The endpoint requires a token but none was supplied.
    #[error("no token was supplied")]
    TokenMissing,

    /// The token has no `sub` claim to identify the user by.
    #[error("token has no subject")]
    MissingSubject,

    /// The token's `exp` lies in the past.
    #[error("token expired at {expired_at}")]
    TokenExpired {
        /// Expiry, in seconds since the epoch.
        expired_at: i64,
    },

    /// The token was issued for another audience.
    #[error("invalid audience: {audience}")]
    InvalidAudience {
        /// The `aud` claim found.
        audience: String,
    },

    /// The token was issued for another client.
    #[error("invalid client ID: {client_id}")]
    InvalidClientId {
        /// The `client_id` claim found.
        client_id: String,
    },

    /// No key in the key set matches the token's `kid`.
    #[error("no key found for kid '{kid}'")]
    JwkNotFound {
        /// The key ID from the token header.
        kid: String,
    },

    /// The token signature does not verify.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token could not be decoded.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The user has no profile in storage.
    #[error("user {user_id} not found in profile storage")]
    UserNotFound {
        /// The user ID looked up.
        user_id: String,
    },

    /// The user lacks one or more required roles.
    #[error("not authorized: missing roles {}", missing.join(", "))]
    MissingRoles {
        /// The roles the user does not hold.
        missing: Vec<String>,
    },

    /// A stored profile document is malformed.
    #[error("invalid profile document: {0}")]
    InvalidProfile(String),

    /// Profile storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthzError {
    /// Create a user-not-found error.
    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    /// Check if this error means the caller is not allowed in.
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::UserNotFound { .. } | Self::MissingRoles { .. })
    }

    /// Check if this error is about the token itself.
    pub const fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenMissing
                | Self::MissingSubject
                | Self::TokenExpired { .. }
                | Self::InvalidAudience { .. }
                | Self::InvalidClientId { .. }
                | Self::JwkNotFound { .. }
                | Self::InvalidSignature
                | Self::InvalidToken(_)
        )
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        if err.is_access_denied() {
            // Callers are never told which roles they lack.
            Self::forbidden("Not authorized")
        } else if err.is_token_error() {
            Self::authentication(err.to_string())
        } else {
            Self::internal_with_source("authorization failed", err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_missing_roles_display() {
        let err = AuthzError::MissingRoles {
            missing: vec!["admin".into(), "ops".into()],
        };
        assert_eq!(err.to_string(), "not authorized: missing roles admin, ops");
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_access_denied_maps_to_forbidden() {
        let err: ServiceError = AuthzError::user_not_found("u-1").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(!err.to_string().contains("u-1"));
    }

    #[test]
    fn test_token_errors_map_to_authentication() {
        let errors = [
            AuthzError::TokenMissing,
            AuthzError::TokenExpired { expired_at: 1 },
            AuthzError::InvalidAudience {
                audience: "other".into(),
            },
            AuthzError::InvalidSignature,
        ];
        for err in errors {
            let service: ServiceError = err.into();
            assert_eq!(service.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let err: ServiceError = AuthzError::Storage("table missing".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
