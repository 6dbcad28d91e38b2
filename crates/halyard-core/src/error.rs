//! Error types for Halyard.
//!
//! This module provides the [`ServiceError`] type, which every stage of a
//! dispatch (routing, authorization, body decoding, handler execution) uses to
//! report failure. The routing core never recovers from these errors locally;
//! they are surfaced unchanged to the dispatch façade, which turns each kind
//! into a status code and response body.
//!
//! | Kind | Raised by | Status |
//! |---|---|---|
//! | `BadRequest` | body decoding, event parsing | 400 |
//! | `Authentication` | token verification | 401 |
//! | `Forbidden` | authorizers | 403 |
//! | `NotFound` | router, no path matched | 404 |
//! | `MethodNotAllowed` | route, path matched but method missing | 405 |
//! | `Internal` | anything else | 500 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ServiceError`].
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed request input.
    BadRequest,
    /// Missing or invalid credentials.
    Authentication,
    /// The caller lacks the permissions the endpoint requires.
    Authorization,
    /// No route matched the requested path.
    NotFound,
    /// A route matched the path but not the method.
    MethodNotAllowed,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for request dispatch.
///
/// # Example
///
/// ```
/// use halyard_core::{ErrorCategory, ServiceError};
///
/// fn require_body(body: &str) -> Result<(), ServiceError> {
///     if body.is_empty() {
///         return Err(ServiceError::bad_request("Body cannot be empty"));
///     }
///     Ok(())
/// }
///
/// let err = require_body("").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::BadRequest);
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request could not be understood.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
    },

    /// No route matched the requested path.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// A route matched the path, but has no handler for the method.
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        /// The rejected method.
        method: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a method-not-allowed error carrying the rejected method.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } => ErrorCategory::BadRequest,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns additional error details suitable for a response body.
    ///
    /// Internal error messages are never included.
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::BadRequest { message } => serde_json::json!({ "message": message }),
            Self::MethodNotAllowed { method } => serde_json::json!({ "method": method }),
            _ => serde_json::json!({}),
        }
    }

    /// Returns `true` if this error should be reported as a server fault.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_error() {
        let error = ServiceError::bad_request("Malformed JSON input");
        assert_eq!(error.category(), ErrorCategory::BadRequest);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("Malformed JSON input"));
        assert_eq!(error.details()["message"], "Malformed JSON input");
    }

    #[test]
    fn test_method_not_allowed_carries_method() {
        let error = ServiceError::method_not_allowed("POST");
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error.error_code(), "METHOD_NOT_ALLOWED");
        assert_eq!(error.details()["method"], "POST");
        assert_eq!(error.to_string(), "Method POST not allowed");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let error = ServiceError::forbidden("missing role admin");
        assert_eq!(error.category(), ErrorCategory::Authorization);
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_error() {
        let error = ServiceError::not_found("/missing");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.details(), serde_json::json!({}));
    }

    #[test]
    fn test_internal_error_hides_source() {
        let source = anyhow::anyhow!("connection reset by peer");
        let error = ServiceError::internal_with_source("storage unavailable", source);
        assert!(error.is_server_error());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.details(), serde_json::json!({}));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::MethodNotAllowed).unwrap();
        assert_eq!(json, "\"method_not_allowed\"");
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::BadRequest,
            ErrorCategory::Authentication,
            ErrorCategory::Authorization,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
