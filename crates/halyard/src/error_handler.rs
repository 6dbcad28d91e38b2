//! Mapping dispatch errors to responses.

use serde_json::{json, Value};

use halyard_core::{HttpResponse, RequestContext, ServiceError};

/// Turns a dispatch error into the response the caller sees.
///
/// Implement this to change error bodies; the façade calls it for every
/// error raised by body decoding, routing, authorization or a handler.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Builds the response for `error`.
    ///
    /// `ctx` is the request context when one was built before the error.
    fn get_response(&self, error: &ServiceError, ctx: Option<&RequestContext>) -> HttpResponse;
}

/// The built-in error handler.
///
/// Bodies have the shape `{"message": ..., "data": {...}}`:
///
/// | Error | Status | Message | Data |
/// |---|---|---|---|
/// | `BadRequest` | 400 | `Bad request` | `{message}` |
/// | `MethodNotAllowed` | 405 | `Method not allowed` | `{method}` |
/// | `NotFound` | 404 | `Not found` | `{}` |
/// | `Authentication` | 401 | `Not authenticated` | `{}` |
/// | `Forbidden` | 403 | `Not authorized` | `{}` |
/// | anything else | 500 | `Unknown error` | `{}` |
///
/// # Example
///
/// ```
/// use halyard::{DefaultErrorHandler, ErrorHandler};
/// use halyard_core::ServiceError;
///
/// let error = ServiceError::method_not_allowed("POST");
/// let response = DefaultErrorHandler.get_response(&error, None);
/// assert_eq!(response.status().as_u16(), 405);
/// assert_eq!(response.body().unwrap()["data"]["method"], "POST");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl DefaultErrorHandler {
    /// Builds an error body.
    #[must_use]
    pub fn error_body(message: &str, data: Value) -> Value {
        json!({
            "message": message,
            "data": data,
        })
    }

    fn message_for(error: &ServiceError) -> &'static str {
        match error {
            ServiceError::BadRequest { .. } => "Bad request",
            ServiceError::MethodNotAllowed { .. } => "Method not allowed",
            ServiceError::NotFound { .. } => "Not found",
            ServiceError::Authentication { .. } => "Not authenticated",
            ServiceError::Forbidden { .. } => "Not authorized",
            ServiceError::Internal { .. } => "Unknown error",
        }
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn get_response(&self, error: &ServiceError, _ctx: Option<&RequestContext>) -> HttpResponse {
        HttpResponse::new(error.status_code())
            .with_body(Self::error_body(Self::message_for(error), error.details()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respond(error: &ServiceError) -> (u16, Value) {
        let response = DefaultErrorHandler.get_response(error, None);
        (response.status().as_u16(), response.body().cloned().unwrap())
    }

    #[test]
    fn test_bad_request_carries_message() {
        let (status, body) = respond(&ServiceError::bad_request("Malformed JSON input"));
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Bad request");
        assert_eq!(body["data"]["message"], "Malformed JSON input");
    }

    #[test]
    fn test_status_table() {
        let cases = [
            (ServiceError::not_found("x"), 404, "Not found"),
            (ServiceError::authentication("x"), 401, "Not authenticated"),
            (ServiceError::forbidden("x"), 403, "Not authorized"),
            (ServiceError::internal("db down"), 500, "Unknown error"),
        ];

        for (error, expected_status, expected_message) in cases {
            let (status, body) = respond(&error);
            assert_eq!(status, expected_status);
            assert_eq!(body["message"], expected_message);
            assert_eq!(body["data"], json!({}));
        }
    }

    #[test]
    fn test_internal_details_hidden() {
        let error = ServiceError::internal_with_source(
            "query failed",
            anyhow::anyhow!("connection refused"),
        );
        let (_, body) = respond(&error);
        assert!(!body.to_string().contains("connection refused"));
        assert!(!body.to_string().contains("query failed"));
    }
}
