//! Handler responses.

use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// An HTTP-shaped response returned by handlers and error handlers.
///
/// The façade turns this into the platform's response envelope. A response
/// with a body is serialized as JSON; an error response without a body gets a
/// generated `{"error": {"message": ...}}` document instead.
///
/// # Example
///
/// ```
/// use halyard_core::HttpResponse;
/// use http::StatusCode;
///
/// let ok = HttpResponse::success(serde_json::json!({ "id": 7 }));
/// assert_eq!(ok.status(), StatusCode::OK);
///
/// let missing = HttpResponse::error(StatusCode::NOT_FOUND, "no such user");
/// assert_eq!(missing.message(), Some("no such user"));
/// assert!(missing.body().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    status: StatusCode,
    body: Option<Value>,
    message: Option<String>,
    enable_cors: bool,
    headers: IndexMap<String, String>,
}

impl HttpResponse {
    /// Creates a response with the given status and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: None,
            message: None,
            enable_cors: true,
            headers: IndexMap::new(),
        }
    }

    /// A `200 OK` response with an empty JSON object body.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK).with_body(Value::Object(serde_json::Map::new()))
    }

    /// A `200 OK` response with a JSON body.
    #[must_use]
    pub fn success(body: Value) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// A `200 OK` response serializing `body`.
    ///
    /// Values that fail to serialize produce a `500` error response.
    #[must_use]
    pub fn json<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self::success(value),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Unknown error")
            }
        }
    }

    /// An error response carrying a message but no body.
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response.message = Some(message.into());
        response
    }

    /// Sets the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Enables or disables CORS headers for this response.
    #[must_use]
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Adds a response header. Names are stored lower-case.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// The status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether CORS headers should be attached.
    #[must_use]
    pub const fn enable_cors(&self) -> bool {
        self.enable_cors
    }

    /// Extra response headers, in insertion order.
    #[must_use]
    pub const fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Returns `true` for 4xx and 5xx responses.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_has_empty_object_body() {
        let response = HttpResponse::ok();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), Some(&serde_json::json!({})));
        assert!(response.enable_cors());
        assert!(!response.is_error());
    }

    #[test]
    fn test_error_response() {
        let response = HttpResponse::error(StatusCode::BAD_REQUEST, "Bad request");
        assert!(response.is_error());
        assert!(response.body().is_none());
        assert_eq!(response.message(), Some("Bad request"));
    }

    #[test]
    fn test_headers_are_lowercased() {
        let response = HttpResponse::ok()
            .with_header("X-Request-Id", "abc")
            .with_header("Cache-Control", "no-store");

        let names: Vec<_> = response.headers().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["x-request-id", "cache-control"]);
    }

    #[test]
    fn test_json_serializes_struct() {
        #[derive(Serialize)]
        struct User {
            id: u32,
        }

        let response = HttpResponse::json(&User { id: 3 });
        assert_eq!(response.body(), Some(&serde_json::json!({ "id": 3 })));
    }

    #[test]
    fn test_builder_methods() {
        let response = HttpResponse::new(StatusCode::CREATED)
            .with_body(serde_json::json!({ "ok": true }))
            .with_cors(false)
            .with_status(StatusCode::ACCEPTED);

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(!response.enable_cors());
    }
}
