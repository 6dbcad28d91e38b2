//! The response envelope returned to the function platform.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use halyard_config::CorsConfig;
use halyard_core::HttpResponse;

/// A serialized function response.
///
/// # Example
///
/// ```
/// use halyard::LambdaResponse;
/// use halyard_config::CorsConfig;
/// use halyard_core::HttpResponse;
///
/// let response = HttpResponse::success(serde_json::json!({ "id": 1 }));
/// let envelope = LambdaResponse::from_response(&response, &CorsConfig::default());
///
/// assert_eq!(envelope.status_code, 200);
/// assert_eq!(envelope.body.as_deref(), Some(r#"{"id":1}"#));
/// assert_eq!(envelope.headers["content-type"], "application/json");
/// assert_eq!(envelope.headers["access-control-allow-origin"], "*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: IndexMap<String, String>,
    /// Serialized body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Always `false`; bodies are JSON text.
    pub is_base64_encoded: bool,
}

impl LambdaResponse {
    /// Serializes `response`.
    ///
    /// A body is written as JSON with `content-type: application/json`. An
    /// error status without a body gets `{"error": {"message": ...}}`. CORS
    /// headers are added when both `cors` and the response allow it.
    #[must_use]
    pub fn from_response(response: &HttpResponse, cors: &CorsConfig) -> Self {
        let mut headers = IndexMap::new();

        let body = match response.body() {
            Some(body) => {
                headers.insert("content-type".to_string(), "application/json".to_string());
                Some(body.to_string())
            }
            None if response.is_error() => Some(
                json!({
                    "error": {
                        "message": response.message().unwrap_or("Unknown error"),
                    }
                })
                .to_string(),
            ),
            None => None,
        };

        for (name, value) in response.headers() {
            headers.insert(name.clone(), value.clone());
        }

        if cors.enabled && response.enable_cors() {
            headers.insert(
                "access-control-allow-headers".to_string(),
                cors.allow_headers.clone(),
            );
            headers.insert(
                "access-control-allow-origin".to_string(),
                cors.allow_origin.clone(),
            );
            headers.insert(
                "access-control-allow-methods".to_string(),
                cors.allow_methods.clone(),
            );
        }

        Self {
            status_code: response.status().as_u16(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// The envelope as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "body": self.body,
            "isBase64Encoded": self.is_base64_encoded,
        })
    }
}
