//! Decoded request bodies.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ServiceError, ServiceResult};

/// A request body after content-type decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// The request carried no body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// A textual body (plain text, XML, CSV).
    Text(String),
    /// A binary body.
    Binary(Bytes),
}

impl Payload {
    /// Returns `true` if the request carried no body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the JSON document, if this is a JSON payload.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the text, if this is a textual payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a binary payload.
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Deserializes a JSON payload into `T`.
    ///
    /// An empty body deserializes from an empty JSON object, so handlers whose
    /// input type has only optional fields accept body-less requests.
    pub fn json<T: DeserializeOwned>(&self) -> ServiceResult<T> {
        match self {
            Self::Json(v) => serde_json::from_value(v.clone())
                .map_err(|e| ServiceError::bad_request(format!("Invalid request body: {e}"))),
            Self::Empty => serde_json::from_value(Value::Object(serde_json::Map::new()))
                .map_err(|e| ServiceError::bad_request(format!("Missing request body: {e}"))),
            _ => Err(ServiceError::bad_request("Expected a JSON request body")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct CreateUser {
        name: String,
        #[serde(default)]
        admin: bool,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        page: Option<u32>,
    }

    #[test]
    fn test_json_deserialize() {
        let payload = Payload::Json(serde_json::json!({ "name": "alice" }));
        let user: CreateUser = payload.json().unwrap();
        assert_eq!(
            user,
            CreateUser {
                name: "alice".into(),
                admin: false
            }
        );
    }

    #[test]
    fn test_json_deserialize_failure_is_bad_request() {
        let payload = Payload::Json(serde_json::json!({ "admin": true }));
        let err = payload.json::<CreateUser>().unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_body_as_empty_object() {
        let filter: Filter = Payload::Empty.json().unwrap();
        assert_eq!(filter, Filter { page: None });
    }

    #[test]
    fn test_binary_is_not_json() {
        let payload = Payload::Binary(Bytes::from_static(b"\x00\x01"));
        assert!(payload.json::<Filter>().is_err());
        assert_eq!(payload.as_bytes().map(Bytes::len), Some(2));
    }
}
