//! Request body decoding.
//!
//! Bodies are decoded by content type:
//!
//! | Content type | Payload |
//! |---|---|
//! | `application/json`, `application/ld+json` | [`Payload::Json`] |
//! | `application/octet-stream` | [`Payload::Binary`] |
//! | `text/*`, `application/xml` | [`Payload::Text`] |
//! | none | JSON, or binary when base64-encoded |
//!
//! Media type parameters such as `; charset=utf-8` are ignored.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use thiserror::Error;

use halyard_core::{Payload, ServiceError};

use crate::event::HttpEvent;

/// Errors raised while decoding a request body.
///
/// Every variant is the caller's fault and converts to
/// [`ServiceError::BadRequest`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The body claimed to be JSON but did not parse.
    #[error("Malformed JSON input")]
    MalformedJson(#[source] serde_json::Error),

    /// The body was flagged base64 but did not decode.
    #[error("Malformed base64 input")]
    MalformedBase64(#[source] base64::DecodeError),

    /// A textual body was not valid UTF-8.
    #[error("Text body is not valid UTF-8")]
    InvalidUtf8,

    /// No decoder exists for the content type.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Result type for body decoding.
pub type CodecResult<T> = Result<T, CodecError>;

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        Self::bad_request(err.to_string())
    }
}

/// How a content type is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// A JSON document.
    Json,
    /// Opaque bytes.
    Binary,
    /// UTF-8 text.
    Text,
}

impl BodyKind {
    /// Classifies a `content-type` header value.
    ///
    /// Returns `None` for media types with no decoder.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "application/json" | "application/ld+json" => Some(Self::Json),
            "application/octet-stream" => Some(Self::Binary),
            "application/xml" => Some(Self::Text),
            other if other.starts_with("text/") => Some(Self::Text),
            _ => None,
        }
    }
}

/// Decodes the body of `event`.
pub fn decode_event_body(event: &HttpEvent) -> CodecResult<Payload> {
    decode_body(
        event.body.as_deref(),
        event.content_type(),
        event.is_base64_encoded,
    )
}

/// Decodes a raw body.
///
/// An absent or empty body is [`Payload::Empty`] whatever the content type.
pub fn decode_body(
    body: Option<&str>,
    content_type: Option<&str>,
    is_base64_encoded: bool,
) -> CodecResult<Payload> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Ok(Payload::Empty);
    };

    let kind = match content_type {
        Some(ct) => BodyKind::from_content_type(ct)
            .ok_or_else(|| CodecError::UnsupportedContentType(ct.trim().to_string()))?,
        None if is_base64_encoded => BodyKind::Binary,
        None => BodyKind::Json,
    };

    let bytes = if is_base64_encoded {
        Bytes::from(STANDARD.decode(body).map_err(CodecError::MalformedBase64)?)
    } else {
        Bytes::copy_from_slice(body.as_bytes())
    };

    match kind {
        BodyKind::Json => serde_json::from_slice(&bytes)
            .map(Payload::Json)
            .map_err(CodecError::MalformedJson),
        BodyKind::Binary => Ok(Payload::Binary(bytes)),
        BodyKind::Text => String::from_utf8(bytes.to_vec())
            .map(Payload::Text)
            .map_err(|_| CodecError::InvalidUtf8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_body_is_empty() {
        assert_eq!(decode_body(None, None, false).unwrap(), Payload::Empty);
        assert_eq!(
            decode_body(Some(""), Some("application/json"), false).unwrap(),
            Payload::Empty
        );
    }

    #[test]
    fn test_json_body() {
        let payload = decode_body(Some(r#"{"a":1}"#), Some("application/json"), false).unwrap();
        assert_eq!(payload, Payload::Json(json!({ "a": 1 })));

        let ld = decode_body(
            Some(r#"{"@id":"x"}"#),
            Some("application/ld+json; charset=utf-8"),
            false,
        )
        .unwrap();
        assert_eq!(ld.as_json().unwrap()["@id"], "x");
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_body(Some("{nope"), Some("application/json"), false).unwrap_err();
        assert!(matches!(err, CodecError::MalformedJson(_)));

        let service: ServiceError = err.into();
        assert_eq!(service.details()["message"], "Malformed JSON input");
    }

    #[test]
    fn test_no_content_type_defaults() {
        let json = decode_body(Some("[1,2]"), None, false).unwrap();
        assert_eq!(json, Payload::Json(json!([1, 2])));

        let binary = decode_body(Some("AAEC"), None, true).unwrap();
        assert_eq!(binary, Payload::Binary(Bytes::from_static(&[0, 1, 2])));
    }

    #[test]
    fn test_binary_body() {
        let encoded = decode_body(Some("aGk="), Some("application/octet-stream"), true).unwrap();
        assert_eq!(encoded.as_bytes().unwrap().as_ref(), b"hi");

        let plain = decode_body(Some("hi"), Some("application/octet-stream"), false).unwrap();
        assert_eq!(plain.as_bytes().unwrap().as_ref(), b"hi");

        let bad = decode_body(Some("!!!"), Some("application/octet-stream"), true);
        assert!(matches!(bad, Err(CodecError::MalformedBase64(_))));
    }

    #[test]
    fn test_text_bodies() {
        for ct in ["text/plain", "text/csv", "application/xml", "TEXT/HTML"] {
            let payload = decode_body(Some("a,b"), Some(ct), false).unwrap();
            assert_eq!(payload.as_text(), Some("a,b"), "{ct}");
        }

        let encoded = decode_body(Some("aGk="), Some("text/plain"), true).unwrap();
        assert_eq!(encoded.as_text(), Some("hi"));
    }

    #[test]
    fn test_unsupported_content_type() {
        let err = decode_body(Some("x"), Some("image/png"), false).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedContentType(ref ct) if ct == "image/png"));
        assert!(matches!(
            ServiceError::from(err),
            ServiceError::BadRequest { .. }
        ));
    }
}
