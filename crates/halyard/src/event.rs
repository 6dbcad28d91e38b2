//! API gateway HTTP events (payload format 2.0).

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use halyard_core::{JwtToken, RequestContext};

/// An HTTP event as delivered by an API gateway HTTP API.
///
/// Every field is optional on the wire; a missing `requestContext.http`
/// surfaces as a missing method or path, which dispatch turns into a `400`.
///
/// # Example
///
/// ```
/// use halyard::HttpEvent;
///
/// let event: HttpEvent = serde_json::from_str(r#"{
///     "rawPath": "/users/42",
///     "rawQueryString": "fields=name&fields=email",
///     "requestContext": {
///         "requestId": "abc-123",
///         "http": { "method": "get", "path": "/users/42" }
///     }
/// }"#).unwrap();
///
/// assert_eq!(event.method(), Some("GET".to_string()));
/// assert_eq!(event.path().as_deref(), Some("/users/42"));
/// assert_eq!(event.query()["fields"], vec!["name", "email"]);
/// assert!(event.token().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    /// Payload format version, `"2.0"`.
    pub version: Option<String>,
    /// Route key, e.g. `"ANY /{proxy+}"`.
    pub route_key: Option<String>,
    /// Request path as received.
    pub raw_path: Option<String>,
    /// Query string without the leading `?`.
    pub raw_query_string: Option<String>,
    /// Raw `name=value` cookies.
    pub cookies: Option<Vec<String>>,
    /// Request headers. Gateways lower-case the names.
    pub headers: Option<HashMap<String, String>>,
    /// Query parameters; repeated keys are comma-joined by the gateway.
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// Gateway path parameters.
    pub path_parameters: Option<HashMap<String, String>>,
    /// Request body, base64-encoded when `is_base64_encoded` is set.
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
    /// Gateway request metadata.
    pub request_context: Option<EventContext>,
}

/// `requestContext` of an [`HttpEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EventContext {
    pub account_id: Option<String>,
    pub api_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_prefix: Option<String>,
    pub request_id: Option<String>,
    pub route_key: Option<String>,
    pub stage: Option<String>,
    pub time: Option<String>,
    pub time_epoch: Option<i64>,
    pub http: Option<HttpDescription>,
    pub authorizer: Option<AuthorizerDescription>,
}

/// `requestContext.http` of an [`HttpEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct HttpDescription {
    pub method: Option<String>,
    pub path: Option<String>,
    pub protocol: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// `requestContext.authorizer` of an [`HttpEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizerDescription {
    /// Claims forwarded by a JWT authorizer.
    pub jwt: Option<JwtDescription>,
}

/// `requestContext.authorizer.jwt` of an [`HttpEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtDescription {
    /// Token claims, usually all as strings.
    pub claims: Option<Map<String, Value>>,
    /// Granted scopes.
    pub scopes: Option<Vec<String>>,
}

impl HttpEvent {
    /// Parses an event from JSON text.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Parses an event from a JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    fn http(&self) -> Option<&HttpDescription> {
        self.request_context.as_ref()?.http.as_ref()
    }

    /// The request method, upper-cased.
    #[must_use]
    pub fn method(&self) -> Option<String> {
        self.http()?.method.as_deref().map(str::to_ascii_uppercase)
    }

    /// The path to dispatch on.
    ///
    /// A `proxy` path parameter wins over `requestContext.http.path`, so a
    /// function mounted under `/{proxy+}` routes on the part after its mount
    /// point. The gateway sends that part without its leading `/`; it is
    /// restored here.
    #[must_use]
    pub fn path(&self) -> Option<Cow<'_, str>> {
        let proxy = self
            .path_parameters
            .as_ref()
            .and_then(|params| params.get("proxy"));
        match proxy {
            Some(proxy) if proxy.starts_with('/') => Some(Cow::Borrowed(proxy)),
            Some(proxy) => Some(Cow::Owned(format!("/{proxy}"))),
            None => self.http()?.path.as_deref().map(Cow::Borrowed),
        }
    }

    /// The gateway request ID.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_context.as_ref()?.request_id.as_deref()
    }

    /// The source IP address.
    #[must_use]
    pub fn source_ip(&self) -> Option<&str> {
        self.http()?.source_ip.as_deref()
    }

    /// Looks up a header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `content-type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The raw cookies.
    #[must_use]
    pub fn cookies(&self) -> &[String] {
        self.cookies.as_deref().unwrap_or_default()
    }

    /// The query string as a multimap.
    ///
    /// Parsed from `rawQueryString` when present, which keeps repeated keys
    /// apart. Otherwise each `queryStringParameters` entry becomes a single
    /// value.
    #[must_use]
    pub fn query(&self) -> HashMap<String, Vec<String>> {
        let mut query: HashMap<String, Vec<String>> = HashMap::new();

        match self.raw_query_string.as_deref() {
            Some(raw) if !raw.is_empty() => {
                for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                    query
                        .entry(key.into_owned())
                        .or_default()
                        .push(value.into_owned());
                }
            }
            _ => {
                if let Some(params) = &self.query_string_parameters {
                    for (key, value) in params {
                        query.insert(key.clone(), vec![value.clone()]);
                    }
                }
            }
        }

        query
    }

    /// The caller's token, built from the authorizer claims.
    ///
    /// Returns `None` when the gateway forwarded no claims or the claims
    /// carry no `iss`. A bearer token in the `Authorization` header is
    /// attached as the raw token so its signature can be checked.
    #[must_use]
    pub fn token(&self) -> Option<JwtToken> {
        let claims = self
            .request_context
            .as_ref()?
            .authorizer
            .as_ref()?
            .jwt
            .as_ref()?
            .claims
            .as_ref()?;

        if !claims.contains_key("iss") {
            return None;
        }

        let token = JwtToken::new(claims.clone());
        match self.bearer_token() {
            Some(raw) => Some(token.with_raw(raw)),
            None => Some(token),
        }
    }

    fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?.trim();
        let raw = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value)
            .trim();
        (!raw.is_empty()).then_some(raw)
    }

    /// Builds the context handlers see, before routing.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::new()
            .with_cookies(self.cookies().to_vec())
            .with_headers(self.headers.iter().flatten())
            .with_query(self.query());

        match self.request_id() {
            Some(id) => ctx.with_request_id(id),
            None => ctx,
        }
    }
}
