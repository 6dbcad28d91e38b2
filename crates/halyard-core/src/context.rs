//! Request context types.
//!
//! The [`RequestContext`] carries all request-scoped data from the dispatch
//! façade into handlers: cookies, headers and query parameters from the
//! inbound event, plus the path variables and authorization profile produced
//! by the router for the route that matched.

use crate::PathVariables;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for each request.
///
/// Gateways usually assign one; when they don't, a time-ordered UUID v7 is
/// generated so log lines can still be correlated.
///
/// # Example
///
/// ```
/// use halyard_core::RequestId;
///
/// let id = RequestId::from("c6af9ac6-7b61-11e6-9a41-93e8deadbeef");
/// assert_eq!(id.as_str(), "c6af9ac6-7b61-11e6-9a41-93e8deadbeef");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Per-request context handed to handlers.
///
/// A context is built once per inbound event. When a route matches, the
/// router derives a copy with [`RequestContext::with_route_data`]: the path
/// variables are replaced wholesale and the authorization profile is set, so
/// nothing leaks between dispatches that share a base context.
///
/// # Example
///
/// ```
/// use halyard_core::{PathVariables, RequestContext};
///
/// let ctx = RequestContext::new()
///     .with_header("Content-Type", "application/json")
///     .with_cookies(vec!["session=abc".to_string()]);
///
/// assert_eq!(ctx.header("content-type"), Some("application/json"));
/// assert_eq!(ctx.cookie("session"), Some("abc"));
/// assert!(ctx.path_variables().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: RequestId,
    path_variables: PathVariables,
    profile: Option<Value>,
    cookies: Vec<String>,
    headers: HashMap<String, String>,
    query: HashMap<String, Vec<String>>,
}

impl RequestContext {
    /// Creates an empty context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Sets the raw cookie strings (`name=value`).
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<String>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Replaces all headers. Names are stored lower-case.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the query-string multimap.
    #[must_use]
    pub fn with_query(mut self, query: HashMap<String, Vec<String>>) -> Self {
        self.query = query;
        self
    }

    /// Derives the context a matched route's handler sees.
    ///
    /// Path variables are replaced, never merged, and the profile is set to
    /// the authorizer's result.
    #[must_use]
    pub fn with_route_data(&self, path_variables: PathVariables, profile: Option<Value>) -> Self {
        Self {
            request_id: self.request_id.clone(),
            path_variables,
            profile,
            cookies: self.cookies.clone(),
            headers: self.headers.clone(),
            query: self.query.clone(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Returns the variables extracted from the matched path.
    #[must_use]
    pub const fn path_variables(&self) -> &PathVariables {
        &self.path_variables
    }

    /// Returns the profile produced by the route's authorizer, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&Value> {
        self.profile.as_ref()
    }

    /// Returns the raw cookie strings.
    #[must_use]
    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    /// Returns the value of the named cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.iter().find_map(|cookie| {
            let (k, v) = cookie.split_once('=')?;
            (k.trim() == name).then_some(v.trim())
        })
    }

    /// Returns all headers (lower-case names).
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns a header value. Lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the query-string multimap.
    #[must_use]
    pub const fn query(&self) -> &HashMap<String, Vec<String>> {
        &self.query
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
