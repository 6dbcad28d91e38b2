//! A single path's binding table.

use halyard_core::{
    HttpResponse, JwtToken, PathVariables, Payload, RequestContext, ServiceError, ServiceResult,
};
use http::Method;
use serde_json::Value;

use crate::error::{RouteError, RouteResult};
use crate::method_table::{parse_methods, Endpoint, MethodTable};
use crate::pattern::PathPattern;

/// One path template and the endpoints bound to its methods.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use halyard_core::{handler_fn, HttpResponse, ServiceError};
/// use halyard_router::{Endpoint, Route};
/// use http::Method;
///
/// let mut route = Route::new("/users/<int:id>").unwrap();
/// let handler = Arc::new(handler_fn(|_, _, _| Ok(HttpResponse::ok())));
/// route.add_handler(["GET"], Endpoint::new(handler)).unwrap();
///
/// let vars = route.match_request(&Method::GET, "/users/7").unwrap().unwrap();
/// assert_eq!(vars.get_int("id"), Some(7));
///
/// // Path matches, method doesn't: the route rejects the request outright.
/// let err = route.match_request(&Method::POST, "/users/7").unwrap_err();
/// assert!(matches!(err, ServiceError::MethodNotAllowed { .. }));
///
/// // Path doesn't match: not this route's business.
/// assert!(route.match_request(&Method::GET, "/posts/7").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    pattern: PathPattern,
    methods: MethodTable,
}

impl Route {
    /// Creates a route with no methods bound.
    pub fn new(template: &str) -> RouteResult<Self> {
        Ok(Self {
            pattern: PathPattern::compile(template)?,
            methods: MethodTable::new(),
        })
    }

    /// The path template.
    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// The compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The bound methods, in canonical order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.methods.allowed_methods()
    }

    /// Returns the endpoint bound to `method`.
    #[must_use]
    pub fn endpoint(&self, method: &Method) -> Option<&Endpoint> {
        self.methods.get(method)
    }

    /// Binds `endpoint` to each of `methods`.
    ///
    /// All names are validated before anything is stored: if one is invalid,
    /// the call fails with [`RouteError::InvalidMethod`] and the route is
    /// unchanged. A method that is already bound is overwritten.
    pub fn add_handler<I, S>(&mut self, methods: I, endpoint: Endpoint) -> RouteResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods = parse_methods(methods)?;
        if methods.is_empty() {
            return Err(RouteError::NoMethods {
                template: self.template().to_string(),
            });
        }

        for method in &methods {
            self.methods.insert(method, endpoint.clone());
        }
        Ok(())
    }

    /// Tests whether this route handles `method` on `path`.
    ///
    /// Returns `Ok(None)` when the path doesn't match and
    /// [`ServiceError::MethodNotAllowed`] when it does but `method` isn't
    /// bound.
    pub fn match_request(
        &self,
        method: &Method,
        path: &str,
    ) -> ServiceResult<Option<PathVariables>> {
        let Some(vars) = self.pattern.match_path(path) else {
            return Ok(None);
        };

        if self.methods.get(method).is_none() {
            return Err(ServiceError::method_not_allowed(method.as_str()));
        }
        Ok(Some(vars))
    }

    /// Runs the authorizer bound to `method`, if any.
    ///
    /// Without an authorizer this returns `Ok(None)`. Otherwise the
    /// authorizer's result (profile or error) is returned unchanged.
    pub fn authorize(
        &self,
        method: &Method,
        token: Option<&JwtToken>,
    ) -> ServiceResult<Option<Value>> {
        let Some(endpoint) = self.methods.get(method) else {
            return Ok(None);
        };
        match &endpoint.authorizer {
            Some(authorizer) => {
                authorizer.authorize(&endpoint.roles, token, endpoint.auth_context.as_ref())
            }
            None => Ok(None),
        }
    }

    /// Invokes the handler bound to `method`.
    pub fn handle(
        &self,
        method: &Method,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        let endpoint = self
            .methods
            .get(method)
            .ok_or_else(|| ServiceError::method_not_allowed(method.as_str()))?;
        endpoint.handler.handle(token, body, ctx)
    }
}
