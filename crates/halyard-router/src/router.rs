//! Ordered route table and dispatch.

use halyard_core::{
    HttpResponse, JwtToken, PathVariables, Payload, RequestContext, ServiceError, ServiceResult,
};
use http::Method;
use tracing::debug;

use crate::error::RouteResult;
use crate::method_table::Endpoint;
use crate::route::Route;

/// Collects routes during startup.
///
/// Registration mutates the table, so it happens on a builder. Once every
/// route is registered, [`RouterBuilder::build`] freezes the table into a
/// [`Router`] that can be shared across threads and never changes again.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use halyard_core::{handler_fn, HttpResponse, Payload, RequestContext};
/// use halyard_router::{Endpoint, Router};
/// use http::Method;
///
/// let mut builder = Router::builder();
/// let list = Arc::new(handler_fn(|_, _, _| Ok(HttpResponse::ok())));
/// builder.add_route(["GET"], "/users", Endpoint::new(list)).unwrap();
/// let router = builder.build();
///
/// let response = router
///     .route(&Method::GET, "/users", None, &Payload::Empty, &RequestContext::new())
///     .unwrap();
/// assert_eq!(response.status(), http::StatusCode::OK);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterBuilder {
    routes: Vec<Route>,
}

impl RouterBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` for `methods` on `template`.
    ///
    /// If a route with exactly the same template string exists, the methods
    /// are added to it; otherwise a new route is appended. Registration order
    /// is match order.
    pub fn add_route<I, S>(
        &mut self,
        methods: I,
        template: &str,
        endpoint: Endpoint,
    ) -> RouteResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(route) = self.routes.iter_mut().find(|r| r.template() == template) {
            return route.add_handler(methods, endpoint);
        }

        // Validate before appending so a failed registration leaves no empty route.
        let mut route = Route::new(template)?;
        route.add_handler(methods, endpoint)?;
        debug!(template, "registered route");
        self.routes.push(route);
        Ok(())
    }

    /// Number of distinct templates registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
        }
    }
}

/// A frozen, ordered route table.
///
/// Routes are tried in registration order and the **first** route whose path
/// pattern matches decides the outcome. If that route does not bind the
/// requested method, dispatch fails with `405` even when a later route would
/// accept both path and method.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Starts building a router.
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The routes, in match order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the route for a request.
    ///
    /// Returns the first route whose path matches together with the extracted
    /// variables, [`ServiceError::MethodNotAllowed`] if that route lacks the
    /// method, or [`ServiceError::NotFound`] if no path matches.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
    ) -> ServiceResult<(&Route, PathVariables)> {
        for route in &self.routes {
            if let Some(vars) = route.match_request(method, path)? {
                return Ok((route, vars));
            }
        }
        Err(ServiceError::not_found(format!("No route matches {path}")))
    }

    /// Dispatches a request: match, authorize, handle.
    ///
    /// The handler sees a context derived from `ctx` carrying the matched
    /// path variables and the authorizer's profile. Authorizer and handler
    /// errors are returned unchanged; if authorization fails the handler is
    /// never invoked.
    pub fn route(
        &self,
        method: &Method,
        path: &str,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        let (route, vars) = self.resolve(method, path)?;
        debug!(%method, path, template = route.template(), "route matched");

        let profile = route.authorize(method, token)?;
        let ctx = ctx.with_route_data(vars, profile);
        route.handle(method, token, body, &ctx)
    }
}
