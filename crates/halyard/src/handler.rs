//! The event handler: route registration and event dispatch.
//!
//! # Dispatch
//!
//! ```text
//! event ─► parse ─► method/path? ─► OPTIONS? ─► decode body ─► Router::route
//!            │            │             │            │               │
//!            ▼            ▼             ▼            ▼               ▼
//!           400          400           200      ErrorHandler ◄── error
//!                                                    │
//!                                                    ▼
//!                                             LambdaResponse
//! ```

use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, info_span, warn};

use halyard_authz::FETCH_FULL_PROFILE;
use halyard_config::{CorsConfig, HalyardConfig};
use halyard_core::{
    AuthContext, Authorizer, BoxAuthorizer, BoxHandler, Handler, HttpResponse, RequestContext,
    ServiceError, ServiceResult,
};
use halyard_router::{Endpoint, Router, RouterBuilder};
use halyard_telemetry::metrics::{record_dispatch, record_dispatch_error};
use halyard_telemetry::{ColdStart, SpanTracer, TracedHandler, Tracer};

use crate::codec::decode_event_body;
use crate::envelope::LambdaResponse;
use crate::error::{BuildError, BuildResult};
use crate::error_handler::{DefaultErrorHandler, ErrorHandler};
use crate::event::HttpEvent;

/// Default service name.
pub const DEFAULT_SERVICE_NAME: &str = "unknown_service";

// Error code recorded for events rejected before routing.
const BAD_REQUEST_CODE: &str = "BAD_REQUEST";

/// Per-route registration options.
///
/// # Example
///
/// ```
/// use halyard::RouteOptions;
///
/// let options = RouteOptions::new()
///     .with_methods(["GET", "PUT"])
///     .authorized(["editor"])
///     .with_persist_response(true);
///
/// assert!(options.authorization);
/// assert_eq!(options.roles, vec!["editor"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    /// Methods the handler serves.
    pub methods: Vec<String>,
    /// Trace this route; `None` follows the service default.
    pub trace: Option<bool>,
    /// Run the service authorizer before the handler.
    pub authorization: bool,
    /// Extra context handed to the authorizer.
    pub auth_context: Option<AuthContext>,
    /// Roles the caller must hold.
    pub roles: Vec<String>,
    /// Attach responses to the trace subsegment.
    pub persist_response: bool,
    /// Name used for the trace subsegment; defaults to the path template.
    pub name: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            methods: vec!["GET".to_string()],
            trace: None,
            authorization: false,
            auth_context: None,
            roles: Vec::new(),
            persist_response: false,
            name: None,
        }
    }
}

impl RouteOptions {
    /// Options for a plain `GET` route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the methods.
    #[must_use]
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Turns tracing on or off for this route.
    #[must_use]
    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Requires authorization with the given roles.
    #[must_use]
    pub fn authorized<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorization = true;
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the authorizer context.
    #[must_use]
    pub fn with_auth_context(mut self, auth_context: AuthContext) -> Self {
        self.auth_context = Some(auth_context);
        self
    }

    /// Asks the authorizer for the caller's whole profile.
    #[must_use]
    pub fn with_fetch_full_profile(mut self, fetch: bool) -> Self {
        self.auth_context
            .get_or_insert_with(AuthContext::new)
            .insert(FETCH_FULL_PROFILE.to_string(), Value::Bool(fetch));
        self
    }

    /// Attach responses to the trace subsegment.
    #[must_use]
    pub const fn with_persist_response(mut self, persist: bool) -> Self {
        self.persist_response = persist;
        self
    }

    /// Sets the trace subsegment name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Builder for [`EventHandler`].
///
/// # Example
///
/// ```
/// use halyard::{EventHandler, RouteOptions};
/// use halyard_core::{handler_fn, HttpResponse};
/// use serde_json::json;
///
/// # fn main() -> Result<(), halyard::BuildError> {
/// let service = EventHandler::builder()
///     .service_name("users")
///     .trace(false)
///     .route(
///         "/users/<int:id>",
///         RouteOptions::new(),
///         handler_fn(|_, _, ctx| {
///             let id = ctx.path_variables().get_int("id").unwrap_or_default();
///             Ok(HttpResponse::success(json!({ "id": id })))
///         }),
///     )?
///     .build();
///
/// let response = service.handle_request(json!({
///     "requestContext": { "http": { "method": "GET", "path": "/users/7" } }
/// }));
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.body.as_deref(), Some(r#"{"id":7}"#));
/// # Ok(())
/// # }
/// ```
pub struct EventHandlerBuilder {
    service_name: String,
    error_handler: Arc<dyn ErrorHandler>,
    authorizer: Option<BoxAuthorizer>,
    tracer: Arc<dyn Tracer>,
    trace: bool,
    persist_response: bool,
    cors: CorsConfig,
    cold_start: Arc<ColdStart>,
    routes: RouterBuilder,
}

impl Default for EventHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandlerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            error_handler: Arc::new(DefaultErrorHandler),
            authorizer: None,
            tracer: Arc::new(SpanTracer::new()),
            trace: true,
            persist_response: false,
            cors: CorsConfig::default(),
            cold_start: ColdStart::process(),
            routes: Router::builder(),
        }
    }

    /// Creates a builder from loaded configuration.
    ///
    /// The authorizer is not part of the configuration; add one with
    /// [`authorizer`](Self::authorizer), e.g. from
    /// [`role_authorizer`](crate::role_authorizer).
    #[must_use]
    pub fn from_config(config: &HalyardConfig) -> Self {
        Self::new()
            .service_name(&config.service.name)
            .trace(config.telemetry.trace)
            .persist_response(config.telemetry.persist_response)
            .cors(config.cors.clone())
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Replaces the error handler.
    #[must_use]
    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Sets the authorizer used by routes registered with authorization.
    ///
    /// Routes registered before this call are unaffected.
    #[must_use]
    pub fn authorizer(mut self, authorizer: impl Authorizer) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Replaces the tracer.
    #[must_use]
    pub fn tracer(mut self, tracer: impl Tracer) -> Self {
        self.tracer = Arc::new(tracer);
        self
    }

    /// Sets whether routes are traced unless they say otherwise.
    #[must_use]
    pub const fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Attach responses to trace subsegments on every traced route.
    #[must_use]
    pub const fn persist_response(mut self, persist: bool) -> Self {
        self.persist_response = persist;
        self
    }

    /// Sets the CORS headers.
    #[must_use]
    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Uses a specific cold-start flag instead of the process-wide one.
    #[must_use]
    pub fn cold_start(mut self, cold_start: Arc<ColdStart>) -> Self {
        self.cold_start = cold_start;
        self
    }

    /// Registers `handler` on `path`.
    ///
    /// Registering the same path again adds methods to the existing route.
    pub fn route<H: Handler>(
        mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> BuildResult<Self> {
        let authorizer = if options.authorization {
            let authorizer = self
                .authorizer
                .as_ref()
                .ok_or_else(|| BuildError::MissingAuthorizer {
                    path: path.to_string(),
                })?;
            Some(Arc::clone(authorizer))
        } else {
            None
        };

        let mut handler: BoxHandler = Arc::new(handler);
        if options.trace.unwrap_or(self.trace) {
            let name = options.name.clone().unwrap_or_else(|| path.to_string());
            handler = Arc::new(
                TracedHandler::new(handler, name, Arc::clone(&self.tracer))
                    .with_persist_response(options.persist_response || self.persist_response)
                    .with_cold_start(Arc::clone(&self.cold_start)),
            );
        }

        let mut endpoint = Endpoint::new(handler).with_roles(options.roles);
        if let Some(authorizer) = authorizer {
            endpoint = endpoint.with_authorizer(authorizer);
        }
        if let Some(auth_context) = options.auth_context {
            endpoint = endpoint.with_auth_context(auth_context);
        }

        self.routes.add_route(&options.methods, path, endpoint)?;
        debug!(
            path,
            methods = ?options.methods,
            authorization = options.authorization,
            "route set up"
        );
        Ok(self)
    }

    /// Freezes the route table.
    #[must_use]
    pub fn build(self) -> EventHandler {
        info!(
            service = %self.service_name,
            routes = self.routes.len(),
            "event handler ready"
        );
        EventHandler {
            service_name: self.service_name,
            router: self.routes.build(),
            error_handler: self.error_handler,
            cors: self.cors,
        }
    }
}

impl std::fmt::Debug for EventHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlerBuilder")
            .field("service_name", &self.service_name)
            .field("trace", &self.trace)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

/// Dispatches API gateway HTTP events to registered handlers.
///
/// Built once at cold start with [`EventHandler::builder`]; the route table
/// is read-only afterwards, so the handler can be shared across threads.
pub struct EventHandler {
    service_name: String,
    router: Router,
    error_handler: Arc<dyn ErrorHandler>,
    cors: CorsConfig,
}

impl EventHandler {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> EventHandlerBuilder {
        EventHandlerBuilder::new()
    }

    /// The service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The frozen route table.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Handles a raw event as delivered by the platform.
    ///
    /// An event that does not have the shape of an HTTP event gets a `400`.
    pub fn handle_request(&self, event: Value) -> LambdaResponse {
        match HttpEvent::from_value(event) {
            Ok(event) => self.respond(&event),
            Err(e) => self.reject_malformed(&e),
        }
    }

    /// Handles an event given as JSON text.
    pub fn handle_json(&self, raw: &str) -> LambdaResponse {
        match HttpEvent::from_json(raw) {
            Ok(event) => self.respond(&event),
            Err(e) => self.reject_malformed(&e),
        }
    }

    /// Handles a parsed event and serializes the result.
    pub fn respond(&self, event: &HttpEvent) -> LambdaResponse {
        LambdaResponse::from_response(&self.handle_event(event), &self.cors)
    }

    /// Handles a parsed event.
    ///
    /// Never fails: every error is turned into a response by the error
    /// handler.
    pub fn handle_event(&self, event: &HttpEvent) -> HttpResponse {
        let started = Instant::now();

        let (Some(method), Some(path)) = (event.method(), event.path()) else {
            error!(
                method_present = event.method().is_some(),
                path_present = event.path().is_some(),
                "event carries no method or path"
            );
            record_dispatch_error(BAD_REQUEST_CODE);
            return HttpResponse::error(StatusCode::BAD_REQUEST, "Bad request");
        };

        let ctx = event.request_context();
        let span = info_span!(
            "dispatch",
            service = %self.service_name,
            request_id = %ctx.request_id(),
            http.method = %method,
            http.path = %path,
        );
        let _entered = span.enter();
        debug!("handling event");

        let response = if method == Method::OPTIONS.as_str() {
            HttpResponse::ok()
        } else {
            match self.dispatch(event, &method, &path, &ctx) {
                Ok(response) => response,
                Err(error) => self.error_response(&error, &ctx),
            }
        };

        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        record_dispatch(&method, status, elapsed);
        info!(
            http.status_code = status,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "event handled"
        );
        response
    }

    fn dispatch(
        &self,
        event: &HttpEvent,
        method: &str,
        path: &str,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ServiceError::bad_request(format!("Invalid method: {method}")))?;
        let body = decode_event_body(event)?;
        let token = event.token();
        self.router.route(&method, path, token.as_ref(), &body, ctx)
    }

    fn error_response(&self, error: &ServiceError, ctx: &RequestContext) -> HttpResponse {
        if error.is_server_error() {
            let source = std::error::Error::source(error).map(ToString::to_string);
            error!(error = %error, source = ?source, "dispatch failed");
        } else {
            warn!(error = %error, code = error.error_code(), "dispatch rejected");
        }
        record_dispatch_error(error.error_code());
        self.error_handler.get_response(error, Some(ctx))
    }

    fn reject_malformed(&self, error: &serde_json::Error) -> LambdaResponse {
        warn!(error = %error, "event is not an HTTP event");
        record_dispatch_error(BAD_REQUEST_CODE);
        LambdaResponse::from_response(
            &HttpResponse::error(StatusCode::BAD_REQUEST, "Bad request"),
            &self.cors,
        )
    }
}

impl std::fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandler")
            .field("service_name", &self.service_name)
            .field("routes", &self.router.routes().len())
            .finish_non_exhaustive()
    }
}
