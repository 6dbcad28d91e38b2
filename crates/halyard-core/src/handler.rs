//! Handler and authorizer traits.
//!
//! A route binds each HTTP method to a [`Handler`] and, optionally, an
//! [`Authorizer`]. Both are invoked synchronously: one inbound event produces
//! one linear call chain of match, authorize, handle.
//!
//! Closures are adapted with [`handler_fn`] and [`authorizer_fn`], which pin
//! down the argument types so the closure signature can be inferred.

use crate::{HttpResponse, JwtToken, Payload, RequestContext, ServiceResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Context passed from a route registration to its authorizer.
pub type AuthContext = Map<String, Value>;

/// A request handler.
///
/// # Example
///
/// ```
/// use halyard_core::{handler_fn, Handler, HttpResponse, Payload, RequestContext};
///
/// let hello = handler_fn(|_token, _body, ctx| {
///     let name = ctx.path_variables().get_str("name").unwrap_or("world");
///     Ok(HttpResponse::success(serde_json::json!({ "hello": name })))
/// });
///
/// let response = hello
///     .handle(None, &Payload::Empty, &RequestContext::new())
///     .unwrap();
/// assert_eq!(response.body().unwrap()["hello"], "world");
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles a request.
    ///
    /// The `ctx` already carries the matched path variables and, if the
    /// route is authorized, the profile the authorizer produced.
    fn handle(
        &self,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse>;
}

/// Validates a caller's credentials against the roles an endpoint requires.
///
/// On success an authorizer returns an opaque profile, which the router
/// threads into the handler's context. To deny, it returns
/// [`ServiceError::Forbidden`](crate::ServiceError::Forbidden) (or
/// `Authentication` when the token itself is unusable).
pub trait Authorizer: Send + Sync + 'static {
    /// Authorizes a request.
    fn authorize(
        &self,
        roles: &[String],
        token: Option<&JwtToken>,
        auth_context: Option<&AuthContext>,
    ) -> ServiceResult<Option<Value>>;
}

/// A shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// A shared, type-erased authorizer.
pub type BoxAuthorizer = Arc<dyn Authorizer>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(
        &self,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        (**self).handle(token, body, ctx)
    }
}

impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    fn authorize(
        &self,
        roles: &[String],
        token: Option<&JwtToken>,
        auth_context: Option<&AuthContext>,
    ) -> ServiceResult<Option<Value>> {
        (**self).authorize(roles, token, auth_context)
    }
}

/// A [`Handler`] backed by a closure. Created with [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Wraps a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Option<&JwtToken>, &Payload, &RequestContext) -> ServiceResult<HttpResponse>
        + Send
        + Sync
        + 'static,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Option<&JwtToken>, &Payload, &RequestContext) -> ServiceResult<HttpResponse>
        + Send
        + Sync
        + 'static,
{
    fn handle(
        &self,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        (self.f)(token, body, ctx)
    }
}

/// An [`Authorizer`] backed by a closure. Created with [`authorizer_fn`].
#[derive(Clone)]
pub struct AuthorizerFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for AuthorizerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizerFn").finish_non_exhaustive()
    }
}

/// Wraps a closure as an [`Authorizer`].
///
/// # Example
///
/// ```
/// use halyard_core::{authorizer_fn, Authorizer, ServiceError};
///
/// let admins_only = authorizer_fn(|roles, _token, _ctx| {
///     if roles.iter().any(|r| r == "admin") {
///         Err(ServiceError::forbidden("admins only"))
///     } else {
///         Ok(None)
///     }
/// });
///
/// assert!(admins_only.authorize(&["admin".into()], None, None).is_err());
/// assert!(admins_only.authorize(&[], None, None).is_ok());
/// ```
pub fn authorizer_fn<F>(f: F) -> AuthorizerFn<F>
where
    F: Fn(&[String], Option<&JwtToken>, Option<&AuthContext>) -> ServiceResult<Option<Value>>
        + Send
        + Sync
        + 'static,
{
    AuthorizerFn { f }
}

impl<F> Authorizer for AuthorizerFn<F>
where
    F: Fn(&[String], Option<&JwtToken>, Option<&AuthContext>) -> ServiceResult<Option<Value>>
        + Send
        + Sync
        + 'static,
{
    fn authorize(
        &self,
        roles: &[String],
        token: Option<&JwtToken>,
        auth_context: Option<&AuthContext>,
    ) -> ServiceResult<Option<Value>> {
        (self.f)(roles, token, auth_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_handler_fn_invokes_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = handler_fn(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::ok())
        });

        handler
            .handle(None, &Payload::Empty, &RequestContext::new())
            .unwrap();
        handler
            .handle(None, &Payload::Empty, &RequestContext::new())
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_boxed_handler() {
        let handler: BoxHandler = Arc::new(handler_fn(|token, _, _| {
            let sub = token.and_then(JwtToken::sub).unwrap_or("anonymous");
            Ok(HttpResponse::success(serde_json::json!({ "sub": sub })))
        }));

        let response = handler
            .handle(None, &Payload::Empty, &RequestContext::new())
            .unwrap();
        assert_eq!(response.body().unwrap()["sub"], "anonymous");
    }

    #[test]
    fn test_authorizer_receives_context() {
        let authorizer: BoxAuthorizer = Arc::new(authorizer_fn(|_, _, ctx| {
            let tenant = ctx
                .and_then(|c| c.get("tenant"))
                .cloned()
                .ok_or_else(|| ServiceError::forbidden("no tenant"))?;
            Ok(Some(serde_json::json!({ "tenant": tenant })))
        }));

        let mut ctx = AuthContext::new();
        ctx.insert("tenant".into(), "acme".into());

        let profile = authorizer.authorize(&[], None, Some(&ctx)).unwrap();
        assert_eq!(profile.unwrap()["tenant"], "acme");
        assert!(authorizer.authorize(&[], None, None).is_err());
    }
}
