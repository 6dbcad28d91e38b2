//! Ordered, typed path router for Halyard.
//!
//! This crate resolves `(method, path)` pairs to handlers registered against
//! path templates, runs the matched endpoint's authorizer, and invokes its
//! handler.
//!
//! # Features
//!
//! - **Typed placeholders**: `<int:id>`, `<float:x>`, `<str:name>` or `<name>`
//! - **Per-method endpoints**: each method on a path has its own handler,
//!   authorizer, authorizer context and required roles
//! - **Build then freeze**: routes are registered on a [`RouterBuilder`]; the
//!   resulting [`Router`] is immutable and `Send + Sync`
//! - **Typed failures**: `404` when no path matches, `405` when the first
//!   matching path lacks the method
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use halyard_core::{handler_fn, HttpResponse, Payload, RequestContext, ServiceError};
//! use halyard_router::{Endpoint, Router};
//! use http::Method;
//!
//! let get_user = handler_fn(|_token, _body, ctx| {
//!     let id = ctx.path_variables().get_int("user_id").unwrap_or_default();
//!     Ok(HttpResponse::success(serde_json::json!({ "id": id })))
//! });
//!
//! let mut builder = Router::builder();
//! builder
//!     .add_route(["GET"], "/users/<int:user_id>", Endpoint::new(Arc::new(get_user)))
//!     .unwrap();
//! let router = builder.build();
//!
//! let ctx = RequestContext::new();
//! let response = router
//!     .route(&Method::GET, "/users/10", None, &Payload::Empty, &ctx)
//!     .unwrap();
//! assert_eq!(response.body().unwrap()["id"], 10);
//!
//! let err = router
//!     .route(&Method::DELETE, "/users/10", None, &Payload::Empty, &ctx)
//!     .unwrap_err();
//! assert!(matches!(err, ServiceError::MethodNotAllowed { .. }));
//! ```
//!
//! # Dispatch
//!
//! ```text
//! START → scan routes in order ─┬─ path matched ─┬─ method bound ─→ authorize ─→ handle ─→ DONE
//!                               │                └─ method missing ─→ 405
//!                               └─ no route matched ─→ 404
//! ```

mod error;
mod method_table;
mod pattern;
mod route;
mod router;

pub use error::{RouteError, RouteResult};
pub use method_table::{parse_methods, Endpoint, MethodTable, ALLOWED_METHODS};
pub use pattern::{PathPattern, Segment, VariableKind};
pub use route::Route;
pub use router::{Router, RouterBuilder};
