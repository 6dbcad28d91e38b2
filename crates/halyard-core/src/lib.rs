//! # Halyard Core
//!
//! Core types and traits shared by every Halyard crate.
//!
//! - [`RequestContext`] - Per-request data threaded into handlers
//! - [`PathVariables`] - Typed variables extracted from a matched path
//! - [`JwtToken`] - Read-only access to a caller's token claims
//! - [`Payload`] - A decoded request body
//! - [`HttpResponse`] - The response handlers return
//! - [`ServiceError`] - The dispatch error taxonomy
//! - [`Handler`] / [`Authorizer`] - The callables a route binds

#![doc(html_root_url = "https://docs.rs/halyard-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod payload;
mod response;
mod token;
mod variables;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, ServiceError, ServiceResult};
pub use handler::{
    authorizer_fn, handler_fn, AuthContext, Authorizer, AuthorizerFn, BoxAuthorizer, BoxHandler,
    Handler, HandlerFn,
};
pub use payload::Payload;
pub use response::HttpResponse;
pub use token::JwtToken;
pub use variables::{PathValue, PathVariables};
