//! # Halyard
//!
//! **Request routing and role-based authorization for serverless HTTP functions**
//!
//! Halyard takes an API gateway HTTP event (payload format 2.0), dispatches it
//! through an ordered router with typed path variables, optionally checks the
//! caller's roles, and returns the platform's response envelope.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use halyard::prelude::*;
//! use halyard_authz::{InMemoryAuthStorage, RoleAuthorizer, SimpleUserProfile};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryAuthStorage::new();
//! let authorizer = Arc::new(RoleAuthorizer::new(storage));
//! authorizer.put_user_profile(&SimpleUserProfile::new("u-1").with_roles(["admin"]))?;
//!
//! let service = EventHandler::builder()
//!     .service_name("users")
//!     .authorizer(Arc::clone(&authorizer))
//!     .route(
//!         "/users/<int:id>",
//!         RouteOptions::new().with_methods(["DELETE"]).authorized(["admin"]),
//!         handler_fn(|_, _, ctx| {
//!             let id = ctx.path_variables().get_int("id");
//!             Ok(HttpResponse::success(json!({ "deleted": id })))
//!         }),
//!     )?
//!     .build();
//!
//! let response = service.handle_request(json!({
//!     "requestContext": {
//!         "http": { "method": "DELETE", "path": "/users/42" },
//!         "authorizer": { "jwt": { "claims": { "iss": "https://issuer", "sub": "u-1" } } }
//!     }
//! }));
//! assert_eq!(response.status_code, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use halyard::prelude::*;
//!
//! let config = ConfigLoader::new().with_file("halyard.toml")?.load()?;
//! halyard::telemetry::init_telemetry(&config.telemetry_config())?;
//!
//! let service = EventHandlerBuilder::from_config(&config)
//!     .route("/health", RouteOptions::new(), handler_fn(|_, _, _| Ok(HttpResponse::ok())))?
//!     .build();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! HttpEvent ─► codec ─► Router ─► Authorizer ─► Handler (TracedHandler)
//!                          │           │             │
//!                          └───────────┴─────────────┴──► ErrorHandler
//!                                                             │
//!                                       LambdaResponse ◄──────┘
//! ```

#![doc(html_root_url = "https://docs.rs/halyard/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authorization;
pub mod codec;
mod envelope;
mod error;
mod error_handler;
pub mod event;
mod handler;

pub use authorization::{authorizer_config, role_authorizer};
pub use codec::{decode_body, decode_event_body, BodyKind, CodecError, CodecResult};
pub use envelope::LambdaResponse;
pub use error::{BuildError, BuildResult};
pub use error_handler::{DefaultErrorHandler, ErrorHandler};
pub use event::HttpEvent;
pub use handler::{EventHandler, EventHandlerBuilder, RouteOptions, DEFAULT_SERVICE_NAME};

// Re-export the member crates
pub use halyard_authz as authz;
pub use halyard_config as config;
pub use halyard_core as core;
pub use halyard_router as router;
pub use halyard_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use halyard::prelude::*;
///
/// let options = RouteOptions::new().with_methods(["GET", "POST"]);
/// assert_eq!(options.methods.len(), 2);
/// ```
pub mod prelude {
    pub use crate::{
        DefaultErrorHandler, ErrorHandler, EventHandler, EventHandlerBuilder, HttpEvent,
        LambdaResponse, RouteOptions,
    };

    pub use halyard_core::{
        authorizer_fn, handler_fn, AuthContext, Authorizer, Handler, HttpResponse, JwtToken,
        Payload, RequestContext, ServiceError, ServiceResult,
    };

    pub use halyard_config::{ConfigLoader, HalyardConfig};
}
