//! Service construction errors.

use halyard_router::RouteError;
use thiserror::Error;

/// Errors raised while building an [`EventHandler`](crate::EventHandler).
///
/// These surface at startup, never while handling an event.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A route registration was rejected by the router.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A route asked for authorization but the service has no authorizer.
    #[error("Route '{path}' requires authorization but no authorizer is configured")]
    MissingAuthorizer {
        /// The path template being registered.
        path: String,
    },
}

/// Result type for service construction.
pub type BuildResult<T> = Result<T, BuildError>;
