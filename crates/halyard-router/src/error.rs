//! Route registration errors.

use thiserror::Error;

/// Errors raised while registering routes.
///
/// These surface at startup, never during dispatch: a service with an
/// invalid route table should fail to build.
#[derive(Debug, Error)]
pub enum RouteError {
    /// One or more method names are outside the allowed set.
    #[error(
        "The following methods are invalid: {}; allowed methods are {}",
        invalid.join(", "),
        allowed.join(", ")
    )]
    InvalidMethod {
        /// The rejected method names, upper-cased, in registration order.
        invalid: Vec<String>,
        /// The accepted method names.
        allowed: &'static [&'static str],
    },

    /// A registration supplied no methods at all.
    #[error("At least one method is required for route '{template}'")]
    NoMethods {
        /// The path template being registered.
        template: String,
    },

    /// The compiled regular expression was rejected by the regex engine.
    #[error("Failed to compile path template '{template}': {source}")]
    Pattern {
        /// The path template being compiled.
        template: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;
