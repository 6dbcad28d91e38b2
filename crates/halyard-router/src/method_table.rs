//! Per-method endpoint table.
//!
//! [`MethodTable`] maps each allowed HTTP method to the [`Endpoint`] bound to
//! it on a single route. Entries are independent: binding an authorizer to
//! `GET` leaves `POST` untouched.

use std::fmt;

use halyard_core::{AuthContext, BoxAuthorizer, BoxHandler};
use http::Method;

use crate::error::{RouteError, RouteResult};

/// The HTTP methods a route may bind, in canonical order.
pub const ALLOWED_METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD", "PATCH", "TRACE",
];

/// Validates and normalizes method names.
///
/// Names are upper-cased. If any name is not in [`ALLOWED_METHODS`], the
/// whole set is rejected and every invalid name is reported. Duplicates are
/// collapsed.
///
/// # Example
///
/// ```
/// use halyard_router::parse_methods;
/// use http::Method;
///
/// assert_eq!(parse_methods(["get", "Post"]).unwrap(), vec![Method::GET, Method::POST]);
/// assert!(parse_methods(["GET", "FETCH"]).is_err());
/// ```
pub fn parse_methods<I, S>(methods: I) -> RouteResult<Vec<Method>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for name in methods {
        let upper = name.as_ref().trim().to_ascii_uppercase();
        if ALLOWED_METHODS.contains(&upper.as_str()) {
            if let Ok(method) = Method::from_bytes(upper.as_bytes()) {
                if !valid.contains(&method) {
                    valid.push(method);
                }
                continue;
            }
        }
        if !invalid.contains(&upper) {
            invalid.push(upper);
        }
    }

    if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(RouteError::InvalidMethod {
            invalid,
            allowed: &ALLOWED_METHODS,
        })
    }
}

/// Everything bound to one method of one route.
#[derive(Clone)]
pub struct Endpoint {
    /// The handler invoked once the request is authorized.
    pub handler: BoxHandler,
    /// Optional authorizer run before the handler.
    pub authorizer: Option<BoxAuthorizer>,
    /// Context handed to the authorizer.
    pub auth_context: Option<AuthContext>,
    /// Roles the caller must hold.
    pub roles: Vec<String>,
}

impl Endpoint {
    /// Creates an endpoint with no authorization.
    #[must_use]
    pub fn new(handler: BoxHandler) -> Self {
        Self {
            handler,
            authorizer: None,
            auth_context: None,
            roles: Vec::new(),
        }
    }

    /// Sets the authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: BoxAuthorizer) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Sets the authorizer context.
    #[must_use]
    pub fn with_auth_context(mut self, auth_context: AuthContext) -> Self {
        self.auth_context = Some(auth_context);
        self
    }

    /// Sets the required roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("authorized", &self.authorizer.is_some())
            .field("auth_context", &self.auth_context)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Maps HTTP methods to endpoints for a single route.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    get: Option<Endpoint>,
    post: Option<Endpoint>,
    put: Option<Endpoint>,
    delete: Option<Endpoint>,
    options: Option<Endpoint>,
    head: Option<Endpoint>,
    patch: Option<Endpoint>,
    trace: Option<Endpoint>,
}

impl MethodTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, method: &Method) -> Option<&Option<Endpoint>> {
        match *method {
            Method::GET => Some(&self.get),
            Method::POST => Some(&self.post),
            Method::PUT => Some(&self.put),
            Method::DELETE => Some(&self.delete),
            Method::OPTIONS => Some(&self.options),
            Method::HEAD => Some(&self.head),
            Method::PATCH => Some(&self.patch),
            Method::TRACE => Some(&self.trace),
            _ => None,
        }
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Endpoint>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }

    /// Binds an endpoint to a method, replacing any previous binding.
    ///
    /// Returns `false` (and binds nothing) for methods outside
    /// [`ALLOWED_METHODS`].
    pub fn insert(&mut self, method: &Method, endpoint: Endpoint) -> bool {
        match self.slot_mut(method) {
            Some(slot) => {
                *slot = Some(endpoint);
                true
            }
            None => false,
        }
    }

    /// Returns the endpoint bound to a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&Endpoint> {
        self.slot(method).and_then(Option::as_ref)
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.allowed_methods().is_empty()
    }

    /// Returns the bound methods in canonical order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        [
            (Method::GET, &self.get),
            (Method::POST, &self.post),
            (Method::PUT, &self.put),
            (Method::DELETE, &self.delete),
            (Method::OPTIONS, &self.options),
            (Method::HEAD, &self.head),
            (Method::PATCH, &self.patch),
            (Method::TRACE, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, slot)| slot.as_ref().map(|_| method))
        .collect()
    }
}
