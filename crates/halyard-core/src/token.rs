//! JWT token carrier.
//!
//! [`JwtToken`] gives read-only access to the claims of a token that the
//! gateway, or a signature verifier, has already decoded. Gateways commonly
//! deliver every claim as a string, so numeric and boolean accessors accept
//! either the native JSON type or its string form.

use serde_json::{Map, Value};

/// Issuer prefix used by Cognito user pools.
const COGNITO_ISSUER_PREFIX: &str = "https://cognito-idp";

/// A decoded JWT token.
///
/// # Example
///
/// ```
/// use halyard_core::JwtToken;
/// use serde_json::json;
///
/// let token = JwtToken::from_value(json!({
///     "iss": "https://cognito-idp.eu-west-1.amazonaws.com/pool",
///     "sub": "user-1",
///     "exp": "1700000000",
///     "cognito:username": "alice",
/// }))
/// .unwrap();
///
/// assert_eq!(token.sub(), Some("user-1"));
/// assert_eq!(token.exp(), Some(1_700_000_000));
/// assert!(token.is_cognito());
/// assert_eq!(token.cognito_username(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JwtToken {
    claims: Map<String, Value>,
    raw: Option<String>,
}

impl JwtToken {
    /// Creates a token from a claims map.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims, raw: None }
    }

    /// Creates a token from a JSON value. Returns `None` if it is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(claims) => Some(Self::new(claims)),
            _ => None,
        }
    }

    /// Attaches the raw encoded token, for signature verification.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// The raw encoded token, if known.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// All claims.
    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Returns a claim by name.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    fn int_claim(&self, name: &str) -> Option<i64> {
        match self.claims.get(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn bool_claim(&self, name: &str) -> Option<bool> {
        match self.claims.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Audience.
    #[must_use]
    pub fn aud(&self) -> Option<&str> {
        self.str_claim("aud")
    }

    /// Expiry, in seconds since the epoch.
    #[must_use]
    pub fn exp(&self) -> Option<i64> {
        self.int_claim("exp")
    }

    /// Issued-at time, in seconds since the epoch.
    #[must_use]
    pub fn iat(&self) -> Option<i64> {
        self.int_claim("iat")
    }

    /// Issuer.
    #[must_use]
    pub fn iss(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    /// Token identifier.
    #[must_use]
    pub fn jti(&self) -> Option<&str> {
        self.str_claim("jti")
    }

    /// Subject. Used as the user identifier by role authorizers.
    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Returns `true` if the token was issued by a Cognito user pool.
    #[must_use]
    pub fn is_cognito(&self) -> bool {
        self.iss()
            .is_some_and(|iss| iss.starts_with(COGNITO_ISSUER_PREFIX))
    }

    /// Time the user authenticated, in seconds since the epoch.
    #[must_use]
    pub fn auth_time(&self) -> Option<i64> {
        self.int_claim("auth_time")
    }

    /// Client the token was issued to (access tokens).
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.str_claim("client_id")
    }

    /// Cognito username (ID tokens).
    #[must_use]
    pub fn cognito_username(&self) -> Option<&str> {
        self.str_claim("cognito:username")
    }

    /// E-mail address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    /// Whether the e-mail address has been verified.
    #[must_use]
    pub fn email_verified(&self) -> Option<bool> {
        self.bool_claim("email_verified")
    }

    /// Identity-provider event identifier.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.str_claim("event_id")
    }

    /// Family name.
    #[must_use]
    pub fn family_name(&self) -> Option<&str> {
        self.str_claim("family_name")
    }

    /// Given name.
    #[must_use]
    pub fn given_name(&self) -> Option<&str> {
        self.str_claim("given_name")
    }

    /// OAuth scopes, space separated.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.str_claim("scope")
    }

    /// Token use (`access` or `id`).
    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.str_claim("token_use")
    }

    /// Username (access tokens).
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.str_claim("username")
    }

    /// The standard claims as a JSON object. Missing claims are `null`.
    #[must_use]
    pub fn standard_claims(&self) -> Value {
        serde_json::json!({
            "aud": self.aud(),
            "exp": self.exp(),
            "iat": self.iat(),
            "iss": self.iss(),
            "jti": self.jti(),
            "sub": self.sub(),
        })
    }
}
