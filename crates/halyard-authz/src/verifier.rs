//! Token verification.
//!
//! Two independent checks:
//!
//! - [`verify_claims`] checks expiry and the intended recipient on an
//!   already-decoded token. API Gateway has normally verified the signature
//!   before the event reaches us.
//! - [`TokenVerifier`] verifies the signature of a raw token against a JSON
//!   Web Key Set the caller supplies.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

use halyard_core::JwtToken;

use crate::error::{AuthzError, AuthzResult};

/// Checks `exp` and, when `client_id` is given, `aud` / `client_id`.
///
/// `now` is seconds since the epoch. An `aud` claim takes precedence: only
/// when it is absent is `client_id` compared.
///
/// # Errors
///
/// [`AuthzError::TokenExpired`], [`AuthzError::InvalidAudience`] or
/// [`AuthzError::InvalidClientId`].
pub fn verify_claims(
    token: &JwtToken,
    client_id: Option<&str>,
    now: i64,
    leeway_secs: u64,
) -> AuthzResult<()> {
    if let Some(exp) = token.exp() {
        let leeway = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
        if exp.saturating_add(leeway) < now {
            return Err(AuthzError::TokenExpired { expired_at: exp });
        }
    }

    let Some(expected) = client_id else {
        return Ok(());
    };

    if let Some(aud) = token.aud() {
        if aud != expected {
            return Err(AuthzError::InvalidAudience {
                audience: aud.to_owned(),
            });
        }
    } else if let Some(found) = token.client_id() {
        if found != expected {
            return Err(AuthzError::InvalidClientId {
                client_id: found.to_owned(),
            });
        }
    }

    Ok(())
}

/// Verifies raw token signatures against a key set.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: JwkSet,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    /// Creates a verifier for RS256 tokens.
    #[must_use]
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys,
            algorithms: vec![Algorithm::RS256],
        }
    }

    /// Parses a key set document (`{"keys": [...]}`).
    ///
    /// # Errors
    ///
    /// [`AuthzError::Json`] if the document is not a key set.
    pub fn from_json(jwks: &str) -> AuthzResult<Self> {
        Ok(Self::new(serde_json::from_str(jwks)?))
    }

    /// Replaces the accepted algorithms.
    #[must_use]
    pub fn with_algorithms(mut self, algorithms: impl Into<Vec<Algorithm>>) -> Self {
        self.algorithms = algorithms.into();
        self
    }

    /// Number of keys held.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.keys.len()
    }

    /// Verifies `raw` and returns its claims.
    ///
    /// Only the signature and structure are checked here; expiry and
    /// audience go through [`verify_claims`].
    ///
    /// # Errors
    ///
    /// [`AuthzError::JwkNotFound`] if the token's `kid` is unknown,
    /// [`AuthzError::InvalidSignature`] if the signature does not verify,
    /// and [`AuthzError::InvalidToken`] for anything malformed.
    pub fn verify(&self, raw: &str) -> AuthzResult<JwtToken> {
        let header = decode_header(raw).map_err(|e| AuthzError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthzError::InvalidToken("token header has no kid".into()))?;
        let jwk = self
            .keys
            .find(&kid)
            .ok_or_else(|| AuthzError::JwkNotFound { kid: kid.clone() })?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthzError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms.clone_from(&self.algorithms);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Map<String, Value>>(raw, &key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthzError::InvalidSignature,
                _ => AuthzError::InvalidToken(e.to_string()),
            }
        })?;

        debug!(kid = %kid, "Token signature verified");
        Ok(JwtToken::new(data.claims).with_raw(raw))
    }
}
