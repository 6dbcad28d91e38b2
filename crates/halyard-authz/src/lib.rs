//! Halyard Authorization - role checks against stored user profiles
//!
//! This crate provides the [`Authorizer`](halyard_core::Authorizer) that
//! routes plug in when they declare required roles.
//!
//! # Overview
//!
//! - [`RoleAuthorizer`] checks the caller's token and roles
//! - [`AuthStorage`] looks up and persists [`SimpleUserProfile`]s
//! - [`RoleCache`] keeps role sets across warm invocations
//! - [`TokenVerifier`] checks raw token signatures against a key set
//!
//! # Architecture
//!
//! ```text
//!      JwtToken + required roles
//!                │
//!     ┌──────────▼─────────────────┐
//!     │   RoleAuthorizer           │
//!     │   verify claims / sig      │
//!     └──────────┬─────────────────┘
//!                │ sub
//!     ┌──────────▼─────────────────┐     ┌──────────────┐
//!     │   RoleCache                │────▶│ AuthStorage  │
//!     │   (roles per user)         │ miss│ (profiles)   │
//!     └──────────┬─────────────────┘     └──────────────┘
//!                │
//!                ▼
//!     profile (or none) / Forbidden
//! ```
//!
//! # Example
//!
//! ```
//! use halyard_authz::{AuthorizerConfig, InMemoryAuthStorage, RoleAuthorizer, SimpleUserProfile};
//! use halyard_core::{Authorizer, JwtToken, ServiceError};
//!
//! let storage = InMemoryAuthStorage::with_profiles([
//!     SimpleUserProfile::new("user-123").with_roles(["reader"]),
//! ]);
//! let authorizer = RoleAuthorizer::with_config(
//!     storage,
//!     AuthorizerConfig::new().with_fetch_full_profile(true),
//! );
//!
//! let token = JwtToken::from_value(serde_json::json!({ "sub": "user-123" })).unwrap();
//!
//! let profile = authorizer
//!     .authorize(&["reader".to_owned()], Some(&token), None)
//!     .unwrap();
//! assert_eq!(profile.unwrap()["userId"], "user-123");
//!
//! let denied = authorizer.authorize(&["admin".to_owned()], Some(&token), None);
//! assert!(matches!(denied, Err(ServiceError::Forbidden { .. })));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorizer;
pub mod cache;
pub mod config;
pub mod error;
pub mod profile;
pub mod storage;
pub mod verifier;

pub use authorizer::{RoleAuthorizer, FETCH_FULL_PROFILE};
pub use cache::{CacheConfig, CacheStats, RoleCache};
pub use config::AuthorizerConfig;
pub use error::{AuthzError, AuthzResult};
pub use profile::SimpleUserProfile;
pub use storage::{AuthStorage, InMemoryAuthStorage};
pub use verifier::{verify_claims, TokenVerifier};
