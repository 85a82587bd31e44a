//! Bearer token authorization for the drinks API.
//!
//! # Purpose
//! Validates issuer-signed bearer tokens against the issuer's published key
//! set and enforces the permission strings carried in their `permissions`
//! claim.
//!
//! # How it fits
//! The HTTP service builds one [`Authorizer`] at startup and asks it to
//! check every protected request. This crate knows nothing about HTTP
//! frameworks; [`AuthError::status_code`] is the only HTTP-shaped surface.
//!
//! # Key invariants
//! - A [`ClaimSet`] exists only after the signature, the registered claims
//!   and (when requested) the permission have been checked.
//! - `none` and symmetric `HS*` algorithms are never accepted.
//! - Key set snapshots are immutable; refreshes swap them atomically.
//!
//! # Important configuration
//! - The trusted issuer is `https://<issuer_domain>/`, see [`issuer_url`].
//! - The audience must match the API identifier registered with the issuer.
//!
//! # Examples
//! ```rust
//! use drinks_authz::{Permission, bearer_token};
//!
//! assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).ok(), Some("abc.def.ghi"));
//! assert_eq!(Permission::PostDrinks.as_str(), "post:drinks");
//! ```
//!
//! # Common pitfalls
//! - Passing a full JWKS URL as the issuer domain yields an issuer that never
//!   matches `iss`.
//! - Clock skew beyond the configured leeway shows up as `token_expired`.

mod algorithms;
mod bearer;
mod claims;
mod directory;
mod errors;
mod gate;
mod jwks;
mod permission;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod verifier;

pub use algorithms::{AlgorithmError, AllowedAlgorithms};
pub use bearer::bearer_token;
pub use claims::{Audience, ClaimSet};
pub use directory::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_JWKS_TTL, KeyDirectory, RemoteKeyDirectory, StaticKeyDirectory,
};
pub use errors::{AuthError, AuthResult, ClaimCheck};
pub use gate::Authorizer;
pub use jwks::{Jwk, Jwks, KeySet, KeyUse, VerificationKey};
pub use permission::Permission;
pub use verifier::{
    DEFAULT_LEEWAY_SECONDS, TokenVerifier, VerifierConfig, issuer_url, jwks_url,
};
