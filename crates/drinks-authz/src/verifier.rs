//! Bearer token verification.
//!
//! # Purpose
//! Turn a compact JWS string into a [`ClaimSet`] the caller can trust.
//!
//! # Check order
//! 1. Structure: three segments and a decodable header with `alg` and `kid`.
//! 2. Algorithm: the header `alg` is in the allow-list (`none` and `HS*`
//!    never are).
//! 3. Key: the `kid` resolves to a directory key with the same algorithm,
//!    refreshing the directory once on a miss.
//! 4. Signature over `header.payload`.
//! 5. Registered claims (`exp`, `nbf`, `iss`, `aud`, `sub`), with an
//!    optional clock leeway.
//! 6. The requested permission, when one is given.
//!
//! The first failing step decides the error. Nothing from the payload is
//! looked at before the signature has been checked.
use crate::claims::{ClaimRules, RawClaims};
use crate::{AllowedAlgorithms, AuthError, AuthResult, ClaimSet, KeyDirectory, VerificationKey};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Clock skew tolerated on `exp` and `nbf`. Zero means an `exp` in the past
/// is always rejected.
pub const DEFAULT_LEEWAY_SECONDS: u64 = 0;

/// Trusted issuer string for an identity-provider domain.
///
/// Accepts `tenant.example.com`, `https://tenant.example.com` or
/// `https://tenant.example.com/` and always yields the trailing-slash form
/// the issuer puts in `iss`.
pub fn issuer_url(domain: &str) -> String {
    format!("https://{}/", bare_domain(domain))
}

/// Default JWKS location for an identity-provider domain.
pub fn jwks_url(domain: &str) -> String {
    format!("https://{}/.well-known/jwks.json", bare_domain(domain))
}

fn bare_domain(domain: &str) -> &str {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/')
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub issuer: String,
    pub audience: String,
    pub allowed_algorithms: AllowedAlgorithms,
    pub leeway_seconds: u64,
}

impl VerifierConfig {
    pub fn for_issuer_domain(domain: &str, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer_url(domain),
            audience: audience.into(),
            allowed_algorithms: AllowedAlgorithms::default(),
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    kid: String,
}

#[derive(Clone)]
pub struct TokenVerifier {
    config: VerifierConfig,
    directory: Arc<dyn KeyDirectory>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: VerifierConfig, directory: Arc<dyn KeyDirectory>) -> Self {
        Self { config, directory }
    }

    /// Verify `token` against the wall clock.
    pub async fn verify(&self, token: &str, required: Option<&str>) -> AuthResult<ClaimSet> {
        self.verify_at(token, required, chrono::Utc::now().timestamp())
            .await
    }

    /// Verify `token` as of `now` (unix seconds).
    pub async fn verify_at(
        &self,
        token: &str,
        required: Option<&str>,
        now: i64,
    ) -> AuthResult<ClaimSet> {
        let (signing_input, header, payload, signature) = split_token(token)?;

        let alg = Algorithm::from_str(&header.alg)
            .ok()
            .filter(|alg| self.config.allowed_algorithms.contains(*alg))
            .ok_or_else(|| {
                AuthError::TokenMalformed(format!("algorithm {} is not allowed", header.alg))
            })?;

        let key = self.resolve_key(&header.kid, alg).await?;

        let verified =
            jsonwebtoken::crypto::verify(signature, signing_input.as_bytes(), &key.decoding_key, alg)
                .unwrap_or(false);
        if !verified {
            return Err(AuthError::SignatureInvalid);
        }

        let raw: RawClaims = decode_segment(payload)
            .map_err(|err| AuthError::TokenMalformed(format!("payload: {err}")))?;
        let claims = raw.validate(&ClaimRules {
            issuer: &self.config.issuer,
            audience: &self.config.audience,
            leeway: i64::try_from(self.config.leeway_seconds).unwrap_or(i64::MAX),
            now,
        })?;

        if let Some(required) = required {
            check_permission(&claims, required)?;
        }
        Ok(claims)
    }

    async fn resolve_key(&self, kid: &str, alg: Algorithm) -> AuthResult<VerificationKey> {
        let keys = self.directory.keys().await?;
        let key = match keys.get(kid) {
            Some(key) => key.clone(),
            None => {
                tracing::debug!(kid, "unknown kid, refreshing key directory");
                let keys = self.directory.refresh().await?;
                keys.get(kid)
                    .cloned()
                    .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))?
            }
        };
        if key.alg != alg {
            return Err(AuthError::KeyNotFound(kid.to_string()));
        }
        Ok(key)
    }
}

fn check_permission(claims: &ClaimSet, required: &str) -> AuthResult<()> {
    if claims.permissions().is_none() {
        return Err(AuthError::PermissionsClaimMissing);
    }
    if !claims.has_permission(required) {
        return Err(AuthError::PermissionDenied(required.to_string()));
    }
    Ok(())
}

/// Returns the signing input, parsed header, payload segment and signature
/// segment.
fn split_token(token: &str) -> AuthResult<(&str, RawHeader, &str, &str)> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::TokenMalformed(
            "expected three segments".to_string(),
        ));
    };
    let parsed: RawHeader = decode_segment(header)
        .map_err(|err| AuthError::TokenMalformed(format!("header: {err}")))?;
    let signing_input = &token[..header.len() + 1 + payload.len()];
    Ok((signing_input, parsed, payload, signature))
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| err.to_string())?;
    serde_json::from_slice(&bytes).map_err(|err| err.to_string())
}
