use crate::{AuthError, AuthResult};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    Sig,
    Enc,
}

/// A single JSON Web Key as published by the issuer.
///
/// Fields other than `kty` are optional on the wire so that one unusable entry
/// (an EC key, an encryption key) does not make the whole set undecodable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_field: Option<KeyUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Public key ready for signature checks, pinned to one algorithm.
#[derive(Clone)]
pub struct VerificationKey {
    pub kid: String,
    pub alg: Algorithm,
    pub decoding_key: DecodingKey,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .finish_non_exhaustive()
    }
}

/// Verification keys indexed by key identifier.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Convert a published JWKS into usable keys.
    ///
    /// Entries that are not RSA signing keys with a known algorithm and
    /// decodable components are skipped. A set with no usable key is an
    /// error because no token could ever verify against it.
    pub fn from_jwks(jwks: &Jwks) -> AuthResult<Self> {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            match verification_key(jwk) {
                Ok(key) => {
                    keys.insert(key.kid.clone(), key);
                }
                Err(reason) => {
                    tracing::warn!(kid = ?jwk.kid, kty = %jwk.kty, reason, "skipping unusable jwk");
                }
            }
        }
        if keys.is_empty() {
            return Err(AuthError::KeyDirectoryUnavailable(
                "key set contains no usable signing keys".to_string(),
            ));
        }
        Ok(Self { keys })
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn verification_key(jwk: &Jwk) -> Result<VerificationKey, &'static str> {
    if jwk.kty != "RSA" {
        return Err("unsupported key type");
    }
    if matches!(jwk.use_field, Some(KeyUse::Enc)) {
        return Err("not a signing key");
    }
    let kid = jwk.kid.as_deref().ok_or("missing kid")?;
    let alg = jwk
        .alg
        .as_deref()
        .ok_or("missing alg")
        .and_then(|alg| Algorithm::from_str(alg).map_err(|_| "unknown alg"))?;
    if !matches!(alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512) {
        return Err("alg does not match RSA key type");
    }
    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        return Err("missing RSA components");
    };
    let decoding_key =
        DecodingKey::from_rsa_components(n, e).map_err(|_| "invalid RSA components")?;
    Ok(VerificationKey {
        kid: kid.to_string(),
        alg,
        decoding_key,
    })
}
