use crate::{AuthError, AuthResult, ClaimCheck};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(value) => value == audience,
            Audience::Many(values) => values.iter().any(|value| value == audience),
        }
    }
}

/// Verified token payload.
///
/// Values of this type are only produced by the token verifier after the
/// signature, the registered claims and the requested permission have all
/// been checked. It intentionally has no public constructor and does not
/// implement `Deserialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimSet {
    iss: String,
    sub: String,
    aud: Audience,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<Vec<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ClaimSet {
    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn audience(&self) -> &Audience {
        &self.aud
    }

    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|granted| granted.iter().any(|value| value == permission))
    }

    /// Payload members without a dedicated accessor (`azp`, `scope`, ...).
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Registered-claim expectations checked against every payload.
pub(crate) struct ClaimRules<'a> {
    pub issuer: &'a str,
    pub audience: &'a str,
    pub leeway: i64,
    pub now: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    iss: Option<String>,
    sub: Option<String>,
    aud: Option<Audience>,
    exp: Option<i64>,
    iat: Option<i64>,
    nbf: Option<i64>,
    permissions: Option<Vec<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl RawClaims {
    /// Validate registered claims in a fixed order: expiry, not-before,
    /// issuer, audience, subject.
    pub(crate) fn validate(self, rules: &ClaimRules<'_>) -> AuthResult<ClaimSet> {
        let invalid = AuthError::TokenExpiredOrInvalidClaims;

        let exp = self.exp.ok_or(invalid(ClaimCheck::Expiry))?;
        if exp < rules.now.saturating_sub(rules.leeway) {
            return Err(invalid(ClaimCheck::Expiry));
        }
        if let Some(nbf) = self.nbf
            && nbf > rules.now.saturating_add(rules.leeway)
        {
            return Err(invalid(ClaimCheck::NotBefore));
        }
        let iss = self
            .iss
            .filter(|iss| iss == rules.issuer)
            .ok_or(invalid(ClaimCheck::Issuer))?;
        let aud = self
            .aud
            .filter(|aud| aud.contains(rules.audience))
            .ok_or(invalid(ClaimCheck::Audience))?;
        let sub = self.sub.ok_or(invalid(ClaimCheck::Subject))?;

        Ok(ClaimSet {
            iss,
            sub,
            aud,
            exp,
            iat: self.iat,
            nbf: self.nbf,
            permissions: self.permissions,
            extra: self.extra,
        })
    }
}
