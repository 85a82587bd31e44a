use jsonwebtoken::Algorithm;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("unknown signature algorithm: {0}")]
    Unknown(String),
    #[error("symmetric algorithm {0} is not allowed for issuer tokens")]
    Symmetric(String),
    #[error("at least one signature algorithm must be allowed")]
    Empty,
}

/// Asymmetric signature algorithms a verifier accepts in token headers.
///
/// Construction rejects `none` (it does not parse), every `HS*` algorithm and
/// the empty set, so a value of this type is always safe to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedAlgorithms(Vec<Algorithm>);

impl AllowedAlgorithms {
    pub fn new(algorithms: impl IntoIterator<Item = Algorithm>) -> Result<Self, AlgorithmError> {
        let mut allowed = Vec::new();
        for alg in algorithms {
            if is_symmetric(alg) {
                return Err(AlgorithmError::Symmetric(format!("{alg:?}")));
            }
            if !allowed.contains(&alg) {
                allowed.push(alg);
            }
        }
        if allowed.is_empty() {
            return Err(AlgorithmError::Empty);
        }
        Ok(Self(allowed))
    }

    pub fn contains(&self, alg: Algorithm) -> bool {
        self.0.contains(&alg)
    }

    pub fn as_slice(&self) -> &[Algorithm] {
        &self.0
    }
}

impl Default for AllowedAlgorithms {
    fn default() -> Self {
        Self(vec![Algorithm::RS256])
    }
}

impl FromStr for AllowedAlgorithms {
    type Err = AlgorithmError;

    /// Parse a comma-separated list such as `RS256,ES256`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut algorithms = Vec::new();
        for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let alg = Algorithm::from_str(name)
                .map_err(|_| AlgorithmError::Unknown(name.to_string()))?;
            algorithms.push(alg);
        }
        Self::new(algorithms)
    }
}

fn is_symmetric(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}
