use std::fmt;
use thiserror::Error;

/// Claim check that rejected an otherwise well-signed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimCheck {
    Expiry,
    NotBefore,
    Issuer,
    Audience,
    Subject,
}

impl ClaimCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimCheck::Expiry => "exp",
            ClaimCheck::NotBefore => "nbf",
            ClaimCheck::Issuer => "iss",
            ClaimCheck::Audience => "aud",
            ClaimCheck::Subject => "sub",
        }
    }
}

impl fmt::Display for ClaimCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way an authorization check can fail.
///
/// `Display` carries diagnostic detail for logs. Responses must use
/// [`AuthError::description`], which never echoes token contents.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    AuthHeaderMissing,
    #[error("authorization header is not of the form `Bearer <token>`")]
    AuthHeaderMalformed,
    #[error("token is malformed: {0}")]
    TokenMalformed(String),
    #[error("no trusted signing key for kid {0}")]
    KeyNotFound(String),
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token claim check failed: {0}")]
    TokenExpiredOrInvalidClaims(ClaimCheck),
    #[error("signing key directory unavailable: {0}")]
    KeyDirectoryUnavailable(String),
    #[error("token does not carry a permissions claim")]
    PermissionsClaimMissing,
    #[error("permission {0} not granted")]
    PermissionDenied(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "authorization_header_missing",
            AuthError::AuthHeaderMalformed => "invalid_header",
            AuthError::TokenMalformed(_) => "invalid_token",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::SignatureInvalid => "invalid_signature",
            AuthError::TokenExpiredOrInvalidClaims(ClaimCheck::Expiry) => "token_expired",
            AuthError::TokenExpiredOrInvalidClaims(_) => "invalid_claims",
            AuthError::KeyDirectoryUnavailable(_) => "key_directory_unavailable",
            AuthError::PermissionsClaimMissing => "permissions_missing",
            AuthError::PermissionDenied(_) => "forbidden",
        }
    }

    /// Human-readable message that is safe to return to callers.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "Authorization header is expected.",
            AuthError::AuthHeaderMalformed => "Authorization header must be a bearer token.",
            AuthError::TokenMalformed(_) => "Unable to parse authentication token.",
            AuthError::KeyNotFound(_) => "Unable to find the appropriate key.",
            AuthError::SignatureInvalid => "Token signature could not be verified.",
            AuthError::TokenExpiredOrInvalidClaims(ClaimCheck::Expiry) => "Token expired.",
            AuthError::TokenExpiredOrInvalidClaims(_) => {
                "Incorrect claims. Please check the audience and issuer."
            }
            AuthError::KeyDirectoryUnavailable(_) => "Unable to verify authentication token.",
            AuthError::PermissionsClaimMissing => "Permissions not included in token.",
            AuthError::PermissionDenied(_) => "Permission not found.",
        }
    }

    /// HTTP status the failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthHeaderMissing
            | AuthError::AuthHeaderMalformed
            | AuthError::TokenMalformed(_)
            | AuthError::KeyNotFound(_)
            | AuthError::SignatureInvalid
            | AuthError::TokenExpiredOrInvalidClaims(_) => 401,
            AuthError::KeyDirectoryUnavailable(_) => 500,
            AuthError::PermissionsClaimMissing => 400,
            AuthError::PermissionDenied(_) => 403,
        }
    }
}
