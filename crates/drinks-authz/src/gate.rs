use crate::{AuthResult, ClaimSet, TokenVerifier, bearer_token};
use std::future::Future;

/// Extracts and verifies bearer tokens for protected operations.
#[derive(Debug, Clone)]
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Check an `Authorization` header value, optionally requiring one
    /// permission string.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        required: Option<&str>,
    ) -> AuthResult<ClaimSet> {
        let token = bearer_token(header)?;
        self.verifier.verify(token, required).await
    }

    /// Run `operation` with the verified claims.
    ///
    /// On any authorization failure the error is returned and `operation` is
    /// dropped without being called.
    pub async fn guard<F, Fut, T>(
        &self,
        header: Option<&str>,
        required: Option<&str>,
        operation: F,
    ) -> AuthResult<T>
    where
        F: FnOnce(ClaimSet) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(header, required).await?;
        Ok(operation(claims).await)
    }
}
