use crate::{AuthError, AuthResult};

const BEARER_SCHEME: &str = "Bearer";

/// Pull the token out of an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`: two space-separated parts with
/// a case-sensitive scheme keyword.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let value = header.ok_or(AuthError::AuthHeaderMissing)?;
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => Ok(*token),
        _ => Err(AuthError::AuthHeaderMalformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            bearer_token(None),
            Err(AuthError::AuthHeaderMissing)
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "bearer abc",
            "BEARER abc",
            "Basic abc",
            "Bearer abc def",
            "Bearer  abc",
            "abc",
        ];
        for case in cases {
            assert!(
                matches!(bearer_token(Some(case)), Err(AuthError::AuthHeaderMalformed)),
                "expected malformed for {case:?}"
            );
        }
    }
}
