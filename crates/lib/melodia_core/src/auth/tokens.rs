//! Signed token codec — access and CSRF tokens (HS256).
//!
//! Both token kinds are self-contained: the server never persists
//! them. Access tokens carry the user version so a single version
//! bump revokes every outstanding token for that user. The payload
//! `kind` tag plus distinct signing secrets keep the two token
//! domains from being swapped for each other.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Access token lifetime: 30 days.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 30;

/// CSRF token lifetime: 1 hour.
pub const CSRF_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Domain tag embedded in every token payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Csrf,
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: u32,
    pub user_version: u32,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// Claims carried by a CSRF token.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfClaims {
    pub user_id: u32,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// Expiry is checked against the local wall clock with no leeway.
fn validation() -> Validation {
    let mut v = Validation::new(Algorithm::HS256);
    v.leeway = 0;
    v
}

fn encode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    AuthError::Crypto(format!("token encode: {e}"))
}

fn decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    }
}

/// Issue a signed access token for (user id, user version).
pub fn issue_access(user_id: u32, user_version: u32, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = AccessClaims {
        user_id,
        user_version,
        iat: now.timestamp(),
        exp: (now + Duration::days(ACCESS_TOKEN_TTL_DAYS)).timestamp(),
        kind: TokenKind::Access,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).map_err(encode_error)
}

/// Verify an access token, returning (user id, user version).
pub fn verify_access(token: &str, secret: &[u8]) -> Result<(u32, u32), AuthError> {
    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map_err(decode_error)?;
    if data.claims.kind != TokenKind::Access {
        return Err(AuthError::TokenInvalid);
    }
    Ok((data.claims.user_id, data.claims.user_version))
}

/// Issue a signed CSRF token for the given user.
pub fn issue_csrf(user_id: u32, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = CsrfClaims {
        user_id,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(CSRF_TOKEN_TTL_SECS)).timestamp(),
        kind: TokenKind::Csrf,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).map_err(encode_error)
}

/// Verify a CSRF token, returning the embedded user id.
pub fn verify_csrf(token: &str, secret: &[u8]) -> Result<u32, AuthError> {
    let data = decode::<CsrfClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map_err(decode_error)?;
    if data.claims.kind != TokenKind::Csrf {
        return Err(AuthError::TokenInvalid);
    }
    Ok(data.claims.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-access-secret";

    #[test]
    fn access_round_trip() {
        let token = issue_access(42, 7, SECRET).unwrap();
        assert_eq!(verify_access(&token, SECRET).unwrap(), (42, 7));
    }

    #[test]
    fn csrf_round_trip() {
        let token = issue_csrf(42, SECRET).unwrap();
        assert_eq!(verify_csrf(&token, SECRET).unwrap(), 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access(1, 1, SECRET).unwrap();
        assert!(matches!(
            verify_access(&token, b"other-secret"),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue_access(1, 1, SECRET).unwrap();
        // Flip one character of the signed payload segment.
        let mut bytes = token.into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(matches!(
            verify_access(&tampered, SECRET),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: 1,
            user_version: 1,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            verify_access(&token, SECRET),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn csrf_token_does_not_verify_as_access() {
        let token = issue_csrf(1, SECRET).unwrap();
        assert!(matches!(
            verify_access(&token, SECRET),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn access_token_does_not_verify_as_csrf() {
        let token = issue_access(1, 1, SECRET).unwrap();
        assert!(matches!(
            verify_csrf(&token, SECRET),
            Err(AuthError::TokenInvalid)
        ));
    }
}
