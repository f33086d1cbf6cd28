//! CSRF service — tokens bound to the authenticated user id.

use super::{AuthError, tokens};

/// Mint a CSRF token for the current user.
pub fn mint(user_id: u32, csrf_secret: &[u8]) -> Result<String, AuthError> {
    tokens::issue_csrf(user_id, csrf_secret)
}

/// Verify a supplied CSRF token against the expected user.
///
/// A token minted for a different user fails the same way as a
/// malformed one.
pub fn check(token: &str, expected_user_id: u32, csrf_secret: &[u8]) -> Result<(), AuthError> {
    let user_id = tokens::verify_csrf(token, csrf_secret)?;
    if user_id != expected_user_id {
        return Err(AuthError::TokenInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-csrf-secret";

    #[test]
    fn minted_token_checks_for_same_user() {
        let token = mint(5, SECRET).unwrap();
        assert!(check(&token, 5, SECRET).is_ok());
    }

    #[test]
    fn token_for_other_user_is_rejected() {
        let token = mint(5, SECRET).unwrap();
        assert!(matches!(
            check(&token, 6, SECRET),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(check("garbage", 1, SECRET).is_err());
    }
}
