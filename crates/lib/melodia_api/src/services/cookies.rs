//! Cookie service — set and clear the httpOnly access-token cookie.
//!
//! The cookie is scoped to `/api` with `SameSite=Strict`; clearing
//! uses an empty value with the same attributes so browsers drop it.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use melodia_core::auth::tokens::ACCESS_TOKEN_TTL_DAYS;

/// Cookie name carrying the access token.
pub const ACCESS_COOKIE: &str = "X-ACCESS-Token";

/// Header carrying the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

fn base_cookie(value: String) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE.to_string(), value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/api".to_string())
        .build()
}

/// Build the access-token cookie (30 days, matching the token expiry).
pub fn access_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = base_cookie(token.to_string());
    cookie.set_max_age(Duration::days(ACCESS_TOKEN_TTL_DAYS));
    cookie
}

/// Build an expired empty cookie to clear auth state.
pub fn clear_access_cookie() -> Cookie<'static> {
    let mut cookie = base_cookie(String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_attributes() {
        let cookie = access_cookie("tok");
        assert_eq!(cookie.name(), ACCESS_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/api"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn clear_cookie_is_empty_with_same_attributes() {
        let cookie = clear_access_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/api"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
