use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::session::SESSION_TTL_SECS;

pub(super) const STATE_COOKIE_NAME: &str = "oauth_state";
pub(super) const VERIFIER_COOKIE_NAME: &str = "code_verifier";

/// Transient cookies must outlive a trip to the provider and back, nothing
/// more.
const TRANSIENT_TTL_SECS: i64 = 600;

/// Create state + PKCE verifier cookies for one login attempt.
pub(super) fn transient_cookies(
    state: &str,
    code_verifier: &str,
    secure: bool,
    auth_path: &str,
) -> (Cookie<'static>, Cookie<'static>) {
    let state = Cookie::build((STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(auth_path.to_string())
        .max_age(Duration::seconds(TRANSIENT_TTL_SECS))
        .build();

    let verifier = Cookie::build((VERIFIER_COOKIE_NAME, code_verifier.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(auth_path.to_string())
        .max_age(Duration::seconds(TRANSIENT_TTL_SECS))
        .build();

    (state, verifier)
}

/// Create removal cookies for state + PKCE verifier.
pub(super) fn clear_transient_cookies(auth_path: &str) -> (Cookie<'static>, Cookie<'static>) {
    let state = Cookie::build((STATE_COOKIE_NAME, ""))
        .path(auth_path.to_string())
        .max_age(Duration::ZERO)
        .build();

    let verifier = Cookie::build((VERIFIER_COOKIE_NAME, ""))
        .path(auth_path.to_string())
        .max_age(Duration::ZERO)
        .build();

    (state, verifier)
}

/// Create the session cookie. Max-age matches the token's own expiry.
pub(super) fn session_cookie(name: &str, token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Create removal cookie for the session.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Get the stored CSRF state from cookies.
pub(super) fn get_state(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME).map(|c| c.value().to_string())
}

/// Get the PKCE verifier from cookies.
pub(super) fn get_code_verifier(jar: &CookieJar) -> Option<String> {
    jar.get(VERIFIER_COOKIE_NAME).map(|c| c.value().to_string())
}
