//! Session cookie helpers.
//!
//! The token pair lives in two HttpOnly cookies. The access cookie's
//! max-age tracks the provider-advertised token lifetime; the refresh
//! cookie outlives it so the resolver can rotate an expired session
//! without a new login.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use studysync_identity::SessionTokens;
use time::Duration;

/// Access token cookie name.
pub const ACCESS_COOKIE: &str = "ss-access-token";

/// Refresh token cookie name.
pub const REFRESH_COOKIE: &str = "ss-refresh-token";

/// Access cookie lifetime when the provider does not advertise one.
const FALLBACK_ACCESS_SECONDS: i64 = 3600;

/// Refresh cookie lifetime.
const REFRESH_DAYS: i64 = 30;

/// Reads the token pair from request cookies, if an access token is set.
#[must_use]
pub fn session_tokens(jar: &CookieJar) -> Option<SessionTokens> {
    let access = jar.get(ACCESS_COOKIE)?.value().to_string();
    if access.is_empty() {
        return None;
    }
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    Some(SessionTokens::new(access, refresh))
}

/// Writes the token pair onto the jar, replacing any previous session.
#[must_use]
pub fn apply_session(jar: CookieJar, tokens: &SessionTokens, secure: bool) -> CookieJar {
    let access_max_age = Duration::seconds(tokens.expires_in.unwrap_or(FALLBACK_ACCESS_SECONDS));

    let access = Cookie::build((ACCESS_COOKIE, tokens.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(access_max_age);

    let mut jar = jar.add(access);

    if let Some(refresh_token) = &tokens.refresh_token {
        let refresh = Cookie::build((REFRESH_COOKIE, refresh_token.clone()))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(REFRESH_DAYS));
        jar = jar.add(refresh);
    }

    jar
}

/// Expires both session cookies.
#[must_use]
pub fn clear_session(jar: CookieJar) -> CookieJar {
    let remove_access = Cookie::build((ACCESS_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO);
    let remove_refresh = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO);
    jar.add(remove_access).add(remove_refresh)
}
