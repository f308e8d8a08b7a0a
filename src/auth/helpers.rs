//! Cookie helpers for the `authGuardian` session
//!
//! Pure functions: header parsing and `Set-Cookie` value builders.

use axum::http::HeaderMap;

use super::AUTH_GUARDIAN_COOKIE;

/// Expiry used to clear a cookie
pub const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Value of cookie `name`, searching every `Cookie` header
///
/// Some proxies split cookies over several headers; the first match wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value storing the session token
pub fn session_cookie(token: &str, secure_flag: &str) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax{}",
        AUTH_GUARDIAN_COOKIE, token, secure_flag
    )
}

/// `Set-Cookie` value clearing the session token
pub fn clear_session_cookie(secure_flag: &str) -> String {
    format!(
        "{}=; HttpOnly; Path=/; Expires={}; SameSite=Lax{}",
        AUTH_GUARDIAN_COOKIE, EXPIRED, secure_flag
    )
}
