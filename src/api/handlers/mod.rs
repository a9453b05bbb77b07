//! Route handlers and shared cookie plumbing.

pub mod health;
pub mod init;
pub mod register;
pub mod root;
pub mod session;
pub mod user_info;

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};

/// Cookie carrying the opaque session id the hosting layer assigns.
pub const SESSION_COOKIE_NAME: &str = "mammba_session";

/// Cookie mirroring the anti-forgery token.
pub const TOKEN_COOKIE_NAME: &str = "code";

/// Pull the session id out of the request cookies, if any.
pub(crate) fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
            continue;
        };
        if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
            return Some(val.trim().to_string());
        }
    }
    None
}

/// `Set-Cookie` value exposing the anti-forgery token.
///
/// Not `HttpOnly`: page scripts read this cookie to echo the token on
/// state-changing requests.
pub(crate) fn token_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE_NAME}={token}; Path=/; SameSite=Lax"
    ))
}

/// `Set-Cookie` value dropping the token cookie on logout.
pub(crate) fn clear_token_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE_NAME}=; Path=/; SameSite=Lax; Max-Age=0"
    ))
}
