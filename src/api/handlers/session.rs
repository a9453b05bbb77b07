//! Login and logout against the session cookie.

use crate::session::SessionStore;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/login",
    responses(
        (status = 204, description = "Session marked authenticated"),
        (status = 404, description = "Unknown or expired session id")
    ),
    tag = "session"
)]
pub async fn login(headers: HeaderMap, store: Extension<Arc<SessionStore>>) -> impl IntoResponse {
    let Some(session_id) = super::extract_session_id(&headers) else {
        return StatusCode::NOT_FOUND;
    };

    match store.mark_authenticated(&session_id) {
        Ok(()) => {
            info!("{} has logged in", session_id);
            StatusCode::NO_CONTENT
        }
        Err(err) => {
            info!("{} login rejected: {err}", session_id);
            StatusCode::NOT_FOUND
        }
    }
}

#[utoipa::path(
    post,
    path = "/mammba-user/logout",
    responses(
        (status = 204, description = "Session invalidated and token cookie cleared")
    ),
    tag = "session"
)]
pub async fn logout(headers: HeaderMap, store: Extension<Arc<SessionStore>>) -> impl IntoResponse {
    // Invalidation is idempotent; a missing session still gets 204.
    if let Some(session_id) = super::extract_session_id(&headers) {
        store.invalidate(&session_id);
        info!("{} has logged out", session_id);
    }

    // Always clear the token cookie, even when no session was presented.
    let mut response_headers = HeaderMap::new();
    match super::clear_token_cookie() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }

    (StatusCode::NO_CONTENT, response_headers)
}
