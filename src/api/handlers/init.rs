use crate::session::TokenIssuer;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    get,
    path = "/init",
    responses(
        (status = 200, description = "Anti-forgery token for the session, also set as the `code` cookie", body = String),
        (status = 404, description = "No session id accompanied the request")
    ),
    tag = "session"
)]
pub async fn init(headers: HeaderMap, issuer: Extension<Arc<TokenIssuer>>) -> impl IntoResponse {
    // Session ids are assigned by the hosting layer; without one there is
    // no token to resolve.
    let Some(session_id) = super::extract_session_id(&headers) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let token = match issuer.issue(&session_id) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    info!("{} initialized", session_id);

    let mut response_headers = HeaderMap::new();
    match super::token_cookie(&token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build token cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    (StatusCode::OK, response_headers, token).into_response()
}
