use crate::member::{Member, RegisterError, RegistrationService};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[utoipa::path(
    post,
    path = "/register",
    request_body = Member,
    responses(
        (status = 200, description = "Member registered", body = String),
        (status = 400, description = "Invalid payload or username already registered", body = String),
        (status = 500, description = "User store unavailable", body = String)
    ),
    tag = "member"
)]
#[instrument(skip(service, payload))]
pub async fn register(
    service: Extension<Arc<RegistrationService>>,
    payload: Option<Json<Member>>,
) -> impl IntoResponse {
    let Some(Json(member)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string());
    };

    debug!("registering member: {}", member.username);

    match service.register(member).await {
        Ok(()) => (StatusCode::OK, "SUCCESS".to_string()),
        Err(err @ (RegisterError::Validation(_) | RegisterError::DuplicateUser)) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err @ RegisterError::StoreUnavailable) => {
            error!("Registration failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
