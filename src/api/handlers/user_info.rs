use crate::member::{RegistrationService, UserSummary};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct UserInfoParams {
    username: String,
}

#[utoipa::path(
    post,
    path = "/mammba-user",
    params(UserInfoParams),
    responses(
        (status = 200, description = "Member summary", body = UserSummary),
        (status = 404, description = "No member with this username")
    ),
    tag = "member"
)]
#[instrument(skip(service))]
pub async fn user_info(
    service: Extension<Arc<RegistrationService>>,
    params: Query<UserInfoParams>,
) -> impl IntoResponse {
    match service.user_info(&params.username).await {
        Ok(Some(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("User info lookup failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
