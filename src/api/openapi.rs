use crate::api::handlers::{health, init, register, session, user_info};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(init::init))
        .routes(routes!(session::login))
        .routes(routes!(session::logout))
        .routes(routes!(register::register))
        .routes(routes!(user_info::user_info))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let mut session_tag = Tag::new("session");
    session_tag.description = Some("Anti-forgery token issuance and session lifecycle".to_string());

    let mut member_tag = Tag::new("member");
    member_tag.description = Some("Member registration and lookup".to_string());

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![session_tag, member_tag]))
        .build()
}
