use crate::{
    api::handlers::root,
    member::{PgUserStore, RegistrationService, UserStore},
    session::{SessionStore, TokenIssuer},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

const SESSION_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Build the full application router with all service state attached.
///
/// Wiring is explicit: the session store and registration service are passed
/// in, never resolved from ambient state.
#[must_use]
pub fn app(store: Arc<SessionStore>, service: Arc<RegistrationService>) -> Router {
    let issuer = Arc::new(TokenIssuer::new(store.clone()));

    let (router, _openapi) = openapi::api_router().split_for_parts();
    router.route("/", get(root::root)).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(store))
            .layer(Extension(issuer))
            .layer(Extension(service)),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, session_ttl: Duration) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(SessionStore::new(session_ttl));
    let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let service = Arc::new(RegistrationService::new(user_store));

    spawn_session_sweeper(store.clone());

    let app = app(store, service);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Periodically drop expired sessions. Expiry is enforced on read; the sweep
/// only bounds memory held by abandoned sessions.
fn spawn_session_sweeper(store: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECONDS));
        loop {
            interval.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                debug!("swept {} expired sessions", removed);
            }
        }
    });
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
