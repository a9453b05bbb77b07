//! HTTP surface tests over the full router, backed by the in-memory user
//! store so no external services are required.

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
    Router,
};
use mammba::{
    api,
    member::{MemoryUserStore, RegistrationService},
    session::SessionStore,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

fn test_app() -> Router {
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let service = Arc::new(RegistrationService::new(Arc::new(MemoryUserStore::new())));
    api::app(store, service)
}

fn init_request(session_id: &str) -> Request<Body> {
    Request::builder()
        .uri("/init")
        .header(COOKIE, format!("mammba_session={session_id}"))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, session_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(COOKIE, format!("mammba_session={session_id}"))
        .body(Body::empty())
        .unwrap()
}

fn register_request(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/register")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn init_without_session_cookie_is_not_found() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/init").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn init_issues_token_and_code_cookie() {
    let app = test_app();

    let response = app.clone().oneshot(init_request("s1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    let token = body_string(response).await;

    assert!(!token.is_empty());
    assert!(cookie.starts_with(&format!("code={token}")));

    // Same session, same token.
    let repeat = app.oneshot(init_request("s1")).await.unwrap();
    assert_eq!(body_string(repeat).await, token);
}

#[tokio::test]
async fn init_tokens_differ_across_sessions() {
    let app = test_app();
    let first = body_string(app.clone().oneshot(init_request("s1")).await.unwrap()).await;
    let second = body_string(app.oneshot(init_request("s2")).await.unwrap()).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn login_requires_an_initialized_session() {
    let app = test_app();

    let response = app.clone().oneshot(post("/login", "ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.clone().oneshot(init_request("s1")).await.unwrap();
    let response = app.oneshot(post("/login", "s1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn logout_discards_the_session_entirely() {
    let app = test_app();

    let before = body_string(app.clone().oneshot(init_request("s1")).await.unwrap()).await;

    let login = app.clone().oneshot(post("/login", "s1")).await.unwrap();
    assert_eq!(login.status(), StatusCode::NO_CONTENT);

    let logout = app
        .clone()
        .oneshot(post("/mammba-user/logout", "s1"))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = logout
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The old session is gone: login fails and a new init rotates the token.
    let relogin = app.clone().oneshot(post("/login", "s1")).await.unwrap();
    assert_eq!(relogin.status(), StatusCode::NOT_FOUND);

    let after = body_string(app.oneshot(init_request("s1")).await.unwrap()).await;
    assert_ne!(before, after);
}

#[tokio::test]
async fn logout_without_a_session_is_a_noop() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mammba-user/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn register_then_duplicate() {
    let app = test_app();
    let payload = json!({ "username": "maria", "city": "Manila" });

    let response = app
        .clone()
        .oneshot(register_request(&payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "SUCCESS");

    let duplicate = app.oneshot(register_request(&payload)).await.unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(duplicate).await, "username already registered");
}

#[tokio::test]
async fn register_rejects_empty_username() {
    let app = test_app();
    let response = app
        .oneshot(register_request(&json!({ "username": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "username must not be empty");
}

#[tokio::test]
async fn register_rejects_missing_payload() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Missing payload");
}

#[tokio::test]
async fn user_info_round_trip() {
    let app = test_app();
    let payload = json!({ "username": "maria", "city": "Manila" });
    app.clone().oneshot(register_request(&payload)).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mammba-user?username=maria")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(summary["username"], "maria");
    assert_eq!(summary["city"], "Manila");

    let missing = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mammba-user?username=nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));

    let health: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["store"], "ok");
    assert_eq!(health["name"], env!("CARGO_PKG_NAME"));
}

#[tokio::test]
async fn root_reports_identity() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.starts_with(env!("CARGO_PKG_NAME")));
}
