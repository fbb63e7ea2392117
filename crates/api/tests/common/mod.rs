#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ideaboard_api::auth::jwt::{generate_access_token, JwtConfig};
use ideaboard_api::config::{IntegrationConfig, ServerConfig};
use ideaboard_api::router::build_app_router;
use ideaboard_api::state::AppState;
use ideaboard_core::identity::TrustedNetworks;
use ideaboard_core::voting::VotePolicy;
use ideaboard_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

pub const SESSION_HEADER: &str = "x-session-id";
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build a test `ServerConfig` with safe defaults and an open admin network
/// policy.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        trusted_networks: TrustedNetworks::default(),
        vote_policy: VotePolicy::default(),
        integrations: IntegrationConfig::default(),
    }
}

/// Build the full application router, mirroring `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// `Authorization` header value for an account token signed with the test secret.
pub fn bearer(user_id: i64, role: &str) -> String {
    let token = generate_access_token(user_id, role, &test_config().jwt).unwrap();
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, &[]).await
}

pub async fn get_with(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    send(app, Method::GET, uri, None, headers).await
}

pub async fn post_json_with(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), headers).await
}

pub async fn put_json_with(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), headers).await
}

pub async fn delete_with(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    send(app, Method::DELETE, uri, None, headers).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Status plus parsed JSON body.
pub async fn status_and_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Submit an idea as a session and return its id.
pub async fn submit_idea(app: Router, session: &str, body: &str) -> i64 {
    let response = post_json_with(
        app,
        "/api/v1/ideas",
        serde_json::json!({ "body": body }),
        &[(SESSION_HEADER, session)],
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {json}");
    json["data"]["id"].as_i64().unwrap()
}
