//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly and need no database.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use ideaboard_api::error::AppError;
use ideaboard_core::error::CoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "idea",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "idea with id 42 not found");
}

#[tokio::test]
async fn identity_required_returns_401() {
    let (status, json) = error_to_response(CoreError::IdentityRequired.into()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "IDENTITY_REQUIRED");
}

#[tokio::test]
async fn submission_required_returns_403() {
    let (status, json) = error_to_response(CoreError::SubmissionRequired.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "SUBMISSION_REQUIRED");
    assert!(json.get("soft").is_none());
}

#[tokio::test]
async fn downvote_locked_is_soft_403_with_threshold() {
    let err = CoreError::DownvoteLocked {
        tally: 12,
        threshold: 100,
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "DOWNVOTE_LOCKED");
    assert_eq!(json["soft"], true);
    assert_eq!(json["threshold"], 100);
    assert_eq!(json["vote_count"], 12);
}

#[tokio::test]
async fn self_vote_returns_400() {
    let (status, json) = error_to_response(CoreError::SelfVote.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "SELF_VOTE");
}

#[tokio::test]
async fn rate_limited_returns_429_with_remaining_seconds() {
    let response = AppError::from(CoreError::RateLimited { remaining_ms: 2_500 }).into_response();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "3");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["soft"], true);
    assert_eq!(json["remaining_time"], 3);
}

#[tokio::test]
async fn invalid_direction_returns_400() {
    let err = CoreError::InvalidDirection("sideways".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_DIRECTION");
}

#[tokio::test]
async fn content_rejected_carries_reason() {
    let err = CoreError::ContentRejected("Too many links (maximum 2)".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONTENT_REJECTED");
    assert_eq!(json["reason"], "Too many links (maximum 2)");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::InternalError("connection string with password".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
