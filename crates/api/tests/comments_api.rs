//! HTTP-level tests for comment threads.

mod common;

use axum::http::StatusCode;
use common::{
    delete_with, get, get_with, post_json_with, status_and_json, submit_idea, SESSION_HEADER,
};
use ideaboard_db::repositories::FeatureFlagRepo;
use serde_json::json;
use sqlx::PgPool;

async fn comment(app: axum::Router, idea_id: i64, session: &str, body: &str) -> i64 {
    let response = post_json_with(
        app,
        &format!("/api/v1/ideas/{idea_id}/comments"),
        json!({ "body": body }),
        &[(SESSION_HEADER, session)],
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "comment failed: {json}");
    json["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn thread_nests_replies(pool: PgPool) {
    let app = common::build_test_app(pool);
    let idea = submit_idea(app.clone(), "author", "I use AI to draft cover letters").await;

    let top = comment(app.clone(), idea, "reader-1", "Does it keep your own voice?").await;

    let response = post_json_with(
        app.clone(),
        &format!("/api/v1/comments/{top}/replies"),
        json!({ "body": "Mostly, after a couple of edits." }),
        &[(SESSION_HEADER, "author")],
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["parent_id"], top);
    assert_eq!(json["data"]["idea_id"], idea);

    // parent_id in the body is the other way to reply.
    let response = post_json_with(
        app.clone(),
        &format!("/api/v1/ideas/{idea}/comments"),
        json!({ "body": "Same experience here.", "parent_id": top }),
        &[(SESSION_HEADER, "reader-2")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_with(
        app,
        &format!("/api/v1/ideas/{idea}/comments"),
        &[(SESSION_HEADER, "reader-1")],
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);

    let thread = json["data"].as_array().unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["id"], top);
    assert_eq!(thread[0]["reply_count"], 2);
    assert_eq!(thread[0]["is_own"], true);
    assert_eq!(thread[0]["replies"].as_array().unwrap().len(), 2);
    assert_eq!(thread[0]["replies"][0]["is_own"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comments_ignore_the_paywall(pool: PgPool) {
    FeatureFlagRepo::set_paywall_enabled(&pool, true).await.unwrap();
    let app = common::build_test_app(pool);
    let idea = submit_idea(app.clone(), "author", "I use AI to draft cover letters").await;

    comment(app.clone(), idea, "lurker", "Curious how well this works.").await;

    let response = get(app, &format!("/api/v1/ideas/{idea}/comments")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_validation_and_missing_targets(pool: PgPool) {
    let app = common::build_test_app(pool);
    let idea = submit_idea(app.clone(), "author", "I use AI to draft cover letters").await;

    let response = post_json_with(
        app.clone(),
        &format!("/api/v1/ideas/{idea}/comments"),
        json!({ "body": "   " }),
        &[(SESSION_HEADER, "reader")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_with(
        app.clone(),
        "/api/v1/ideas/999999/comments",
        json!({ "body": "Anyone home?" }),
        &[(SESSION_HEADER, "reader")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_with(
        app.clone(),
        "/api/v1/comments/999999/replies",
        json!({ "body": "Anyone home?" }),
        &[(SESSION_HEADER, "reader")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_with(
        app,
        &format!("/api/v1/ideas/{idea}/comments"),
        json!({ "body": "No identity" }),
        &[],
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "IDENTITY_REQUIRED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_or_admin_deletes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let idea = submit_idea(app.clone(), "author", "I use AI to draft cover letters").await;
    let first = comment(app.clone(), idea, "reader", "First thought").await;
    let second = comment(app.clone(), idea, "reader", "Second thought").await;

    let uri = format!("/api/v1/comments/{first}");

    let response = delete_with(app.clone(), &uri, &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete_with(app.clone(), &uri, &[(SESSION_HEADER, "stranger")]).await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let response = delete_with(app.clone(), &uri, &[(SESSION_HEADER, "reader")]).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_with(app.clone(), &uri, &[(SESSION_HEADER, "reader")]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let admin = common::bearer(1, "admin");
    let response = delete_with(
        app.clone(),
        &format!("/api/v1/comments/{second}"),
        &[("authorization", admin.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, json) =
        status_and_json(get(app, &format!("/api/v1/ideas/{idea}/comments")).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
