//! HTTP-level tests for the admin surface.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{
    body_bytes, delete_with, get, get_with, post_json_with, put_json_with, status_and_json,
    submit_idea, FORWARDED_FOR, SESSION_HEADER,
};
use ideaboard_core::identity::TrustedNetworks;
use serde_json::json;
use sqlx::PgPool;

fn admin() -> String {
    common::bearer(1, "admin")
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, json) = status_and_json(get(app, "/api/v1/admin/ideas").await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_requires_admin_role(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = common::bearer(2, "user");

    let response = get_with(app, "/api/v1/admin/ideas", &[("authorization", user.as_str())]).await;
    let (status, json) = status_and_json(response).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_requires_trusted_network(pool: PgPool) {
    let mut config = common::test_config();
    config.trusted_networks = TrustedNetworks::parse("10.0.0.0/8").unwrap();
    let app = common::build_test_app_with(pool, config);
    let admin = admin();

    let response = get_with(
        app.clone(),
        "/api/v1/admin/ideas",
        &[("authorization", admin.as_str()), (FORWARDED_FOR, "8.8.8.8")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_with(
        app,
        "/api/v1/admin/ideas",
        &[("authorization", admin.as_str()), (FORWARDED_FOR, "10.20.30.40")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Ideas
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_edits_and_deletes_ideas(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    let auth = [("authorization", admin.as_str())];
    let id = submit_idea(app.clone(), "author", "I use AI to write release notes").await;

    let response = put_json_with(
        app.clone(),
        &format!("/api/v1/admin/ideas/{id}"),
        json!({ "category": " Writing ", "link_url": "https://example.com/notes" }),
        &auth,
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["category"], "writing");
    assert_eq!(json["data"]["body"], "I use AI to write release notes");
    // Admin views are not subject to link hiding.
    assert_eq!(json["data"]["link_url"], "https://example.com/notes");

    let response = put_json_with(
        app.clone(),
        &format!("/api/v1/admin/ideas/{id}"),
        json!({ "body": "nope" }),
        &auth,
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONTENT_REJECTED");

    let uri = format!("/api/v1/admin/ideas/{id}");
    let response = delete_with(app.clone(), &uri, &auth).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_with(app.clone(), &uri, &auth).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/ideas/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_overrides_tally(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    let auth = [("authorization", admin.as_str())];
    let id = submit_idea(app.clone(), "author", "I use AI to write release notes").await;
    let uri = format!("/api/v1/admin/ideas/{id}/tally");

    let response = put_json_with(app.clone(), &uri, json!({ "vote_count": -1 }), &auth).await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = put_json_with(app.clone(), &uri, json!({ "vote_count": 120 }), &auth).await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["vote_count"], 120);

    let response = put_json_with(
        app,
        "/api/v1/admin/ideas/999999/tally",
        json!({ "vote_count": 3 }),
        &auth,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_exports_csv(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    submit_idea(app.clone(), "author", "I use AI to write SQL, then review it").await;

    let response = get_with(
        app,
        "/api/v1/admin/export/ideas",
        &[("authorization", admin.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("ideas.csv"));

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,body,category,tool,link_url,vote_count,ai_score,is_test,created_at")
    );
    let row = lines.next().unwrap();
    assert!(row.contains("\"I use AI to write SQL, then review it\""), "{row}");
    assert!(lines.next().is_none());
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_toggles_paywall(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    let auth = [("authorization", admin.as_str())];

    let response = put_json_with(
        app.clone(),
        "/api/v1/admin/paywall",
        json!({ "enabled": true }),
        &auth,
    )
    .await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "paywall_enabled");
    assert_eq!(json["data"]["enabled"], true);

    let response = get(app.clone(), "/api/v1/ideas").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, json) =
        status_and_json(get_with(app.clone(), "/api/v1/admin/flags", &auth).await).await;
    let flags = json["data"].as_array().unwrap();
    assert!(flags
        .iter()
        .any(|f| f["name"] == "paywall_enabled" && f["enabled"] == true));

    put_json_with(
        app.clone(),
        "/api/v1/admin/paywall",
        json!({ "enabled": false }),
        &auth,
    )
    .await;
    let response = get(app, "/api/v1/ideas").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Comments and reporting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_moderates_comments(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    let auth = [("authorization", admin.as_str())];
    let idea = submit_idea(app.clone(), "author", "I use AI to write release notes").await;

    let response = post_json_with(
        app.clone(),
        &format!("/api/v1/ideas/{idea}/comments"),
        json!({ "body": "Which tool do you use?" }),
        &[(SESSION_HEADER, "reader")],
    )
    .await;
    let (_, json) = status_and_json(response).await;
    let comment_id = json["data"]["id"].as_i64().unwrap();

    let response = get_with(app.clone(), "/api/v1/admin/comments?limit=10", &auth).await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], comment_id);
    assert_eq!(json["data"][0]["idea_body"], "I use AI to write release notes");

    let response = delete_with(
        app.clone(),
        &format!("/api/v1/admin/comments/{comment_id}"),
        &auth,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, json) = status_and_json(get_with(app, "/api/v1/admin/comments", &auth).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_analytics_counts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = admin();
    let auth = [("authorization", admin.as_str())];

    submit_idea(app.clone(), "a", "I use AI to write release notes").await;
    let id = submit_idea(app.clone(), "b", "I use AI to review pull requests").await;
    put_json_with(
        app.clone(),
        &format!("/api/v1/admin/ideas/{id}"),
        json!({ "category": "coding" }),
        &auth,
    )
    .await;
    let response = post_json_with(
        app.clone(),
        &format!("/api/v1/ideas/{id}/vote"),
        json!({ "vote_type": "up" }),
        &[(SESSION_HEADER, "a"), (FORWARDED_FOR, "203.0.113.9")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with(app, "/api/v1/admin/analytics", &auth).await;
    let (status, json) = status_and_json(response).await;
    assert_eq!(status, StatusCode::OK);

    let summary = &json["data"]["summary"];
    assert_eq!(summary["total_ideas"], 2);
    assert_eq!(summary["total_votes"], 1);
    assert_eq!(summary["upvotes"], 1);
    assert_eq!(summary["downvotes"], 0);
    assert_eq!(summary["ideas_last_24h"], 2);

    let by_category = json["data"]["by_category"].as_array().unwrap();
    assert_eq!(by_category.len(), 2);
    assert!(by_category
        .iter()
        .any(|c| c["category"] == "coding" && c["idea_count"] == 1));
}
