//! Handlers for the `/admin` surface: moderation, corrections, flags,
//! export, and analytics.
//!
//! All handlers require [`RequireAdmin`]. Writes here bypass the vote engine.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ideaboard_core::error::CoreError;
use ideaboard_core::export::build_csv;
use ideaboard_core::ideas::{clamp_limit, normalize_tag, validate_link};
use ideaboard_core::moderation::check_idea;
use ideaboard_core::types::DbId;
use ideaboard_db::engine::CommentEngine;
use ideaboard_db::models::analytics::{AnalyticsSummary, CategoryCount};
use ideaboard_db::models::comment::RecentComment;
use ideaboard_db::models::feature_flag::{FeatureFlag, SetPaywall};
use ideaboard_db::models::idea::{Idea, UpdateIdea};
use ideaboard_db::models::subscription::Subscription;
use ideaboard_db::repositories::{
    AnalyticsRepo, CommentRepo, FeatureFlagRepo, IdeaRepo, SubscriptionRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Column order of the idea export.
const EXPORT_HEADER: &[&str] = &[
    "id",
    "body",
    "category",
    "tool",
    "link_url",
    "vote_count",
    "ai_score",
    "is_test",
    "created_at",
];

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/ideas/{id}/tally`.
#[derive(Debug, Deserialize)]
pub struct SetTallyRequest {
    pub vote_count: i32,
}

/// Query parameters for `GET /admin/comments`.
#[derive(Debug, Deserialize)]
pub struct RecentCommentsParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub by_category: Vec<CategoryCount>,
}

// ---------------------------------------------------------------------------
// Ideas
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/ideas
///
/// Every idea, including test submissions and hidden links.
pub async fn list_ideas(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Idea>>>> {
    let ideas = IdeaRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: ideas }))
}

/// PUT /api/v1/admin/ideas/{id}
///
/// Edit an idea. Supplied fields go through the same filters as a submission.
pub async fn update_idea(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIdea>,
) -> AppResult<Json<DataResponse<Idea>>> {
    let update = UpdateIdea {
        body: input.body.as_deref().map(check_idea).transpose()?,
        category: normalize_tag(input.category.as_deref(), "Category")?,
        tool: normalize_tag(input.tool.as_deref(), "Tool")?,
        link_url: validate_link(input.link_url.as_deref())?,
    };

    let idea = IdeaRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound { entity: "idea", id })?;

    tracing::info!(idea_id = id, admin_id = admin.user_id, "Idea edited by admin");
    Ok(Json(DataResponse { data: idea }))
}

/// DELETE /api/v1/admin/ideas/{id}
pub async fn delete_idea(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !IdeaRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "idea", id }.into());
    }
    tracing::info!(idea_id = id, admin_id = admin.user_id, "Idea deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/ideas/{id}/tally
///
/// Overwrite an idea's tally. Negative values are rejected.
pub async fn set_tally(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetTallyRequest>,
) -> AppResult<Json<DataResponse<Idea>>> {
    if input.vote_count < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "vote_count must not be negative".to_string(),
        )));
    }

    let idea = IdeaRepo::set_tally(&state.pool, id, input.vote_count)
        .await?
        .ok_or(CoreError::NotFound { entity: "idea", id })?;

    tracing::info!(
        idea_id = id,
        vote_count = input.vote_count,
        admin_id = admin.user_id,
        "Tally overridden by admin",
    );
    Ok(Json(DataResponse { data: idea }))
}

/// GET /api/v1/admin/export/ideas
///
/// All ideas as a CSV attachment.
pub async fn export_ideas_csv(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let ideas = IdeaRepo::list_all(&state.pool).await?;
    let rows: Vec<Vec<String>> = ideas
        .iter()
        .map(|idea| {
            vec![
                idea.id.to_string(),
                idea.body.clone(),
                idea.category.clone().unwrap_or_default(),
                idea.tool.clone().unwrap_or_default(),
                idea.link_url.clone().unwrap_or_default(),
                idea.vote_count.to_string(),
                idea.ai_score.map(|s| s.to_string()).unwrap_or_default(),
                idea.is_test.to_string(),
                idea.created_at.to_rfc3339(),
            ]
        })
        .collect();

    let csv = build_csv(EXPORT_HEADER, &rows);

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"ideas.csv\""),
        ],
        csv,
    ))
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/flags
pub async fn list_flags(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<FeatureFlag>>>> {
    let flags = FeatureFlagRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: flags }))
}

/// PUT /api/v1/admin/paywall
pub async fn set_paywall(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<SetPaywall>,
) -> AppResult<Json<DataResponse<FeatureFlag>>> {
    let flag = FeatureFlagRepo::set_paywall_enabled(&state.pool, input.enabled).await?;
    tracing::info!(enabled = input.enabled, admin_id = admin.user_id, "Paywall toggled");
    Ok(Json(DataResponse { data: flag }))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/comments?limit=
pub async fn list_recent_comments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<RecentCommentsParams>,
) -> AppResult<Json<DataResponse<Vec<RecentComment>>>> {
    let comments = CommentRepo::list_recent(&state.pool, clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// DELETE /api/v1/admin/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CommentEngine::delete(&state.pool, None, true, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AnalyticsResponse>>> {
    let summary = AnalyticsRepo::summary(&state.pool).await?;
    let by_category = AnalyticsRepo::by_category(&state.pool).await?;
    Ok(Json(DataResponse {
        data: AnalyticsResponse {
            summary,
            by_category,
        },
    }))
}

/// GET /api/v1/admin/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Subscription>>>> {
    let subscriptions = SubscriptionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: subscriptions }))
}
