//! Handlers for comment threads.
//!
//! Threads are readable and writable without the submission gate.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ideaboard_core::types::DbId;
use ideaboard_db::engine::CommentEngine;
use ideaboard_db::models::comment::{Comment, CommentThread, CreateComment};

use crate::error::AppResult;
use crate::middleware::identity::{Actor, Caller, ClientIp, MaybeActor};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/ideas/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(idea_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CommentThread>>>> {
    let thread = CommentEngine::thread(&state.pool, idea_id, viewer.as_ref()).await?;
    Ok(Json(DataResponse { data: thread }))
}

/// POST /api/v1/ideas/{id}/comments
///
/// Top-level comment, or a reply when `parent_id` is given.
pub async fn create_comment(
    State(state): State<AppState>,
    Actor(author): Actor,
    Path(idea_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let comment =
        CommentEngine::post(&state.pool, &author, idea_id, input.parent_id, &input.body).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// POST /api/v1/comments/{id}/replies
pub async fn create_reply(
    State(state): State<AppState>,
    Actor(author): Actor,
    Path(parent_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let reply = CommentEngine::reply(&state.pool, &author, parent_id, &input.body).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reply })))
}

/// DELETE /api/v1/comments/{id}
///
/// Allowed for the author, and for admins calling from a trusted network.
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: Caller,
    ClientIp(ip): ClientIp,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let is_admin = caller.is_admin() && state.config.trusted_networks.allows(&ip);
    CommentEngine::delete(&state.pool, caller.identity.as_ref(), is_admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
