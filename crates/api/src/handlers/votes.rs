//! Handlers for idea and comment votes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use ideaboard_core::types::DbId;
use ideaboard_core::voting::VoteDirection;
use ideaboard_db::engine::comment_engine::{CommentVoteReceipt, CommentVoteRequest};
use ideaboard_db::engine::vote_engine::{VoteReceipt, VoteRequest};
use ideaboard_db::engine::{CommentEngine, VoteEngine};
use ideaboard_db::models::vote::CastVote;

use crate::error::AppResult;
use crate::middleware::identity::{Actor, ClientIp};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/ideas/{id}/vote
///
/// Body: `{ "vote_type": "up" | "down" }`.
pub async fn vote_idea(
    State(state): State<AppState>,
    Actor(voter): Actor,
    ClientIp(ip_address): ClientIp,
    Path(idea_id): Path<DbId>,
    Json(input): Json<CastVote>,
) -> AppResult<Json<DataResponse<VoteReceipt>>> {
    let direction: VoteDirection = input.vote_type.trim().parse()?;

    let request = VoteRequest {
        voter,
        ip_address,
        idea_id,
        direction,
        at: Utc::now(),
    };
    let receipt = VoteEngine::cast(&state.pool, &state.config.vote_policy, &request).await?;
    Ok(Json(DataResponse { data: receipt }))
}

/// POST /api/v1/comments/{id}/vote
///
/// Repeat votes return the current tally unchanged.
pub async fn vote_comment(
    State(state): State<AppState>,
    Actor(voter): Actor,
    ClientIp(ip_address): ClientIp,
    Path(comment_id): Path<DbId>,
    Json(input): Json<CastVote>,
) -> AppResult<Json<DataResponse<CommentVoteReceipt>>> {
    let direction: VoteDirection = input.vote_type.trim().parse()?;

    let request = CommentVoteRequest {
        voter,
        ip_address,
        comment_id,
        direction,
        at: Utc::now(),
    };
    let receipt = CommentEngine::vote(&state.pool, &state.config.vote_policy, &request).await?;
    Ok(Json(DataResponse { data: receipt }))
}
