//! Idea vote models.

use ideaboard_core::error::CoreError;
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::VoteDirection;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub idea_id: DbId,
    pub user_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    pub vote_type: String,
    pub ip_address: String,
    pub voted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vote {
    pub fn direction(&self) -> Result<VoteDirection, CoreError> {
        self.vote_type.parse()
    }
}

/// DTO for `POST /api/v1/ideas/{id}/vote` and `POST /api/v1/comments/{id}/vote`.
///
/// The direction stays a string here so a bad value maps to
/// `InvalidDirection` instead of a generic JSON rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CastVote {
    pub vote_type: String,
}
