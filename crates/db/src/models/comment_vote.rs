//! Comment vote models.

use ideaboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comment_votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentVote {
    pub id: DbId,
    pub comment_id: DbId,
    pub user_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    pub vote_type: String,
    pub ip_address: String,
    pub voted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
