//! Participant rows: anonymous sessions and authenticated accounts share the
//! same gate and reward columns.

use ideaboard_core::gate::ParticipantState;
use ideaboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub session_id: String,
    pub has_submitted: bool,
    pub shared_link_bypass: bool,
    pub upvotes_given: i32,
    pub last_activity_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Gate and reward columns of either participant table.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ParticipantRow {
    pub has_submitted: bool,
    pub shared_link_bypass: bool,
    pub upvotes_given: i32,
}

impl From<ParticipantRow> for ParticipantState {
    fn from(row: ParticipantRow) -> Self {
        ParticipantState {
            has_submitted: row.has_submitted,
            shared_link_bypass: row.shared_link_bypass,
            upvotes_given: row.upvotes_given,
        }
    }
}

/// Response body for `GET /api/v1/session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: Option<String>,
    pub user_id: Option<DbId>,
    pub has_submitted: bool,
    pub can_view_feed: bool,
    pub upvotes_given: i32,
}
