//! Comment entity models and DTOs.

use ideaboard_core::identity::Identity;
use ideaboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub idea_id: DbId,
    pub parent_id: Option<DbId>,
    pub user_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    pub body: String,
    pub vote_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Comment {
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        identity.owns(self.user_id, self.session_id.as_deref())
    }
}

/// A comment together with its number of direct replies.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithReplyCount {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub reply_count: i64,
}

/// One node of a rendered thread. Only top-level nodes carry `replies`.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub id: DbId,
    pub idea_id: DbId,
    pub parent_id: Option<DbId>,
    pub body: String,
    pub vote_count: i32,
    pub reply_count: i64,
    pub is_own: bool,
    pub created_at: Timestamp,
    pub replies: Vec<CommentThread>,
}

impl CommentThread {
    pub fn from_row(row: &CommentWithReplyCount, viewer: Option<&Identity>) -> Self {
        let c = &row.comment;
        CommentThread {
            id: c.id,
            idea_id: c.idea_id,
            parent_id: c.parent_id,
            body: c.body.clone(),
            vote_count: c.vote_count,
            reply_count: row.reply_count,
            is_own: viewer.is_some_and(|v| c.is_owned_by(v)),
            created_at: c.created_at,
            replies: Vec::new(),
        }
    }
}

/// DTO for posting a comment or a reply.
///
/// `parent_id` is only read on `POST /ideas/{id}/comments`; the replies
/// route takes the parent from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub body: String,
    #[serde(default)]
    pub parent_id: Option<DbId>,
}

/// Admin moderation listing row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentComment {
    pub id: DbId,
    pub idea_id: DbId,
    pub parent_id: Option<DbId>,
    pub body: String,
    pub vote_count: i32,
    pub idea_body: String,
    pub created_at: Timestamp,
}
