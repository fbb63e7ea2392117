use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Identity required: send a session token or a bearer token")]
    IdentityRequired,

    #[error("Share an idea of your own to unlock the feed")]
    SubmissionRequired,

    #[error("Downvoting unlocks once an idea has {threshold} votes (this one has {tally})")]
    DownvoteLocked { tally: i32, threshold: i32 },

    #[error("You cannot vote on your own content")]
    SelfVote,

    /// `remaining_ms` is how long the caller must wait before retrying.
    #[error("Slow down, please take a moment to read before voting again ({remaining_ms} ms)")]
    RateLimited { remaining_ms: i64 },

    #[error("Invalid vote direction '{0}'. Must be one of: up, down")]
    InvalidDirection(String),

    #[error("Content rejected: {0}")]
    ContentRejected(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Remaining wait for [`CoreError::RateLimited`], rounded up to whole seconds.
    pub fn remaining_secs(&self) -> Option<i64> {
        match self {
            CoreError::RateLimited { remaining_ms } => Some((remaining_ms + 999) / 1000),
            _ => None,
        }
    }

    /// Whether the client should render this as gentle guidance rather than a failure.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            CoreError::RateLimited { .. } | CoreError::DownvoteLocked { .. }
        )
    }
}
