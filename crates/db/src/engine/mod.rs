//! Transactional workflows composed from the repositories.
//!
//! Each engine opens its own transaction, applies the domain checks from
//! `ideaboard_core` against locked rows, and commits. Failures surface as
//! [`EngineError`]: either a domain rejection or a database error.

pub mod comment_engine;
pub mod feed;
pub mod submission;
pub mod vote_engine;

use ideaboard_core::error::CoreError;

pub use comment_engine::CommentEngine;
pub use feed::Feed;
pub use submission::IdeaSubmission;
pub use vote_engine::VoteEngine;

/// Attempts for a write transaction that loses a deadlock or serialization race.
pub const MAX_ATTEMPTS: u32 = 3;

/// Postgres `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// Postgres `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Whether the failed transaction can simply be run again.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Database(sqlx::Error::Database(db_err)) => matches!(
                db_err.code().as_deref(),
                Some(DEADLOCK_DETECTED) | Some(SERIALIZATION_FAILURE)
            ),
            _ => false,
        }
    }

    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            EngineError::Core(err) => Some(err),
            EngineError::Database(_) => None,
        }
    }
}
