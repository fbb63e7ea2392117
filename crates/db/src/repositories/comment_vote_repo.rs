//! Repository for the `comment_votes` table.

use ideaboard_core::identity::Identity;
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::VoteDirection;
use sqlx::PgExecutor;

use crate::models::comment_vote::CommentVote;

const COLUMNS: &str = "\
    id, comment_id, user_id, session_id, vote_type, ip_address, voted_at, created_at, updated_at";

/// First key of the per-IP advisory lock taken by comment votes.
const IP_LOCK_NAMESPACE: i32 = 2;

pub struct CommentVoteRepo;

impl CommentVoteRepo {
    pub async fn find_for_identity<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
        comment_id: DbId,
    ) -> Result<Option<CommentVote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comment_votes \
             WHERE comment_id = $1 AND (user_id = $2 OR session_id = $3)"
        );
        sqlx::query_as::<_, CommentVote>(&query)
            .bind(comment_id)
            .bind(voter.user_id())
            .bind(voter.session_id())
            .fetch_optional(executor)
            .await
    }

    /// Time of the identity's most recent comment vote.
    pub async fn last_voted_at_by_identity<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "SELECT MAX(voted_at) FROM comment_votes WHERE (user_id = $1 OR session_id = $2)",
        )
        .bind(voter.user_id())
        .bind(voter.session_id())
        .fetch_one(executor)
        .await
    }

    /// Serialize comment votes from one IP address until the transaction ends.
    pub async fn lock_ip<'e, E: PgExecutor<'e>>(
        executor: E,
        ip_address: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(IP_LOCK_NAMESPACE)
            .bind(ip_address)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Time of the most recent comment vote from an IP address.
    pub async fn last_voted_at_by_ip<'e, E: PgExecutor<'e>>(
        executor: E,
        ip_address: &str,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "SELECT MAX(voted_at) FROM comment_votes WHERE ip_address = $1",
        )
        .bind(ip_address)
        .fetch_one(executor)
        .await
    }

    /// Insert a vote. Returns `None` when the identity already voted on the comment.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
        comment_id: DbId,
        direction: VoteDirection,
        ip_address: &str,
        voted_at: Timestamp,
    ) -> Result<Option<CommentVote>, sqlx::Error> {
        let query = format!(
            "INSERT INTO comment_votes (comment_id, user_id, session_id, vote_type, ip_address, voted_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentVote>(&query)
            .bind(comment_id)
            .bind(voter.user_id())
            .bind(voter.session_id())
            .bind(direction.as_str())
            .bind(ip_address)
            .bind(voted_at)
            .fetch_optional(executor)
            .await
    }
}
