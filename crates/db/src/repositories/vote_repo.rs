//! Repository for the `votes` table.

use ideaboard_core::identity::Identity;
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::VoteDirection;
use sqlx::{PgExecutor, PgPool};

use crate::models::vote::Vote;

const COLUMNS: &str = "\
    id, idea_id, user_id, session_id, vote_type, ip_address, voted_at, created_at, updated_at";

/// First key of the per-IP advisory lock taken by idea votes.
const IP_LOCK_NAMESPACE: i32 = 1;

pub struct VoteRepo;

impl VoteRepo {
    /// The identity's current vote on an idea, if any.
    pub async fn find_for_identity<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
        idea_id: DbId,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes \
             WHERE idea_id = $1 AND (user_id = $2 OR session_id = $3)"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(idea_id)
            .bind(voter.user_id())
            .bind(voter.session_id())
            .fetch_optional(executor)
            .await
    }

    /// Time of the identity's most recent accepted vote action on any idea.
    pub async fn last_voted_at<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "SELECT MAX(voted_at) FROM vote_events WHERE (user_id = $1 OR session_id = $2)",
        )
        .bind(voter.user_id())
        .bind(voter.session_id())
        .fetch_one(executor)
        .await
    }

    /// Times of every vote action (new votes and flips) from `ip_address`
    /// after `since`.
    pub async fn recent_times_from_ip<'e, E: PgExecutor<'e>>(
        executor: E,
        ip_address: &str,
        since: Timestamp,
    ) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "SELECT voted_at FROM vote_events \
             WHERE ip_address = $1 AND voted_at > $2 \
             ORDER BY voted_at DESC",
        )
        .bind(ip_address)
        .bind(since)
        .fetch_all(executor)
        .await
    }

    /// Serialize idea votes from one IP address until the transaction ends.
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

    /// Append an accepted vote action to the rate-limit log.
    pub async fn record_event<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
        idea_id: DbId,
        direction: VoteDirection,
        ip_address: &str,
        voted_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO vote_events (idea_id, user_id, session_id, vote_type, ip_address, voted_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(idea_id)
        .bind(voter.user_id())
        .bind(voter.session_id())
        .bind(direction.as_str())
        .bind(ip_address)
        .bind(voted_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Number of logged vote actions on an idea.
    pub async fn count_events_for_idea<'e, E: PgExecutor<'e>>(
        executor: E,
        idea_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vote_events WHERE idea_id = $1")
            .bind(idea_id)
            .fetch_one(executor)
            .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        voter: &Identity,
        idea_id: DbId,
        direction: VoteDirection,
        ip_address: &str,
        voted_at: Timestamp,
    ) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "INSERT INTO votes (idea_id, user_id, session_id, vote_type, ip_address, voted_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(idea_id)
            .bind(voter.user_id())
            .bind(voter.session_id())
            .bind(direction.as_str())
            .bind(ip_address)
            .bind(voted_at)
            .fetch_one(executor)
            .await
    }

    /// Rewrite an existing vote in place (direction flip).
    pub async fn update_direction<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        direction: VoteDirection,
        ip_address: &str,
        voted_at: Timestamp,
    ) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "UPDATE votes SET vote_type = $2, ip_address = $3, voted_at = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(id)
            .bind(direction.as_str())
            .bind(ip_address)
            .bind(voted_at)
            .fetch_one(executor)
            .await
    }

    /// All votes on an idea, oldest first.
    pub async fn list_for_idea(pool: &PgPool, idea_id: DbId) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM votes WHERE idea_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Vote>(&query)
            .bind(idea_id)
            .fetch_all(pool)
            .await
    }
}
