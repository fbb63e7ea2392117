//! Repository for the `comments` table.

use ideaboard_core::identity::Identity;
use ideaboard_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::comment::{Comment, CommentWithReplyCount, RecentComment};

const COLUMNS: &str = "\
    id, idea_id, parent_id, user_id, session_id, body, vote_count, created_at, updated_at";

/// `COLUMNS` qualified with the `c` alias plus the direct reply count.
const THREAD_COLUMNS: &str = "\
    c.id, c.idea_id, c.parent_id, c.user_id, c.session_id, c.body, c.vote_count, \
    c.created_at, c.updated_at, \
    (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        author: &Identity,
        idea_id: DbId,
        parent_id: Option<DbId>,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (idea_id, parent_id, user_id, session_id, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(idea_id)
            .bind(parent_id)
            .bind(author.user_id())
            .bind(author.session_id())
            .bind(body)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch a comment and lock its row until the surrounding transaction ends.
    pub async fn lock_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Top-level comments on an idea, oldest first.
    pub async fn list_top_level(
        pool: &PgPool,
        idea_id: DbId,
    ) -> Result<Vec<CommentWithReplyCount>, sqlx::Error> {
        let query = format!(
            "SELECT {THREAD_COLUMNS} FROM comments c \
             WHERE c.idea_id = $1 AND c.parent_id IS NULL \
             ORDER BY c.created_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, CommentWithReplyCount>(&query)
            .bind(idea_id)
            .fetch_all(pool)
            .await
    }

    /// Direct replies to any of `parent_ids`, oldest first.
    pub async fn list_replies(
        pool: &PgPool,
        parent_ids: &[DbId],
    ) -> Result<Vec<CommentWithReplyCount>, sqlx::Error> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {THREAD_COLUMNS} FROM comments c \
             WHERE c.parent_id = ANY($1) \
             ORDER BY c.created_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, CommentWithReplyCount>(&query)
            .bind(parent_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn add_to_tally<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        delta: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_as::<_, (i32,)>(
            "UPDATE comments SET vote_count = vote_count + $2 WHERE id = $1 RETURNING vote_count",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await
        .map(|row| row.map(|(count,)| count))
    }

    /// Delete a comment and, through the cascade, every reply beneath it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest comments across all ideas, for moderation.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentComment>, sqlx::Error> {
        sqlx::query_as::<_, RecentComment>(
            "SELECT c.id, c.idea_id, c.parent_id, c.body, c.vote_count, \
                    i.body AS idea_body, c.created_at \
             FROM comments c \
             JOIN ideas i ON i.id = c.idea_id \
             ORDER BY c.created_at DESC, c.id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
