//! Repository for the `ideas` table.

use ideaboard_core::identity::Identity;
use ideaboard_core::ideas::SortOrder;
use ideaboard_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::idea::{Idea, NewIdea, UpdateIdea};

/// Column list for `ideas` queries.
const COLUMNS: &str = "\
    id, user_id, session_id, body, category, tool, link_url, \
    vote_count, ai_score, is_test, created_at, updated_at";

pub struct IdeaRepo;

impl IdeaRepo {
    /// Insert a new idea owned by `owner` with a zero tally.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        owner: &Identity,
        input: &NewIdea,
    ) -> Result<Idea, sqlx::Error> {
        let query = format!(
            "INSERT INTO ideas (user_id, session_id, body, category, tool, link_url, is_test) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(owner.user_id())
            .bind(owner.session_id())
            .bind(&input.body)
            .bind(&input.category)
            .bind(&input.tool)
            .bind(&input.link_url)
            .bind(input.is_test)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas WHERE id = $1");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch an idea and lock its row until the surrounding transaction ends.
    pub async fn lock_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List the feed, optionally filtered by category and/or tool.
    ///
    /// Tally ordering breaks ties by insertion order.
    pub async fn list(
        pool: &PgPool,
        order: SortOrder,
        category: Option<&str>,
        tool: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Idea>, sqlx::Error> {
        let order_by = match order {
            SortOrder::Votes => "vote_count DESC, id ASC",
            SortOrder::Recent => "created_at DESC, id DESC",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM ideas \
             WHERE ($1::TEXT IS NULL OR category = $1) \
               AND ($2::TEXT IS NULL OR tool = $2) \
             ORDER BY {order_by} \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(category)
            .bind(tool)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every idea in id order, for the admin export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas ORDER BY id ASC");
        sqlx::query_as::<_, Idea>(&query).fetch_all(pool).await
    }

    /// Every idea owned by `owner`.
    pub async fn list_by_owner<'e, E: PgExecutor<'e>>(
        executor: E,
        owner: &Identity,
    ) -> Result<Vec<Idea>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ideas \
             WHERE (user_id = $1 OR session_id = $2) \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(owner.user_id())
            .bind(owner.session_id())
            .fetch_all(executor)
            .await
    }

    /// Apply a signed delta to the tally in one statement and return the new value.
    ///
    /// Returns `None` if the idea does not exist.
    pub async fn add_to_tally<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        delta: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_as::<_, (i32,)>(
            "UPDATE ideas SET vote_count = vote_count + $2 WHERE id = $1 RETURNING vote_count",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await
        .map(|row| row.map(|(count,)| count))
    }

    /// Overwrite the tally (admin correction).
    pub async fn set_tally(
        pool: &PgPool,
        id: DbId,
        vote_count: i32,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "UPDATE ideas SET vote_count = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(vote_count)
            .fetch_optional(pool)
            .await
    }

    /// Admin edit. Omitted fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIdea,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "UPDATE ideas SET \
                body = COALESCE($2, body), \
                category = COALESCE($3, category), \
                tool = COALESCE($4, tool), \
                link_url = COALESCE($5, link_url) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(&input.body)
            .bind(&input.category)
            .bind(&input.tool)
            .bind(&input.link_url)
            .fetch_optional(pool)
            .await
    }

    /// Record the grader's score for an idea.
    pub async fn set_ai_score(pool: &PgPool, id: DbId, score: f32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE ideas SET ai_score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an idea together with its votes and comments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Purge flagged test submissions created before `cutoff`.
    pub async fn delete_test_submissions_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ideas WHERE is_test AND created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
