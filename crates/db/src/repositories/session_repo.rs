//! Repository for the `user_sessions` table.

use sqlx::PgPool;

use crate::models::participant::UserSession;

const COLUMNS: &str = "\
    id, session_id, has_submitted, shared_link_bypass, upvotes_given, \
    last_activity_at, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Find a session by its client token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE session_id = $1");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Register a token, or touch it when it already exists.
    pub async fn register(pool: &PgPool, token: &str) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (session_id) VALUES ($1) \
             ON CONFLICT (session_id) DO UPDATE SET last_activity_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token)
            .fetch_one(pool)
            .await
    }
}
