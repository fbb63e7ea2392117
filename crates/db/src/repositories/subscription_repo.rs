//! Repository for the `subscriptions` table.

use sqlx::PgPool;

use crate::models::subscription::Subscription;

const COLUMNS: &str = "id, email, source, session_id, created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Store an opt-in. Returns `None` when the email is already subscribed.
    ///
    /// `email` must already be normalized. An unknown session token is
    /// dropped rather than rejected.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        source: &str,
        session_id: Option<&str>,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (email, source, session_id) \
             VALUES ($1, $2, (SELECT session_id FROM user_sessions WHERE session_id = $3)) \
             ON CONFLICT ON CONSTRAINT uq_subscriptions_email DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(email)
            .bind(source)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY id ASC");
        sqlx::query_as::<_, Subscription>(&query).fetch_all(pool).await
    }
}
