//! Aggregate queries for the admin dashboard.

use sqlx::PgPool;

use crate::models::analytics::{AnalyticsSummary, CategoryCount};

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    pub async fn summary(pool: &PgPool) -> Result<AnalyticsSummary, sqlx::Error> {
        sqlx::query_as::<_, AnalyticsSummary>(
            "SELECT \
                (SELECT COUNT(*) FROM ideas) AS total_ideas, \
                (SELECT COUNT(*) FROM comments) AS total_comments, \
                (SELECT COUNT(*) FROM votes) AS total_votes, \
                (SELECT COUNT(*) FROM votes WHERE vote_type = 'up') AS upvotes, \
                (SELECT COUNT(*) FROM votes WHERE vote_type = 'down') AS downvotes, \
                (SELECT COUNT(*) FROM user_sessions) AS total_sessions, \
                (SELECT COUNT(*) FROM user_sessions WHERE has_submitted) AS contributing_sessions, \
                (SELECT COUNT(*) FROM accounts) AS total_accounts, \
                (SELECT COUNT(*) FROM subscriptions) AS total_subscriptions, \
                (SELECT COUNT(*) FROM ideas WHERE created_at > NOW() - INTERVAL '24 hours') AS ideas_last_24h, \
                (SELECT COUNT(*) FROM votes WHERE voted_at > NOW() - INTERVAL '24 hours') AS votes_last_24h",
        )
        .fetch_one(pool)
        .await
    }

    /// Idea counts and summed tallies per category, largest first.
    pub async fn by_category(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS idea_count, \
                    COALESCE(SUM(vote_count), 0)::BIGINT AS total_votes \
             FROM ideas \
             GROUP BY category \
             ORDER BY idea_count DESC, category ASC NULLS LAST",
        )
        .fetch_all(pool)
        .await
    }
}
