//! Admin analytics read models.

use serde::Serialize;
use sqlx::FromRow;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct AnalyticsSummary {
    pub total_ideas: i64,
    pub total_comments: i64,
    pub total_votes: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub total_sessions: i64,
    pub contributing_sessions: i64,
    pub total_accounts: i64,
    pub total_subscriptions: i64,
    pub ideas_last_24h: i64,
    pub votes_last_24h: i64,
}

/// Idea count per category (uncategorized ideas report `None`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub idea_count: i64,
    pub total_votes: i64,
}
