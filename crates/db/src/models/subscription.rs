//! Email opt-in models.

use ideaboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub email: String,
    pub source: String,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscription {
    pub email: String,
    pub source: Option<String>,
}
