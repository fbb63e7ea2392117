//! Persisted feature flags.

use ideaboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `feature_flags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeatureFlag {
    pub id: DbId,
    pub name: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /api/v1/admin/paywall`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPaywall {
    pub enabled: bool,
}
