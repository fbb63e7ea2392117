//! Repository for the `feature_flags` table.

use ideaboard_core::gate::{FeatureFlags, PAYWALL_FLAG};
use sqlx::{PgExecutor, PgPool};

use crate::models::feature_flag::FeatureFlag;

const COLUMNS: &str = "id, name, enabled, created_at, updated_at";

pub struct FeatureFlagRepo;

impl FeatureFlagRepo {
    /// Whether the named flag is on. Unknown flags read as off.
    pub async fn is_enabled<'e, E: PgExecutor<'e>>(
        executor: E,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        let enabled =
            sqlx::query_scalar::<_, bool>("SELECT enabled FROM feature_flags WHERE name = $1")
                .bind(name)
                .fetch_optional(executor)
                .await?;
        Ok(enabled.unwrap_or(false))
    }

    /// Snapshot of every flag the gate consults.
    pub async fn load<'e, E: PgExecutor<'e>>(executor: E) -> Result<FeatureFlags, sqlx::Error> {
        Ok(FeatureFlags {
            paywall_enabled: Self::is_enabled(executor, PAYWALL_FLAG).await?,
        })
    }

    /// Create or update a flag.
    pub async fn set(pool: &PgPool, name: &str, enabled: bool) -> Result<FeatureFlag, sqlx::Error> {
        let query = format!(
            "INSERT INTO feature_flags (name, enabled) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET enabled = EXCLUDED.enabled \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureFlag>(&query)
            .bind(name)
            .bind(enabled)
            .fetch_one(pool)
            .await
    }

    /// Switch the submission gate on or off for every instance.
    pub async fn set_paywall_enabled(pool: &PgPool, enabled: bool) -> Result<FeatureFlag, sqlx::Error> {
        Self::set(pool, PAYWALL_FLAG, enabled).await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<FeatureFlag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_flags ORDER BY name ASC");
        sqlx::query_as::<_, FeatureFlag>(&query).fetch_all(pool).await
    }
}
