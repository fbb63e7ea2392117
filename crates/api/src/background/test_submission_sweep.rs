//! Periodic purge of flagged test submissions.
//!
//! Ideas whose body reads like a throwaway test post are stored with
//! `is_test = true` and deleted once they are older than
//! [`TEST_SUBMISSION_TTL_MINS`].

use std::time::Duration;

use chrono::Utc;
use ideaboard_core::ideas::TEST_SUBMISSION_TTL_MINS;
use ideaboard_db::repositories::IdeaRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        ttl_mins = TEST_SUBMISSION_TTL_MINS,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Test submission sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Test submission sweep stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = sweep_once(&pool).await {
                    tracing::error!(error = %e, "Test submission sweep failed");
                }
            }
        }
    }
}

/// Delete expired test submissions once. Returns how many were removed.
pub async fn sweep_once(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::minutes(TEST_SUBMISSION_TTL_MINS);
    let deleted = IdeaRepo::delete_test_submissions_before(pool, cutoff).await?;
    if deleted > 0 {
        tracing::info!(deleted, "Purged expired test submissions");
    } else {
        tracing::debug!("No expired test submissions");
    }
    Ok(deleted)
}
