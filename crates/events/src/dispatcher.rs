//! Routes committed events to the external collaborators.
//!
//! Failures are logged and dropped: a grader outage must never fail the
//! request that stored the idea.

use std::sync::Arc;

use ideaboard_db::repositories::IdeaRepo;
use ideaboard_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::{PlatformEvent, IDEA_SUBMITTED, SUBSCRIPTION_CREATED};
use crate::integrations::{IdeaGrader, MailingList, SpreadsheetSink};

/// Background consumer of the event bus. Collaborators left unset are skipped.
pub struct SideEffectDispatcher {
    pool: DbPool,
    grader: Option<Arc<dyn IdeaGrader>>,
    mailing_list: Option<Arc<dyn MailingList>>,
    spreadsheet: Option<Arc<dyn SpreadsheetSink>>,
}

impl SideEffectDispatcher {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            grader: None,
            mailing_list: None,
            spreadsheet: None,
        }
    }

    pub fn with_grader(mut self, grader: Arc<dyn IdeaGrader>) -> Self {
        self.grader = Some(grader);
        self
    }

    pub fn with_mailing_list(mut self, mailing_list: Arc<dyn MailingList>) -> Self {
        self.mailing_list = Some(mailing_list);
        self
    }

    pub fn with_spreadsheet(mut self, spreadsheet: Arc<dyn SpreadsheetSink>) -> Self {
        self.spreadsheet = Some(spreadsheet);
        self
    }

    /// Consume events until the bus closes or `cancel` fires.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>, cancel: CancellationToken) {
        tracing::info!(
            grader = self.grader.is_some(),
            mailing_list = self.mailing_list.is_some(),
            spreadsheet = self.spreadsheet.is_some(),
            "Side-effect dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Side-effect dispatcher stopping (cancelled)");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Side-effect dispatcher lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, side-effect dispatcher shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Process one event.
    pub async fn handle(&self, event: &PlatformEvent) {
        match event.event_type.as_str() {
            IDEA_SUBMITTED => self.on_idea_submitted(event).await,
            SUBSCRIPTION_CREATED => self.on_subscription_created(event).await,
            other => tracing::trace!(event_type = other, "No side effects for event"),
        }
    }

    async fn on_idea_submitted(&self, event: &PlatformEvent) {
        let Some(idea_id) = event.source_entity_id else {
            tracing::warn!("idea.submitted event without an idea id");
            return;
        };
        if event.payload.get("is_test").and_then(|v| v.as_bool()) == Some(true) {
            tracing::debug!(idea_id, "Skipping side effects for test submission");
            return;
        }
        let body = event.payload_str("body").unwrap_or_default();

        if let Some(grader) = &self.grader {
            match grader.grade(body).await {
                Ok(score) => match IdeaRepo::set_ai_score(&self.pool, idea_id, score).await {
                    Ok(true) => tracing::debug!(idea_id, score, "Idea graded"),
                    Ok(false) => tracing::debug!(idea_id, "Graded idea no longer exists"),
                    Err(e) => tracing::error!(idea_id, error = %e, "Failed to store idea score"),
                },
                Err(e) => tracing::warn!(idea_id, error = %e, "Idea grading failed"),
            }
        }

        if let Some(spreadsheet) = &self.spreadsheet {
            let row = vec![
                idea_id.to_string(),
                event.timestamp.to_rfc3339(),
                body.to_string(),
                event.payload_str("category").unwrap_or_default().to_string(),
                event.payload_str("tool").unwrap_or_default().to_string(),
            ];
            if let Err(e) = spreadsheet.append_row(&row).await {
                tracing::warn!(idea_id, error = %e, "Spreadsheet backup failed");
            }
        }
    }

    async fn on_subscription_created(&self, event: &PlatformEvent) {
        let Some(mailing_list) = &self.mailing_list else {
            return;
        };
        let Some(email) = event.payload_str("email") else {
            tracing::warn!("subscription.created event without an email");
            return;
        };
        match mailing_list.subscribe(email).await {
            Ok(outcome) => tracing::info!(?outcome, "Mailing list updated"),
            Err(e) => tracing::warn!(error = %e, "Mailing list subscription failed"),
        }
    }
}
