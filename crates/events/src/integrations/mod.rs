//! External collaborators invoked after a write commits.
//!
//! Each one is a trait so the dispatcher can run against the HTTP clients in
//! [`http`] in production and against in-memory fakes in tests.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lowest and highest score the grader may return.
pub const MIN_SCORE: f32 = 1.0;
pub const MAX_SCORE: f32 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// Network, DNS, timeout, or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server answered with a non-2xx status.
    #[error("Remote returned HTTP {0}")]
    HttpStatus(u16),

    /// The remote answered 2xx with a body we cannot use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Outcome of a mailing-list opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

/// Scores an idea's text on a 1.0 to 10.0 scale.
#[async_trait]
pub trait IdeaGrader: Send + Sync {
    async fn grade(&self, text: &str) -> Result<f32, IntegrationError>;
}

/// Forwards opted-in emails to the newsletter provider.
#[async_trait]
pub trait MailingList: Send + Sync {
    async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, IntegrationError>;
}

/// Appends one row per submitted idea to an external spreadsheet backup.
#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    async fn append_row(&self, values: &[String]) -> Result<(), IntegrationError>;
}

/// Reject scores outside the grader's documented range.
pub fn validate_score(score: f32) -> Result<f32, IntegrationError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(IntegrationError::InvalidResponse(format!(
            "score {score} outside {MIN_SCORE}..={MAX_SCORE}"
        )))
    }
}
