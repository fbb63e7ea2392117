//! HTTP clients for the external collaborators.
//!
//! Every request goes through [`HttpTransport::post_json`], which retries
//! failed attempts with exponential backoff (1 s, 2 s, 4 s) before giving up.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{
    validate_score, IdeaGrader, IntegrationError, MailingList, SpreadsheetSink, SubscribeOutcome,
};

/// Retry delays in seconds.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// Timeout for a single attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Shared reqwest client plus the retry loop.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    retry_delays: Vec<Duration>,
}

impl HttpTransport {
    pub fn new() -> Result<Self, IntegrationError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            retry_delays: RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        })
    }

    /// POST `body` to `url`, retrying on failure. `accept` lists non-2xx
    /// statuses that count as a definitive answer rather than a failure.
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        accept: &[StatusCode],
    ) -> Result<reqwest::Response, IntegrationError> {
        let mut last_err: Option<IntegrationError> = None;

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_post(url, body, accept).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Integration request failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        match self.try_post(url, body, accept).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(url, error = %e, "Integration request failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    async fn try_post(
        &self,
        url: &str,
        body: &serde_json::Value,
        accept: &[StatusCode],
    ) -> Result<reqwest::Response, IntegrationError> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() && !accept.contains(&status) {
            return Err(IntegrationError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Grader
// ---------------------------------------------------------------------------

/// Grader service: `POST {url}` with `{ "text" }`, answers `{ "score" }`.
pub struct HttpIdeaGrader {
    transport: HttpTransport,
    url: String,
}

#[derive(Deserialize)]
struct GradeResponse {
    score: f32,
}

impl HttpIdeaGrader {
    pub fn new(transport: HttpTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IdeaGrader for HttpIdeaGrader {
    async fn grade(&self, text: &str) -> Result<f32, IntegrationError> {
        let response = self
            .transport
            .post_json(&self.url, &serde_json::json!({ "text": text }), &[])
            .await?;
        let body: GradeResponse = response.json().await?;
        validate_score(body.score)
    }
}

// ---------------------------------------------------------------------------
// Mailing list
// ---------------------------------------------------------------------------

/// Newsletter provider: `POST {url}` with `{ "email" }`. `409 Conflict`
/// means the address is already on the list.
pub struct HttpMailingList {
    transport: HttpTransport,
    url: String,
}

impl HttpMailingList {
    pub fn new(transport: HttpTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MailingList for HttpMailingList {
    async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, IntegrationError> {
        let response = self
            .transport
            .post_json(
                &self.url,
                &serde_json::json!({ "email": email }),
                &[StatusCode::CONFLICT],
            )
            .await?;
        Ok(if response.status() == StatusCode::CONFLICT {
            SubscribeOutcome::AlreadySubscribed
        } else {
            SubscribeOutcome::Subscribed
        })
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

/// Spreadsheet webhook: `POST {url}` with `{ "values": [...] }`.
pub struct WebhookSpreadsheetSink {
    transport: HttpTransport,
    url: String,
}

impl WebhookSpreadsheetSink {
    pub fn new(transport: HttpTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SpreadsheetSink for WebhookSpreadsheetSink {
    async fn append_row(&self, values: &[String]) -> Result<(), IntegrationError> {
        self.transport
            .post_json(&self.url, &serde_json::json!({ "values": values }), &[])
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
