use std::str::FromStr;

use axum::http::HeaderValue;
use chrono::Duration;
use ideaboard_core::identity::TrustedNetworks;
use ideaboard_core::voting::VotePolicy;

use crate::auth::jwt::JwtConfig;

/// A missing or malformed environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Endpoints of the optional external collaborators. `None` disables one.
#[derive(Debug, Clone, Default)]
pub struct IntegrationConfig {
    pub grader_url: Option<String>,
    pub mailing_list_url: Option<String>,
    pub spreadsheet_webhook_url: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Client networks allowed to reach admin routes. Empty allows any.
    pub trusted_networks: TrustedNetworks,
    /// Vote and comment-vote thresholds.
    pub vote_policy: VotePolicy,
    pub integrations: IntegrationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                       |
    /// | `ADMIN_TRUSTED_NETWORKS`     | empty (any origin)         |
    /// | `VOTE_COOLDOWN_SECS`         | `5`                        |
    /// | `COMMENT_VOTE_COOLDOWN_SECS` | `2`                        |
    /// | `DOWNVOTE_THRESHOLD`         | `100`                      |
    /// | `GRADER_URL`                 | unset (grading disabled)   |
    /// | `MAILING_LIST_URL`           | unset (relay disabled)     |
    /// | `SPREADSHEET_WEBHOOK_URL`    | unset (backup disabled)    |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                reason: format!("'{origin}': {e}"),
            })?;
        }

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30)?;

        let trusted_networks = match std::env::var("ADMIN_TRUSTED_NETWORKS") {
            Ok(list) => TrustedNetworks::parse(&list).map_err(|e| ConfigError::Invalid {
                var: "ADMIN_TRUSTED_NETWORKS",
                reason: e.to_string(),
            })?,
            Err(_) => TrustedNetworks::default(),
        };

        let defaults = VotePolicy::default();
        let vote_policy = VotePolicy {
            downvote_threshold: env_or("DOWNVOTE_THRESHOLD", defaults.downvote_threshold)?,
            cooldown: Duration::seconds(env_or(
                "VOTE_COOLDOWN_SECS",
                defaults.cooldown.num_seconds(),
            )?),
            comment_cooldown: Duration::seconds(env_or(
                "COMMENT_VOTE_COOLDOWN_SECS",
                defaults.comment_cooldown.num_seconds(),
            )?),
            ..defaults
        };

        let integrations = IntegrationConfig {
            grader_url: env_opt("GRADER_URL"),
            mailing_list_url: env_opt("MAILING_LIST_URL"),
            spreadsheet_webhook_url: env_opt("SPREADSHEET_WEBHOOK_URL"),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env()?,
            trusted_networks,
            vote_policy,
            integrations,
        })
    }
}

/// Parse `var` if set, otherwise return `default`.
pub(crate) fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// A set, non-empty variable.
fn env_opt(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
