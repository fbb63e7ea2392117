//! Identity resolution for voting, posting, and reading.
//!
//! A valid Bearer token always wins over the `X-Session-Id` header. Session
//! tokens are opaque: presenting one assumes that session's state.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use ideaboard_core::error::CoreError;
use ideaboard_core::identity::{client_ip, normalize_session_token, Identity};
use ideaboard_core::roles::ROLE_ADMIN;

use super::auth::bearer_claims;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the anonymous session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// Header carrying the client address when behind a proxy.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Everything known about the caller: identity (if any) and token role.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub identity: Option<Identity>,
    /// Role from the access token; `None` for sessions and anonymous callers.
    pub role: Option<String>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ROLE_ADMIN)
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = bearer_claims(parts, state)? {
            return Ok(Caller {
                identity: Some(Identity::User(claims.sub)),
                role: Some(claims.role),
            });
        }

        let session = match parts.headers.get(SESSION_HEADER) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    CoreError::Validation("Session token must be ASCII".to_string())
                })?;
                normalize_session_token(raw)?
            }
            None => None,
        };

        Ok(Caller {
            identity: Identity::resolve(None, session).ok(),
            role: None,
        })
    }
}

/// A caller that must be identified. Rejects with `IdentityRequired`.
#[derive(Debug, Clone)]
pub struct Actor(pub Identity);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        caller
            .identity
            .map(Actor)
            .ok_or(AppError::Core(CoreError::IdentityRequired))
    }
}

/// A caller that may be anonymous.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        Ok(MaybeActor(caller.identity))
    }
}

/// Best-effort client address: first `X-Forwarded-For` entry, then the
/// socket peer, then `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(ClientIp(client_ip(forwarded, peer)))
    }
}
