//! Route definitions for `/subscriptions`.

use axum::routing::post;
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// ```text
/// POST   /                        -> subscribe
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(subscriptions::subscribe))
}
