//! Route definitions for `/session`.

use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// ```text
/// GET    /session                 -> get_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/session", get(session::get_session))
}
