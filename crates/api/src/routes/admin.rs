//! Route definitions for the `/admin` surface.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role from a trusted network (enforced by
/// handler extractors).
///
/// ```text
/// GET    /ideas                   -> list_ideas
/// PUT    /ideas/{id}              -> update_idea
/// DELETE /ideas/{id}              -> delete_idea
/// PUT    /ideas/{id}/tally        -> set_tally
/// GET    /export/ideas            -> export_ideas_csv
/// GET    /flags                   -> list_flags
/// PUT    /paywall                 -> set_paywall
/// GET    /comments                -> list_recent_comments
/// DELETE /comments/{id}           -> delete_comment
/// GET    /analytics               -> analytics
/// GET    /subscriptions           -> list_subscriptions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ideas", get(admin::list_ideas))
        .route(
            "/ideas/{id}",
            put(admin::update_idea).delete(admin::delete_idea),
        )
        .route("/ideas/{id}/tally", put(admin::set_tally))
        .route("/export/ideas", get(admin::export_ideas_csv))
        .route("/flags", get(admin::list_flags))
        .route("/paywall", put(admin::set_paywall))
        .route("/comments", get(admin::list_recent_comments))
        .route("/comments/{id}", delete(admin::delete_comment))
        .route("/analytics", get(admin::analytics))
        .route("/subscriptions", get(admin::list_subscriptions))
}
