pub mod admin;
pub mod comments;
pub mod health;
pub mod ideas;
pub mod session;
pub mod subscriptions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /session                                session state (creates a token if absent)
///
/// /ideas                                  list (gated), submit
/// /ideas/{id}                             get (?shared=true grants the bypass)
/// /ideas/{id}/vote                        vote (POST)
/// /ideas/{id}/comments                    thread, post comment
///
/// /comments/{id}                          delete (author or admin)
/// /comments/{id}/replies                  reply (POST)
/// /comments/{id}/vote                     vote (POST)
///
/// /subscriptions                          email opt-in (POST)
///
/// /admin/ideas                            list (admin only)
/// /admin/ideas/{id}                       edit, delete
/// /admin/ideas/{id}/tally                 override tally (PUT)
/// /admin/export/ideas                     CSV export
/// /admin/flags                            list feature flags
/// /admin/paywall                          toggle paywall (PUT)
/// /admin/comments                         recent comments
/// /admin/comments/{id}                    delete any comment
/// /admin/analytics                        summary and per-category counts
/// /admin/subscriptions                    list opt-ins
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .nest("/ideas", ideas::router())
        .nest("/comments", comments::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/admin", admin::router())
}
