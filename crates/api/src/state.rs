use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference counted and everything else sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: ideaboard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Post-commit events for the side-effect dispatcher.
    pub event_bus: Arc<ideaboard_events::EventBus>,
}
