//! Route definitions for the `/comments` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::{comments, votes};
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// DELETE /{id}                    -> delete_comment
/// POST   /{id}/replies            -> create_reply
/// POST   /{id}/vote               -> vote_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(comments::delete_comment))
        .route("/{id}/replies", post(comments::create_reply))
        .route("/{id}/vote", post(votes::vote_comment))
}
