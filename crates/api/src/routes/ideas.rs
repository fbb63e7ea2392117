//! Route definitions for the `/ideas` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{comments, ideas, votes};
use crate::state::AppState;

/// Routes mounted at `/ideas`.
///
/// ```text
/// GET    /                        -> list_ideas
/// POST   /                        -> submit_idea
/// GET    /{id}                    -> get_idea
/// POST   /{id}/vote               -> vote_idea
/// GET    /{id}/comments           -> list_comments
/// POST   /{id}/comments           -> create_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ideas::list_ideas).post(ideas::submit_idea))
        .route("/{id}", get(ideas::get_idea))
        .route("/{id}/vote", post(votes::vote_idea))
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
}
