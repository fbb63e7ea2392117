//! Handler for `GET /session`.

use axum::extract::State;
use axum::Json;
use ideaboard_core::identity::{generate_session_token, Identity};
use ideaboard_db::engine::Feed;
use ideaboard_db::models::participant::SessionInfo;
use ideaboard_db::repositories::{ParticipantRepo, SessionRepo};

use crate::error::AppResult;
use crate::middleware::identity::MaybeActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/session
///
/// Describe the caller's participant state. A caller without a token gets a
/// freshly registered session token to send back as `X-Session-Id`.
pub async fn get_session(
    State(state): State<AppState>,
    MaybeActor(identity): MaybeActor,
) -> AppResult<Json<DataResponse<SessionInfo>>> {
    let identity = identity.unwrap_or_else(|| Identity::Session(generate_session_token()));

    let (has_submitted, upvotes_given) = match &identity {
        Identity::Session(token) => {
            let session = SessionRepo::register(&state.pool, token).await?;
            (session.has_submitted, session.upvotes_given)
        }
        Identity::User(_) => {
            let row = ParticipantRepo::ensure(&state.pool, &identity).await?;
            (row.has_submitted, row.upvotes_given)
        }
    };
    let can_view_feed = Feed::can_view(&state.pool, Some(&identity)).await?;

    Ok(Json(DataResponse {
        data: SessionInfo {
            session_id: identity.session_id().map(str::to_string),
            user_id: identity.user_id(),
            has_submitted,
            can_view_feed,
            upvotes_given,
        },
    }))
}
