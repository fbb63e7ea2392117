//! Handlers for the `/ideas` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ideaboard_core::types::DbId;
use ideaboard_db::engine::{Feed, IdeaSubmission};
use ideaboard_db::models::idea::{CreateIdea, IdeaListQuery, IdeaView};
use ideaboard_events::bus::IDEA_SUBMITTED;
use ideaboard_events::PlatformEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::identity::{Actor, MaybeActor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /ideas/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct OpenIdeaParams {
    /// Set when the client arrived through a shared link.
    #[serde(default)]
    pub shared: bool,
}

/// POST /api/v1/ideas
///
/// Submit an idea. Unlocks the feed for the author and queues grading and
/// backup once committed.
pub async fn submit_idea(
    State(state): State<AppState>,
    Actor(author): Actor,
    Json(input): Json<CreateIdea>,
) -> AppResult<(StatusCode, Json<DataResponse<IdeaView>>)> {
    let idea = IdeaSubmission::submit(&state.pool, &author, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(IDEA_SUBMITTED)
            .with_source("idea", idea.id)
            .with_actor(&author)
            .with_payload(json!({
                "body": idea.body,
                "category": idea.category,
                "tool": idea.tool,
                "is_test": idea.is_test,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: idea.to_view(Some(&author)),
        }),
    ))
}

/// GET /api/v1/ideas?sort=votes|recent&category=&tool=&limit=&offset=
pub async fn list_ideas(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Query(query): Query<IdeaListQuery>,
) -> AppResult<Json<DataResponse<Vec<IdeaView>>>> {
    let ideas = Feed::list(&state.pool, viewer.as_ref(), &query).await?;
    Ok(Json(DataResponse { data: ideas }))
}

/// GET /api/v1/ideas/{id}?shared=true
pub async fn get_idea(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(id): Path<DbId>,
    Query(params): Query<OpenIdeaParams>,
) -> AppResult<Json<DataResponse<IdeaView>>> {
    let idea = Feed::open(&state.pool, viewer.as_ref(), id, params.shared).await?;
    Ok(Json(DataResponse { data: idea }))
}
