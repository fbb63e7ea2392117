//! Gated reads of the idea feed.

use ideaboard_core::error::CoreError;
use ideaboard_core::gate::{can_view_feed, require_feed_access, ParticipantState};
use ideaboard_core::identity::Identity;
use ideaboard_core::ideas::{clamp_limit, clamp_offset, normalize_tag, SortOrder};
use ideaboard_core::types::DbId;
use sqlx::PgPool;

use super::EngineError;
use crate::models::idea::{IdeaListQuery, IdeaView};
use crate::repositories::{FeatureFlagRepo, IdeaRepo, ParticipantRepo};

pub struct Feed;

impl Feed {
    /// Stored state for `viewer`, without creating a row.
    pub async fn participant_state(
        pool: &PgPool,
        viewer: Option<&Identity>,
    ) -> Result<Option<ParticipantState>, EngineError> {
        let Some(viewer) = viewer else {
            return Ok(None);
        };
        Ok(ParticipantRepo::find(pool, viewer).await?.map(Into::into))
    }

    /// Whether `viewer` may browse the feed under the current flags.
    pub async fn can_view(pool: &PgPool, viewer: Option<&Identity>) -> Result<bool, EngineError> {
        let flags = FeatureFlagRepo::load(pool).await?;
        let state = Self::participant_state(pool, viewer).await?;
        Ok(can_view_feed(state.as_ref(), &flags, false))
    }

    /// Fail with `SubmissionRequired` unless `viewer` may browse the feed.
    pub async fn authorize(pool: &PgPool, viewer: Option<&Identity>) -> Result<(), EngineError> {
        let flags = FeatureFlagRepo::load(pool).await?;
        if !flags.paywall_enabled {
            return Ok(());
        }
        let state = Self::participant_state(pool, viewer).await?;
        require_feed_access(state.as_ref(), &flags, false)?;
        Ok(())
    }

    /// The sorted, filtered feed as seen by `viewer`.
    pub async fn list(
        pool: &PgPool,
        viewer: Option<&Identity>,
        query: &IdeaListQuery,
    ) -> Result<Vec<IdeaView>, EngineError> {
        let order: SortOrder = match query.sort.as_deref() {
            Some(raw) => raw.parse()?,
            None => SortOrder::default(),
        };
        let category = normalize_tag(query.category.as_deref(), "Category")?;
        let tool = normalize_tag(query.tool.as_deref(), "Tool")?;

        Self::authorize(pool, viewer).await?;

        let ideas = IdeaRepo::list(
            pool,
            order,
            category.as_deref(),
            tool.as_deref(),
            clamp_limit(query.limit),
            clamp_offset(query.offset),
        )
        .await?;
        Ok(ideas.iter().map(|idea| idea.to_view(viewer)).collect())
    }

    /// A single idea.
    ///
    /// Arriving through a shared link always shows the idea and, for an
    /// identified viewer, persists the bypass so the rest of the feed
    /// unlocks too.
    pub async fn open(
        pool: &PgPool,
        viewer: Option<&Identity>,
        idea_id: DbId,
        via_shared_link: bool,
    ) -> Result<IdeaView, EngineError> {
        let idea = IdeaRepo::find_by_id(pool, idea_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "idea",
                id: idea_id,
            })?;

        if via_shared_link {
            if let Some(viewer) = viewer {
                ParticipantRepo::grant_shared_link_bypass(pool, viewer).await?;
                tracing::debug!(idea_id, viewer = %viewer, "Shared-link bypass granted");
            }
        } else {
            Self::authorize(pool, viewer).await?;
        }

        Ok(idea.to_view(viewer))
    }
}
