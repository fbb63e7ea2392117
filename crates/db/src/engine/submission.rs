//! Idea submission: content filter, insert, and the gate flag in one
//! transaction.

use ideaboard_core::identity::Identity;
use ideaboard_core::ideas::{normalize_tag, validate_link};
use ideaboard_core::moderation::{check_idea, is_test_submission};
use sqlx::PgPool;

use super::EngineError;
use crate::models::idea::{CreateIdea, Idea, NewIdea};
use crate::repositories::{IdeaRepo, ParticipantRepo};

pub struct IdeaSubmission;

impl IdeaSubmission {
    /// Validate and store a new idea, unlocking the feed for its author.
    pub async fn submit(
        pool: &PgPool,
        author: &Identity,
        input: &CreateIdea,
    ) -> Result<Idea, EngineError> {
        let body = check_idea(&input.body)?;
        let new_idea = NewIdea {
            is_test: is_test_submission(&body),
            category: normalize_tag(input.category.as_deref(), "Category")?,
            tool: normalize_tag(input.tool.as_deref(), "Tool")?,
            link_url: validate_link(input.link_url.as_deref())?,
            body,
        };

        let mut tx = pool.begin().await?;
        ParticipantRepo::ensure(&mut *tx, author).await?;
        let idea = IdeaRepo::create(&mut *tx, author, &new_idea).await?;
        ParticipantRepo::mark_submitted(&mut *tx, author).await?;
        tx.commit().await?;

        tracing::info!(
            idea_id = idea.id,
            author = %author,
            is_test = idea.is_test,
            "Idea submitted",
        );
        Ok(idea)
    }
}
