//! Threaded comments and their single-shot votes.

use std::collections::HashMap;

use ideaboard_core::comments::{check_can_delete, check_parent};
use ideaboard_core::error::CoreError;
use ideaboard_core::identity::{Identity, UNKNOWN_IP};
use ideaboard_core::moderation::check_comment;
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::{check_cooldown, VoteDirection, VoteOutcome, VotePolicy};
use serde::Serialize;
use sqlx::PgPool;

use super::EngineError;
use crate::models::comment::{Comment, CommentThread};
use crate::repositories::{CommentRepo, CommentVoteRepo, IdeaRepo, ParticipantRepo};

/// One comment vote request.
#[derive(Debug, Clone)]
pub struct CommentVoteRequest {
    pub voter: Identity,
    pub ip_address: String,
    pub comment_id: DbId,
    pub direction: VoteDirection,
    pub at: Timestamp,
}

/// Result of a comment vote. Duplicates report `Unchanged`.
#[derive(Debug, Clone, Serialize)]
pub struct CommentVoteReceipt {
    pub comment_id: DbId,
    pub vote_count: i32,
    pub outcome: VoteOutcome,
}

pub struct CommentEngine;

impl CommentEngine {
    /// Post a comment on an idea, optionally under an existing comment of
    /// the same idea.
    pub async fn post(
        pool: &PgPool,
        author: &Identity,
        idea_id: DbId,
        parent_id: Option<DbId>,
        body: &str,
    ) -> Result<Comment, EngineError> {
        let body = check_comment(body)?;
        let mut tx = pool.begin().await?;

        IdeaRepo::find_by_id(&mut *tx, idea_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "idea",
                id: idea_id,
            })?;

        if let Some(parent_id) = parent_id {
            let parent = CommentRepo::find_by_id(&mut *tx, parent_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "comment",
                    id: parent_id,
                })?;
            check_parent(parent.id, parent.idea_id, idea_id)?;
        }

        ParticipantRepo::ensure(&mut *tx, author).await?;
        let comment = CommentRepo::create(&mut *tx, author, idea_id, parent_id, &body).await?;
        tx.commit().await?;

        tracing::info!(
            comment_id = comment.id,
            idea_id,
            parent_id,
            author = %author,
            "Comment posted",
        );
        Ok(comment)
    }

    /// Reply to a comment. The reply joins the parent's idea.
    pub async fn reply(
        pool: &PgPool,
        author: &Identity,
        parent_id: DbId,
        body: &str,
    ) -> Result<Comment, EngineError> {
        let parent = CommentRepo::find_by_id(pool, parent_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "comment",
                id: parent_id,
            })?;
        Self::post(pool, author, parent.idea_id, Some(parent.id), body).await
    }

    /// Vote on a comment.
    ///
    /// A repeat vote from the same identity is a no-op returning the current
    /// tally; it is never throttled. New votes are throttled by a shared
    /// cooldown per identity and per IP.
    pub async fn vote(
        pool: &PgPool,
        policy: &VotePolicy,
        request: &CommentVoteRequest,
    ) -> Result<CommentVoteReceipt, EngineError> {
        let mut tx = pool.begin().await?;

        ParticipantRepo::ensure(&mut *tx, &request.voter).await?;
        let comment = CommentRepo::lock_by_id(&mut *tx, request.comment_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "comment",
                id: request.comment_id,
            })?;

        if CommentVoteRepo::find_for_identity(&mut *tx, &request.voter, comment.id)
            .await?
            .is_some()
        {
            tx.commit().await?;
            return Ok(CommentVoteReceipt {
                comment_id: comment.id,
                vote_count: comment.vote_count,
                outcome: VoteOutcome::Unchanged,
            });
        }

        let last_by_identity =
            CommentVoteRepo::last_voted_at_by_identity(&mut *tx, &request.voter).await?;
        check_cooldown(last_by_identity, request.at, policy.comment_cooldown)?;
        if request.ip_address != UNKNOWN_IP {
            CommentVoteRepo::lock_ip(&mut *tx, &request.ip_address).await?;
            let last_by_ip =
                CommentVoteRepo::last_voted_at_by_ip(&mut *tx, &request.ip_address).await?;
            check_cooldown(last_by_ip, request.at, policy.comment_cooldown)?;
        }

        let inserted = CommentVoteRepo::insert(
            &mut *tx,
            &request.voter,
            comment.id,
            request.direction,
            &request.ip_address,
            request.at,
        )
        .await?;

        let (vote_count, outcome) = match inserted {
            Some(_) => {
                let count = CommentRepo::add_to_tally(&mut *tx, comment.id, request.direction.sign())
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "comment",
                        id: comment.id,
                    })?;
                (count, VoteOutcome::Recorded)
            }
            None => (comment.vote_count, VoteOutcome::Unchanged),
        };
        tx.commit().await?;

        tracing::debug!(
            comment_id = comment.id,
            voter = %request.voter,
            direction = %request.direction,
            vote_count,
            "Comment vote processed",
        );
        Ok(CommentVoteReceipt {
            comment_id: comment.id,
            vote_count,
            outcome,
        })
    }

    /// Delete a comment and its replies. Owners and admins only.
    pub async fn delete(
        pool: &PgPool,
        actor: Option<&Identity>,
        is_admin: bool,
        comment_id: DbId,
    ) -> Result<(), EngineError> {
        let comment = CommentRepo::find_by_id(pool, comment_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "comment",
                id: comment_id,
            })?;
        check_can_delete(actor, is_admin, comment.user_id, comment.session_id.as_deref())?;

        if !CommentRepo::delete(pool, comment_id).await? {
            return Err(CoreError::NotFound {
                entity: "comment",
                id: comment_id,
            }
            .into());
        }
        tracing::info!(comment_id, is_admin, "Comment deleted");
        Ok(())
    }

    /// Top-level comments on an idea with one level of replies resolved.
    pub async fn thread(
        pool: &PgPool,
        idea_id: DbId,
        viewer: Option<&Identity>,
    ) -> Result<Vec<CommentThread>, EngineError> {
        IdeaRepo::find_by_id(pool, idea_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "idea",
                id: idea_id,
            })?;

        let top_level = CommentRepo::list_top_level(pool, idea_id).await?;
        let parent_ids: Vec<DbId> = top_level.iter().map(|row| row.comment.id).collect();
        let replies = CommentRepo::list_replies(pool, &parent_ids).await?;

        let mut replies_by_parent: HashMap<DbId, Vec<CommentThread>> = HashMap::new();
        for row in &replies {
            if let Some(parent_id) = row.comment.parent_id {
                replies_by_parent
                    .entry(parent_id)
                    .or_default()
                    .push(CommentThread::from_row(row, viewer));
            }
        }

        Ok(top_level
            .iter()
            .map(|row| {
                let mut node = CommentThread::from_row(row, viewer);
                node.replies = replies_by_parent.remove(&node.id).unwrap_or_default();
                node
            })
            .collect())
    }
}
