//! Idea voting: validation, dedup, tally update, and the reward loop in a
//! single transaction.
//!
//! Locks taken, in order: the voter's participant row (serializes one
//! identity's votes), a transaction advisory lock on the client IP
//! (serializes the IP window check and the write that follows), then the
//! target idea (serializes tally updates and the downvote threshold read).
//! Every accepted insert or flip is appended to `vote_events`, which the
//! cooldown and IP windows read. A completed reward batch also updates the
//! voter's weakest idea. Lock cycles between two voters are resolved by
//! Postgres aborting one transaction, which is retried.

use ideaboard_core::error::CoreError;
use ideaboard_core::gate::{require_feed_access, ParticipantState};
use ideaboard_core::identity::{Identity, UNKNOWN_IP};
use ideaboard_core::reward::{earns_bonus, pick_bonus_target, BonusCandidate, REWARD_BONUS};
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::{
    check_cooldown, check_downvote_eligibility, check_ip_windows, check_not_self_vote, plan_vote,
    VoteDirection, VoteOutcome, VotePlan, VotePolicy,
};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use super::{EngineError, MAX_ATTEMPTS};
use crate::models::vote::Vote;
use crate::repositories::{FeatureFlagRepo, IdeaRepo, ParticipantRepo, VoteRepo};

/// One vote request.
#[derive(Debug, Clone)]
pub struct VoteRequest {
    pub voter: Identity,
    pub ip_address: String,
    pub idea_id: DbId,
    pub direction: VoteDirection,
    /// Time the vote is recorded at; cooldowns are measured against it.
    pub at: Timestamp,
}

/// Bonus point granted by the reward loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusAward {
    pub idea_id: DbId,
    pub vote_count: i32,
}

/// Result of an accepted vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    pub idea_id: DbId,
    pub vote_count: i32,
    pub vote_type: VoteDirection,
    pub outcome: VoteOutcome,
    pub bonus: Option<BonusAward>,
}

pub struct VoteEngine;

impl VoteEngine {
    /// Cast a vote. Rejections come back in this order: `NotFound`,
    /// `SubmissionRequired`, `DownvoteLocked`, `SelfVote`, then `RateLimited`
    /// for the identity cooldown and the IP windows.
    pub async fn cast(
        pool: &PgPool,
        policy: &VotePolicy,
        request: &VoteRequest,
    ) -> Result<VoteReceipt, EngineError> {
        let mut attempt = 1;
        loop {
            match Self::cast_once(pool, policy, request).await {
                Err(err) if attempt < MAX_ATTEMPTS && err.is_retryable() => {
                    tracing::warn!(
                        idea_id = request.idea_id,
                        voter = %request.voter,
                        attempt,
                        error = %err,
                        "Vote transaction aborted, retrying",
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn cast_once(
        pool: &PgPool,
        policy: &VotePolicy,
        request: &VoteRequest,
    ) -> Result<VoteReceipt, EngineError> {
        let mut tx = pool.begin().await?;

        let participant: ParticipantState =
            ParticipantRepo::ensure(&mut *tx, &request.voter).await?.into();

        // Votes without a resolvable address cannot be attributed to one network.
        let track_ip = request.ip_address != UNKNOWN_IP;
        if track_ip {
            VoteRepo::lock_ip(&mut *tx, &request.ip_address).await?;
        }

        let idea = IdeaRepo::lock_by_id(&mut *tx, request.idea_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "idea",
                id: request.idea_id,
            })?;

        let flags = FeatureFlagRepo::load(&mut *tx).await?;
        require_feed_access(Some(&participant), &flags, false)?;
        check_downvote_eligibility(request.direction, idea.vote_count, policy.downvote_threshold)?;
        check_not_self_vote(&request.voter, idea.user_id, idea.session_id.as_deref())?;

        let last_voted_at = VoteRepo::last_voted_at(&mut *tx, &request.voter).await?;
        check_cooldown(last_voted_at, request.at, policy.cooldown)?;

        if track_ip {
            let since = request.at - policy.ip_lookback();
            let recent =
                VoteRepo::recent_times_from_ip(&mut *tx, &request.ip_address, since).await?;
            check_ip_windows(&recent, request.at, &policy.ip_windows)?;
        }

        let existing = VoteRepo::find_for_identity(&mut *tx, &request.voter, idea.id).await?;
        let existing_direction = existing.as_ref().map(Vote::direction).transpose()?;
        let plan = plan_vote(existing_direction, request.direction);

        let vote_count = match plan {
            VotePlan::Unchanged => idea.vote_count,
            VotePlan::Flip { .. } | VotePlan::Insert { .. } => {
                match &existing {
                    Some(vote) => {
                        VoteRepo::update_direction(
                            &mut *tx,
                            vote.id,
                            request.direction,
                            &request.ip_address,
                            request.at,
                        )
                        .await?;
                    }
                    None => {
                        VoteRepo::insert(
                            &mut *tx,
                            &request.voter,
                            idea.id,
                            request.direction,
                            &request.ip_address,
                            request.at,
                        )
                        .await?;
                    }
                }
                VoteRepo::record_event(
                    &mut *tx,
                    &request.voter,
                    idea.id,
                    request.direction,
                    &request.ip_address,
                    request.at,
                )
                .await?;
                IdeaRepo::add_to_tally(&mut *tx, idea.id, plan.delta())
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "idea",
                        id: idea.id,
                    })?
            }
        };

        let bonus = if plan.feeds_reward(request.direction) {
            Self::apply_reward(&mut *tx, policy, &request.voter).await?
        } else {
            None
        };

        tx.commit().await?;

        tracing::info!(
            idea_id = idea.id,
            voter = %request.voter,
            direction = %request.direction,
            delta = plan.delta(),
            vote_count,
            bonus_idea_id = bonus.map(|b| b.idea_id),
            "Vote processed",
        );

        Ok(VoteReceipt {
            idea_id: idea.id,
            vote_count,
            vote_type: request.direction,
            outcome: plan.outcome(),
            bonus,
        })
    }

    /// Count a newly given upvote and, when it completes a batch, add the
    /// bonus to the voter's lowest-tally idea.
    async fn apply_reward(
        conn: &mut PgConnection,
        policy: &VotePolicy,
        voter: &Identity,
    ) -> Result<Option<BonusAward>, EngineError> {
        let given = ParticipantRepo::increment_upvotes_given(&mut *conn, voter).await?;
        if !earns_bonus(given, policy.reward_batch_size) {
            return Ok(None);
        }

        let own_ideas = IdeaRepo::list_by_owner(&mut *conn, voter).await?;
        let candidates: Vec<BonusCandidate> = own_ideas.iter().map(BonusCandidate::from).collect();
        let Some(target) = pick_bonus_target(&candidates) else {
            tracing::debug!(voter = %voter, given, "Reward batch completed with no idea to boost");
            return Ok(None);
        };

        let vote_count = IdeaRepo::add_to_tally(&mut *conn, target, REWARD_BONUS).await?;
        Ok(vote_count.map(|vote_count| BonusAward {
            idea_id: target,
            vote_count,
        }))
    }
}
