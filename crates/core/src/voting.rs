//! Vote rules: direction parsing, downvote eligibility, self-vote
//! prevention, rate limiting, and the per-pair dedup plan.
//!
//! The DB layer runs these checks in order inside one transaction; the
//! first failure wins:
//!
//! 1. target exists
//! 2. submission gate
//! 3. downvote eligibility
//! 4. self-vote
//! 5. rate limits (identity cooldown, then IP windows)
//! 6. dedup plan

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identity::Identity;
use crate::reward::REWARD_BATCH_SIZE;
use crate::types::Timestamp;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

pub const VOTE_UP: &str = "up";
pub const VOTE_DOWN: &str = "down";

/// Minimum tally before an idea accepts downvotes.
pub const DEFAULT_DOWNVOTE_THRESHOLD: i32 = 100;

/// Minimum gap between two votes from one identity.
pub const DEFAULT_VOTE_COOLDOWN_SECS: i64 = 5;

/// Minimum gap between two comment votes from one identity or IP.
pub const DEFAULT_COMMENT_VOTE_COOLDOWN_SECS: i64 = 2;

/* --------------------------------------------------------------------------
Direction
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => VOTE_UP,
            VoteDirection::Down => VOTE_DOWN,
        }
    }

    /// Contribution of a single vote in this direction to a tally.
    pub fn sign(self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl FromStr for VoteDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            VOTE_UP => Ok(VoteDirection::Up),
            VOTE_DOWN => Ok(VoteDirection::Down),
            other => Err(CoreError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Policy
-------------------------------------------------------------------------- */

/// At most `max_votes` votes from one IP within a rolling `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub max_votes: usize,
    pub window: Duration,
}

/// Tunable thresholds for the vote and comment-vote engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotePolicy {
    pub downvote_threshold: i32,
    pub cooldown: Duration,
    pub ip_windows: Vec<RateWindow>,
    pub comment_cooldown: Duration,
    pub reward_batch_size: i32,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            downvote_threshold: DEFAULT_DOWNVOTE_THRESHOLD,
            cooldown: Duration::seconds(DEFAULT_VOTE_COOLDOWN_SECS),
            ip_windows: vec![
                RateWindow {
                    max_votes: 2,
                    window: Duration::seconds(10),
                },
                RateWindow {
                    max_votes: 5,
                    window: Duration::seconds(60),
                },
            ],
            comment_cooldown: Duration::seconds(DEFAULT_COMMENT_VOTE_COOLDOWN_SECS),
            reward_batch_size: REWARD_BATCH_SIZE,
        }
    }
}

impl VotePolicy {
    /// Longest IP window, i.e. how far back the IP history must be loaded.
    pub fn ip_lookback(&self) -> Duration {
        self.ip_windows
            .iter()
            .map(|w| w.window)
            .max()
            .unwrap_or_else(Duration::zero)
    }
}

/* --------------------------------------------------------------------------
Checks
-------------------------------------------------------------------------- */

/// Downvoting is a privilege unlocked by popularity.
pub fn check_downvote_eligibility(
    direction: VoteDirection,
    tally: i32,
    threshold: i32,
) -> Result<(), CoreError> {
    if direction == VoteDirection::Down && tally < threshold {
        return Err(CoreError::DownvoteLocked { tally, threshold });
    }
    Ok(())
}

/// Reject votes on content the voter owns.
pub fn check_not_self_vote(
    voter: &Identity,
    owner_user_id: Option<i64>,
    owner_session_id: Option<&str>,
) -> Result<(), CoreError> {
    if voter.owns(owner_user_id, owner_session_id) {
        return Err(CoreError::SelfVote);
    }
    Ok(())
}

/// Reject when the previous action happened less than `cooldown` ago.
pub fn check_cooldown(
    last_action_at: Option<Timestamp>,
    now: Timestamp,
    cooldown: Duration,
) -> Result<(), CoreError> {
    let Some(last) = last_action_at else {
        return Ok(());
    };
    let elapsed = (now - last).max(Duration::zero());
    if elapsed < cooldown {
        let remaining = cooldown - elapsed;
        return Err(CoreError::RateLimited {
            remaining_ms: remaining.num_milliseconds().max(1),
        });
    }
    Ok(())
}

/// Check recent votes from one IP against every rolling window.
///
/// `recent` may be in any order and may include votes older than the
/// longest window. When several windows block, the longest wait is reported.
pub fn check_ip_windows(
    recent: &[Timestamp],
    now: Timestamp,
    windows: &[RateWindow],
) -> Result<(), CoreError> {
    let mut longest_wait: Option<Duration> = None;

    for rule in windows {
        if rule.max_votes == 0 {
            continue;
        }
        let since = now - rule.window;
        let mut in_window: Vec<Timestamp> = recent.iter().copied().filter(|t| *t > since).collect();
        if in_window.len() < rule.max_votes {
            continue;
        }
        in_window.sort();
        // The vote that must age out before another one fits.
        let blocking = in_window[in_window.len() - rule.max_votes];
        let wait = (blocking + rule.window - now).max(Duration::milliseconds(1));
        longest_wait = Some(longest_wait.map_or(wait, |w| w.max(wait)));
    }

    match longest_wait {
        Some(wait) => Err(CoreError::RateLimited {
            remaining_ms: wait.num_milliseconds(),
        }),
        None => Ok(()),
    }
}

/* --------------------------------------------------------------------------
Dedup plan
-------------------------------------------------------------------------- */

/// What a vote request does to the stored vote and the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePlan {
    /// Same direction as the existing vote: nothing changes.
    Unchanged,
    /// Opposite direction: rewrite the record, undo the old vote and apply the new one.
    Flip { delta: i32 },
    /// No existing vote: insert a record.
    Insert { delta: i32 },
}

impl VotePlan {
    pub fn delta(self) -> i32 {
        match self {
            VotePlan::Unchanged => 0,
            VotePlan::Flip { delta } | VotePlan::Insert { delta } => delta,
        }
    }

    /// Only brand-new upvotes feed the reward loop; flips are self-corrections.
    pub fn feeds_reward(self, direction: VoteDirection) -> bool {
        matches!(self, VotePlan::Insert { .. }) && direction == VoteDirection::Up
    }

    pub fn outcome(self) -> VoteOutcome {
        match self {
            VotePlan::Unchanged => VoteOutcome::Unchanged,
            VotePlan::Flip { .. } => VoteOutcome::Flipped,
            VotePlan::Insert { .. } => VoteOutcome::Recorded,
        }
    }
}

/// Reported back to the caller alongside the new tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Recorded,
    Flipped,
    Unchanged,
}

/// Decide how a request interacts with the identity's existing vote.
pub fn plan_vote(existing: Option<VoteDirection>, requested: VoteDirection) -> VotePlan {
    match existing {
        Some(current) if current == requested => VotePlan::Unchanged,
        Some(_) => VotePlan::Flip {
            delta: 2 * requested.sign(),
        },
        None => VotePlan::Insert {
            delta: requested.sign(),
        },
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
