//! Reward loop: every [`REWARD_BATCH_SIZE`] upvotes an identity gives to
//! others earns a bonus point on that identity's weakest idea.

use crate::types::{DbId, Timestamp};

/// Given upvotes needed per bonus point.
pub const REWARD_BATCH_SIZE: i32 = 3;

/// Bonus added to the weakest idea when a batch completes.
pub const REWARD_BONUS: i32 = 1;

/// Whether the counter value *after* an increment completes a batch.
///
/// Fires once per crossing: at 3, 6, 9, ... and never at 0.
pub fn earns_bonus(upvotes_given: i32, batch_size: i32) -> bool {
    batch_size > 0 && upvotes_given > 0 && upvotes_given % batch_size == 0
}

/// One of the rewarded identity's own ideas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusCandidate {
    pub idea_id: DbId,
    pub vote_count: i32,
    pub created_at: Timestamp,
}

/// Pick the idea that receives the bonus: lowest tally, then earliest
/// submission, then lowest id.
pub fn pick_bonus_target(candidates: &[BonusCandidate]) -> Option<DbId> {
    candidates
        .iter()
        .min_by_key(|c| (c.vote_count, c.created_at, c.idea_id))
        .map(|c| c.idea_id)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn candidate(idea_id: DbId, vote_count: i32, created_secs: i64) -> BonusCandidate {
        BonusCandidate {
            idea_id,
            vote_count,
            created_at: Utc.timestamp_opt(1_700_000_000 + created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn bonus_fires_on_multiples_only() {
        let fired: Vec<i32> = (0..=10)
            .filter(|n| earns_bonus(*n, REWARD_BATCH_SIZE))
            .collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[test]
    fn zero_batch_never_fires() {
        assert!(!earns_bonus(3, 0));
    }

    #[test]
    fn lowest_tally_wins() {
        let ideas = [candidate(1, 5, 0), candidate(2, -2, 10), candidate(3, 0, 5)];
        assert_eq!(pick_bonus_target(&ideas), Some(2));
    }

    #[test]
    fn ties_go_to_earliest_submission() {
        let ideas = [candidate(1, 4, 20), candidate(2, 4, 10), candidate(3, 9, 0)];
        assert_eq!(pick_bonus_target(&ideas), Some(2));
    }

    #[test]
    fn no_ideas_no_target() {
        assert_eq!(pick_bonus_target(&[]), None);
    }
}
