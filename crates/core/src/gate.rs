//! Submission gate ("paywall"): who may browse the shared idea feed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Name of the persisted flag that switches the paywall on.
pub const PAYWALL_FLAG: &str = "paywall_enabled";

/// Feature flags injected into each gate decision.
///
/// Sourced from the `feature_flags` table per request rather than held in a
/// process-wide singleton, so every instance of the API sees the same value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub paywall_enabled: bool,
}

/// Per-identity state the gate and the reward loop care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantState {
    pub has_submitted: bool,
    /// Sticky grant from arriving through a shared idea link.
    pub shared_link_bypass: bool,
    pub upvotes_given: i32,
}

/// Whether an identity may view the feed.
///
/// `state` is `None` when the identity has never been seen (or the request
/// is anonymous); such a caller only passes when the paywall is off or the
/// request carries the shared-link bypass.
pub fn can_view_feed(
    state: Option<&ParticipantState>,
    flags: &FeatureFlags,
    has_shared_link_bypass: bool,
) -> bool {
    if !flags.paywall_enabled {
        return true;
    }
    let submitted = state.is_some_and(|s| s.has_submitted);
    let sticky_bypass = state.is_some_and(|s| s.shared_link_bypass);
    submitted || sticky_bypass || has_shared_link_bypass
}

/// [`can_view_feed`] as a `Result`, failing with `SubmissionRequired`.
pub fn require_feed_access(
    state: Option<&ParticipantState>,
    flags: &FeatureFlags,
    has_shared_link_bypass: bool,
) -> Result<(), CoreError> {
    if can_view_feed(state, flags, has_shared_link_bypass) {
        Ok(())
    } else {
        Err(CoreError::SubmissionRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: FeatureFlags = FeatureFlags {
        paywall_enabled: true,
    };
    const OFF: FeatureFlags = FeatureFlags {
        paywall_enabled: false,
    };

    #[test]
    fn paywall_off_always_open() {
        assert!(can_view_feed(None, &OFF, false));
        assert!(can_view_feed(Some(&ParticipantState::default()), &OFF, false));
    }

    #[test]
    fn paywall_on_requires_submission() {
        let fresh = ParticipantState::default();
        assert!(!can_view_feed(None, &ON, false));
        assert!(!can_view_feed(Some(&fresh), &ON, false));

        let contributor = ParticipantState {
            has_submitted: true,
            ..Default::default()
        };
        assert!(can_view_feed(Some(&contributor), &ON, false));
    }

    #[test]
    fn shared_link_bypass_opens_gate() {
        assert!(can_view_feed(None, &ON, true));

        let sticky = ParticipantState {
            shared_link_bypass: true,
            ..Default::default()
        };
        assert!(can_view_feed(Some(&sticky), &ON, false));
    }

    #[test]
    fn require_feed_access_maps_to_error() {
        assert_eq!(
            require_feed_access(None, &ON, false),
            Err(CoreError::SubmissionRequired)
        );
        assert!(require_feed_access(None, &OFF, false).is_ok());
    }
}
