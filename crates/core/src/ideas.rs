//! Idea feed constants and helpers: sort orders, tag normalization, and
//! link visibility.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Votes an idea needs before its external link is shown in the feed.
pub const LINK_VISIBILITY_THRESHOLD: i32 = 10;

/// Maximum length of a category or tool tag.
pub const MAX_TAG_LENGTH: usize = 50;

/// Maximum length of an idea's external link.
pub const MAX_LINK_LENGTH: usize = 500;

/// Delay before a flagged test submission is purged, in minutes.
pub const TEST_SUBMISSION_TTL_MINS: i64 = 10;

/// Default and maximum page sizes for feed and admin listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const SORT_VOTES: &str = "votes";
pub const SORT_RECENT: &str = "recent";

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending tally, ties in insertion order.
    #[default]
    Votes,
    /// Newest first.
    Recent,
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SORT_VOTES => Ok(SortOrder::Votes),
            SORT_RECENT => Ok(SortOrder::Recent),
            other => Err(CoreError::Validation(format!(
                "Invalid sort '{other}'. Must be one of: {SORT_VOTES}, {SORT_RECENT}"
            ))),
        }
    }
}

/// Normalize an optional category/tool tag: trimmed, lower-cased, empty = none.
pub fn normalize_tag(raw: Option<&str>, label: &str) -> Result<Option<String>, CoreError> {
    let Some(tag) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if tag.chars().count() > MAX_TAG_LENGTH {
        return Err(CoreError::Validation(format!(
            "{label} exceeds maximum length of {MAX_TAG_LENGTH} characters"
        )));
    }
    Ok(Some(tag.to_lowercase()))
}

/// Validate an optional external link. Only http(s) URLs are accepted.
pub fn validate_link(raw: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(link) = raw.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    if link.len() > MAX_LINK_LENGTH {
        return Err(CoreError::Validation(format!(
            "Link exceeds maximum length of {MAX_LINK_LENGTH} characters"
        )));
    }
    let lower = link.to_ascii_lowercase();
    if !(lower.starts_with("https://") || lower.starts_with("http://")) || link.contains(' ') {
        return Err(CoreError::Validation(format!(
            "Invalid link '{link}'. Must be an http(s) URL"
        )));
    }
    Ok(Some(link.to_string()))
}

/// Whether an idea's link is visible at the given tally.
pub fn link_visible(vote_count: i32) -> bool {
    vote_count >= LINK_VISIBILITY_THRESHOLD
}

/// Clamp a user-provided limit to `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
