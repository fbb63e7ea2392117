//! Content filter for idea and comment bodies.
//!
//! Rejections surface as [`CoreError::ContentRejected`] with a reason the
//! client can show verbatim.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

pub const MIN_IDEA_LENGTH: usize = 10;
pub const MAX_IDEA_LENGTH: usize = 2_000;
pub const MIN_COMMENT_LENGTH: usize = 2;
pub const MAX_COMMENT_LENGTH: usize = 1_000;

/// Links allowed in one body before it is treated as spam.
pub const MAX_LINKS: usize = 2;

/// Words an idea needs to count as describing a use case.
pub const MIN_IDEA_WORDS: usize = 3;

/// Terms that are never accepted, matched case-insensitively as whole words.
pub const BANNED_TERMS: &[&str] = &[
    "viagra",
    "casino",
    "crypto giveaway",
    "free money",
    "onlyfans",
    "porn",
];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid regex"));

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]{2,}").expect("valid regex"));

static BANNED_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BANNED_TERMS
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex")
});

static TEST_SUBMISSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*test(?:ing)?\b").expect("valid regex"));

/* --------------------------------------------------------------------------
Checks
-------------------------------------------------------------------------- */

/// Validate an idea body. Returns the trimmed body on success.
pub fn check_idea(body: &str) -> Result<String, CoreError> {
    let trimmed = body.trim();
    check_length(trimmed, MIN_IDEA_LENGTH, MAX_IDEA_LENGTH, "Idea")?;
    check_banned(trimmed)?;
    check_spam(trimmed)?;

    if WORD_RE.find_iter(trimmed).count() < MIN_IDEA_WORDS {
        return Err(CoreError::ContentRejected(
            "Describe how you use AI in a few words".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validate a comment body. Returns the trimmed body on success.
pub fn check_comment(body: &str) -> Result<String, CoreError> {
    let trimmed = body.trim();
    check_length(trimmed, MIN_COMMENT_LENGTH, MAX_COMMENT_LENGTH, "Comment")?;
    check_banned(trimmed)?;
    check_spam(trimmed)?;
    Ok(trimmed.to_string())
}

/// Whether an accepted idea looks like a throwaway test post.
pub fn is_test_submission(body: &str) -> bool {
    TEST_SUBMISSION_RE.is_match(body)
}

fn check_length(text: &str, min: usize, max: usize, label: &str) -> Result<(), CoreError> {
    let len = text.chars().count();
    if len < min {
        return Err(CoreError::ContentRejected(format!(
            "{label} is too short (minimum {min} characters)"
        )));
    }
    if len > max {
        return Err(CoreError::ContentRejected(format!(
            "{label} is too long (maximum {max} characters)"
        )));
    }
    Ok(())
}

fn check_banned(text: &str) -> Result<(), CoreError> {
    if let Some(m) = BANNED_RE.find(text) {
        return Err(CoreError::ContentRejected(format!(
            "Contains a banned term: '{}'",
            m.as_str().to_lowercase()
        )));
    }
    Ok(())
}

fn check_spam(text: &str) -> Result<(), CoreError> {
    if URL_RE.find_iter(text).count() > MAX_LINKS {
        return Err(CoreError::ContentRejected(format!(
            "Too many links (maximum {MAX_LINKS})"
        )));
    }

    if has_long_run(text, 8) {
        return Err(CoreError::ContentRejected(
            "Looks like spam: repeated characters".to_string(),
        ));
    }

    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 20 {
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        if upper * 10 > letters.len() * 8 {
            return Err(CoreError::ContentRejected(
                "Please don't shout: too many capital letters".to_string(),
            ));
        }
    }

    Ok(())
}

/// Whether any non-whitespace character repeats `run` or more times in a row.
fn has_long_run(text: &str, run: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut count = 0;
    for c in text.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if count >= run && !c.is_whitespace() {
            return true;
        }
    }
    false
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_reasonable_idea() {
        let body = "  I use an LLM to draft weekly status reports for my team.  ";
        assert_eq!(
            check_idea(body).unwrap(),
            "I use an LLM to draft weekly status reports for my team."
        );
    }

    #[test]
    fn rejects_short_and_long_ideas() {
        assert_matches!(check_idea("too short"), Err(CoreError::ContentRejected(r)) if r.contains("too short"));
        let long = "word ".repeat(500);
        assert_matches!(check_idea(&long), Err(CoreError::ContentRejected(r)) if r.contains("too long"));
    }

    #[test]
    fn rejects_banned_terms_case_insensitively() {
        let result = check_idea("Use AI to win big at the CASINO every night");
        assert_matches!(result, Err(CoreError::ContentRejected(r)) if r.contains("casino"));
    }

    #[test]
    fn banned_terms_match_whole_words() {
        assert!(check_idea("Summarizing occasional meeting notes with AI").is_ok());
    }

    #[test]
    fn rejects_link_spam() {
        let body = "see https://a.example https://b.example https://c.example now";
        assert_matches!(check_idea(body), Err(CoreError::ContentRejected(r)) if r.contains("links"));
    }

    #[test]
    fn rejects_repeated_characters() {
        assert!(check_comment("nice!!!!!!!!!!").is_err());
        assert!(check_comment("nice!!!").is_ok());
    }

    #[test]
    fn rejects_shouting() {
        assert!(check_idea("I USE CHATGPT FOR EVERYTHING IN MY LIFE NOW").is_err());
    }

    #[test]
    fn rejects_off_topic_idea() {
        assert!(check_idea("?!?!?!? ... ---").is_err());
    }

    #[test]
    fn comment_bounds() {
        assert!(check_comment("x").is_err());
        assert!(check_comment("ok").is_ok());
        assert!(check_comment(&"a ".repeat(600)).is_err());
    }

    #[test]
    fn detects_test_submissions() {
        assert!(is_test_submission("test post please ignore this one"));
        assert!(is_test_submission("Testing the form with a long body"));
        assert!(!is_test_submission("Contest entries get sorted by an LLM"));
    }
}
