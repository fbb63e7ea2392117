//! Email opt-in validation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Default source tag when the client does not send one.
pub const DEFAULT_SOURCE: &str = "website";

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_SOURCE_LENGTH: usize = 50;

/// Normalize and validate an email address (trimmed, lower-cased).
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LENGTH || !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{}'",
            raw.trim()
        )));
    }
    Ok(email)
}

/// Normalize the optional source tag.
pub fn normalize_source(raw: Option<&str>) -> Result<String, CoreError> {
    let source = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SOURCE);
    if source.len() > MAX_SOURCE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Source exceeds maximum length of {MAX_SOURCE_LENGTH} characters"
        )));
    }
    Ok(source.to_string())
}
