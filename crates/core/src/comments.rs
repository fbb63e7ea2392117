//! Comment thread rules.
//!
//! Comments form a forest rooted at `parent_id = NULL`. Every comment
//! carries the id of the root idea, including nested replies. Reads only
//! resolve one level of replies per top-level comment.

use crate::error::CoreError;
use crate::identity::Identity;
use crate::types::DbId;

/// A reply must live under the same idea as its parent.
pub fn check_parent(parent_id: DbId, parent_idea_id: DbId, idea_id: DbId) -> Result<(), CoreError> {
    if parent_idea_id != idea_id {
        return Err(CoreError::Validation(format!(
            "Comment {parent_id} does not belong to idea {idea_id}"
        )));
    }
    Ok(())
}

/// Comments may be deleted by their owner or by an admin.
pub fn check_can_delete(
    actor: Option<&Identity>,
    is_admin: bool,
    owner_user_id: Option<DbId>,
    owner_session_id: Option<&str>,
) -> Result<(), CoreError> {
    if is_admin {
        return Ok(());
    }
    match actor {
        Some(identity) if identity.owns(owner_user_id, owner_session_id) => Ok(()),
        Some(_) => Err(CoreError::Forbidden(
            "Only the author or an admin can delete this comment".to_string(),
        )),
        None => Err(CoreError::IdentityRequired),
    }
}
