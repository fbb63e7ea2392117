//! Idea entity models and DTOs.

use ideaboard_core::identity::Identity;
use ideaboard_core::ideas::link_visible;
use ideaboard_core::reward::BonusCandidate;
use ideaboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `ideas` table.
///
/// The owning session token is a bearer credential and is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Idea {
    pub id: DbId,
    pub user_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    pub body: String,
    pub category: Option<String>,
    pub tool: Option<String>,
    pub link_url: Option<String>,
    pub vote_count: i32,
    pub ai_score: Option<f32>,
    pub is_test: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Idea {
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        identity.owns(self.user_id, self.session_id.as_deref())
    }

    /// Feed representation for `viewer`: the link is withheld until the idea
    /// is popular enough.
    pub fn to_view(&self, viewer: Option<&Identity>) -> IdeaView {
        IdeaView {
            id: self.id,
            body: self.body.clone(),
            category: self.category.clone(),
            tool: self.tool.clone(),
            link_url: self
                .link_url
                .clone()
                .filter(|_| link_visible(self.vote_count)),
            vote_count: self.vote_count,
            ai_score: self.ai_score,
            is_own: viewer.is_some_and(|v| self.is_owned_by(v)),
            created_at: self.created_at,
        }
    }
}

impl From<&Idea> for BonusCandidate {
    fn from(idea: &Idea) -> Self {
        BonusCandidate {
            idea_id: idea.id,
            vote_count: idea.vote_count,
            created_at: idea.created_at,
        }
    }
}

/// Public projection of an idea.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaView {
    pub id: DbId,
    pub body: String,
    pub category: Option<String>,
    pub tool: Option<String>,
    pub link_url: Option<String>,
    pub vote_count: i32,
    pub ai_score: Option<f32>,
    pub is_own: bool,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/ideas`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIdea {
    pub body: String,
    pub category: Option<String>,
    pub tool: Option<String>,
    pub link_url: Option<String>,
}

/// Validated insert payload produced by the submission engine.
#[derive(Debug, Clone)]
pub struct NewIdea {
    pub body: String,
    pub category: Option<String>,
    pub tool: Option<String>,
    pub link_url: Option<String>,
    pub is_test: bool,
}

/// DTO for admin edits. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIdea {
    pub body: Option<String>,
    pub category: Option<String>,
    pub tool: Option<String>,
    pub link_url: Option<String>,
}

/// Query parameters for `GET /api/v1/ideas`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaListQuery {
    /// `votes` (default) or `recent`.
    pub sort: Option<String>,
    pub category: Option<String>,
    pub tool: Option<String>,
    /// Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
