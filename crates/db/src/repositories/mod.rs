//! Repository layer: one zero-sized struct per table.
//!
//! Functions that take part in the engines' transactions accept any
//! `PgExecutor`, so they run against either the pool or an open transaction.

pub mod analytics_repo;
pub mod comment_repo;
pub mod comment_vote_repo;
pub mod feature_flag_repo;
pub mod idea_repo;
pub mod participant_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod vote_repo;

pub use analytics_repo::AnalyticsRepo;
pub use comment_repo::CommentRepo;
pub use comment_vote_repo::CommentVoteRepo;
pub use feature_flag_repo::FeatureFlagRepo;
pub use idea_repo::IdeaRepo;
pub use participant_repo::ParticipantRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use vote_repo::VoteRepo;
