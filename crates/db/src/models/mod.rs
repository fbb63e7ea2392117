pub mod analytics;
pub mod comment;
pub mod comment_vote;
pub mod feature_flag;
pub mod idea;
pub mod participant;
pub mod subscription;
pub mod vote;
