pub mod admin;
pub mod comments;
pub mod ideas;
pub mod session;
pub mod subscriptions;
pub mod votes;
