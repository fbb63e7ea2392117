//! Domain rules for the ideaboard platform.
//!
//! Everything in this crate is pure: no I/O, no database access. The DB
//! layer and the HTTP layer call into these functions so the voting,
//! gating, reward, and moderation rules live in one place.

pub mod comments;
pub mod error;
pub mod export;
pub mod gate;
pub mod identity;
pub mod ideas;
pub mod moderation;
pub mod reward;
pub mod roles;
pub mod subscriptions;
pub mod types;
pub mod voting;
