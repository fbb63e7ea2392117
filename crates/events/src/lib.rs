//! Post-commit side effects for the idea board.
//!
//! - [`EventBus`] - in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] - the domain event envelope published after a write
//!   commits.
//! - [`integrations`] - external collaborators (idea grader, mailing list,
//!   spreadsheet backup) and their HTTP clients.
//! - [`SideEffectDispatcher`] - background task routing events to the
//!   configured collaborators.

pub mod bus;
pub mod dispatcher;
pub mod integrations;

pub use bus::{EventBus, PlatformEvent};
pub use dispatcher::SideEffectDispatcher;
pub use integrations::{IdeaGrader, IntegrationError, MailingList, SpreadsheetSink};
