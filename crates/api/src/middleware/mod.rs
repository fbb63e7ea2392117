//! Request extractors for identity, client address, and authorization.
//!
//! - [`auth::AuthUser`] -- account from a JWT Bearer token (required).
//! - [`identity::Caller`] -- whoever is calling: token, session, or nobody.
//! - [`identity::Actor`] -- an identity that may vote and post (required).
//! - [`identity::MaybeActor`] -- same, but anonymous readers are allowed.
//! - [`identity::ClientIp`] -- best-effort client address.
//! - [`rbac::RequireAdmin`] -- `admin` role from a trusted network.

pub mod auth;
pub mod identity;
pub mod rbac;
