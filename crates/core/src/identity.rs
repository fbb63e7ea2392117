//! Acting identities, client IP normalization, and trusted network policy.
//!
//! Every request acts as exactly one [`Identity`]: an authenticated account
//! or an anonymous session token. Session tokens are opaque capability
//! tokens; anyone presenting one assumes that session's state. There is no
//! cryptographic binding between a token and a client, which is a known
//! spoofing surface accepted for this low-stakes domain.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Sentinel stored when no client address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Longest session token accepted from a client.
pub const MAX_SESSION_TOKEN_LENGTH: usize = 128;

/* --------------------------------------------------------------------------
Identity
-------------------------------------------------------------------------- */

/// The unit that casts votes and owns content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Identity {
    User(DbId),
    Session(String),
}

impl Identity {
    /// Resolve the acting identity. An authenticated user always wins over a
    /// session token; neither present fails with `IdentityRequired`.
    pub fn resolve(user_id: Option<DbId>, session_id: Option<String>) -> Result<Self, CoreError> {
        match (user_id, session_id) {
            (Some(id), _) => Ok(Identity::User(id)),
            (None, Some(token)) => Ok(Identity::Session(token)),
            (None, None) => Err(CoreError::IdentityRequired),
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Identity::User(id) => Some(*id),
            Identity::Session(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Identity::User(_) => None,
            Identity::Session(token) => Some(token.as_str()),
        }
    }

    /// Whether this identity owns content stored with the given owner columns.
    pub fn owns(&self, owner_user_id: Option<DbId>, owner_session_id: Option<&str>) -> bool {
        match self {
            Identity::User(id) => owner_user_id == Some(*id),
            Identity::Session(token) => owner_session_id == Some(token.as_str()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::User(id) => write!(f, "user:{id}"),
            Identity::Session(token) => write!(f, "session:{token}"),
        }
    }
}

/// Trim a client-supplied session token. Empty tokens count as absent.
pub fn normalize_session_token(raw: &str) -> Result<Option<String>, CoreError> {
    let token = raw.trim();
    if token.is_empty() {
        return Ok(None);
    }
    if token.len() > MAX_SESSION_TOKEN_LENGTH {
        return Err(CoreError::Validation(format!(
            "Session token exceeds maximum length of {MAX_SESSION_TOKEN_LENGTH} characters"
        )));
    }
    if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(CoreError::Validation(
            "Session token must not contain whitespace or control characters".to_string(),
        ));
    }
    Ok(Some(token.to_string()))
}

/// Generate a fresh opaque session token.
pub fn generate_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/* --------------------------------------------------------------------------
Client IP
-------------------------------------------------------------------------- */

/// Best-effort client IP: the first `X-Forwarded-For` entry, then the socket
/// peer address, then [`UNKNOWN_IP`].
///
/// A forwarded entry that is not an IP address is ignored, so a client can
/// never pick the [`UNKNOWN_IP`] sentinel for itself.
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .and_then(|entry| entry.trim().parse::<IpAddr>().ok())
        .or(peer)
        .map(|ip| canonical_ip(ip).to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Collapse IPv4-mapped IPv6 addresses to their IPv4 form.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

/* --------------------------------------------------------------------------
Trusted networks
-------------------------------------------------------------------------- */

/// A single CIDR range such as `10.0.0.0/8` or `::1/128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRange {
    network: IpAddr,
    prefix: u8,
}

impl IpRange {
    /// Parse `addr/prefix` or a bare address (treated as a single host).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        let (addr_part, prefix_part) = match raw.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (raw, None),
        };

        let network: IpAddr = addr_part
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid network address '{raw}'")))?;
        let max_prefix = max_prefix(&network);

        let prefix = match prefix_part {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= max_prefix)
                .ok_or_else(|| CoreError::Validation(format!("Invalid prefix in '{raw}'")))?,
            None => max_prefix,
        };

        Ok(Self { network, prefix })
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = canonical_ip(ip);
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                prefix_match(u32::from(net) as u128, u32::from(addr) as u128, self.prefix, 32)
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                prefix_match(u128::from(net), u128::from(addr), self.prefix, 128)
            }
            _ => false,
        }
    }
}

fn max_prefix(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn prefix_match(net: u128, addr: u128, prefix: u8, bits: u8) -> bool {
    if prefix == 0 {
        return true;
    }
    let shift = u32::from(bits - prefix);
    (net >> shift) == (addr >> shift)
}

/// Policy object deciding which client addresses may reach admin routes.
///
/// An empty policy trusts every origin; admin routes are still protected by
/// the admin role check.
#[derive(Debug, Clone, Default)]
pub struct TrustedNetworks {
    ranges: Vec<IpRange>,
}

impl TrustedNetworks {
    /// Parse a comma-separated list of CIDR ranges.
    pub fn parse(list: &str) -> Result<Self, CoreError> {
        let ranges = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(IpRange::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether a normalized client IP string is trusted.
    ///
    /// Unparseable addresses (including [`UNKNOWN_IP`]) are only trusted when
    /// the policy is empty.
    pub fn allows(&self, client_ip: &str) -> bool {
        if self.ranges.is_empty() {
            return true;
        }
        match client_ip.parse::<IpAddr>() {
            Ok(ip) => self.ranges.iter().any(|r| r.contains(ip)),
            Err(_) => false,
        }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
