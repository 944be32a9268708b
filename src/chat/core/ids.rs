//! Session identifiers.
//!
//! Sessions used to be keyed by their creation time in milliseconds, which
//! collides when two sessions start within the same tick. New sessions get a
//! random UUID instead. Millisecond ids already on disk are still accepted and
//! written back as numbers, so older history keeps its entries.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: generate time-ordered `UUIDv7` values via `uuid/v7`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh UUID for a new session.
///
/// With feature `uuid_v7` enabled, this uses `Uuid::now_v7()`.
/// Otherwise it falls back to `Uuid::new_v4()`.
#[inline]
#[must_use]
fn session_uuid() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Identifier for a chat session.
///
/// Stays stable for the whole life of a session, so repeated archival of the
/// same conversation updates one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    /// Creation time in milliseconds, as stored by older history.
    Legacy(u64),
    /// Random identifier used for every new session.
    Uuid(Uuid),
}

impl Default for SessionId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SessionId {
    /// Create a new identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::Uuid(session_uuid())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy(millis) => write!(f, "{millis}"),
            Self::Uuid(uuid) => write!(f, "{uuid}"),
        }
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    /// Digits parse as a legacy id, anything else must be a UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(millis) = s.parse::<u64>() {
            return Ok(Self::Legacy(millis));
        }
        Ok(Self::Uuid(Uuid::parse_str(s)?))
    }
}
