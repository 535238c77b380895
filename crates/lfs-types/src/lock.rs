use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lock identifier drawn from a monotonically increasing sequence.
///
/// Ids are never reused, so an id doubles as a stable pagination cursor.
/// Persisted keys use the big-endian encoding from [`LockId::to_key`] so
/// that lexicographic key order equals ascending numeric order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LockId(pub u64);

impl LockId {
    /// The start of the id keyspace.
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The cursor that resumes iteration just after this id.
    pub fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// 8-byte big-endian key.
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::Debug for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockId({:x})", self.0)
    }
}

impl FromStr for LockId {
    type Err = TypeError;

    /// Parse the hexadecimal wire form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| TypeError::InvalidHex(s.to_string()))
    }
}

impl From<u64> for LockId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// An exclusive lock on a repository path.
///
/// At most one live lock exists per path. Locks are read-only once
/// created and are destroyed only by an explicit delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub id: LockId,
    pub path: String,
    pub owner: String,
    pub locked_at: DateTime<Utc>,
}

impl Lock {
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

/// One page of a lock listing.
///
/// When `has_more` is set, `next_cursor` is the id just after the last
/// returned lock; otherwise it echoes the requested cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockPage {
    pub locks: Vec<Lock>,
    pub next_cursor: LockId,
    pub has_more: bool,
}
