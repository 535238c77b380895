use serde::{Deserialize, Serialize};

/// Metadata for a content-addressed object.
///
/// The `oid` is the identity key. Records are immutable once stored
/// except for full replacement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Content identifier (typically a hex SHA-256 digest).
    pub oid: String,
    /// Object size in bytes.
    pub size: i64,
}

impl ObjectRecord {
    pub fn new(oid: impl Into<String>, size: i64) -> Self {
        Self {
            oid: oid.into(),
            size,
        }
    }
}

/// Result of writing object metadata.
///
/// A write that finds the oid already present performs no mutation and
/// reports the stored record as [`PutOutcome::AlreadyExists`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was written by this call.
    Created(ObjectRecord),
    /// The oid was already present; the stored record is returned untouched.
    AlreadyExists(ObjectRecord),
}

impl PutOutcome {
    /// The record as it now exists in the store.
    pub fn record(&self) -> &ObjectRecord {
        match self {
            Self::Created(r) | Self::AlreadyExists(r) => r,
        }
    }

    pub fn into_record(self) -> ObjectRecord {
        match self {
            Self::Created(r) | Self::AlreadyExists(r) => r,
        }
    }

    /// Returns `true` if no new data was written.
    pub fn is_existing(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
