use lfs_types::{Lock, LockId};

/// Errors from metadata and lock store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Missing or rejected credential.
    #[error("forbidden")]
    Auth,

    /// No metadata record for the requested oid.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// No lock with the requested id.
    #[error("lock not found: {0}")]
    LockNotFound(LockId),

    /// The path is already locked. Carries the existing lock.
    #[error("path already locked: {} (lock {}, owner {})", .0.path, .0.id, .0.owner)]
    Duplicate(Box<Lock>),

    /// Delete attempted by a user who does not own the lock.
    #[error("user {owner} not allowed to delete lock {id}")]
    Unauthorized { id: LockId, owner: String },

    /// A partition the store relies on does not exist.
    #[error("bucket not found: {0}")]
    BucketMissing(String),

    /// The sequence for a partition cannot advance any further.
    #[error("sequence exhausted for {0}")]
    SequenceExhausted(String),

    /// Record encoding or decoding failure.
    #[error("codec error: {0}")]
    Codec(String),

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Infrastructure failures that callers report as server errors.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Auth
                | Self::ObjectNotFound(_)
                | Self::LockNotFound(_)
                | Self::Duplicate(_)
                | Self::Unauthorized { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_) | Self::LockNotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
