//! Lock manager.
//!
//! Locks live in two partitions that always change together inside one
//! write transaction:
//!
//! - `locks` keyed by the big-endian id, iterated for listing
//! - `lockPaths` keyed by path, consulted for uniqueness
//!
//! Ids come from the `locks` sequence, drawn in the same transaction as the
//! insert. Because ids only increase and are never reused, a cursor handed
//! out by [`MetaStore::lock_list`] stays valid across later mutations.
//!
//! The lock manager does not authenticate; callers resolve the owner first.

use chrono::Utc;
use lfs_types::{Lock, LockId, LockPage};
use redb::{ReadableTable, ReadableTableMetadata};
use tracing::debug;

use crate::codec::{decode, encode};
use crate::engine::{next_sequence, read_table, write_table, Cursor, LOCKS, LOCK_PATHS};
use crate::error::{StoreError, StoreResult};
use crate::pattern::PathFilter;
use crate::store::MetaStore;

/// Smallest and largest page size accepted by [`MetaStore::lock_list`].
pub const MIN_PAGE_SIZE: usize = 1;
pub const MAX_PAGE_SIZE: usize = 100;

const LOCK_SEQUENCE: &str = "locks";

impl MetaStore {
    /// Lock `path` for `owner`.
    ///
    /// Fails with [`StoreError::Duplicate`] carrying the current holder if
    /// the path is already locked, including by the same owner. The check,
    /// the id draw and both writes happen in one write transaction.
    pub fn lock_add(&self, path: &str, owner: &str) -> StoreResult<Lock> {
        let lock = self.engine.update(|txn| {
            let mut paths = write_table(txn, LOCK_PATHS)?;
            let holder: Option<Lock> = match paths.get(path)? {
                Some(bytes) => Some(decode(bytes.value())?),
                None => None,
            };
            if let Some(existing) = holder {
                return Err(StoreError::Duplicate(Box::new(existing)));
            }

            let id = LockId::new(next_sequence(txn, LOCK_SEQUENCE)?);
            let lock = Lock {
                id,
                path: path.to_string(),
                owner: owner.to_string(),
                locked_at: Utc::now(),
            };
            let bytes = encode(&lock)?;

            let mut ids = write_table(txn, LOCKS)?;
            let key = id.to_key();
            ids.insert(key.as_slice(), bytes.as_slice())?;
            paths.insert(path, bytes.as_slice())?;
            Ok(lock)
        })?;

        debug!(id = %lock.id, path, owner, "lock created");
        Ok(lock)
    }

    /// Delete lock `id` and return it.
    ///
    /// Unless `force` is set, `owner` must match the holder; otherwise
    /// [`StoreError::Unauthorized`] is returned and nothing changes.
    pub fn lock_delete(&self, id: LockId, owner: &str, force: bool) -> StoreResult<Lock> {
        let lock = self.engine.update(|txn| {
            let mut ids = write_table(txn, LOCKS)?;
            let key = id.to_key();
            let lock: Lock = match ids.get(key.as_slice())? {
                Some(bytes) => decode(bytes.value())?,
                None => return Err(StoreError::LockNotFound(id)),
            };

            if !force && !lock.is_owned_by(owner) {
                return Err(StoreError::Unauthorized {
                    id,
                    owner: owner.to_string(),
                });
            }

            ids.remove(key.as_slice())?;
            let mut paths = write_table(txn, LOCK_PATHS)?;
            paths.remove(lock.path.as_str())?;
            Ok(lock)
        })?;

        debug!(id = %lock.id, path = %lock.path, by = owner, force, "lock deleted");
        Ok(lock)
    }

    /// List locks in ascending id order starting at `cursor` (inclusive).
    ///
    /// `limit` is clamped to `[1, 100]`. With a non-empty `pattern`, only
    /// locks whose path glob-matches are returned, and skipped locks do not
    /// count against `limit`. When the page fills up with entries left
    /// over, `has_more` is set and `next_cursor` is the id after the last
    /// returned lock; otherwise `next_cursor` echoes `cursor`.
    pub fn lock_list(&self, pattern: &str, cursor: LockId, limit: usize) -> StoreResult<LockPage> {
        let limit = limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let filter = PathFilter::new(pattern);

        self.engine.view(|txn| {
            let table = read_table(txn, LOCKS)?;
            let mut scan = Cursor::new(&table);
            let mut locks = Vec::new();

            let mut entry = scan.seek(&cursor.to_key())?;
            while let Some((_, value)) = &entry {
                if locks.len() == limit {
                    break;
                }
                let lock: Lock = decode(value)?;
                if filter.accepts(&lock.path) {
                    locks.push(lock);
                }
                entry = scan.next_entry()?;
            }

            let has_more = entry.is_some();
            let next_cursor = match locks.last() {
                Some(last) if has_more => last.id.successor(),
                _ => cursor,
            };
            Ok(LockPage {
                locks,
                next_cursor,
                has_more,
            })
        })
    }

    /// Fetch a single lock by id.
    pub fn lock_get(&self, id: LockId) -> StoreResult<Lock> {
        self.engine.view(|txn| {
            let table = read_table(txn, LOCKS)?;
            let key = id.to_key();
            let value = table.get(key.as_slice())?;
            match value {
                Some(bytes) => decode(bytes.value()),
                None => Err(StoreError::LockNotFound(id)),
            }
        })
    }

    /// Fetch the lock held on `path`, if any.
    pub fn lock_for_path(&self, path: &str) -> StoreResult<Option<Lock>> {
        self.engine.view(|txn| {
            let table = read_table(txn, LOCK_PATHS)?;
            let value = table.get(path)?;
            match value {
                Some(bytes) => Ok(Some(decode(bytes.value())?)),
                None => Ok(None),
            }
        })
    }

    /// Number of live locks.
    pub fn lock_count(&self) -> StoreResult<u64> {
        self.engine.view(|txn| Ok(read_table(txn, LOCKS)?.len()?))
    }
}
