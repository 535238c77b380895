//! Adapter over the embedded ordered key-value engine.
//!
//! The store lives in a single redb file holding four partitions plus the
//! sequence partition that backs [`next_sequence`]:
//!
//! ```text
//! users      name              -> secret
//! objects    oid               -> ObjectRecord (bincode)
//! locks      id (8-byte BE)    -> Lock (bincode)
//! lockPaths  path              -> Lock (bincode, same payload as `locks`)
//! sequences  partition name    -> last issued value
//! ```
//!
//! redb allows one writer at a time and any number of readers over
//! point-in-time snapshots. [`Engine::update`] commits on `Ok` and aborts
//! on `Err`, so no partial write is ever visible.

use std::ops::Bound;
use std::path::{Path, PathBuf};

use redb::{
    Database, Key, ReadOnlyTable, ReadTransaction, ReadableTable, Table, TableDefinition,
    TableError, TableHandle, Value, WriteTransaction,
};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

pub(crate) const USERS: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("users");

pub(crate) const OBJECTS: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("objects");

pub(crate) const LOCKS: TableDefinition<'static, &'static [u8], &'static [u8]> =
    TableDefinition::new("locks");

pub(crate) const LOCK_PATHS: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("lockPaths");

const SEQUENCES: TableDefinition<'static, &'static str, u64> = TableDefinition::new("sequences");

/// Handle to the database file.
pub struct Engine {
    db: Database,
    path: PathBuf,
}

impl Engine {
    /// Open or create the database at `path` and make sure every partition
    /// exists. Creating partitions is idempotent.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path)?;
        let engine = Self {
            db,
            path: path.to_path_buf(),
        };

        engine.update(|txn| {
            write_table(txn, USERS)?;
            write_table(txn, OBJECTS)?;
            write_table(txn, LOCKS)?;
            write_table(txn, LOCK_PATHS)?;
            write_table(txn, SEQUENCES)?;
            Ok(())
        })?;

        info!(path = %path.display(), "opened metadata database");
        Ok(engine)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a consistent read snapshot.
    pub fn view<T>(&self, f: impl FnOnce(&ReadTransaction) -> StoreResult<T>) -> StoreResult<T> {
        let txn = self.db.begin_read()?;
        f(&txn)
    }

    /// Run `f` inside a write transaction.
    ///
    /// Writers are serialized by the engine. The transaction commits when
    /// `f` returns `Ok` and is rolled back otherwise.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&WriteTransaction) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let txn = self.db.begin_write()?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = txn.abort() {
                    warn!(error = %abort_err, "failed to abort write transaction");
                }
                debug!(error = %err, "write transaction rolled back");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("path", &self.path).finish()
    }
}

fn table_error(name: &str, err: TableError) -> StoreError {
    match err {
        TableError::TableDoesNotExist(_) => StoreError::BucketMissing(name.to_string()),
        other => StoreError::Table(other),
    }
}

/// Open a partition for reading.
pub(crate) fn read_table<K: Key + 'static, V: Value + 'static>(
    txn: &ReadTransaction,
    def: TableDefinition<K, V>,
) -> StoreResult<ReadOnlyTable<K, V>> {
    txn.open_table(def).map_err(|e| table_error(def.name(), e))
}

/// Open a partition for writing.
pub(crate) fn write_table<'txn, K: Key + 'static, V: Value + 'static>(
    txn: &'txn WriteTransaction,
    def: TableDefinition<K, V>,
) -> StoreResult<Table<'txn, K, V>> {
    txn.open_table(def).map_err(|e| table_error(def.name(), e))
}

/// Draw the next value of the sequence scoped to `partition`.
///
/// The draw is part of the caller's write transaction: if that transaction
/// rolls back, so does the draw. Values start at 1 and only increase.
pub(crate) fn next_sequence(txn: &WriteTransaction, partition: &str) -> StoreResult<u64> {
    let mut table = write_table(txn, SEQUENCES)?;
    let current = table.get(partition)?.map(|v| v.value()).unwrap_or(0);
    let next = current
        .checked_add(1)
        .ok_or_else(|| StoreError::SequenceExhausted(partition.to_string()))?;
    table.insert(partition, next)?;
    Ok(next)
}

/// A key-value pair copied out of a partition.
pub(crate) type Entry = (Vec<u8>, Vec<u8>);

enum Position {
    Start,
    After(Vec<u8>),
    Exhausted,
}

/// Forward cursor over a byte-keyed partition.
///
/// [`Cursor::seek`] positions on the first key greater than or equal to the
/// given key; [`Cursor::next_entry`] moves to the key after the last one
/// returned. Each step is an ordered lookup inside the same snapshot.
pub(crate) struct Cursor<'t, T> {
    table: &'t T,
    position: Position,
}

impl<'t, T> Cursor<'t, T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    pub(crate) fn new(table: &'t T) -> Self {
        Self {
            table,
            position: Position::Start,
        }
    }

    pub(crate) fn seek(&mut self, key: &[u8]) -> StoreResult<Option<Entry>> {
        self.first_in((Bound::Included(key), Bound::Unbounded))
    }

    pub(crate) fn next_entry(&mut self) -> StoreResult<Option<Entry>> {
        match std::mem::replace(&mut self.position, Position::Exhausted) {
            Position::Start => self.first_in((Bound::Unbounded, Bound::Unbounded)),
            Position::After(last) => {
                self.first_in((Bound::Excluded(last.as_slice()), Bound::Unbounded))
            }
            Position::Exhausted => Ok(None),
        }
    }

    fn first_in(&mut self, bounds: (Bound<&[u8]>, Bound<&[u8]>)) -> StoreResult<Option<Entry>> {
        let found = match self.table.range::<&[u8]>(bounds)?.next() {
            Some(item) => {
                let (k, v) = item?;
                Some((k.value().to_vec(), v.value().to_vec()))
            }
            None => None,
        };
        self.position = match &found {
            Some((k, _)) => Position::After(k.clone()),
            None => Position::Exhausted,
        };
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        let engine = Engine::open(&dir.path().join("meta.db")).unwrap();
        (dir, engine)
    }

    fn fill(engine: &Engine, keys: &[u64]) {
        engine
            .update(|txn| {
                let mut t = write_table(txn, LOCKS)?;
                for k in keys {
                    t.insert(k.to_be_bytes().as_slice(), b"v".as_slice())?;
                }
                Ok(())
            })
            .unwrap();
    }

    fn collect_from(engine: &Engine, start: u64) -> Vec<u64> {
        engine
            .view(|txn| {
                let table = read_table(txn, LOCKS)?;
                let mut cursor = Cursor::new(&table);
                let mut out = Vec::new();
                let mut entry = cursor.seek(&start.to_be_bytes())?;
                while let Some((k, _)) = entry {
                    out.push(u64::from_be_bytes(k.try_into().unwrap()));
                    entry = cursor.next_entry()?;
                }
                Ok(out)
            })
            .unwrap()
    }

    #[test]
    fn open_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("meta.db");
        {
            let engine = Engine::open(&path).unwrap();
            fill(&engine, &[1]);
        }
        let engine = Engine::open(&path).unwrap();
        assert_eq!(collect_from(&engine, 0), vec![1]);
        assert_eq!(engine.path(), path.as_path());
    }

    #[test]
    fn seek_lands_on_key_or_next() {
        let (_dir, engine) = open_temp();
        fill(&engine, &[2, 5, 9, 300]);
        assert_eq!(collect_from(&engine, 0), vec![2, 5, 9, 300]);
        assert_eq!(collect_from(&engine, 5), vec![5, 9, 300]);
        assert_eq!(collect_from(&engine, 6), vec![9, 300]);
        assert!(collect_from(&engine, 301).is_empty());
    }

    #[test]
    fn next_without_seek_starts_at_beginning() {
        let (_dir, engine) = open_temp();
        fill(&engine, &[7, 3]);
        let first = engine
            .view(|txn| {
                let table = read_table(txn, LOCKS)?;
                let mut cursor = Cursor::new(&table);
                cursor.next_entry()
            })
            .unwrap();
        assert_eq!(first.unwrap().0, 3u64.to_be_bytes().to_vec());
    }

    #[test]
    fn sequence_is_monotonic_and_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.db");
        {
            let engine = Engine::open(&path).unwrap();
            let a = engine.update(|txn| next_sequence(txn, "locks")).unwrap();
            let b = engine.update(|txn| next_sequence(txn, "locks")).unwrap();
            assert_eq!((a, b), (1, 2));
        }
        let engine = Engine::open(&path).unwrap();
        assert_eq!(engine.update(|txn| next_sequence(txn, "locks")).unwrap(), 3);
        // Independent per partition.
        assert_eq!(engine.update(|txn| next_sequence(txn, "other")).unwrap(), 1);
    }

    #[test]
    fn rolled_back_draw_is_not_kept() {
        let (_dir, engine) = open_temp();
        let err = engine
            .update(|txn| {
                next_sequence(txn, "locks")?;
                Err::<(), _>(StoreError::Auth)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Auth));
        assert_eq!(engine.update(|txn| next_sequence(txn, "locks")).unwrap(), 1);
    }

    #[test]
    fn failed_update_leaves_no_writes() {
        let (_dir, engine) = open_temp();
        let _ = engine.update(|txn| {
            let mut t = write_table(txn, LOCKS)?;
            t.insert(1u64.to_be_bytes().as_slice(), b"v".as_slice())?;
            Err::<(), _>(StoreError::Codec("boom".into()))
        });
        assert!(collect_from(&engine, 0).is_empty());
    }

    #[test]
    fn missing_partition_is_bucket_missing() {
        let (_dir, engine) = open_temp();
        const GHOST: TableDefinition<'static, &'static str, &'static str> =
            TableDefinition::new("ghost");
        let err = engine.view(|txn| read_table(txn, GHOST).map(|_| ())).unwrap_err();
        assert!(matches!(err, StoreError::BucketMissing(ref name) if name == "ghost"));
        assert!(err.is_fatal());
    }
}
