//! Object metadata store over the `objects` partition.

use lfs_types::{ObjectRecord, PutOutcome};
use redb::ReadableTable;
use tracing::debug;

use crate::codec::{decode, encode};
use crate::engine::{read_table, write_table, OBJECTS};
use crate::error::{StoreError, StoreResult};
use crate::store::MetaStore;

impl MetaStore {
    /// Look up the record for `oid` after checking `authorization`.
    pub fn get_object(&self, oid: &str, authorization: &str) -> StoreResult<ObjectRecord> {
        if !self.authenticate(authorization) {
            return Err(StoreError::Auth);
        }
        self.get_object_unchecked(oid)
    }

    /// Look up the record for `oid` without authenticating.
    ///
    /// Only for callers that have already authenticated the request.
    pub fn get_object_unchecked(&self, oid: &str) -> StoreResult<ObjectRecord> {
        self.engine.view(|txn| {
            let table = read_table(txn, OBJECTS)?;
            let value = table.get(oid)?;
            match value {
                Some(bytes) => decode(bytes.value()),
                None => Err(StoreError::ObjectNotFound(oid.to_string())),
            }
        })
    }

    /// Store `{oid, size}` after checking `authorization`.
    ///
    /// If `oid` is already present nothing is written and the stored record
    /// comes back as [`PutOutcome::AlreadyExists`], size untouched.
    pub fn put_object(&self, oid: &str, size: i64, authorization: &str) -> StoreResult<PutOutcome> {
        if !self.authenticate(authorization) {
            return Err(StoreError::Auth);
        }

        let outcome = self.engine.update(|txn| {
            let mut table = write_table(txn, OBJECTS)?;
            let existing: Option<ObjectRecord> = match table.get(oid)? {
                Some(bytes) => Some(decode(bytes.value())?),
                None => None,
            };
            if let Some(record) = existing {
                return Ok(PutOutcome::AlreadyExists(record));
            }

            let record = ObjectRecord::new(oid, size);
            let bytes = encode(&record)?;
            table.insert(oid, bytes.as_slice())?;
            Ok(PutOutcome::Created(record))
        })?;

        debug!(oid, size, existing = outcome.is_existing(), "object metadata put");
        Ok(outcome)
    }

    /// Remove the record for `oid` after checking `authorization`. Removing
    /// an absent oid is not an error.
    pub fn delete_object(&self, oid: &str, authorization: &str) -> StoreResult<()> {
        if !self.authenticate(authorization) {
            return Err(StoreError::Auth);
        }
        let existed = self.engine.update(|txn| {
            let mut table = write_table(txn, OBJECTS)?;
            let removed = table.remove(oid)?.is_some();
            Ok(removed)
        })?;
        debug!(oid, existed, "object metadata deleted");
        Ok(())
    }

    /// Every object record, in oid order.
    pub fn objects(&self) -> StoreResult<Vec<ObjectRecord>> {
        self.engine.view(|txn| {
            let table = read_table(txn, OBJECTS)?;
            let mut records = Vec::new();
            for item in table.iter()? {
                let (_, bytes) = item?;
                records.push(decode(bytes.value())?);
            }
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{AuthConfig, BasicCredentials};
    use crate::error::StoreError;
    use crate::testutil::temp_store;
    use lfs_types::ObjectRecord;

    fn alice() -> String {
        BasicCredentials {
            user: "alice".into(),
            pass: "pw".into(),
        }
        .to_header()
    }

    #[test]
    fn put_then_get() {
        let (_dir, store) = temp_store(AuthConfig::default());
        store.add_user("alice", "pw").unwrap();

        let outcome = store.put_object("abc123", 2048, &alice()).unwrap();
        assert!(!outcome.is_existing());
        assert_eq!(outcome.record(), &ObjectRecord::new("abc123", 2048));

        let got = store.get_object("abc123", &alice()).unwrap();
        assert_eq!(got, ObjectRecord::new("abc123", 2048));
    }

    #[test]
    fn second_put_reports_existing_and_keeps_size() {
        let (_dir, store) = temp_store(AuthConfig::public());
        store.put_object("abc123", 10, "").unwrap();

        let again = store.put_object("abc123", 99, "").unwrap();
        assert!(again.is_existing());
        assert_eq!(again.record().size, 10);
        assert_eq!(store.get_object_unchecked("abc123").unwrap().size, 10);
    }

    #[test]
    fn missing_oid_is_not_found() {
        let (_dir, store) = temp_store(AuthConfig::public());
        let err = store.get_object("nope", "").unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound(ref oid) if oid == "nope"));
    }

    #[test]
    fn bad_credentials_are_rejected_before_any_access() {
        let (_dir, store) = temp_store(AuthConfig::default());
        store.add_user("alice", "pw").unwrap();

        assert!(matches!(store.put_object("x", 1, "Basic bad"), Err(StoreError::Auth)));
        assert!(store.objects().unwrap().is_empty());

        store.put_object("x", 1, &alice()).unwrap();
        assert!(matches!(store.get_object("x", ""), Err(StoreError::Auth)));
        assert!(matches!(store.delete_object("x", ""), Err(StoreError::Auth)));
        assert_eq!(store.objects().unwrap().len(), 1);
    }

    #[test]
    fn unchecked_get_skips_the_gate() {
        let (_dir, store) = temp_store(AuthConfig::default());
        store.add_user("alice", "pw").unwrap();
        store.put_object("x", 5, &alice()).unwrap();
        assert_eq!(store.get_object_unchecked("x").unwrap().size, 5);
    }

    #[test]
    fn delete_removes_and_tolerates_absence() {
        let (_dir, store) = temp_store(AuthConfig::public());
        store.put_object("x", 5, "").unwrap();
        store.delete_object("x", "").unwrap();
        assert!(store.get_object("x", "").unwrap_err().is_not_found());
        store.delete_object("x", "").unwrap();
    }

    #[test]
    fn objects_lists_in_oid_order() {
        let (_dir, store) = temp_store(AuthConfig::public());
        store.put_object("bbb", 2, "").unwrap();
        store.put_object("aaa", 1, "").unwrap();
        let oids: Vec<String> = store.objects().unwrap().into_iter().map(|r| r.oid).collect();
        assert_eq!(oids, ["aaa", "bbb"]);
    }
}
