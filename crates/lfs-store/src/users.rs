//! Credential store over the `users` partition.

use lfs_types::User;
use redb::ReadableTable;
use tracing::debug;

use crate::engine::{read_table, write_table, USERS};
use crate::error::StoreResult;
use crate::store::MetaStore;
use crate::traits::CredentialLookup;

impl MetaStore {
    /// Insert or overwrite the secret for `name`.
    pub fn add_user(&self, name: &str, secret: &str) -> StoreResult<()> {
        self.engine.update(|txn| {
            let mut table = write_table(txn, USERS)?;
            table.insert(name, secret)?;
            Ok(())
        })?;
        debug!(user = name, "user stored");
        Ok(())
    }

    /// Remove `name`. Removing an absent user is not an error.
    pub fn delete_user(&self, name: &str) -> StoreResult<()> {
        let existed = self.engine.update(|txn| {
            let mut table = write_table(txn, USERS)?;
            let removed = table.remove(name)?.is_some();
            Ok(removed)
        })?;
        debug!(user = name, existed, "user removed");
        Ok(())
    }

    /// All users, in partition order.
    pub fn users(&self) -> StoreResult<Vec<User>> {
        self.engine.view(|txn| {
            let table = read_table(txn, USERS)?;
            let mut users = Vec::new();
            for item in table.iter()? {
                let (name, secret) = item?;
                users.push(User::new(name.value(), secret.value()));
            }
            Ok(users)
        })
    }
}

impl CredentialLookup for MetaStore {
    fn secret(&self, user: &str) -> StoreResult<Option<String>> {
        self.engine.view(|txn| {
            let table = read_table(txn, USERS)?;
            let secret = table.get(user)?.map(|v| v.value().to_string());
            Ok(secret)
        })
    }
}
