use tempfile::TempDir;

use crate::auth::AuthConfig;
use crate::store::MetaStore;

/// Open a store in a fresh temporary directory. Keep the `TempDir` alive
/// for as long as the store is used.
pub(crate) fn temp_store(auth: AuthConfig) -> (TempDir, MetaStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = MetaStore::open(&dir.path().join("lfs.db"), auth).expect("open store");
    (dir, store)
}
