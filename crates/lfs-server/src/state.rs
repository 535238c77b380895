use std::sync::Arc;

use lfs_store::{MetaStore, StoreResult};

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetaStore>,
}

impl AppState {
    pub fn new(store: Arc<MetaStore>) -> Self {
        Self { store }
    }

    /// Run a store call on the blocking pool. The engine is synchronous
    /// and may wait on disk or on another writer.
    pub async fn run<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&MetaStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(result?)
    }
}
