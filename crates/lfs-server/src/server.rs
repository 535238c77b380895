use std::sync::Arc;

use lfs_store::MetaStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Lock and metadata HTTP server.
pub struct LfsServer {
    config: ServerConfig,
    store: Arc<MetaStore>,
}

impl LfsServer {
    /// Open the database named in `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = MetaStore::open(&config.db_path, config.auth.clone())?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Serve an already-open store.
    pub fn with_store(config: ServerConfig, store: Arc<MetaStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<MetaStore> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.store)))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            db = %self.config.db_path.display(),
            public = self.config.auth.public,
            "lfs server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
