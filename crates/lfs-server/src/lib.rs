//! HTTP server for lfs-meta.
//!
//! Thin glue over [`lfs_store::MetaStore`]: the lock API used by
//! large-file clients plus object metadata endpoints. Request parsing and
//! response rendering live here; all invariants live in the store.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod locks;
pub mod objects;
pub mod router;
pub mod server;
pub mod state;
pub mod wire;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::LfsServer;
pub use state::AppState;
