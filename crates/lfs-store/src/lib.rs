//! Lock and metadata store for lfs-meta.
//!
//! Durable records for users, object metadata, and exclusive path locks,
//! persisted in a single [redb](https://docs.rs/redb) file.
//!
//! # Components
//!
//! - [`Engine`] -- file-backed ordered key-value engine adapter: partitions,
//!   read/write transactions, forward cursors, per-partition sequences
//! - credential store -- `users` partition (`MetaStore::add_user` and friends)
//! - object metadata store -- `objects` partition, gated by [`AuthGate`]
//! - lock manager -- `locks` and `lockPaths` partitions kept in lockstep
//! - [`AuthGate`] -- stateless allow/deny predicate over an [`AuthConfig`]
//!
//! # Design Rules
//!
//! 1. Every operation runs in exactly one engine transaction.
//! 2. Writes are all-or-nothing: any error rolls the transaction back.
//! 3. The two lock partitions are never mutated separately.
//! 4. Lock ids come from a sequence that only increases; ids are never reused.
//! 5. No retries above the engine: contending writers queue inside redb.
//! 6. Infrastructure errors are propagated, never swallowed.

pub mod auth;
mod codec;
pub mod engine;
pub mod error;
pub mod locks;
mod objects;
mod pattern;
pub mod store;
pub mod traits;
mod users;

#[cfg(test)]
mod testutil;

pub use auth::{AdminCredential, AuthConfig, AuthGate, BasicCredentials};
pub use engine::Engine;
pub use error::{StoreError, StoreResult};
pub use locks::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
pub use store::MetaStore;
pub use traits::CredentialLookup;
