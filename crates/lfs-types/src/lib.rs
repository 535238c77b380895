//! Foundation types for lfs-meta.
//!
//! This crate provides the records tracked by the metadata and locking
//! backend of a large-file versioning server. Every other lfs-meta crate
//! depends on `lfs-types`.
//!
//! # Key Types
//!
//! - [`User`] — Credential record keyed by user name
//! - [`ObjectRecord`] — Metadata for a content-addressed object (oid, size)
//! - [`PutOutcome`] — Whether a metadata write created a record or found one
//! - [`Lock`] — Exclusive path lock held by an owner
//! - [`LockId`] — Monotonic lock identifier, rendered as hexadecimal
//! - [`LockPage`] — One page of a cursor-paginated lock listing

pub mod error;
pub mod lock;
pub mod object;
pub mod user;

pub use error::TypeError;
pub use lock::{Lock, LockId, LockPage};
pub use object::{ObjectRecord, PutOutcome};
pub use user::User;
