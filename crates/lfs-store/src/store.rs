use std::path::Path;

use crate::auth::{AuthConfig, AuthGate};
use crate::engine::Engine;
use crate::error::StoreResult;

/// Metadata and lock store backed by a single redb file.
///
/// Holds user credentials, object metadata, and path locks. The store is
/// synchronous; every operation runs in its own engine transaction.
/// Operations are split across modules:
///
/// - credentials: [`add_user`](Self::add_user), [`delete_user`](Self::delete_user),
///   [`users`](Self::users)
/// - object metadata: [`get_object`](Self::get_object),
///   [`put_object`](Self::put_object), [`delete_object`](Self::delete_object)
/// - locks: [`lock_add`](Self::lock_add), [`lock_delete`](Self::lock_delete),
///   [`lock_list`](Self::lock_list), [`lock_get`](Self::lock_get)
#[derive(Debug)]
pub struct MetaStore {
    pub(crate) engine: Engine,
    gate: AuthGate,
}

impl MetaStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path, auth: AuthConfig) -> StoreResult<Self> {
        Ok(Self {
            engine: Engine::open(path)?,
            gate: AuthGate::new(auth),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Check an `Authorization` header value against the gate.
    pub fn authenticate(&self, authorization: &str) -> bool {
        self.gate.authenticate(authorization, self)
    }

    /// Check a decoded `(user, pass)` pair. Used by lock endpoints, which
    /// resolve the owner identity once per request.
    pub fn validate_user(&self, user: &str, pass: &str) -> bool {
        self.gate.validate(user, pass, self)
    }
}
