use crate::error::StoreResult;

/// Source of stored user secrets consulted by the [`AuthGate`].
///
/// [`MetaStore`] implements this over its `users` partition. Lookups must
/// not mutate anything.
///
/// [`AuthGate`]: crate::auth::AuthGate
/// [`MetaStore`]: crate::store::MetaStore
pub trait CredentialLookup: Send + Sync {
    /// The stored secret for `user`, or `Ok(None)` if the user is unknown.
    fn secret(&self, user: &str) -> StoreResult<Option<String>>;
}
