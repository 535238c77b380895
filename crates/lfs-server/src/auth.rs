//! Request authentication for the lock endpoints.
//!
//! Lock operations need the caller's identity as the lock owner, so the
//! Basic credential is decoded and checked once per request here, before
//! the lock manager is consulted.

use axum::http::{header, HeaderMap};
use lfs_store::BasicCredentials;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// The raw `Authorization` header value, or `""` when absent.
pub fn authorization(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Resolve the authenticated user name or fail with 403.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> ServerResult<String> {
    let creds = BasicCredentials::parse(&authorization(headers)).ok_or(ServerError::Forbidden)?;
    let BasicCredentials { user, pass } = creds;

    let name = user.clone();
    let valid = state
        .run(move |store| Ok(store.validate_user(&user, &pass)))
        .await?;
    if valid {
        Ok(name)
    } else {
        tracing::warn!(user = %name, "lock request with invalid credentials");
        Err(ServerError::Forbidden)
    }
}
