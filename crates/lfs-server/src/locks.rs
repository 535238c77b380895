//! Lock API handlers.
//!
//! Every route authenticates the Basic credential first; the resolved user
//! becomes the lock owner.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use lfs_store::{StoreError, MAX_PAGE_SIZE};
use lfs_types::{Lock, LockId};
use serde::de::DeserializeOwned;

use crate::auth::require_user;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use crate::wire::{
    lfs_json, CreateLockRequest, DeleteLockRequest, ListLocksQuery, LockJson, LockListResponse,
    LockResponse, VerifyLocksRequest, VerifyLocksResponse,
};

fn json_body<T: DeserializeOwned>(body: &Bytes) -> ServerResult<T> {
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Unparseable or missing cursors restart from the beginning.
fn parse_cursor(raw: Option<&str>) -> LockId {
    raw.and_then(|c| c.parse().ok()).unwrap_or(LockId::ZERO)
}

/// Page size requested by the client.
///
/// An absent `limit` asks for a full page rather than the one-lock minimum
/// a zero would clamp to. Negative values count as zero.
fn page_limit(raw: Option<i64>) -> usize {
    match raw {
        Some(limit) => usize::try_from(limit).unwrap_or(0),
        None => MAX_PAGE_SIZE,
    }
}

fn lock_list(locks: &[Lock]) -> Vec<LockJson> {
    locks.iter().map(LockJson::from).collect()
}

/// `POST /{user}/{repo}/locks` -- 201, 400, 403 or 409.
pub async fn create_lock(
    State(state): State<AppState>,
    Path((_user, _repo)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let owner = require_user(&state, &headers).await?;
    let request: CreateLockRequest = json_body(&body)?;
    if request.path.is_empty() {
        return Err(ServerError::BadRequest("lock path is empty".into()));
    }

    let lock = state
        .run(move |store| store.lock_add(&request.path, &owner))
        .await?;
    Ok(lfs_json(
        StatusCode::CREATED,
        &LockResponse {
            lock: LockJson::from(&lock),
        },
    ))
}

/// `GET /{user}/{repo}/locks` -- 200, 400 or 403.
pub async fn list_locks(
    State(state): State<AppState>,
    Path((_user, _repo)): Path<(String, String)>,
    Query(query): Query<ListLocksQuery>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    require_user(&state, &headers).await?;

    if let Some(raw_id) = query.id.filter(|id| !id.is_empty()) {
        let locks = match raw_id.parse::<LockId>() {
            Ok(id) => match state.run(move |store| store.lock_get(id)).await {
                Ok(lock) => vec![lock],
                Err(ServerError::Store(StoreError::LockNotFound(_))) => Vec::new(),
                Err(err) => return Err(err),
            },
            Err(_) => Vec::new(),
        };
        return Ok(lfs_json(
            StatusCode::OK,
            &LockListResponse {
                locks: lock_list(&locks),
                next_cursor: None,
            },
        ));
    }

    let pattern = query.path.unwrap_or_default();
    let cursor = parse_cursor(query.cursor.as_deref());
    let limit = page_limit(query.limit);
    let page = state
        .run(move |store| store.lock_list(&pattern, cursor, limit))
        .await?;

    Ok(lfs_json(
        StatusCode::OK,
        &LockListResponse {
            locks: lock_list(&page.locks),
            next_cursor: page.has_more.then(|| page.next_cursor.to_string()),
        },
    ))
}

/// `POST /{user}/{repo}/locks/verify` -- 200, 400 or 403.
///
/// Splits one page of locks into those held by the caller and the rest.
pub async fn verify_locks(
    State(state): State<AppState>,
    Path((_user, _repo)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let user = require_user(&state, &headers).await?;
    let request: VerifyLocksRequest = json_body(&body)?;

    let cursor = parse_cursor(request.cursor.as_deref());
    let limit = page_limit(request.limit);
    let page = state
        .run(move |store| store.lock_list("", cursor, limit))
        .await?;

    let (ours, theirs): (Vec<Lock>, Vec<Lock>) =
        page.locks.into_iter().partition(|l| l.is_owned_by(&user));
    Ok(lfs_json(
        StatusCode::OK,
        &VerifyLocksResponse {
            ours: lock_list(&ours),
            theirs: lock_list(&theirs),
            next_cursor: page.has_more.then(|| page.next_cursor.to_string()),
        },
    ))
}

/// `POST /{user}/{repo}/locks/{id}/unlock` -- 200, 400, 403 or 404.
pub async fn unlock(
    State(state): State<AppState>,
    Path((_user, _repo, raw_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let owner = require_user(&state, &headers).await?;
    let id: LockId = raw_id
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid lock id: {raw_id}")))?;
    let request: DeleteLockRequest = if body.is_empty() {
        DeleteLockRequest::default()
    } else {
        json_body(&body)?
    };

    let lock = state
        .run(move |store| store.lock_delete(id, &owner, request.force))
        .await?;
    Ok(lfs_json(
        StatusCode::OK,
        &LockResponse {
            lock: LockJson::from(&lock),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_parsing() {
        assert_eq!(parse_cursor(None), LockId::ZERO);
        assert_eq!(parse_cursor(Some("zz")), LockId::ZERO);
        assert_eq!(parse_cursor(Some("1f")), LockId::new(31));
    }

    #[test]
    fn limit_defaults() {
        assert_eq!(page_limit(None), MAX_PAGE_SIZE);
        assert_eq!(page_limit(Some(-4)), 0);
        assert_eq!(page_limit(Some(7)), 7);
    }
}
