//! Object metadata handlers. Authentication happens inside the store from
//! the raw `Authorization` header.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::auth::authorization;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use crate::wire::{lfs_json, ObjectResponse, PutObjectRequest};

/// `GET /{user}/{repo}/objects/{oid}` -- 200, 403 or 404.
pub async fn get_object(
    State(state): State<AppState>,
    Path((_user, _repo, oid)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let auth = authorization(&headers);
    let record = state
        .run(move |store| store.get_object(&oid, &auth))
        .await?;
    Ok(lfs_json(StatusCode::OK, &ObjectResponse::from(record)))
}

/// `POST /{user}/{repo}/objects` -- 201 when created, 200 when present.
pub async fn put_object(
    State(state): State<AppState>,
    Path((_user, _repo)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let auth = authorization(&headers);
    let request: PutObjectRequest =
        serde_json::from_slice(&body).map_err(|e| ServerError::BadRequest(e.to_string()))?;
    if request.oid.is_empty() || request.size < 0 {
        return Err(ServerError::BadRequest("invalid oid or size".into()));
    }

    let outcome = state
        .run(move |store| store.put_object(&request.oid, request.size, &auth))
        .await?;
    let status = if outcome.is_existing() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok(lfs_json(status, &ObjectResponse::from(outcome.into_record())))
}

/// `DELETE /{user}/{repo}/objects/{oid}` -- 204 or 403.
pub async fn delete_object(
    State(state): State<AppState>,
    Path((_user, _repo, oid)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let auth = authorization(&headers);
    state
        .run(move |store| store.delete_object(&oid, &auth))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
