//! JSON bodies for the lock and object endpoints.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use lfs_types::{Lock, ObjectRecord};
use serde::{Deserialize, Serialize};

/// Media type used by large-file clients.
pub const LFS_MEDIA_TYPE: &str = "application/vnd.git-lfs+json";

#[derive(Debug, Deserialize)]
pub struct CreateLockRequest {
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListLocksQuery {
    pub path: Option<String>,
    pub id: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyLocksRequest {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteLockRequest {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct PutObjectRequest {
    pub oid: String,
    pub size: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OwnerJson {
    pub name: String,
}

/// Wire form of a lock: hex id, RFC 3339 timestamp.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LockJson {
    pub id: String,
    pub path: String,
    pub locked_at: String,
    pub owner: OwnerJson,
}

impl From<&Lock> for LockJson {
    fn from(lock: &Lock) -> Self {
        Self {
            id: lock.id.to_string(),
            path: lock.path.clone(),
            locked_at: lock.locked_at.to_rfc3339(),
            owner: OwnerJson {
                name: lock.owner.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LockResponse {
    pub lock: LockJson,
}

#[derive(Debug, Serialize)]
pub struct LockListResponse {
    pub locks: Vec<LockJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyLocksResponse {
    pub ours: Vec<LockJson>,
    pub theirs: Vec<LockJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ObjectResponse {
    pub oid: String,
    pub size: i64,
}

impl From<ObjectRecord> for ObjectResponse {
    fn from(record: ObjectRecord) -> Self {
        Self {
            oid: record.oid,
            size: record.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockJson>,
}

/// Serialize `body` with the large-file media type.
pub fn lfs_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(LFS_MEDIA_TYPE))],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
