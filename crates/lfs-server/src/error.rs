use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lfs_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

use crate::wire::{lfs_json, ErrorBody, LockJson};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(err) if err.is_fatal() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::FORBIDDEN,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = Uuid::now_v7().to_string();

        if status.is_server_error() {
            tracing::error!(%request_id, error = %self, "request failed");
        } else {
            tracing::debug!(%request_id, status = status.as_u16(), error = %self, "request rejected");
        }

        let message = if status.is_server_error() || matches!(self, Self::BadRequest(_)) {
            self.to_string()
        } else {
            status.canonical_reason().unwrap_or("error").to_string()
        };
        let lock = match &self {
            Self::Store(StoreError::Duplicate(existing)) => Some(LockJson::from(&**existing)),
            _ => None,
        };

        lfs_json(
            status,
            &ErrorBody {
                message,
                request_id,
                lock,
            },
        )
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
