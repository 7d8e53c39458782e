use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analytics::SettlementError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Failures of ledger operations on a staging buffer.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error("wager {0} not found")]
    WagerNotFound(i64),

    #[error("wager {id} is already settled as {status}")]
    AlreadySettled { id: i64, status: String },

    #[error("invalid wager: {0}")]
    InvalidWager(String),

    #[error("invalid cash transaction: {0}")]
    InvalidCash(String),

    #[error("invalid identity {0:?}: use 1-64 letters, digits, '-' or '_'")]
    InvalidIdentity(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, format!("Store unavailable: {msg}"))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Store(e) => AppError::StoreUnavailable(e.to_string()),
            // A table in the store that cannot be decoded blocks every read.
            LedgerError::Schema(e) => AppError::StoreUnavailable(e.to_string()),
            LedgerError::WagerNotFound(_) => AppError::NotFound(e.to_string()),
            LedgerError::AlreadySettled { .. } => AppError::Conflict(e.to_string()),
            LedgerError::Settlement(_)
            | LedgerError::InvalidWager(_)
            | LedgerError::InvalidCash(_)
            | LedgerError::InvalidIdentity(_) => AppError::BadRequest(e.to_string()),
        }
    }
}
