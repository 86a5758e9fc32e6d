//! Error taxonomy and HTTP mapping for API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::oracle::OracleError;

/// Failures from ledger operations and queries. Validation errors are
/// raised before any storage access; domain-rule errors after a read but
/// before any mutation. Nothing is ever partially committed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("insufficient shares")]
    InsufficientShares,
    #[error("no position in ticker")]
    NoPosition,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InsufficientFunds => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient funds".to_string())
            }
            Self::InsufficientShares => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient shares".to_string())
            }
            Self::NoPosition => {
                (StatusCode::UNPROCESSABLE_ENTITY, "no position in ticker".to_string())
            }
            Self::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Oracle(OracleError::RateLimited) => (
                StatusCode::TOO_MANY_REQUESTS,
                "market data provider rate limited, retry later".to_string(),
            ),
            Self::Oracle(err @ OracleError::QuoteUnavailable { .. }) => {
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            Self::Db(err) => {
                tracing::error!("database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            Self::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, axum::Json(json!({ "error": error }))).into_response()
    }
}
