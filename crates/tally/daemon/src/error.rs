//! Error types for the tally daemon.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tally_storage::StorageError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write-path errors returned by the vote ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Candidate identifier outside the fixed set. No I/O was performed.
    #[error("invalid candidate `{0}`")]
    InvalidCandidate(String),

    /// Vote write failed; the acknowledgement is withheld.
    #[error("vote write failed: {0}")]
    Persistence(#[from] StorageError),
}

/// Read-path errors returned by the aggregation view.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Either underlying query failed; no partial snapshot is produced.
    #[error("snapshot failed: {0}")]
    Connectivity(#[from] StorageError),
}

/// API-level errors mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client fault: bad candidate identifier
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vote write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Store unreachable or pool exhausted during a read
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidCandidate(_) => {
                ApiError::Validation("Invalid candidate".to_string())
            }
            LedgerError::Persistence(e) => ApiError::Persistence(e.to_string()),
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Connectivity(e) => ApiError::Connectivity(e.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // End users get a generic message per fault class; the underlying
        // cause goes to server-side diagnostics only.
        let (status, message) = match &self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Vote could not be recorded".to_string(),
            ),
            ApiError::Connectivity(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            status: "error",
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::Validation("Invalid candidate".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );

        assert_eq!(
            ApiError::Persistence("insert failed".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        assert_eq!(
            ApiError::Connectivity("pool exhausted".to_string())
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn invalid_candidate_maps_to_the_client_message() {
        let api: ApiError = LedgerError::InvalidCandidate("gcp".to_string()).into();
        match api {
            ApiError::Validation(message) => assert_eq!(message, "Invalid candidate"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_failure_maps_to_connectivity() {
        let api: ApiError =
            SnapshotError::Connectivity(StorageError::Connection("down".to_string())).into();
        assert!(matches!(api, ApiError::Connectivity(_)));
    }
}
