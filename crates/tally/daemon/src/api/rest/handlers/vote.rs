//! Vote ingestion handler.

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{ConnectInfo, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Cast vote request.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub candidate: String,
}

/// Cast vote response.
#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub status: &'static str,
}

/// Record one vote. The client address goes into the audit message only; it
/// is never validated or used for deduplication, so repeat votes from one
/// origin count independently.
pub async fn cast_vote(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    Json(request): Json<CastVoteRequest>,
) -> ApiResult<Json<CastVoteResponse>> {
    let candidate = state
        .ledger
        .cast_vote(&request.candidate, Some(client))
        .await?;

    tracing::info!(candidate = %candidate, client = %client, "vote recorded");

    Ok(Json(CastVoteResponse { status: "success" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::state::AppState;
    use crate::ballot::{ResultsView, VoteLedger};
    use crate::error::ApiError;
    use axum::response::IntoResponse;
    use std::sync::Arc;
    use tally_storage::memory::InMemoryBallotStorage;
    use tally_storage::VoteStore;

    fn test_state() -> (Arc<InMemoryBallotStorage>, AppState) {
        let storage = Arc::new(InMemoryBallotStorage::new());
        let ledger = Arc::new(VoteLedger::new(storage.clone(), "pod-test"));
        let view = Arc::new(ResultsView::new(storage.clone(), 10));
        (storage.clone(), AppState::new(ledger, view, "pod-test"))
    }

    fn client() -> ConnectInfo<SocketAddr> {
        ConnectInfo("127.0.0.1:5000".parse().unwrap())
    }

    #[tokio::test]
    async fn valid_vote_returns_success_body() {
        let (storage, state) = test_state();

        let response = cast_vote(
            State(state),
            client(),
            Json(CastVoteRequest {
                candidate: "aws".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.status, "success");
        assert_eq!(storage.tally().await.unwrap().aws, 1);
    }

    #[tokio::test]
    async fn unknown_candidate_is_a_client_error() {
        let (storage, state) = test_state();

        let result = cast_vote(
            State(state),
            client(),
            Json(CastVoteRequest {
                candidate: "gcp".to_string(),
            }),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid candidate");

        assert_eq!(storage.tally().await.unwrap().total, 0);
    }
}
