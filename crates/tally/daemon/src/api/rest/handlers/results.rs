//! Live results handler.

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use serde::Serialize;
use tally_storage::{AuditRecord, Tally};

/// Results payload.
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub meta: ResultsMeta,
    pub data: ResultsData,
}

/// Which replica served this request.
#[derive(Debug, Serialize)]
pub struct ResultsMeta {
    pub pod_id: String,
}

/// The merged snapshot: live tally plus the recent audit window.
#[derive(Debug, Serialize)]
pub struct ResultsData {
    pub votes: Tally,
    pub logs: Vec<AuditRecord>,
}

/// Return the current tally and the most recent audit entries. An all-zero
/// tally is a success, not an error.
pub async fn get_results(State(state): State<AppState>) -> ApiResult<Json<ResultsResponse>> {
    let snapshot = state.view.snapshot().await?;

    Ok(Json(ResultsResponse {
        meta: ResultsMeta {
            pod_id: state.pod_id.clone(),
        },
        data: ResultsData {
            votes: snapshot.tally,
            logs: snapshot.recent_audit,
        },
    }))
}
