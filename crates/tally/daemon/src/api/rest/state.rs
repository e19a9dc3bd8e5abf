//! Application state for API handlers.

use crate::ballot::{ResultsView, VoteLedger};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Write path
    pub ledger: Arc<VoteLedger>,

    /// Read path
    pub view: Arc<ResultsView>,

    /// Identity of this replica, reported in every results payload
    pub pod_id: String,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(ledger: Arc<VoteLedger>, view: Arc<ResultsView>, pod_id: impl Into<String>) -> Self {
        Self {
            ledger,
            view,
            pod_id: pod_id.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string.
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
