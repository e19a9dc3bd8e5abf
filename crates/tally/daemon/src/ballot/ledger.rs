//! The write path.

use crate::error::LedgerError;
use std::net::SocketAddr;
use std::sync::Arc;
use tally_storage::{AuditAppend, AuditEventType, AuditStore, BallotStorage, Candidate, VoteStore};
use tracing::warn;

/// Validates a candidate identifier, persists one vote row, and triggers a
/// best-effort audit append.
pub struct VoteLedger {
    storage: Arc<dyn BallotStorage>,
    pod_id: String,
}

impl VoteLedger {
    pub fn new(storage: Arc<dyn BallotStorage>, pod_id: impl Into<String>) -> Self {
        Self {
            storage,
            pod_id: pod_id.into(),
        }
    }

    /// Record one vote.
    ///
    /// The awaited vote insert is the durability boundary for the returned
    /// acknowledgement. The audit append runs as a detached task: its
    /// failure is logged for operators and never changes the outcome.
    /// Unknown candidates are rejected before any I/O.
    pub async fn cast_vote(
        &self,
        raw_candidate: &str,
        client: Option<SocketAddr>,
    ) -> Result<Candidate, LedgerError> {
        let candidate: Candidate = raw_candidate
            .parse()
            .map_err(|_| LedgerError::InvalidCandidate(raw_candidate.to_string()))?;

        self.storage.insert_vote(candidate).await?;

        let entry = AuditAppend {
            event_type: AuditEventType::VoteConfirmed,
            message: match client {
                Some(addr) => format!("vote for {candidate} accepted from {addr}"),
                None => format!("vote for {candidate} accepted"),
            },
            origin_id: self.pod_id.clone(),
        };
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            if let Err(err) = storage.append_audit(entry).await {
                warn!(error = %err, "audit append failed for an acknowledged vote");
            }
        });

        Ok(candidate)
    }
}
