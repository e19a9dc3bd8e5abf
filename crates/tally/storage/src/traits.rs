use crate::model::{AuditAppend, AuditRecord, Candidate, Tally};
use crate::StorageResult;
use async_trait::async_trait;

/// Storage interface for the vote write and aggregation paths.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Persist one vote row. The stored timestamp is assigned by the backend.
    ///
    /// Always a single-row insert; the store's own write ordering is the only
    /// serialization across replicas.
    async fn insert_vote(&self, candidate: Candidate) -> StorageResult<()>;

    /// Recompute the per-candidate counts by aggregating over all vote rows.
    async fn tally(&self) -> StorageResult<Tally>;
}

/// Storage interface for the append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one audit entry. One insert per call, no batching.
    async fn append_audit(&self, entry: AuditAppend) -> StorageResult<()>;

    /// Read up to `limit` entries, newest first. Each call re-executes the
    /// bounded query fresh; this is not a subscription.
    async fn tail_audit(&self, limit: usize) -> StorageResult<Vec<AuditRecord>>;
}

/// Unified storage bundle handed to the daemon's services.
pub trait BallotStorage: VoteStore + AuditStore + Send + Sync {}

impl<T> BallotStorage for T where T: VoteStore + AuditStore + Send + Sync {}
