//! The read path.

use crate::error::SnapshotError;
use std::sync::Arc;
use tally_storage::{AuditRecord, AuditStore, BallotStorage, Tally, VoteStore};

/// Merged result of one tally read and one audit-tail read.
///
/// The two halves are queried concurrently and are not transactionally
/// joined: they may reflect slightly different moments of the store. That is
/// an accepted approximation for a live-polling display.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tally: Tally,
    pub recent_audit: Vec<AuditRecord>,
}

/// Fans out the tally and audit-tail queries, joins them, and merges the
/// results into one response payload.
pub struct ResultsView {
    storage: Arc<dyn BallotStorage>,
    tail_limit: usize,
}

impl ResultsView {
    pub fn new(storage: Arc<dyn BallotStorage>, tail_limit: usize) -> Self {
        Self {
            storage,
            tail_limit,
        }
    }

    /// Both queries are started before either is awaited. Failure of either
    /// fails the whole snapshot; a half-populated dashboard is more
    /// misleading than an explicit failure.
    pub async fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let (tally, recent_audit) = tokio::try_join!(
            self.storage.tally(),
            self.storage.tail_audit(self.tail_limit),
        )?;

        Ok(Snapshot {
            tally,
            recent_audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tally_storage::memory::InMemoryBallotStorage;
    use tally_storage::{
        AuditAppend, AuditEventType, AuditStore, Candidate, StorageError, StorageResult, VoteStore,
    };

    async fn seeded_storage() -> Arc<InMemoryBallotStorage> {
        let storage = Arc::new(InMemoryBallotStorage::new());
        storage.insert_vote(Candidate::Aws).await.unwrap();
        storage.insert_vote(Candidate::Azure).await.unwrap();
        storage.insert_vote(Candidate::Aws).await.unwrap();
        for i in 0..4 {
            storage
                .append_audit(AuditAppend {
                    event_type: AuditEventType::VoteConfirmed,
                    message: format!("event {i}"),
                    origin_id: "replica-1".to_string(),
                })
                .await
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn snapshot_merges_tally_and_bounded_audit() {
        let view = ResultsView::new(seeded_storage().await, 3);

        let snapshot = view.snapshot().await.unwrap();
        assert_eq!(snapshot.tally, Tally::new(2, 1));
        assert_eq!(snapshot.recent_audit.len(), 3);
        assert_eq!(snapshot.recent_audit[0].message, "event 3");
    }

    #[tokio::test]
    async fn snapshot_of_empty_store_succeeds() {
        let storage = Arc::new(InMemoryBallotStorage::new());
        let view = ResultsView::new(storage, 10);

        let snapshot = view.snapshot().await.unwrap();
        assert_eq!(snapshot.tally.total, 0);
        assert!(snapshot.recent_audit.is_empty());
    }

    #[tokio::test]
    async fn reads_are_idempotent_without_intervening_writes() {
        let view = ResultsView::new(seeded_storage().await, 10);

        let first = view.snapshot().await.unwrap();
        let second = view.snapshot().await.unwrap();
        assert_eq!(first.tally.total, second.tally.total);
        assert_eq!(first.recent_audit.len(), second.recent_audit.len());
    }

    /// Storage whose tally query fails while the audit tail works.
    struct BrokenTallyStorage {
        inner: InMemoryBallotStorage,
    }

    #[async_trait]
    impl VoteStore for BrokenTallyStorage {
        async fn insert_vote(&self, candidate: Candidate) -> StorageResult<()> {
            self.inner.insert_vote(candidate).await
        }

        async fn tally(&self) -> StorageResult<Tally> {
            Err(StorageError::Connection("pool exhausted".to_string()))
        }
    }

    #[async_trait]
    impl AuditStore for BrokenTallyStorage {
        async fn append_audit(&self, entry: AuditAppend) -> StorageResult<()> {
            self.inner.append_audit(entry).await
        }

        async fn tail_audit(&self, limit: usize) -> StorageResult<Vec<AuditRecord>> {
            self.inner.tail_audit(limit).await
        }
    }

    /// Storage whose audit tail fails while the tally works.
    struct BrokenTailStorage {
        inner: InMemoryBallotStorage,
    }

    #[async_trait]
    impl VoteStore for BrokenTailStorage {
        async fn insert_vote(&self, candidate: Candidate) -> StorageResult<()> {
            self.inner.insert_vote(candidate).await
        }

        async fn tally(&self) -> StorageResult<Tally> {
            self.inner.tally().await
        }
    }

    #[async_trait]
    impl AuditStore for BrokenTailStorage {
        async fn append_audit(&self, entry: AuditAppend) -> StorageResult<()> {
            self.inner.append_audit(entry).await
        }

        async fn tail_audit(&self, _limit: usize) -> StorageResult<Vec<AuditRecord>> {
            Err(StorageError::Connection("store unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_tally_fails_the_whole_snapshot() {
        let storage = Arc::new(BrokenTallyStorage {
            inner: InMemoryBallotStorage::new(),
        });
        let view = ResultsView::new(storage, 10);

        let result = view.snapshot().await;
        assert!(matches!(result, Err(SnapshotError::Connectivity(_))));
    }

    #[tokio::test]
    async fn failed_tail_fails_the_whole_snapshot() {
        let storage = Arc::new(BrokenTailStorage {
            inner: InMemoryBallotStorage::new(),
        });
        let view = ResultsView::new(storage, 10);

        let result = view.snapshot().await;
        assert!(matches!(result, Err(SnapshotError::Connectivity(_))));
    }
}
