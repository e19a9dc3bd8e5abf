//! In-memory reference implementation for the storage traits.
//!
//! Deterministic and test-friendly. Production replicas use the Postgres
//! adapter so all instances observe the same rows.

use crate::model::{AuditAppend, AuditRecord, Candidate, Tally, VoteRecord};
use crate::traits::{AuditStore, VoteStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

/// In-memory ballot storage adapter.
#[derive(Default)]
pub struct InMemoryBallotStorage {
    votes: RwLock<Vec<VoteRecord>>,
    audit: RwLock<Vec<AuditRecord>>,
}

impl InMemoryBallotStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteStore for InMemoryBallotStorage {
    async fn insert_vote(&self, candidate: Candidate) -> StorageResult<()> {
        let mut guard = self
            .votes
            .write()
            .map_err(|_| StorageError::Backend("votes lock poisoned".to_string()))?;
        guard.push(VoteRecord {
            candidate,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn tally(&self) -> StorageResult<Tally> {
        let guard = self
            .votes
            .read()
            .map_err(|_| StorageError::Backend("votes lock poisoned".to_string()))?;
        let mut aws = 0;
        let mut azure = 0;
        for vote in guard.iter() {
            match vote.candidate {
                Candidate::Aws => aws += 1,
                Candidate::Azure => azure += 1,
            }
        }
        Ok(Tally::new(aws, azure))
    }
}

#[async_trait]
impl AuditStore for InMemoryBallotStorage {
    async fn append_audit(&self, entry: AuditAppend) -> StorageResult<()> {
        let mut guard = self
            .audit
            .write()
            .map_err(|_| StorageError::Backend("audit lock poisoned".to_string()))?;
        guard.push(AuditRecord {
            event_type: entry.event_type,
            message: entry.message,
            origin_id: entry.origin_id,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn tail_audit(&self, limit: usize) -> StorageResult<Vec<AuditRecord>> {
        let guard = self
            .audit
            .read()
            .map_err(|_| StorageError::Backend("audit lock poisoned".to_string()))?;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuditEventType;

    fn entry(message: &str) -> AuditAppend {
        AuditAppend {
            event_type: AuditEventType::VoteConfirmed,
            message: message.to_string(),
            origin_id: "replica-1".to_string(),
        }
    }

    #[tokio::test]
    async fn tally_counts_each_candidate() {
        let storage = InMemoryBallotStorage::new();
        storage.insert_vote(Candidate::Aws).await.unwrap();
        storage.insert_vote(Candidate::Aws).await.unwrap();
        storage.insert_vote(Candidate::Azure).await.unwrap();

        let tally = storage.tally().await.unwrap();
        assert_eq!(tally.aws, 2);
        assert_eq!(tally.azure, 1);
        assert_eq!(tally.total, 3);
    }

    #[tokio::test]
    async fn tally_of_empty_store_is_zero() {
        let storage = InMemoryBallotStorage::new();
        let tally = storage.tally().await.unwrap();
        assert_eq!(tally, Tally::new(0, 0));
    }

    #[tokio::test]
    async fn tail_is_bounded_and_newest_first() {
        let storage = InMemoryBallotStorage::new();
        for i in 0..5 {
            storage.append_audit(entry(&format!("event {i}"))).await.unwrap();
        }

        let tail = storage.tail_audit(3).await.unwrap();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].message, "event 4");
        assert_eq!(tail[2].message, "event 2");
        for pair in tail.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn tail_limit_zero_returns_nothing() {
        let storage = InMemoryBallotStorage::new();
        storage.append_audit(entry("only")).await.unwrap();
        assert!(storage.tail_audit(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_assigns_store_timestamps() {
        let storage = InMemoryBallotStorage::new();
        let before = Utc::now();
        storage.append_audit(entry("stamped")).await.unwrap();
        let tail = storage.tail_audit(1).await.unwrap();
        assert!(tail[0].created_at >= before);
        assert_eq!(tail[0].origin_id, "replica-1");
    }
}
