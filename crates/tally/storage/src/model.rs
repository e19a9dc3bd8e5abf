use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the two fixed voting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Candidate {
    Aws,
    Azure,
}

impl Candidate {
    /// The full candidate set, in display order.
    pub const ALL: [Candidate; 2] = [Candidate::Aws, Candidate::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Candidate::Aws => "aws",
            Candidate::Azure => "azure",
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a raw identifier is not in the candidate set.
#[derive(Debug, Error)]
#[error("unknown candidate `{0}`")]
pub struct UnknownCandidate(pub String);

impl FromStr for Candidate {
    type Err = UnknownCandidate;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "aws" => Ok(Candidate::Aws),
            "azure" => Ok(Candidate::Azure),
            other => Err(UnknownCandidate(other.to_string())),
        }
    }
}

/// Immutable vote fact. Timestamps are assigned by the store, never the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub candidate: Candidate,
    pub created_at: DateTime<Utc>,
}

/// Audit event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditEventType {
    VoteConfirmed,
    ReplicaStarted,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::VoteConfirmed => "vote-confirmed",
            AuditEventType::ReplicaStarted => "replica-started",
        }
    }
}

/// Audit append payload. The stored timestamp is assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditAppend {
    pub event_type: AuditEventType,
    pub message: String,
    pub origin_id: String,
}

/// Persistent append-only audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_type: AuditEventType,
    pub message: String,
    pub origin_id: String,
    pub created_at: DateTime<Utc>,
}

/// Derived per-candidate counts. Not persisted; recomputed on every read.
///
/// `total` is only ever produced by [`Tally::new`], so it always equals the
/// sum of the per-candidate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub aws: u64,
    pub azure: u64,
    pub total: u64,
}

impl Tally {
    pub fn new(aws: u64, azure: u64) -> Self {
        Self {
            aws,
            azure,
            total: aws + azure,
        }
    }

    pub fn count(&self, candidate: Candidate) -> u64 {
        match candidate {
            Candidate::Aws => self.aws,
            Candidate::Azure => self.azure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_parsing_accepts_only_the_fixed_set() {
        assert_eq!("aws".parse::<Candidate>().unwrap(), Candidate::Aws);
        assert_eq!("azure".parse::<Candidate>().unwrap(), Candidate::Azure);
        assert!("gcp".parse::<Candidate>().is_err());
        assert!("AWS".parse::<Candidate>().is_err());
        assert!("".parse::<Candidate>().is_err());
    }

    #[test]
    fn tally_total_is_the_sum_of_counts() {
        let tally = Tally::new(3, 4);
        assert_eq!(tally.total, 7);
        assert_eq!(tally.count(Candidate::Aws), 3);
        assert_eq!(tally.count(Candidate::Azure), 4);
    }

    #[test]
    fn candidate_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Candidate::Aws).unwrap(),
            "\"aws\""
        );
        assert_eq!(
            serde_json::to_string(&AuditEventType::VoteConfirmed).unwrap(),
            "\"vote-confirmed\""
        );
    }
}
