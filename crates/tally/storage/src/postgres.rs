//! PostgreSQL adapter for ballot storage.
//!
//! One shared Postgres instance is the system of record across all replicas.
//! The adapter owns the connection pool; acquisition past the configured
//! bound queues until the acquire timeout elapses, which surfaces as a
//! connection error rather than blocking indefinitely.

use crate::model::{AuditAppend, AuditEventType, AuditRecord, Candidate, Tally};
use crate::traits::{AuditStore, VoteStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

/// PostgreSQL-backed ballot storage adapter.
#[derive(Clone)]
pub struct PostgresBallotStorage {
    pool: PgPool,
}

impl PostgresBallotStorage {
    /// Connect to PostgreSQL and initialize the required schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        acquire_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(acquire_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Connection(format!("failed to connect postgres: {e}")))?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> StorageResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id BIGSERIAL PRIMARY KEY,
                candidate TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id BIGSERIAL PRIMARY KEY,
                event_type TEXT NOT NULL,
                message TEXT NOT NULL,
                origin_id TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_votes_candidate ON votes (candidate)",
            "CREATE INDEX IF NOT EXISTS idx_audit_log_id ON audit_log (id DESC)",
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VoteStore for PostgresBallotStorage {
    async fn insert_vote(&self, candidate: Candidate) -> StorageResult<()> {
        sqlx::query("INSERT INTO votes (candidate) VALUES ($1)")
            .bind(candidate.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn tally(&self) -> StorageResult<Tally> {
        let rows = sqlx::query("SELECT candidate, COUNT(*) AS votes FROM votes GROUP BY candidate")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut aws = 0_u64;
        let mut azure = 0_u64;
        for row in rows {
            let raw: String = row.try_get("candidate").map_err(map_sqlx_err)?;
            let count: i64 = row.try_get("votes").map_err(map_sqlx_err)?;
            match parse_candidate(&raw)? {
                Candidate::Aws => aws = count as u64,
                Candidate::Azure => azure = count as u64,
            }
        }
        Ok(Tally::new(aws, azure))
    }
}

#[async_trait]
impl AuditStore for PostgresBallotStorage {
    async fn append_audit(&self, entry: AuditAppend) -> StorageResult<()> {
        sqlx::query("INSERT INTO audit_log (event_type, message, origin_id) VALUES ($1, $2, $3)")
            .bind(entry.event_type.as_str())
            .bind(entry.message)
            .bind(entry.origin_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn tail_audit(&self, limit: usize) -> StorageResult<Vec<AuditRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT event_type, message, origin_id, created_at
              FROM audit_log
             ORDER BY id DESC
             LIMIT $1
            "#,
        )
        .bind(to_i64(limit)?)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(audit_row_to_record).collect()
    }
}

fn audit_row_to_record(row: sqlx::postgres::PgRow) -> StorageResult<AuditRecord> {
    let raw_event_type: String = row.try_get("event_type").map_err(map_sqlx_err)?;
    Ok(AuditRecord {
        event_type: parse_event_type(&raw_event_type)?,
        message: row.try_get("message").map_err(map_sqlx_err)?,
        origin_id: row.try_get("origin_id").map_err(map_sqlx_err)?,
        created_at: row.try_get("created_at").map_err(map_sqlx_err)?,
    })
}

fn parse_candidate(raw: &str) -> StorageResult<Candidate> {
    raw.parse()
        .map_err(|_| StorageError::Serialization(format!("unknown candidate row `{raw}`")))
}

fn parse_event_type(raw: &str) -> StorageResult<AuditEventType> {
    match raw {
        "vote-confirmed" => Ok(AuditEventType::VoteConfirmed),
        "replica-started" => Ok(AuditEventType::ReplicaStarted),
        _ => Err(StorageError::Serialization(format!(
            "unknown audit event type `{raw}`"
        ))),
    }
}

/// Pool exhaustion and transport faults are connectivity errors; everything
/// else stays a query error. No retries at this layer.
fn map_sqlx_err(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::PoolTimedOut => {
            StorageError::Connection("connection pool exhausted".to_string())
        }
        sqlx::Error::PoolClosed => StorageError::Connection("connection pool closed".to_string()),
        sqlx::Error::Io(e) => StorageError::Connection(e.to_string()),
        other => StorageError::Query(other.to_string()),
    }
}

fn to_i64(value: usize) -> StorageResult<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::Serialization("tail limit too large".to_string()))
}
