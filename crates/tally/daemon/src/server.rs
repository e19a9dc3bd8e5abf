//! Server setup and lifecycle management.

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::ballot::{ResultsView, VoteLedger};
use crate::config::{DaemonConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use std::net::SocketAddr;
use std::sync::Arc;
use tally_storage::memory::InMemoryBallotStorage;
use tally_storage::postgres::PostgresBallotStorage;
use tally_storage::{AuditAppend, AuditEventType, AuditStore, BallotStorage};
use tokio::net::TcpListener;

/// Tally daemon server.
pub struct Server {
    config: DaemonConfig,
    storage: Arc<dyn BallotStorage>,
}

impl Server {
    /// Create a new server with the given configuration. The storage backend
    /// is constructed here and owned for the process lifetime; services get
    /// an injected handle, never ambient global access.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let storage: Arc<dyn BallotStorage> = match &config.storage {
            StorageConfig::Memory => {
                tracing::warn!("using in-memory storage; votes are local to this replica");
                Arc::new(InMemoryBallotStorage::new())
            }
            StorageConfig::Postgres {
                url,
                max_connections,
                acquire_timeout_secs,
            } => Arc::new(
                PostgresBallotStorage::connect_with_options(
                    url,
                    *max_connections,
                    *acquire_timeout_secs,
                )
                .await?,
            ),
        };

        Ok(Self { config, storage })
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let pod_id = self.config.resolve_pod_id();

        let ledger = Arc::new(VoteLedger::new(self.storage.clone(), pod_id.clone()));
        let view = Arc::new(ResultsView::new(
            self.storage.clone(),
            self.config.audit.tail_limit,
        ));
        let state = AppState::new(ledger, view, pod_id.clone());

        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("tallyd listening on {}", addr);
        tracing::info!(pod_id = %pod_id, "replica identity resolved");

        // Boot marker in the audit trail; same detached best-effort contract
        // as vote confirmations.
        let storage = self.storage.clone();
        tokio::spawn(async move {
            let entry = AuditAppend {
                event_type: AuditEventType::ReplicaStarted,
                message: format!("replica {pod_id} accepting requests"),
                origin_id: pod_id,
            };
            if let Err(err) = storage.append_audit(entry).await {
                tracing::warn!(error = %err, "startup audit append failed");
            }
        });

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("tallyd shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
