//! tallyd — replicated vote ingestion and live tally daemon.
//!
//! Each replica serves:
//! - `POST /api/v1/vote` — vote ingestion against the shared store
//! - `GET /api/v1/results` — live tally plus recent audit entries
//! - `GET /api/v1/health` — unconditional liveness

use clap::Parser;
use tally_daemon::config::DaemonConfig;
use tally_daemon::error::{DaemonError, DaemonResult};
use tally_daemon::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tally daemon CLI
#[derive(Parser)]
#[command(name = "tallyd")]
#[command(about = "Tally daemon - replicated vote ingestion and live results", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TALLY_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "TALLY_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Replica identity stamped on audit entries; defaults to $HOSTNAME
    #[arg(short, long, env = "TALLY_POD_ID")]
    pod_id: Option<String>,

    /// Log level
    #[arg(long, env = "TALLY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "TALLY_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    config.server.listen_addr = cli
        .listen
        .parse()
        .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;

    if cli.pod_id.is_some() {
        config.pod_id = cli.pod_id;
    }

    // Print startup banner
    println!(
        r#"
  _        _ _
 | |_ __ _| | |_   _
 | __/ _` | | | | | |
 | || (_| | | | |_| |
  \__\__,_|_|_|\__, |
               |___/

  Tally - Replicated Vote Ingestion Daemon
  Version: {}
  Pod: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.resolve_pod_id(),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await
}
