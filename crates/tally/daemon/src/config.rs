//! Configuration for the tally daemon.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Audit trail configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Explicit replica identity. When unset, the `HOSTNAME` environment
    /// variable (the pod name under Kubernetes) is used instead.
    #[serde(default)]
    pub pod_id: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
            pod_id: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    Memory,

    /// PostgreSQL storage shared by all replicas
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in the pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Pool acquire timeout in seconds
        #[serde(default = "default_acquire_timeout")]
        acquire_timeout_secs: u64,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

/// Audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// How many recent entries the results payload carries
    #[serde(default = "default_tail_limit")]
    pub tail_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            tail_limit: default_tail_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_tail_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file, and `TALLY_`
    /// prefixed environment variables, in increasing precedence.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TALLY")
                .separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Resolve the identity this replica stamps on audit entries and the
    /// results payload.
    pub fn resolve_pod_id(&self) -> String {
        if let Some(id) = &self.pod_id {
            return id.clone();
        }
        std::env::var("HOSTNAME").unwrap_or_else(|_| "tallyd-local".to_string())
    }
}
