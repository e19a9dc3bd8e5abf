//! Tally daemon library.
//!
//! Core components of one voting replica:
//! - REST API handlers over the shared store
//! - vote ledger (write path) and aggregation view (read path)
//! - configuration and server lifecycle management

pub mod api;
pub mod ballot;
pub mod config;
pub mod error;
pub mod server;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, LedgerError, SnapshotError};
pub use server::Server;
