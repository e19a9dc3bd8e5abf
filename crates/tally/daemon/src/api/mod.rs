//! API surface for the daemon.

pub mod rest;

pub use rest::router::create_router;
