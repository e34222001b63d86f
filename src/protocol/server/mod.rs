//! Server implementation for the PQC key exchange.
//!
//! This module provides the synchronous server driver that runs one
//! handshake session per accepted connection.

// Synchronous server implementation
pub mod sync_server;

pub use sync_server::{PqcServer, ServeSummary};
