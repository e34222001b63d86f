//! Protocol drivers for the PQC key exchange.
//!
//! This module contains the client and server endpoints that run
//! handshake sessions over transport connections.

// Client implementation
pub mod client;

// Server implementation
pub mod server;

// Re-export for convenience
pub use client::PqcClient;
pub use server::{PqcServer, ServeSummary};
