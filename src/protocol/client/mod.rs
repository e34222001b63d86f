//! Client implementation for the PQC key exchange.
//!
//! This module provides the synchronous client driver.

// Synchronous client implementation
pub mod sync_client;

pub use sync_client::PqcClient;
