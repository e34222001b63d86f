//! Core components for the PQC key exchange.
//!
//! This module contains the fundamental building blocks of the handshake,
//! including the KEM provider, message framing, transports, the session
//! state machine and error handling.

// Export cryptographic functionality
pub mod crypto;

// Export message handling
pub mod message;

// Export session management
pub mod session;

// Export transport adapters
pub mod transport;

// Secret hand-off
pub mod sink;

// Handshake configuration
pub mod config;

// Protocol constants
pub mod constants;

// Error handling
pub mod error;

// Re-exports for convenience
pub use self::config::HandshakeConfig;
pub use self::error::{Error, FailureReason, FrameError, KeyExchangeError, Result};
pub use self::message::{format::Message, format::MessageHeader, types::MessageType};
pub use self::session::{HandshakeSession, HandshakeState, Role};
pub use self::sink::SecretSink;
