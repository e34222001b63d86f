/*!
Session management for the PQC key exchange.

This module provides the per-role handshake state machine and the session
that drives it over a connection.
*/

// State management
pub mod state;

// Handshake driver
pub mod handshake;

// Re-export main session types
pub use self::handshake::HandshakeSession;
pub use self::state::{HandshakeState, Role, StateManager};
