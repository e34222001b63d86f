/*!
Handshake state management for the PQC key exchange.

This module defines the handshake states and the per-role transition
table. Transitions only move forward; `Done` and `Failed` are terminal.
*/

use std::fmt;

use crate::core::error::{FailureReason, Result};
use crate::invalid_state_err;

/// Handshake state for tracking protocol progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Session created, nothing done yet
    Init,
    /// Server: keypair generated and public key sent
    KeypairGenerated,
    /// Client: waiting for the server's public key
    AwaitingPublicKey,
    /// Server: waiting for the client's ciphertext
    AwaitingCiphertext,
    /// Shared secret derived
    Done,
    /// Handshake aborted
    Failed(FailureReason),
}

impl HandshakeState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Done | HandshakeState::Failed(_))
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Init => write!(f, "Init"),
            HandshakeState::KeypairGenerated => write!(f, "KeypairGenerated"),
            HandshakeState::AwaitingPublicKey => write!(f, "AwaitingPublicKey"),
            HandshakeState::AwaitingCiphertext => write!(f, "AwaitingCiphertext"),
            HandshakeState::Done => write!(f, "Done"),
            HandshakeState::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Endpoint role in the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Client role (encapsulates against the server's public key)
    Client,
    /// Server role (generates the keypair, decapsulates)
    Server,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "Client"),
            Role::Server => write!(f, "Server"),
        }
    }
}

/// Handshake state manager
///
/// Owns the current state of one session and rejects every transition
/// that is not the next step for its role.
#[derive(Debug, Clone, Copy)]
pub struct StateManager {
    /// Current state of the session
    state: HandshakeState,
    /// Role of this endpoint
    role: Role,
}

impl StateManager {
    /// Create a new state manager
    pub fn new(role: Role) -> Self {
        Self {
            state: HandshakeState::Init,
            role,
        }
    }

    /// Get the current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Get the role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Check if the session is in the given state
    pub fn is_state(&self, state: HandshakeState) -> bool {
        self.state == state
    }

    /// Check if the session has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The successful state that follows the current one, if any
    pub fn next_state(&self) -> Option<HandshakeState> {
        use HandshakeState::*;

        match (self.role, self.state) {
            (Role::Server, Init) => Some(KeypairGenerated),
            (Role::Server, KeypairGenerated) => Some(AwaitingCiphertext),
            (Role::Server, AwaitingCiphertext) => Some(Done),
            (Role::Client, Init) => Some(AwaitingPublicKey),
            (Role::Client, AwaitingPublicKey) => Some(Done),
            _ => None,
        }
    }

    /// Check if moving to `next` is allowed
    pub fn can_transition_to(&self, next: HandshakeState) -> bool {
        match next {
            HandshakeState::Failed(_) => !self.is_terminal(),
            _ => self.next_state() == Some(next),
        }
    }

    /// Move to `next`
    pub fn transition_to(&mut self, next: HandshakeState) -> Result<()> {
        if !self.can_transition_to(next) {
            let expected = self
                .next_state()
                .map_or_else(|| "no further transition".to_string(), |s| s.to_string());
            return invalid_state_err!(
                format!("{} (as {})", expected, self.role),
                format!("{} -> {}", self.state, next)
            );
        }
        self.state = next;
        Ok(())
    }

    /// Enter `Failed(reason)`; returns false if already terminal
    pub fn fail(&mut self, reason: FailureReason) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = HandshakeState::Failed(reason);
        true
    }
}
