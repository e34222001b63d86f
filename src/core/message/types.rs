/*!
Message types for the PQC key exchange.

This module defines the type tags that can appear in a frame header.
*/

use std::fmt;

/// Protocol message types
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Server's KEM public key
    PublicKey = 0x01,
    /// Client's KEM ciphertext
    Ciphertext = 0x02,
    /// Acknowledgment message (reserved, never sent by the handshake)
    Ack = 0x03,
}

impl MessageType {
    /// Convert a u8 value to a MessageType
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(MessageType::PublicKey),
            0x02 => Some(MessageType::Ciphertext),
            0x03 => Some(MessageType::Ack),
            _ => None,
        }
    }

    /// Get the u8 value of this MessageType
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::PublicKey => write!(f, "PublicKey"),
            MessageType::Ciphertext => write!(f, "Ciphertext"),
            MessageType::Ack => write!(f, "Ack"),
        }
    }
}
