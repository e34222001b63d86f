/*!
Message handling for the PQC key exchange.

This module provides the message type tags and the length-prefixed
framing used to carry key material over a byte stream.
*/

pub mod types;
pub mod format;

// Re-export commonly used items
pub use types::MessageType;
pub use format::{read_message, read_message_within, write_message, Message, MessageHeader};
