/*!
Error handling for the PQC key exchange.

Every failure raised by the KEM provider, the framing codec or the
transport is surfaced as an [`Error`]. The handshake state machine reduces
each error to a [`FailureReason`] when it enters its `Failed` state.
*/

use std::fmt;
use std::io;
use thiserror::Error;

use crate::core::message::types::MessageType;

/// Result type for the PQC key exchange
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the PQC key exchange
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error (connect, accept, send, receive)
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// A buffer could not be allocated
    #[error("Buffer allocation failed")]
    AllocationFailed,

    /// Key encapsulation mechanism failure
    #[error("Key exchange failed: {0}")]
    KeyExchange(#[source] KeyExchangeError),

    /// Malformed wire data
    #[error("Invalid message framing: {0}")]
    Frame(#[source] FrameError),

    /// Peer sent a well-formed message of the wrong type
    #[error("Protocol violation: expected {expected} message, received {actual}")]
    ProtocolViolation {
        expected: MessageType,
        actual: MessageType,
    },

    /// Timeout error
    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    /// Session not in the state required by the operation
    #[error("Session not in correct state: expected {expected}, but was {actual}")]
    InvalidState {
        expected: String,
        actual: String,
    },

    /// Algorithm not supported, or not the one the provider implements
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Handshake settings outside their valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external consumer refused the shared secret
    #[error("Secret sink rejected the shared secret: {0}")]
    Sink(String),
}

/// Key exchange errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyExchangeError {
    /// Key generation failed
    #[error("Key generation failed")]
    KeyGenerationFailed,

    /// Key encapsulation failed
    #[error("Key encapsulation failed")]
    EncapsulationFailed,

    /// Key decapsulation failed
    #[error("Key decapsulation failed")]
    DecapsulationFailed,

    /// Public key of the wrong size
    #[error("Invalid public key length: expected {expected} bytes, got {actual}")]
    InvalidPublicKeyLength { expected: usize, actual: usize },

    /// Ciphertext of the wrong size
    #[error("Invalid ciphertext length: expected {expected} bytes, got {actual}")]
    InvalidCiphertextLength { expected: usize, actual: usize },

    /// Secret key of the wrong size
    #[error("Invalid secret key length: expected {expected} bytes, got {actual}")]
    InvalidSecretKeyLength { expected: usize, actual: usize },
}

/// Framing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Stream ended before a full header or payload was read
    #[error("Truncated message: needed {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Header carried a type tag outside the protocol
    #[error("Unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Header declared a payload larger than the configured bound
    #[error("Payload length {length} exceeds maximum of {max} bytes")]
    LengthOutOfRange { length: u64, max: usize },
}

/// Terminal failure reason recorded by a handshake session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    AllocationFailed,
    KeygenFailed,
    EncapsFailed,
    DecapsFailed,
    InvalidPublicKeyLength,
    InvalidCiphertextLength,
    InvalidSecretKeyLength,
    Truncated,
    UnknownMessageType,
    LengthOutOfRange,
    ProtocolViolation,
    Timeout,
    TransportError,
    InvalidState,
    UnsupportedAlgorithm,
    InvalidConfig,
    SinkRejected,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::AllocationFailed => "AllocationFailed",
            FailureReason::KeygenFailed => "KeygenFailed",
            FailureReason::EncapsFailed => "EncapsFailed",
            FailureReason::DecapsFailed => "DecapsFailed",
            FailureReason::InvalidPublicKeyLength => "InvalidPublicKeyLength",
            FailureReason::InvalidCiphertextLength => "InvalidCiphertextLength",
            FailureReason::InvalidSecretKeyLength => "InvalidSecretKeyLength",
            FailureReason::Truncated => "Truncated",
            FailureReason::UnknownMessageType => "UnknownMessageType",
            FailureReason::LengthOutOfRange => "LengthOutOfRange",
            FailureReason::ProtocolViolation => "ProtocolViolation",
            FailureReason::Timeout => "Timeout",
            FailureReason::TransportError => "TransportError",
            FailureReason::InvalidState => "InvalidState",
            FailureReason::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            FailureReason::InvalidConfig => "InvalidConfig",
            FailureReason::SinkRejected => "SinkRejected",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Reduce this error to the reason recorded in a `Failed` state
    pub fn reason(&self) -> FailureReason {
        match self {
            Error::Transport(_) => FailureReason::TransportError,
            Error::AllocationFailed => FailureReason::AllocationFailed,
            Error::KeyExchange(err) => match err {
                KeyExchangeError::KeyGenerationFailed => FailureReason::KeygenFailed,
                KeyExchangeError::EncapsulationFailed => FailureReason::EncapsFailed,
                KeyExchangeError::DecapsulationFailed => FailureReason::DecapsFailed,
                KeyExchangeError::InvalidPublicKeyLength { .. } => {
                    FailureReason::InvalidPublicKeyLength
                }
                KeyExchangeError::InvalidCiphertextLength { .. } => {
                    FailureReason::InvalidCiphertextLength
                }
                KeyExchangeError::InvalidSecretKeyLength { .. } => {
                    FailureReason::InvalidSecretKeyLength
                }
            },
            Error::Frame(err) => match err {
                FrameError::Truncated { .. } => FailureReason::Truncated,
                FrameError::UnknownMessageType(_) => FailureReason::UnknownMessageType,
                FrameError::LengthOutOfRange { .. } => FailureReason::LengthOutOfRange,
            },
            Error::ProtocolViolation { .. } => FailureReason::ProtocolViolation,
            Error::Timeout(_) => FailureReason::Timeout,
            Error::InvalidState { .. } => FailureReason::InvalidState,
            Error::UnsupportedAlgorithm(_) => FailureReason::UnsupportedAlgorithm,
            Error::InvalidConfig(_) => FailureReason::InvalidConfig,
            Error::Sink(_) => FailureReason::SinkRejected,
        }
    }
}

impl From<KeyExchangeError> for Error {
    fn from(err: KeyExchangeError) -> Self {
        Error::KeyExchange(err)
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Error::Frame(err)
    }
}

/// Create a key exchange error
#[macro_export]
macro_rules! key_exchange_err {
    ($err:expr) => {
        Err($crate::core::error::Error::KeyExchange($err))
    };
}

/// Create a framing error
#[macro_export]
macro_rules! frame_err {
    ($err:expr) => {
        Err($crate::core::error::Error::Frame($err))
    };
}

/// Create an invalid state error
#[macro_export]
macro_rules! invalid_state_err {
    ($expected:expr, $actual:expr) => {
        Err($crate::core::error::Error::InvalidState {
            expected: $expected.to_string(),
            actual: $actual.to_string(),
        })
    };
}

/// Convert from Error to io::Error (for compatibility)
impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Transport(io_error) => io_error,
            Error::Timeout(ms) => io::Error::new(
                io::ErrorKind::TimedOut,
                format!("Operation timed out after {} ms", ms),
            ),
            Error::Frame(FrameError::Truncated { .. }) => {
                io::Error::new(io::ErrorKind::UnexpectedEof, error.to_string())
            }
            Error::AllocationFailed => io::Error::new(io::ErrorKind::OutOfMemory, error.to_string()),
            Error::InvalidState { .. } => {
                io::Error::new(io::ErrorKind::NotConnected, error.to_string())
            }
            Error::InvalidConfig(_) => io::Error::new(io::ErrorKind::InvalidInput, error.to_string()),
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}
