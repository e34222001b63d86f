/*!
Handshake configuration for the PQC key exchange.
*/

use std::time::Duration;

use crate::core::constants::defaults;
use crate::core::crypto::config::KemAlgorithm;
use crate::core::error::{Error, Result};

/// Settings shared by both roles of a handshake
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandshakeConfig {
    /// KEM parameter set
    pub algorithm: KemAlgorithm,
    /// Bound on each blocking receive; `None` waits forever
    pub receive_timeout: Option<Duration>,
    /// Largest payload accepted from the peer
    pub max_payload_len: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            algorithm: KemAlgorithm::default(),
            receive_timeout: Some(defaults::RECEIVE_TIMEOUT),
            max_payload_len: defaults::MAX_PAYLOAD_LEN,
        }
    }
}

impl HandshakeConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different KEM parameter set
    pub fn with_algorithm(mut self, algorithm: KemAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Use a different receive timeout
    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Use a different payload bound
    pub fn with_max_payload_len(mut self, max_payload_len: usize) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let needed = self.algorithm.parameters().max_wire_payload();
        if self.max_payload_len < needed {
            return Err(Error::InvalidConfig(format!(
                "max payload length {} is smaller than the {} bytes {} requires",
                self.max_payload_len, needed, self.algorithm
            )));
        }
        if u32::try_from(self.max_payload_len).is_err() {
            return Err(Error::InvalidConfig(format!(
                "max payload length {} does not fit the 32-bit length field",
                self.max_payload_len
            )));
        }
        if self.receive_timeout == Some(Duration::ZERO) {
            return Err(Error::InvalidConfig(
                "receive timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
