/*!
Transport adapters for the PQC key exchange.

The handshake only needs a connected, ordered, reliable byte stream. This
module defines that interface and provides a TCP adapter and an in-process
adapter with identical timeout and close semantics.
*/

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::core::constants::defaults::PORT;
use crate::core::error::Result;

pub mod memory;
pub mod tcp;

pub use memory::{MemoryConnection, MemoryConnector, MemoryListener};
pub use tcp::{TcpConnection, TcpListenerHandle};

/// A connected byte stream
pub trait Connection {
    /// Send all of `data`
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive between 1 and `max_bytes` bytes.
    ///
    /// An empty buffer means the peer closed the stream. A receive that
    /// outlasts the configured timeout fails with `Error::Timeout`.
    fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>>;

    /// Bound every subsequent `receive`; `None` blocks indefinitely
    fn set_receive_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Close the stream. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Human-readable peer description for logs
    fn peer(&self) -> String {
        "unknown".to_string()
    }
}

/// Source of inbound connections
pub trait Listener {
    type Connection: Connection;

    /// Block until the next peer connects
    fn accept(&mut self) -> Result<Self::Connection>;
}

/// Append the default port to an address that lacks one
pub fn with_default_port(address: &str) -> String {
    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }
    if let Ok(ip) = address.parse::<IpAddr>() {
        return SocketAddr::new(ip, PORT).to_string();
    }
    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, PORT)
    }
}

/// Milliseconds for timeout reporting
pub(crate) fn timeout_millis(timeout: Option<Duration>) -> u64 {
    timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
}
