/*!
In-process transport adapter.

A [`MemoryConnection`] pair behaves like two ends of a TCP stream: bytes
arrive in order, chunk boundaries are not preserved, dropping or closing
one end is seen as end-of-stream by the other, and receives honour the
configured timeout.
*/

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::{timeout_millis, Connection, Listener};
use crate::core::error::{Error, Result};

/// One end of an in-process duplex byte stream
#[derive(Debug)]
pub struct MemoryConnection {
    outgoing: Option<Sender<Vec<u8>>>,
    incoming: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    timeout: Option<Duration>,
    closed: bool,
    label: String,
}

impl MemoryConnection {
    /// Create two connected ends
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self::new(a_tx, a_rx, "memory:a"),
            Self::new(b_tx, b_rx, "memory:b"),
        )
    }

    fn new(outgoing: Sender<Vec<u8>>, incoming: Receiver<Vec<u8>>, label: &str) -> Self {
        Self {
            outgoing: Some(outgoing),
            incoming,
            pending: Vec::new(),
            timeout: None,
            closed: false,
            label: label.to_string(),
        }
    }

    /// Whether `close` has been called on this end
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn not_connected() -> Error {
        Error::Transport(io::Error::new(
            io::ErrorKind::NotConnected,
            "connection already closed",
        ))
    }

    /// Wait for the next chunk; `None` means the peer is gone
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        match self.timeout {
            Some(timeout) => match self.incoming.recv_timeout(timeout) {
                Ok(chunk) => Ok(Some(chunk)),
                Err(RecvTimeoutError::Timeout) => {
                    Err(Error::Timeout(timeout_millis(self.timeout)))
                }
                Err(RecvTimeoutError::Disconnected) => Ok(None),
            },
            None => Ok(self.incoming.recv().ok()),
        }
    }
}

impl Connection for MemoryConnection {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let outgoing = self.outgoing.as_ref().ok_or_else(Self::not_connected)?;
        if data.is_empty() {
            return Ok(());
        }
        outgoing.send(data.to_vec()).map_err(|_| {
            Error::Transport(io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
        })
    }

    fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        if self.closed {
            return Err(Self::not_connected());
        }
        if self.pending.is_empty() {
            match self.next_chunk()? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(Vec::new()),
            }
        }

        let take = max_bytes.min(self.pending.len());
        let rest = self.pending.split_off(take);
        Ok(std::mem::replace(&mut self.pending, rest))
    }

    fn set_receive_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.outgoing = None;
        Ok(())
    }

    fn peer(&self) -> String {
        self.label.clone()
    }
}

/// Create an in-process listener and the connector that dials it
pub fn listener() -> (MemoryListener, MemoryConnector) {
    let (tx, rx) = mpsc::channel();
    (MemoryListener { incoming: rx }, MemoryConnector { outgoing: tx })
}

/// Accepting side of an in-process listener
#[derive(Debug)]
pub struct MemoryListener {
    incoming: Receiver<MemoryConnection>,
}

impl Listener for MemoryListener {
    type Connection = MemoryConnection;

    fn accept(&mut self) -> Result<MemoryConnection> {
        self.incoming.recv().map_err(|_| {
            Error::Transport(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "all connectors dropped",
            ))
        })
    }
}

/// Dialing side of an in-process listener
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    outgoing: Sender<MemoryConnection>,
}

impl MemoryConnector {
    /// Open a new connection to the listener
    pub fn connect(&self) -> Result<MemoryConnection> {
        let (local, remote) = MemoryConnection::pair();
        self.outgoing.send(remote).map_err(|_| {
            Error::Transport(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "listener dropped",
            ))
        })?;
        Ok(local)
    }
}
