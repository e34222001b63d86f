/*!
TCP transport adapter.
*/

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::debug;

use super::{timeout_millis, Connection, Listener};
use crate::core::error::{Error, Result};

/// Bind a listener on `address`
pub fn listen(address: &str) -> Result<TcpListenerHandle> {
    let listener = TcpListener::bind(address)?;
    debug!(address = %listener.local_addr()?, "listening");
    Ok(TcpListenerHandle { listener })
}

/// Connect to `address`
pub fn connect(address: &str) -> Result<TcpConnection> {
    let stream = TcpStream::connect(address)?;
    debug!(address, "connected");
    TcpConnection::new(stream)
}

/// A bound TCP listener
#[derive(Debug)]
pub struct TcpListenerHandle {
    listener: TcpListener,
}

impl TcpListenerHandle {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

impl Listener for TcpListenerHandle {
    type Connection = TcpConnection;

    fn accept(&mut self) -> Result<TcpConnection> {
        let (stream, peer) = self.listener.accept()?;
        debug!(%peer, "accepted connection");
        TcpConnection::new(stream)
    }
}

/// A connected TCP stream
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    timeout: Option<Duration>,
    closed: bool,
}

impl TcpConnection {
    /// Wrap an already connected stream
    pub fn new(stream: TcpStream) -> Result<Self> {
        // Handshake messages are small and strictly alternating
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();
        Ok(Self {
            stream,
            peer,
            timeout: None,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            )));
        }
        Ok(())
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut buf = vec![0u8; max_bytes];
        loop {
            match self.stream.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Err(Error::Timeout(timeout_millis(self.timeout)));
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }

    fn set_receive_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        self.timeout = timeout;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(peer = %self.peer(), "closing connection");
        match self.stream.shutdown(std::net::Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(Error::Transport(e)),
            _ => Ok(()),
        }
    }

    fn peer(&self) -> String {
        self.peer.map_or_else(|| "unknown".to_string(), |p| p.to_string())
    }
}
