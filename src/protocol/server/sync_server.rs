/*!
Synchronous server for the PQC key exchange.

The server generates a fresh keypair per connection, publishes the public
key and decapsulates the client's ciphertext. Every connection gets its
own [`HandshakeSession`]; only the stateless KEM provider is shared.
*/

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::core::{
    config::HandshakeConfig,
    crypto::{algorithms::create_kem_provider, traits::KemProvider, types::SharedSecret},
    error::Result,
    session::{HandshakeSession, Role},
    sink::SecretSink,
    transport::{Connection, Listener},
};

/// Outcome counts of a [`PqcServer::serve`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Sessions that reached `Done` and were delivered to their sink
    pub completed: usize,
    /// Sessions that failed or whose sink rejected the secret
    pub failed: usize,
}

/// Synchronous server for the PQC key exchange.
#[derive(Clone)]
pub struct PqcServer {
    /// Shared, stateless KEM provider
    provider: Arc<dyn KemProvider>,

    /// Handshake configuration
    config: HandshakeConfig,
}

impl PqcServer {
    /// Create a new server with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(HandshakeConfig::default())
    }

    /// Create a server with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::from(create_kem_provider(config.algorithm)?);
        Ok(Self { provider, config })
    }

    /// Create a server around an existing provider.
    pub fn with_provider(provider: Arc<dyn KemProvider>, config: HandshakeConfig) -> Result<Self> {
        // Fails early on a provider/config mismatch
        HandshakeSession::server(Arc::clone(&provider), config.clone())?;
        Ok(Self { provider, config })
    }

    /// Get the current role
    pub fn role(&self) -> Role {
        Role::Server
    }

    /// Get the handshake configuration
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Get the shared KEM provider
    pub fn provider(&self) -> &Arc<dyn KemProvider> {
        &self.provider
    }

    /// Start a fresh server-role session
    pub fn session(&self) -> Result<HandshakeSession> {
        HandshakeSession::server(Arc::clone(&self.provider), self.config.clone())
    }

    /// Run one handshake over `conn` and return the shared secret.
    ///
    /// The connection is left open on success and closed on failure.
    pub fn handshake<C: Connection + ?Sized>(&self, conn: &mut C) -> Result<SharedSecret> {
        let mut session = self.session()?;
        session.run(conn)?;
        session.into_shared_secret()
    }

    /// Run one handshake over `conn` and hand the secret to `sink`.
    pub fn handshake_into<C, S>(&self, conn: &mut C, sink: &mut S) -> Result<()>
    where
        C: Connection + ?Sized,
        S: SecretSink + ?Sized,
    {
        let mut session = self.session()?;
        session.run(conn)?;
        session.deliver(sink)
    }

    /// Accept one connection, run the handshake, deliver the secret and
    /// close the connection.
    pub fn accept_one<L, S>(&self, listener: &mut L, sink: &mut S) -> Result<()>
    where
        L: Listener,
        S: SecretSink + ?Sized,
    {
        let mut conn = listener.accept()?;
        info!(peer = %conn.peer(), "client connected");
        let result = self.handshake_into(&mut conn, sink);
        close_quietly(&mut conn);
        result
    }

    /// Accept connections and run one isolated handshake per connection,
    /// each on its own thread.
    ///
    /// Stops after `limit` connections when given, otherwise runs until
    /// the listener fails. `make_sink` is called once per connection.
    pub fn serve<L, F, S>(
        &self,
        listener: &mut L,
        limit: Option<usize>,
        mut make_sink: F,
    ) -> Result<ServeSummary>
    where
        L: Listener,
        L::Connection: Send + 'static,
        F: FnMut() -> S,
        S: SecretSink + Send + 'static,
    {
        let mut summary = ServeSummary::default();
        let mut workers: Vec<JoinHandle<Result<()>>> = Vec::new();
        let mut accepted = 0usize;

        let outcome = loop {
            if limit.is_some_and(|limit| accepted >= limit) {
                break Ok(());
            }

            let mut conn = match listener.accept() {
                Ok(conn) => conn,
                Err(err) => break Err(err),
            };
            accepted += 1;
            info!(peer = %conn.peer(), accepted, "client connected");

            let server = self.clone();
            let mut sink = make_sink();
            workers.push(thread::spawn(move || {
                let result = server.handshake_into(&mut conn, &mut sink);
                close_quietly(&mut conn);
                result
            }));

            reap(&mut workers, &mut summary, false);
        };

        reap(&mut workers, &mut summary, true);
        info!(
            completed = summary.completed,
            failed = summary.failed,
            "server stopped"
        );
        outcome.map(|()| summary)
    }
}

/// Collect finished workers, or all of them when `wait` is set
fn reap(workers: &mut Vec<JoinHandle<Result<()>>>, summary: &mut ServeSummary, wait: bool) {
    let mut index = 0;
    while index < workers.len() {
        if !wait && !workers[index].is_finished() {
            index += 1;
            continue;
        }
        match workers.swap_remove(index).join() {
            Ok(Ok(())) => summary.completed += 1,
            Ok(Err(err)) => {
                debug!(reason = %err.reason(), "session ended without a secret");
                summary.failed += 1;
            }
            Err(_) => {
                warn!("handshake worker panicked");
                summary.failed += 1;
            }
        }
    }
}

fn close_quietly<C: Connection + ?Sized>(conn: &mut C) {
    if let Err(err) = conn.close() {
        warn!(error = %err, "failed to close connection");
    }
}

impl std::fmt::Debug for PqcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PqcServer")
            .field("algorithm", &self.provider.algorithm())
            .field("config", &self.config)
            .finish()
    }
}
