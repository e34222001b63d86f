/*!
Synchronous client for the PQC key exchange.

The client waits for the server's public key, encapsulates against it and
returns the ciphertext.
*/

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{
    config::HandshakeConfig,
    crypto::{algorithms::create_kem_provider, traits::KemProvider, types::SharedSecret},
    error::Result,
    session::{HandshakeSession, Role},
    sink::SecretSink,
    transport::{tcp, with_default_port, Connection},
};

/// Synchronous client for the PQC key exchange.
#[derive(Clone)]
pub struct PqcClient {
    /// Shared, stateless KEM provider
    provider: Arc<dyn KemProvider>,

    /// Handshake configuration
    config: HandshakeConfig,
}

impl PqcClient {
    /// Create a new client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(HandshakeConfig::default())
    }

    /// Create a client with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::from(create_kem_provider(config.algorithm)?);
        Ok(Self { provider, config })
    }

    /// Create a client around an existing provider.
    pub fn with_provider(provider: Arc<dyn KemProvider>, config: HandshakeConfig) -> Result<Self> {
        HandshakeSession::client(Arc::clone(&provider), config.clone())?;
        Ok(Self { provider, config })
    }

    /// Get the current role
    pub fn role(&self) -> Role {
        Role::Client
    }

    /// Get the handshake configuration
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Start a fresh client-role session
    pub fn session(&self) -> Result<HandshakeSession> {
        HandshakeSession::client(Arc::clone(&self.provider), self.config.clone())
    }

    /// Run one handshake over `conn` and return the shared secret.
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

    /// Connect over TCP, run the handshake, deliver the secret and close.
    ///
    /// `address` without a port uses the default port.
    pub fn connect_and_handshake<S: SecretSink + ?Sized>(
        &self,
        address: &str,
        sink: &mut S,
    ) -> Result<()> {
        let address = with_default_port(address);
        let mut conn = tcp::connect(&address)?;
        info!(%address, "connected to server");

        let result = self.handshake_into(&mut conn, sink);
        if let Err(err) = conn.close() {
            warn!(error = %err, "failed to close connection");
        }
        result
    }
}

impl std::fmt::Debug for PqcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PqcClient")
            .field("algorithm", &self.provider.algorithm())
            .field("config", &self.config)
            .finish()
    }
}
