/*!
Handshake session for the PQC key exchange.

A [`HandshakeSession`] drives one role of the protocol over one connection:

```text
Server: Init -> KeypairGenerated -> AwaitingCiphertext -> Done
Client: Init -> AwaitingPublicKey -> Done
```

Every error raised by the provider, the framing codec or the transport
moves the session to `Failed(reason)`, scrubs its secret material and
closes the connection. A session is single-shot and never rewinds.
*/

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::config::HandshakeConfig;
use crate::core::crypto::traits::KemProvider;
use crate::core::crypto::types::{Ciphertext, KeyPair, SharedSecret};
use crate::core::error::{Error, Result};
use crate::core::message::format::{read_message_within, write_message, Message};
use crate::core::message::types::MessageType;
use crate::core::session::state::{HandshakeState, Role, StateManager};
use crate::core::sink::SecretSink;
use crate::core::transport::Connection;
use crate::invalid_state_err;

/// One run of the key exchange for one role
pub struct HandshakeSession {
    state_manager: StateManager,
    provider: Arc<dyn KemProvider>,
    config: HandshakeConfig,
    /// Server only, dropped (and zeroized) once decapsulation has run
    keypair: Option<KeyPair>,
    /// Server only
    peer_ciphertext: Option<Ciphertext>,
    shared_secret: Option<SharedSecret>,
}

impl HandshakeSession {
    /// Create a session for `role`
    ///
    /// The provider must implement the algorithm named in `config`.
    pub fn new(role: Role, provider: Arc<dyn KemProvider>, config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        if provider.algorithm() != config.algorithm {
            return Err(Error::UnsupportedAlgorithm(format!(
                "provider implements {}, configuration requires {}",
                provider.algorithm(),
                config.algorithm
            )));
        }

        Ok(Self {
            state_manager: StateManager::new(role),
            provider,
            config,
            keypair: None,
            peer_ciphertext: None,
            shared_secret: None,
        })
    }

    /// Create a server-role session
    pub fn server(provider: Arc<dyn KemProvider>, config: HandshakeConfig) -> Result<Self> {
        Self::new(Role::Server, provider, config)
    }

    /// Create a client-role session
    pub fn client(provider: Arc<dyn KemProvider>, config: HandshakeConfig) -> Result<Self> {
        Self::new(Role::Client, provider, config)
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state_manager.state()
    }

    /// Role of this session
    pub fn role(&self) -> Role {
        self.state_manager.role()
    }

    /// Configuration in use
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Ciphertext received from the client (server role, after `Done`)
    pub fn peer_ciphertext(&self) -> Option<&Ciphertext> {
        self.peer_ciphertext.as_ref()
    }

    /// Perform the next transition and return the state it reached.
    ///
    /// On error the session is already `Failed` and `conn` has been closed.
    pub fn step<C: Connection + ?Sized>(&mut self, conn: &mut C) -> Result<HandshakeState> {
        if self.state_manager.is_terminal() {
            return invalid_state_err!("a non-terminal state", self.state());
        }

        match self.advance(conn) {
            Ok(()) => Ok(self.state()),
            Err(err) => {
                self.abort(conn, &err);
                Err(err)
            }
        }
    }

    /// Drive the session until it reaches `Done` or fails
    pub fn run<C: Connection + ?Sized>(&mut self, conn: &mut C) -> Result<()> {
        while self.step(conn)? != HandshakeState::Done {}
        Ok(())
    }

    /// The derived secret; only available in `Done`
    pub fn shared_secret(&self) -> Result<&SharedSecret> {
        match (&self.shared_secret, self.state()) {
            (Some(secret), HandshakeState::Done) => Ok(secret),
            (_, state) => invalid_state_err!(HandshakeState::Done, state),
        }
    }

    /// Take the derived secret out of a `Done` session
    pub fn into_shared_secret(mut self) -> Result<SharedSecret> {
        if self.state() != HandshakeState::Done {
            return invalid_state_err!(HandshakeState::Done, self.state());
        }
        match self.shared_secret.take() {
            Some(secret) => Ok(secret),
            None => invalid_state_err!("a stored shared secret", "none"),
        }
    }

    /// Hand the derived secret to `sink`. The session keeps no copy.
    pub fn deliver<S: SecretSink + ?Sized>(self, sink: &mut S) -> Result<()> {
        let role = self.role();
        let secret = self.into_shared_secret()?;
        sink.accept(secret).inspect_err(|err| {
            warn!(%role, error = %err, "secret sink rejected shared secret");
        })
    }

    fn advance<C: Connection + ?Sized>(&mut self, conn: &mut C) -> Result<()> {
        match (self.role(), self.state()) {
            (Role::Server, HandshakeState::Init) => {
                let keypair = self.provider.generate_keypair()?;
                let message =
                    Message::new(MessageType::PublicKey, keypair.public_key.as_bytes().to_vec())?;
                self.keypair = Some(keypair);
                write_message(conn, &message)?;
                debug!(peer = %conn.peer(), len = message.payload().len(), "sent public key");
                self.enter(HandshakeState::KeypairGenerated)
            }
            (Role::Server, HandshakeState::KeypairGenerated) => {
                conn.set_receive_timeout(self.config.receive_timeout)?;
                self.enter(HandshakeState::AwaitingCiphertext)
            }
            (Role::Server, HandshakeState::AwaitingCiphertext) => {
                let message = self.expect_message(conn, MessageType::Ciphertext)?;
                let ciphertext = Ciphertext::new(message.into_payload());
                let keypair = match self.keypair.take() {
                    Some(keypair) => keypair,
                    None => return invalid_state_err!("a generated keypair", "none"),
                };
                let shared_secret = self
                    .provider
                    .decapsulate(ciphertext.as_bytes(), &keypair.secret_key)?;
                drop(keypair);

                self.peer_ciphertext = Some(ciphertext);
                self.shared_secret = Some(shared_secret);
                self.enter(HandshakeState::Done)
            }
            (Role::Client, HandshakeState::Init) => {
                conn.set_receive_timeout(self.config.receive_timeout)?;
                self.enter(HandshakeState::AwaitingPublicKey)
            }
            (Role::Client, HandshakeState::AwaitingPublicKey) => {
                let message = self.expect_message(conn, MessageType::PublicKey)?;
                let encapsulation = self.provider.encapsulate(message.payload())?;
                let reply = Message::new(
                    MessageType::Ciphertext,
                    encapsulation.ciphertext.as_bytes().to_vec(),
                )?;
                write_message(conn, &reply)?;
                debug!(peer = %conn.peer(), len = reply.payload().len(), "sent ciphertext");

                self.shared_secret = Some(encapsulation.shared_secret);
                self.enter(HandshakeState::Done)
            }
            (role, state) => invalid_state_err!(format!("a {} state", role), state),
        }
    }

    fn expect_message<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        expected: MessageType,
    ) -> Result<Message> {
        let message =
            read_message_within(conn, self.config.max_payload_len, self.config.receive_timeout)?;
        if message.msg_type() != expected {
            return Err(Error::ProtocolViolation {
                expected,
                actual: message.msg_type(),
            });
        }
        debug!(peer = %conn.peer(), %expected, len = message.payload().len(), "received message");
        Ok(message)
    }

    fn enter(&mut self, next: HandshakeState) -> Result<()> {
        self.state_manager.transition_to(next)?;
        if next == HandshakeState::Done {
            info!(
                role = %self.role(),
                algorithm = %self.config.algorithm,
                "handshake complete"
            );
        } else {
            debug!(role = %self.role(), state = %next, "handshake state changed");
        }
        Ok(())
    }

    fn abort<C: Connection + ?Sized>(&mut self, conn: &mut C, err: &Error) {
        let reason = err.reason();
        if !self.state_manager.fail(reason) {
            return;
        }
        self.keypair = None;
        self.peer_ciphertext = None;
        self.shared_secret = None;

        warn!(role = %self.role(), %reason, error = %err, "handshake failed");
        if let Err(close_err) = conn.close() {
            warn!(error = %close_err, "failed to close connection");
        }
    }
}
