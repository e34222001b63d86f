/*!
# PQC Key Exchange

A two-party post-quantum key exchange over a byte stream, using
CRYSTALS-Kyber (ML-KEM) key encapsulation.

## Overview

One peer (the server) generates a KEM keypair and publishes its public
key. The other peer (the client) encapsulates a shared secret against that
key and returns the ciphertext. The server decapsulates it and both sides
end up with the same 32-byte secret, which is handed to a [`SecretSink`].

```text
Server                               Client
  | generate_keypair                   |
  |--------- PublicKey --------------->|
  |                                    | encapsulate
  |<-------- Ciphertext ---------------|
  | decapsulate                        |
```

- Kyber-512, Kyber-768 (default) and Kyber-1024 parameter sets
- Length validation before every KEM operation
- Length-prefixed framing with a configurable payload bound
- Per-role state machine with terminal `Failed(reason)` states
- Secret material zeroized on drop
- TCP and in-memory transports

## Example

```no_run
use pqc_kex::{HandshakeConfig, PqcClient, Result, SecretSink, SharedSecret};

struct Print;

impl SecretSink for Print {
    fn accept(&mut self, shared_secret: SharedSecret) -> Result<()> {
        println!("fingerprint {}", shared_secret.fingerprint_hex());
        Ok(())
    }
}

fn main() -> Result<()> {
    let client = PqcClient::with_config(HandshakeConfig::default())?;
    client.connect_and_handshake("127.0.0.1", &mut Print)
}
```
*/

// Core protocol components
pub mod core;

// Protocol implementation
pub mod protocol;

// Re-export commonly used types for convenience
pub use self::core::config::HandshakeConfig;
pub use self::core::constants::{defaults, sizes};
pub use self::core::error::{Error, FailureReason, FrameError, KeyExchangeError, Result};
pub use self::core::message::{
    read_message, read_message_within, write_message, Message, MessageHeader, MessageType,
};
pub use self::core::session::{HandshakeSession, HandshakeState, Role};
pub use self::core::sink::SecretSink;
pub use self::core::transport::{tcp, with_default_port, Connection, Listener, MemoryConnection};

// Re-export the KEM provider abstraction
pub use self::core::crypto::{
    create_kem_provider, Ciphertext, Encapsulation, KemAlgorithm, KemBackend, KemHandler,
    KemParameters, KemProvider, KeyPair, KyberBackend, PublicKey, SecretKey, SharedSecret,
};

// Re-export protocol drivers
pub use protocol::{PqcClient, PqcServer, ServeSummary};
