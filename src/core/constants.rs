/*!
Constants for the PQC key exchange.

This module contains the wire sizes, KEM parameter sizes and the
configurable defaults used by the handshake.
*/

use std::time::Duration;

/// Size constants for the protocol
pub mod sizes {
    /// Size of the message header in bytes (type tag + big-endian length)
    pub const HEADER_SIZE: usize = 5;

    /// Offset of the length field inside the header
    pub const LENGTH_OFFSET: usize = 1;

    /// CRYSTALS-Kyber constants
    pub mod kyber {
        /// Size of Kyber768 public key in bytes
        pub const PUBLIC_KEY_BYTES: usize = 1184;

        /// Size of Kyber768 secret key in bytes
        pub const SECRET_KEY_BYTES: usize = 2400;

        /// Size of Kyber768 ciphertext in bytes
        pub const CIPHERTEXT_BYTES: usize = 1088;

        /// Size of Kyber shared secret in bytes (all parameter sets)
        pub const SHARED_SECRET_BYTES: usize = 32;

        /// Size of Kyber512 public key in bytes
        pub const PUBLIC_KEY_BYTES_512: usize = 800;

        /// Size of Kyber512 secret key in bytes
        pub const SECRET_KEY_BYTES_512: usize = 1632;

        /// Size of Kyber512 ciphertext in bytes
        pub const CIPHERTEXT_BYTES_512: usize = 768;

        /// Size of Kyber1024 public key in bytes
        pub const PUBLIC_KEY_BYTES_1024: usize = 1568;

        /// Size of Kyber1024 secret key in bytes
        pub const SECRET_KEY_BYTES_1024: usize = 3168;

        /// Size of Kyber1024 ciphertext in bytes
        pub const CIPHERTEXT_BYTES_1024: usize = 1568;
    }
}

/// Configuration defaults
pub mod defaults {
    use super::{sizes::kyber, Duration};

    /// TCP port used when an address carries no explicit port
    pub const PORT: u16 = 4500;

    /// Largest legitimate payload of any supported parameter set
    pub const MAX_PAYLOAD_LEN: usize = kyber::PUBLIC_KEY_BYTES_1024;

    /// Default bound on a single blocking receive
    pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Number of leading fingerprint bytes reported for a shared secret
    pub const FINGERPRINT_LEN: usize = 8;
}
