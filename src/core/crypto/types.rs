/*!
Owned key material types for the PQC key exchange.

Every buffer handed out by a KEM provider is one of these owned types.
Secret material (`SecretKey`, `SharedSecret`) is zeroized when dropped,
is never `Clone`, and is redacted from `Debug` output.
*/

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::defaults::FINGERPRINT_LEN;

/// Fixed, algorithm-defined buffer sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KemParameters {
    /// Public key length in bytes
    pub public_key_len: usize,
    /// Secret key length in bytes
    pub secret_key_len: usize,
    /// Ciphertext length in bytes
    pub ciphertext_len: usize,
    /// Shared secret length in bytes
    pub shared_secret_len: usize,
}

impl KemParameters {
    /// Largest payload this parameter set ever puts on the wire
    pub fn max_wire_payload(&self) -> usize {
        self.public_key_len.max(self.ciphertext_len)
    }
}

/// KEM public key
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bytes)", self.0.len())
    }
}

/// KEM secret key, zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// A public/secret key pair, produced atomically by `generate_keypair`
#[derive(Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

/// KEM ciphertext
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// Derived shared secret, zeroized on drop
///
/// Equality is evaluated in constant time.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading bytes of SHA-256 over the secret.
    ///
    /// Lets both peers compare their results without exposing key material.
    pub fn fingerprint(&self) -> [u8; FINGERPRINT_LEN] {
        let digest = Sha256::digest(&self.0);
        let mut out = [0u8; FINGERPRINT_LEN];
        out.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        out
    }

    /// Hex rendering of [`SharedSecret::fingerprint`]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// Output of `encapsulate`: the ciphertext for the peer and our copy of the secret
#[derive(Debug)]
pub struct Encapsulation {
    pub ciphertext: Ciphertext,
    pub shared_secret: SharedSecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let sk = SecretKey::new(vec![0xAA; 16]);
        let ss = SharedSecret::new(vec![0xBB; 32]);

        assert_eq!(format!("{:?}", sk), "SecretKey([REDACTED; 16 bytes])");
        assert_eq!(format!("{:?}", ss), "SharedSecret([REDACTED; 32 bytes])");
        assert!(!format!("{:?}", ss).contains("bb"));
    }

    #[test]
    fn test_zeroize_clears_secret() {
        let original = SharedSecret::new(vec![0x42; 32]);
        let mut ss = SharedSecret::new(vec![0x42; 32]);
        ss.zeroize();

        // Vec zeroize wipes the contents and then truncates
        assert!(ss.is_empty());
        assert_ne!(ss, original);

        let mut sk = SecretKey::new(vec![0x42; 2400]);
        sk.zeroize();
        assert!(sk.is_empty());
    }

    #[test]
    fn test_shared_secret_equality() {
        let a = SharedSecret::new(vec![1, 2, 3, 4]);
        let b = SharedSecret::new(vec![1, 2, 3, 4]);
        let c = SharedSecret::new(vec![1, 2, 3, 5]);
        let d = SharedSecret::new(vec![1, 2, 3]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = SharedSecret::new(vec![7; 32]);
        let b = SharedSecret::new(vec![7; 32]);
        let c = SharedSecret::new(vec![8; 32]);

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint_hex().len(), FINGERPRINT_LEN * 2);
    }

    #[test]
    fn test_max_wire_payload() {
        let params = KemParameters {
            public_key_len: 1184,
            secret_key_len: 2400,
            ciphertext_len: 1088,
            shared_secret_len: 32,
        };
        assert_eq!(params.max_wire_payload(), 1184);
    }
}
