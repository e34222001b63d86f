/*!
Traits for key encapsulation.

[`KemProvider`] is the capability set the handshake depends on. It is
implemented by [`KemHandler`](crate::core::crypto::algorithms::kem::KemHandler),
which validates every length before handing buffers to a [`KemBackend`],
the raw mechanism for one parameter set.
*/

use crate::core::crypto::config::KemAlgorithm;
use crate::core::crypto::types::{Encapsulation, KemParameters, KeyPair, SecretKey, SharedSecret};
use crate::core::error::Result;

/// Trait for key encapsulation operations
pub trait KemProvider: Send + Sync {
    /// Get the algorithm this provider implements
    fn algorithm(&self) -> KemAlgorithm;

    /// Get the fixed sizes for this algorithm
    fn parameters(&self) -> KemParameters;

    /// Generate a key pair; both halves or neither
    fn generate_keypair(&self) -> Result<KeyPair>;

    /// Encapsulate a shared secret using the receiver's public key (sender side)
    fn encapsulate(&self, public_key: &[u8]) -> Result<Encapsulation>;

    /// Decapsulate a shared secret from a ciphertext (receiver side)
    fn decapsulate(&self, ciphertext: &[u8], secret_key: &SecretKey) -> Result<SharedSecret>;
}

/// A raw key encapsulation mechanism.
///
/// Implementations may assume every input has exactly the length reported
/// by [`KemBackend::parameters`]; callers go through a validating provider.
pub trait KemBackend: Send + Sync {
    /// Get the algorithm implemented by this backend
    fn algorithm(&self) -> KemAlgorithm;

    /// Get the fixed sizes for this backend
    fn parameters(&self) -> KemParameters {
        self.algorithm().parameters()
    }

    /// Produce `(public_key, secret_key)`
    fn keypair(&self) -> Result<(Vec<u8>, SecretKey)>;

    /// Produce `(ciphertext, shared_secret)` for a correctly sized public key
    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret)>;

    /// Recover the shared secret from correctly sized inputs
    fn decapsulate(&self, ciphertext: &[u8], secret_key: &[u8]) -> Result<SharedSecret>;
}
