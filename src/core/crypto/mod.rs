/*!
Cryptographic components for the PQC key exchange.

This module provides the KEM provider abstraction, its Kyber
implementation and the owned key material types it hands out.
*/

// Algorithm selection
pub mod config;

// Key material types
pub mod types;

// Provider and backend traits
pub mod traits;

// Concrete implementations
pub mod algorithms;

// Re-export frequently used types
pub use algorithms::kem::{create_kem_provider, KemHandler, KyberBackend};
pub use config::KemAlgorithm;
pub use traits::{KemBackend, KemProvider};
pub use types::{
    Ciphertext, Encapsulation, KemParameters, KeyPair, PublicKey, SecretKey, SharedSecret,
};
