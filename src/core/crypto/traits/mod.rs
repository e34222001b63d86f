/*!
Core traits for cryptographic operations.

This module defines the interfaces the key exchange depends on.
*/

pub mod kem;

// Re-export core traits for easier access
pub use kem::{KemBackend, KemProvider};
