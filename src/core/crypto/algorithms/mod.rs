/*!
Implementations of cryptographic algorithms.

This module provides concrete implementations of the
cryptographic algorithm interfaces.
*/

// Key encapsulation mechanisms
pub mod kem;

// Re-export factory functions
pub use kem::create_kem_provider;
