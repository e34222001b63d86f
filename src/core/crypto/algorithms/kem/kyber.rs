/*!
CRYSTALS-Kyber KEM backend.

This module provides the raw Kyber mechanism for the three standard
parameter sets. Length validation happens in the provider wrapping it.
*/

use crate::core::crypto::config::KemAlgorithm;
use crate::core::crypto::traits::kem::KemBackend;
use crate::core::crypto::types::{SecretKey, SharedSecret};
use crate::core::error::{Error, KeyExchangeError, Result};

use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};

/// Run `$body` with `$module` bound to the pqcrypto module for `$algorithm`
macro_rules! with_kyber {
    ($algorithm:expr, $module:ident => $body:expr) => {
        match $algorithm {
            KemAlgorithm::Kyber512 => {
                use pqcrypto_kyber::kyber512 as $module;
                $body
            }
            KemAlgorithm::Kyber768 => {
                use pqcrypto_kyber::kyber768 as $module;
                $body
            }
            KemAlgorithm::Kyber1024 => {
                use pqcrypto_kyber::kyber1024 as $module;
                $body
            }
        }
    };
}

/// Kyber key encapsulation backend
#[derive(Debug, Clone, Copy)]
pub struct KyberBackend {
    algorithm: KemAlgorithm,
}

impl KyberBackend {
    /// Create a new KyberBackend with the specified algorithm
    pub fn new(algorithm: KemAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl KemBackend for KyberBackend {
    fn algorithm(&self) -> KemAlgorithm {
        self.algorithm
    }

    /// Generate a new Kyber key pair
    fn keypair(&self) -> Result<(Vec<u8>, SecretKey)> {
        with_kyber!(self.algorithm, kyber => {
            let (pk, sk) = kyber::keypair();
            Ok((pk.as_bytes().to_vec(), SecretKey::new(sk.as_bytes().to_vec())))
        })
    }

    /// Encapsulate a shared secret using the receiver's public key (sender side)
    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret)> {
        with_kyber!(self.algorithm, kyber => {
            let pk = kyber::PublicKey::from_bytes(public_key)
                .map_err(|_| Error::KeyExchange(KeyExchangeError::EncapsulationFailed))?;
            let (ss, ct) = kyber::encapsulate(&pk);
            Ok((ct.as_bytes().to_vec(), SharedSecret::new(ss.as_bytes().to_vec())))
        })
    }

    /// Decapsulate a shared secret from a ciphertext (receiver side)
    fn decapsulate(&self, ciphertext: &[u8], secret_key: &[u8]) -> Result<SharedSecret> {
        with_kyber!(self.algorithm, kyber => {
            let ct = kyber::Ciphertext::from_bytes(ciphertext)
                .map_err(|_| Error::KeyExchange(KeyExchangeError::DecapsulationFailed))?;
            let sk = kyber::SecretKey::from_bytes(secret_key)
                .map_err(|_| Error::KeyExchange(KeyExchangeError::DecapsulationFailed))?;
            let ss = kyber::decapsulate(&ct, &sk);
            Ok(SharedSecret::new(ss.as_bytes().to_vec()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_match_pqcrypto() {
        for algorithm in KemAlgorithm::ALL {
            let params = KyberBackend::new(algorithm).parameters();
            with_kyber!(algorithm, kyber => {
                assert_eq!(params.public_key_len, kyber::public_key_bytes());
                assert_eq!(params.secret_key_len, kyber::secret_key_bytes());
                assert_eq!(params.ciphertext_len, kyber::ciphertext_bytes());
                assert_eq!(params.shared_secret_len, kyber::shared_secret_bytes());
            });
        }
    }

    #[test]
    fn test_raw_round_trip() -> Result<()> {
        for algorithm in KemAlgorithm::ALL {
            let backend = KyberBackend::new(algorithm);
            let (pk, sk) = backend.keypair()?;
            let (ct, ss_sender) = backend.encapsulate(&pk)?;
            let ss_receiver = backend.decapsulate(&ct, sk.as_bytes())?;
            assert_eq!(ss_sender, ss_receiver, "mismatch for {}", algorithm);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_size_public_key() {
        let backend = KyberBackend::new(KemAlgorithm::Kyber768);
        let result = backend.encapsulate(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(Error::KeyExchange(KeyExchangeError::EncapsulationFailed))
        ));
    }
}
