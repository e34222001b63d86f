/*!
Key encapsulation provider implementations.

[`KemHandler`] wraps any [`KemBackend`] and enforces the size contract on
both sides of the mechanism: malformed input never reaches the backend, and
malformed backend output never reaches the caller.
*/

mod kyber;

pub use kyber::KyberBackend;

use tracing::{debug, warn};

use crate::core::crypto::config::KemAlgorithm;
use crate::core::crypto::traits::kem::{KemBackend, KemProvider};
use crate::core::crypto::types::{
    Ciphertext, Encapsulation, KemParameters, KeyPair, PublicKey, SecretKey, SharedSecret,
};
use crate::core::error::{Error, KeyExchangeError, Result};
use crate::key_exchange_err;

/// Create a KEM provider for the specified algorithm
pub fn create_kem_provider(algorithm: KemAlgorithm) -> Result<Box<dyn KemProvider>> {
    Ok(Box::new(KemHandler::new(KyberBackend::new(algorithm))))
}

/// Length-validating provider around a raw KEM backend
pub struct KemHandler<B: KemBackend> {
    backend: B,
    parameters: KemParameters,
}

impl<B: KemBackend> KemHandler<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        let parameters = backend.parameters();
        debug!(
            algorithm = %backend.algorithm(),
            public_key_len = parameters.public_key_len,
            secret_key_len = parameters.secret_key_len,
            ciphertext_len = parameters.ciphertext_len,
            shared_secret_len = parameters.shared_secret_len,
            "KEM provider initialized"
        );
        Self { backend, parameters }
    }

    /// Get the wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Keep allocation and contract errors, fold anything else into `fallback`
fn backend_failure(err: Error, fallback: KeyExchangeError) -> Error {
    match err {
        Error::AllocationFailed | Error::KeyExchange(_) => err,
        other => {
            warn!(error = %other, "KEM backend failure");
            Error::KeyExchange(fallback)
        }
    }
}

impl<B: KemBackend> KemProvider for KemHandler<B> {
    fn algorithm(&self) -> KemAlgorithm {
        self.backend.algorithm()
    }

    fn parameters(&self) -> KemParameters {
        self.parameters
    }

    fn generate_keypair(&self) -> Result<KeyPair> {
        let (public_key, secret_key) = self
            .backend
            .keypair()
            .map_err(|e| backend_failure(e, KeyExchangeError::KeyGenerationFailed))?;

        if public_key.len() != self.parameters.public_key_len
            || secret_key.len() != self.parameters.secret_key_len
        {
            warn!(
                public_key_len = public_key.len(),
                secret_key_len = secret_key.len(),
                "KEM backend produced a mis-sized keypair"
            );
            return key_exchange_err!(KeyExchangeError::KeyGenerationFailed);
        }

        debug!(
            public_key_len = public_key.len(),
            secret_key_len = secret_key.len(),
            "generated keypair"
        );
        Ok(KeyPair {
            public_key: PublicKey::new(public_key),
            secret_key,
        })
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<Encapsulation> {
        if public_key.len() != self.parameters.public_key_len {
            return key_exchange_err!(KeyExchangeError::InvalidPublicKeyLength {
                expected: self.parameters.public_key_len,
                actual: public_key.len(),
            });
        }

        let (ciphertext, shared_secret) = self
            .backend
            .encapsulate(public_key)
            .map_err(|e| backend_failure(e, KeyExchangeError::EncapsulationFailed))?;

        if ciphertext.len() != self.parameters.ciphertext_len
            || shared_secret.len() != self.parameters.shared_secret_len
        {
            warn!(
                ciphertext_len = ciphertext.len(),
                shared_secret_len = shared_secret.len(),
                "KEM backend produced mis-sized encapsulation"
            );
            return key_exchange_err!(KeyExchangeError::EncapsulationFailed);
        }

        debug!(
            ciphertext_len = ciphertext.len(),
            shared_secret_len = shared_secret.len(),
            "encapsulated shared secret"
        );
        Ok(Encapsulation {
            ciphertext: Ciphertext::new(ciphertext),
            shared_secret,
        })
    }

    fn decapsulate(&self, ciphertext: &[u8], secret_key: &SecretKey) -> Result<SharedSecret> {
        if ciphertext.len() != self.parameters.ciphertext_len {
            return key_exchange_err!(KeyExchangeError::InvalidCiphertextLength {
                expected: self.parameters.ciphertext_len,
                actual: ciphertext.len(),
            });
        }
        if secret_key.len() != self.parameters.secret_key_len {
            return key_exchange_err!(KeyExchangeError::InvalidSecretKeyLength {
                expected: self.parameters.secret_key_len,
                actual: secret_key.len(),
            });
        }

        let shared_secret = self
            .backend
            .decapsulate(ciphertext, secret_key.as_bytes())
            .map_err(|e| backend_failure(e, KeyExchangeError::DecapsulationFailed))?;

        if shared_secret.len() != self.parameters.shared_secret_len {
            warn!(
                shared_secret_len = shared_secret.len(),
                "KEM backend produced mis-sized shared secret"
            );
            return key_exchange_err!(KeyExchangeError::DecapsulationFailed);
        }

        debug!(shared_secret_len = shared_secret.len(), "decapsulated shared secret");
        Ok(shared_secret)
    }
}

impl<B: KemBackend> Drop for KemHandler<B> {
    fn drop(&mut self) {
        debug!(algorithm = %self.backend.algorithm(), "KEM provider released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that counts calls and can be told to misbehave
    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        short_output: bool,
    }

    impl CountingBackend {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl KemBackend for CountingBackend {
        fn algorithm(&self) -> KemAlgorithm {
            KemAlgorithm::Kyber768
        }

        fn keypair(&self) -> Result<(Vec<u8>, SecretKey)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let params = self.parameters();
            let sk_len = if self.short_output { 10 } else { params.secret_key_len };
            Ok((vec![1u8; params.public_key_len], SecretKey::new(vec![2u8; sk_len])))
        }

        fn encapsulate(&self, _public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let params = self.parameters();
            let ct_len = if self.short_output { 1 } else { params.ciphertext_len };
            Ok((vec![3u8; ct_len], SharedSecret::new(vec![4u8; params.shared_secret_len])))
        }

        fn decapsulate(&self, _ciphertext: &[u8], _secret_key: &[u8]) -> Result<SharedSecret> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let len = if self.short_output { 0 } else { self.parameters().shared_secret_len };
            Ok(SharedSecret::new(vec![4u8; len]))
        }
    }

    #[test]
    fn test_encapsulate_rejects_bad_public_key_without_backend_call() {
        let handler = KemHandler::new(CountingBackend::default());

        for len in [0, 1, 1183, 1185, 2400] {
            let result = handler.encapsulate(&vec![0u8; len]);
            match result {
                Err(Error::KeyExchange(KeyExchangeError::InvalidPublicKeyLength {
                    expected,
                    actual,
                })) => {
                    assert_eq!(expected, 1184);
                    assert_eq!(actual, len);
                }
                other => panic!("unexpected result for len {}: {:?}", len, other),
            }
        }
        assert_eq!(handler.backend().calls(), 0);
    }

    #[test]
    fn test_decapsulate_rejects_bad_lengths_without_backend_call() {
        let handler = KemHandler::new(CountingBackend::default());
        let good_sk = SecretKey::new(vec![0u8; 2400]);
        let bad_sk = SecretKey::new(vec![0u8; 2399]);

        let result = handler.decapsulate(&[0u8; 1087], &good_sk);
        assert!(matches!(
            result,
            Err(Error::KeyExchange(KeyExchangeError::InvalidCiphertextLength {
                expected: 1088,
                actual: 1087
            }))
        ));

        let result = handler.decapsulate(&[0u8; 1088], &bad_sk);
        assert!(matches!(
            result,
            Err(Error::KeyExchange(KeyExchangeError::InvalidSecretKeyLength {
                expected: 2400,
                actual: 2399
            }))
        ));

        assert_eq!(handler.backend().calls(), 0);
    }

    #[test]
    fn test_valid_lengths_reach_backend() -> Result<()> {
        let handler = KemHandler::new(CountingBackend::default());
        let keypair = handler.generate_keypair()?;
        let encapsulation = handler.encapsulate(keypair.public_key.as_bytes())?;
        handler.decapsulate(encapsulation.ciphertext.as_bytes(), &keypair.secret_key)?;
        assert_eq!(handler.backend().calls(), 3);
        Ok(())
    }

    #[test]
    fn test_mis_sized_backend_output_is_rejected() {
        let handler = KemHandler::new(CountingBackend {
            short_output: true,
            ..Default::default()
        });

        assert!(matches!(
            handler.generate_keypair(),
            Err(Error::KeyExchange(KeyExchangeError::KeyGenerationFailed))
        ));
        assert!(matches!(
            handler.encapsulate(&[0u8; 1184]),
            Err(Error::KeyExchange(KeyExchangeError::EncapsulationFailed))
        ));
        assert!(matches!(
            handler.decapsulate(&[0u8; 1088], &SecretKey::new(vec![0u8; 2400])),
            Err(Error::KeyExchange(KeyExchangeError::DecapsulationFailed))
        ));
    }

    #[test]
    fn test_factory_round_trip() -> Result<()> {
        for algorithm in KemAlgorithm::ALL {
            let provider = create_kem_provider(algorithm)?;
            let params = provider.parameters();
            let keypair = provider.generate_keypair()?;
            assert_eq!(keypair.public_key.len(), params.public_key_len);
            assert_eq!(keypair.secret_key.len(), params.secret_key_len);

            let encapsulation = provider.encapsulate(keypair.public_key.as_bytes())?;
            assert_eq!(encapsulation.ciphertext.len(), params.ciphertext_len);

            let recovered =
                provider.decapsulate(encapsulation.ciphertext.as_bytes(), &keypair.secret_key)?;
            assert_eq!(recovered.len(), params.shared_secret_len);
            assert_eq!(recovered, encapsulation.shared_secret);
        }
        Ok(())
    }
}
