/*!
KEM algorithm selection for the PQC key exchange.

Each variant names one fixed parameter set; the sizes it implies are the
lengths every provider operation validates against.
*/

use std::fmt;
use std::str::FromStr;

use crate::core::constants::sizes::kyber;
use crate::core::crypto::types::KemParameters;
use crate::core::error::{Error, Result};

/// Supported Key Encapsulation Mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum KemAlgorithm {
    /// CRYSTALS-Kyber KEM (Kyber512) - for resource-constrained environments
    Kyber512,
    /// CRYSTALS-Kyber KEM (Kyber768)
    #[default]
    Kyber768,
    /// CRYSTALS-Kyber KEM (Kyber1024) - highest security level
    Kyber1024,
}

impl KemAlgorithm {
    /// All supported parameter sets
    pub const ALL: [KemAlgorithm; 3] = [
        KemAlgorithm::Kyber512,
        KemAlgorithm::Kyber768,
        KemAlgorithm::Kyber1024,
    ];

    /// Fixed buffer sizes for this parameter set
    pub fn parameters(self) -> KemParameters {
        match self {
            KemAlgorithm::Kyber512 => KemParameters {
                public_key_len: kyber::PUBLIC_KEY_BYTES_512,
                secret_key_len: kyber::SECRET_KEY_BYTES_512,
                ciphertext_len: kyber::CIPHERTEXT_BYTES_512,
                shared_secret_len: kyber::SHARED_SECRET_BYTES,
            },
            KemAlgorithm::Kyber768 => KemParameters {
                public_key_len: kyber::PUBLIC_KEY_BYTES,
                secret_key_len: kyber::SECRET_KEY_BYTES,
                ciphertext_len: kyber::CIPHERTEXT_BYTES,
                shared_secret_len: kyber::SHARED_SECRET_BYTES,
            },
            KemAlgorithm::Kyber1024 => KemParameters {
                public_key_len: kyber::PUBLIC_KEY_BYTES_1024,
                secret_key_len: kyber::SECRET_KEY_BYTES_1024,
                ciphertext_len: kyber::CIPHERTEXT_BYTES_1024,
                shared_secret_len: kyber::SHARED_SECRET_BYTES,
            },
        }
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            KemAlgorithm::Kyber512 => "kyber512",
            KemAlgorithm::Kyber768 => "kyber768",
            KemAlgorithm::Kyber1024 => "kyber1024",
        }
    }
}

impl fmt::Display for KemAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KemAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "kyber512" | "mlkem512" => Ok(KemAlgorithm::Kyber512),
            "kyber768" | "mlkem768" => Ok(KemAlgorithm::Kyber768),
            "kyber1024" | "mlkem1024" => Ok(KemAlgorithm::Kyber1024),
            _ => Err(Error::UnsupportedAlgorithm(format!("unknown KEM algorithm '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_kyber768() {
        let params = KemAlgorithm::default().parameters();
        assert_eq!(params.public_key_len, 1184);
        assert_eq!(params.secret_key_len, 2400);
        assert_eq!(params.ciphertext_len, 1088);
        assert_eq!(params.shared_secret_len, 32);
    }

    #[test]
    fn test_parse_names() -> Result<()> {
        assert_eq!("kyber512".parse::<KemAlgorithm>()?, KemAlgorithm::Kyber512);
        assert_eq!("Kyber-768".parse::<KemAlgorithm>()?, KemAlgorithm::Kyber768);
        assert_eq!("ML_KEM_1024".parse::<KemAlgorithm>()?, KemAlgorithm::Kyber1024);
        assert!(matches!(
            "rsa2048".parse::<KemAlgorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        Ok(())
    }

    #[test]
    fn test_name_round_trip() -> Result<()> {
        for algorithm in KemAlgorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<KemAlgorithm>()?, algorithm);
        }
        Ok(())
    }
}
