//! # Signature Algorithm Tags
//!
//! The tag is part of every mint ID (`ed25519-...`) and of every signed
//! key entry, so two keys with identical bytes under different algorithms
//! can never collide.

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Signature algorithms a key may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// Ed25519 (RFC 8032).
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SignatureAlgorithm {
    /// The wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }

    /// Expected public key length in bytes.
    pub fn public_key_len(&self) -> usize {
        match self {
            Self::Ed25519 => 32,
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(Self::Ed25519),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}
