//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Public key bytes are malformed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes have the wrong length.
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Secret key material is malformed.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// The algorithm tag is not supported.
    #[error("unsupported signature algorithm: {0:?}")]
    UnsupportedAlgorithm(String),
}
