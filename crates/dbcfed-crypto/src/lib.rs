//! # dbcfed-crypto — Cryptographic Primitives
//!
//! Provides the signature building blocks for the mint federation:
//!
//! - **Ed25519** key generation, signing and verification for identity keys,
//!   per-denomination signing keys and key-replacement proofs.
//! - **Algorithm tags** embedded in every mint ID and every signed key entry.
//!
//! ## Crate Policy
//!
//! - Depends only on `dbcfed-core` internally.
//! - Signing input is always `&CanonicalBytes`.
//! - Private key material is zeroized on drop and never appears in `Debug`
//!   output. It is serialized only through the explicit hex accessors.
//! - No mocking of cryptographic operations in tests.

pub mod algorithm;
pub mod ed25519;
pub mod error;

pub use algorithm::SignatureAlgorithm;
pub use ed25519::{
    verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};
pub use error::CryptoError;
