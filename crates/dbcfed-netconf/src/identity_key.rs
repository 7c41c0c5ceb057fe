//! # Mint Identity Keys
//!
//! A mint's long-term key pair. Its marshalled form
//! `<algorithm>-<base64url(pubkey)>` is the [`MintId`] used as the key of
//! every membership set.
//!
//! The private half is carried in memory only. It is never serialized, so an
//! identity key embedded in a network epoch or a mint artifact is always
//! public. Secrets are stored separately (see [`crate::store`]).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use dbcfed_core::{CanonicalBytes, MintId};
use dbcfed_crypto::{
    verify_with_public_key, CryptoError, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
    SignatureAlgorithm,
};

use crate::error::NetconfError;

/// A mint identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// Public key.
    pub public_key: Ed25519PublicKey,
    #[serde(skip)]
    keypair: Option<Ed25519KeyPair>,
}

impl IdentityKey {
    /// Generate a fresh identity key pair.
    pub fn generate() -> Self {
        Self::from_keypair(Ed25519KeyPair::generate())
    }

    /// Wrap an existing key pair.
    pub fn from_keypair(keypair: Ed25519KeyPair) -> Self {
        Self {
            algorithm: SignatureAlgorithm::Ed25519,
            public_key: keypair.public_key(),
            keypair: Some(keypair),
        }
    }

    /// Reconstruct a full key pair from a stored hex seed.
    pub fn from_secret(seed_hex: &str) -> Result<Self, NetconfError> {
        Ok(Self::from_keypair(Ed25519KeyPair::from_seed_hex(seed_hex)?))
    }

    /// A public-only identity key.
    pub fn from_public(public_key: Ed25519PublicKey) -> Self {
        Self {
            algorithm: SignatureAlgorithm::Ed25519,
            public_key,
            keypair: None,
        }
    }

    /// Parse a marshalled ID (`ed25519-<base64url>`) back into a public key.
    pub fn parse(id: &str) -> Result<Self, NetconfError> {
        let parse_err = |reason: String| NetconfError::IdentityKeyParse {
            input: id.to_string(),
            reason,
        };
        let (algo, encoded) = id
            .split_once('-')
            .ok_or_else(|| parse_err("missing algorithm prefix".to_string()))?;
        let algorithm: SignatureAlgorithm = algo
            .parse()
            .map_err(|e: CryptoError| parse_err(e.to_string()))?;
        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| parse_err(e.to_string()))?;
        if raw.len() != algorithm.public_key_len() {
            return Err(parse_err(format!(
                "expected {} key bytes, got {}",
                algorithm.public_key_len(),
                raw.len()
            )));
        }
        let public_key = Ed25519PublicKey::from_slice(&raw)?;
        Ok(Self {
            algorithm,
            public_key,
            keypair: None,
        })
    }

    /// The canonical ID of this key.
    pub fn marshal_id(&self) -> MintId {
        MintId::new(format!(
            "{}-{}",
            self.algorithm,
            URL_SAFE_NO_PAD.encode(self.public_key.as_bytes())
        ))
    }

    /// Whether the private half is available.
    pub fn has_private(&self) -> bool {
        self.keypair.is_some()
    }

    /// The private key pair, if loaded.
    pub fn keypair(&self) -> Result<&Ed25519KeyPair, NetconfError> {
        self.keypair
            .as_ref()
            .ok_or_else(|| NetconfError::MissingPrivateKey {
                what: format!("identity key {}", self.marshal_id()),
            })
    }

    /// A copy of this key with the private half dropped.
    pub fn to_public(&self) -> Self {
        Self::from_public(self.public_key)
    }

    /// Sign canonical bytes with the identity key.
    pub fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, NetconfError> {
        Ok(self.keypair()?.sign(data))
    }

    /// Verify a signature made by this identity key.
    pub fn verify(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        verify_with_public_key(data, signature, &self.public_key)
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.public_key == other.public_key
    }
}

impl Eq for IdentityKey {}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "4b75408909900de74555aa57bb667ab36e18d242f4962b317a0fedc2083891c0";
    const PUBKEY: &str = "38ff60e128224b4eb708a49de1908d7d61b447a8228459b216ac49c209910295";
    const ID: &str = "ed25519-OP9g4SgiS063CKSd4ZCNfWG0R6gihFmyFqxJwgmRApU";

    #[test]
    fn test_marshal_id_vector() {
        let ik = IdentityKey::from_secret(SEED).unwrap();
        assert_eq!(ik.public_key.to_hex(), PUBKEY);
        assert_eq!(ik.marshal_id().as_str(), ID);
    }

    #[test]
    fn test_parse_inverts_marshal_id() {
        let ik = IdentityKey::parse(ID).unwrap();
        assert_eq!(ik.public_key.to_hex(), PUBKEY);
        assert!(!ik.has_private());
        assert_eq!(ik.marshal_id().as_str(), ID);

        let fresh = IdentityKey::generate();
        assert_eq!(IdentityKey::parse(fresh.marshal_id().as_str()).unwrap(), fresh);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in [
            "noprefix",
            "rsa-OP9g4SgiS063CKSd4ZCNfWG0R6gihFmyFqxJwgmRApU",
            "ed25519-OP9g4Sgi",
            "ed25519-!!!",
        ] {
            assert!(
                matches!(IdentityKey::parse(bad), Err(NetconfError::IdentityKeyParse { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_serialization_omits_private_half() {
        let ik = IdentityKey::generate();
        let json = serde_json::to_value(&ik).unwrap();
        assert_eq!(json["algorithm"], "ed25519");
        assert_eq!(json["public_key"], ik.public_key.to_hex());
        assert_eq!(json.as_object().unwrap().len(), 2);

        let back: IdentityKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, ik);
        assert!(!back.has_private());
    }

    #[test]
    fn test_public_key_cannot_sign() {
        let ik = IdentityKey::parse(ID).unwrap();
        let data = CanonicalBytes::identity_binding(&ik.marshal_id());
        assert!(matches!(ik.sign(&data), Err(NetconfError::MissingPrivateKey { .. })));
    }

    #[test]
    fn test_sign_and_verify() {
        let ik = IdentityKey::generate();
        let data = CanonicalBytes::identity_binding(&ik.marshal_id());
        let sig = ik.sign(&data).unwrap();
        ik.to_public().verify(&data, &sig).unwrap();
    }
}
