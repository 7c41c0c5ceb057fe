//! # Key Replacement Proofs
//!
//! A mint moves to a new identity key by having its old key sign the new
//! key's marshalled ID. The proof is the only thing that authorizes a
//! succession; governance must reject a replacement whose proof fails before
//! appending it to an epoch.

use serde::{Deserialize, Serialize};

use dbcfed_core::{CanonicalBytes, MintId};
use dbcfed_crypto::Ed25519Signature;

use crate::error::NetconfError;
use crate::identity_key::IdentityKey;

/// Signed attestation that `old_key` hands its membership to `new_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyReplacement {
    /// The successor identity key.
    pub new_key: IdentityKey,
    /// The replaced identity key.
    pub old_key: IdentityKey,
    /// Signature by `old_key` over `new_key`'s marshalled ID.
    pub signature: Ed25519Signature,
}

impl KeyReplacement {
    /// Sign a replacement. `old_key` must carry its private half.
    pub fn create(new_key: &IdentityKey, old_key: &IdentityKey) -> Result<Self, NetconfError> {
        let signature = old_key.sign(&CanonicalBytes::identity_binding(&new_key.marshal_id()))?;
        Ok(Self {
            new_key: new_key.to_public(),
            old_key: old_key.to_public(),
            signature,
        })
    }

    /// Assemble a replacement from a signature produced elsewhere.
    pub fn from_parts(
        new_key: IdentityKey,
        old_key: IdentityKey,
        signature: Ed25519Signature,
    ) -> Self {
        Self {
            new_key: new_key.to_public(),
            old_key: old_key.to_public(),
            signature,
        }
    }

    /// ID of the replaced mint.
    pub fn old_id(&self) -> MintId {
        self.old_key.marshal_id()
    }

    /// ID of the successor mint.
    pub fn new_id(&self) -> MintId {
        self.new_key.marshal_id()
    }

    /// Check that the old key signed the new key's ID.
    pub fn verify(&self) -> Result<(), NetconfError> {
        let new_id = self.new_id();
        self.old_key
            .verify(&CanonicalBytes::identity_binding(&new_id), &self.signature)
            .map_err(|source| NetconfError::KeyReplacementInvalid {
                old: self.old_id(),
                new: new_id,
                source,
            })
    }
}
