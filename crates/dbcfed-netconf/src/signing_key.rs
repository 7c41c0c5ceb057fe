//! # Signing Keys
//!
//! A short-lived key a mint publishes for one DBC type in one epoch.
//!
//! The private half is serialized (as a hex seed) only while present. The
//! operator's private key list keeps it; [`SigningKey::prune`] drops it
//! before the public artifact is written.

use serde::{Deserialize, Serialize};

use dbcfed_core::CanonicalBytes;
use dbcfed_crypto::{
    verify_with_public_key, CryptoError, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
    SignatureAlgorithm,
};

use crate::dbc_type::DbcType;
use crate::error::NetconfError;

/// One entry of a mint epoch's key list.
///
/// A deserialized private half must belong to `public_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSigningKey")]
pub struct SigningKey {
    /// The currency this key signs.
    pub currency: String,
    /// The amount this key signs, in minor units.
    pub amount: u64,
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// Public key.
    pub public_key: Ed25519PublicKey,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "private_key_hex::serialize"
    )]
    private_key: Option<Ed25519KeyPair>,
}

#[derive(Deserialize)]
struct RawSigningKey {
    currency: String,
    amount: u64,
    algorithm: SignatureAlgorithm,
    public_key: Ed25519PublicKey,
    #[serde(default, deserialize_with = "private_key_hex::deserialize")]
    private_key: Option<Ed25519KeyPair>,
}

impl TryFrom<RawSigningKey> for SigningKey {
    type Error = NetconfError;

    fn try_from(raw: RawSigningKey) -> Result<Self, Self::Error> {
        let key = Self {
            currency: raw.currency,
            amount: raw.amount,
            algorithm: raw.algorithm,
            public_key: raw.public_key,
            private_key: raw.private_key,
        };
        if let Some(keypair) = &key.private_key {
            if keypair.public_key() != key.public_key {
                return Err(NetconfError::PrivateKeyMismatch {
                    what: format!("signing key {}", key.dbc_type()),
                });
            }
        }
        Ok(key)
    }
}

impl SigningKey {
    /// Generate a fresh key for `dbc_type`.
    pub fn generate(dbc_type: &DbcType) -> Self {
        let keypair = Ed25519KeyPair::generate();
        Self {
            currency: dbc_type.currency.clone(),
            amount: dbc_type.amount,
            algorithm: SignatureAlgorithm::Ed25519,
            public_key: keypair.public_key(),
            private_key: Some(keypair),
        }
    }

    /// The DBC type this key signs.
    pub fn dbc_type(&self) -> DbcType {
        DbcType::new(self.currency.clone(), self.amount)
    }

    /// Whether the private half is present.
    pub fn has_private(&self) -> bool {
        self.private_key.is_some()
    }

    /// Drop the private half.
    pub fn prune(&mut self) {
        self.private_key = None;
    }

    /// Sign with this key.
    pub fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, NetconfError> {
        let keypair = self
            .private_key
            .as_ref()
            .ok_or_else(|| NetconfError::MissingPrivateKey {
                what: format!("signing key {}", self.dbc_type()),
            })?;
        Ok(keypair.sign(data))
    }

    /// Verify a signature made by this key.
    pub fn verify(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        verify_with_public_key(data, signature, &self.public_key)
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.currency == other.currency
            && self.amount == other.amount
            && self.algorithm == other.algorithm
            && self.public_key == other.public_key
    }
}

impl Eq for SigningKey {}

mod private_key_hex {
    use serde::{Deserialize, Deserializer, Serializer};
    use zeroize::Zeroize;

    use dbcfed_crypto::Ed25519KeyPair;

    pub fn serialize<S: Serializer>(
        key: &Option<Ed25519KeyPair>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match key {
            Some(kp) => serializer.serialize_some(kp.seed_hex().as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Ed25519KeyPair>, D::Error> {
        let Some(mut seed) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let keypair = Ed25519KeyPair::from_seed_hex(&seed).map_err(serde::de::Error::custom);
        seed.zeroize();
        keypair.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbcfed_core::Field;

    fn eur1() -> DbcType {
        DbcType::new("EUR", 100_000_000)
    }

    #[test]
    fn test_generate_sign_verify() {
        let sk = SigningKey::generate(&eur1());
        assert_eq!(sk.dbc_type(), eur1());
        let data = CanonicalBytes::encode(&[Field::Uint64(sk.amount)]).unwrap();
        let sig = sk.sign(&data).unwrap();
        sk.verify(&data, &sig).unwrap();
    }

    #[test]
    fn test_private_half_serialized_until_pruned() {
        let mut sk = SigningKey::generate(&eur1());
        let json = serde_json::to_value(&sk).unwrap();
        assert_eq!(json["private_key"].as_str().map(str::len), Some(64));

        let restored: SigningKey = serde_json::from_value(json).unwrap();
        assert!(restored.has_private());
        assert_eq!(restored, sk);

        sk.prune();
        let json = serde_json::to_value(&sk).unwrap();
        assert!(json.get("private_key").is_none());
        let public: SigningKey = serde_json::from_value(json).unwrap();
        assert!(!public.has_private());
    }

    #[test]
    fn test_foreign_private_half_rejected() {
        let sk = SigningKey::generate(&eur1());
        let other = SigningKey::generate(&eur1());
        let mut json = serde_json::to_value(&sk).unwrap();
        json["private_key"] = serde_json::to_value(&other).unwrap()["private_key"].clone();
        let err = serde_json::from_value::<SigningKey>(json).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_pruned_key_cannot_sign() {
        let mut sk = SigningKey::generate(&eur1());
        sk.prune();
        let data = CanonicalBytes::encode(&[Field::Uint64(1)]).unwrap();
        assert!(matches!(sk.sign(&data), Err(NetconfError::MissingPrivateKey { .. })));
    }
}
