//! # Mint Credential Sets
//!
//! A mint mirrors every network epoch with a [`MintEpoch`] holding one
//! signing key per active DBC type. Each mint epoch is signed twice over:
//!
//! ```text
//! signable = identity algo | identity pubkey | sign start | sign end | validate end
//!            | { currency | amount | algo | pubkey } for each signing key
//!
//! signatures = [ sig(signing key 0), ..., sig(signing key k-1), sig(identity key) ]
//! ```
//!
//! Each signing key attests to its own inclusion, and the identity key
//! attests to the whole list. Once published, an epoch is never re-signed:
//! [`Mint::extend`] only keys and signs the epochs it appends.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use dbcfed_core::{CanonicalBytes, Field, MintId};
use dbcfed_crypto::Ed25519Signature;

use crate::dbc_type::DbcType;
use crate::error::NetconfError;
use crate::identity_key::IdentityKey;
use crate::network::Network;
use crate::signing_key::SigningKey;
use crate::store::{self, FileMode};
use crate::window::{validate_chain, EpochWindow};

/// A mint's key list for one network epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEpoch {
    /// Boundaries, equal to the matching network epoch's.
    #[serde(flatten)]
    pub window: EpochWindow,
    /// One key per active DBC type.
    #[serde(default)]
    pub signing_keys: Vec<SigningKey>,
    /// One signature per signing key, then the identity signature.
    #[serde(default)]
    pub signatures: Vec<Ed25519Signature>,
}

impl MintEpoch {
    /// An unkeyed, unsigned epoch.
    pub fn new(window: EpochWindow) -> Self {
        Self {
            window,
            signing_keys: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// The canonical encoding both tiers of signatures cover.
    pub fn signable(&self, identity: &IdentityKey) -> Result<CanonicalBytes, NetconfError> {
        let mut fields = Vec::with_capacity(5 + 4 * self.signing_keys.len());
        fields.push(Field::bytes(identity.algorithm.as_str()));
        fields.push(Field::bytes(identity.public_key.as_bytes()));
        fields.push(Field::Int64(self.window.sign_start.epoch_secs()));
        fields.push(Field::Int64(self.window.sign_end.epoch_secs()));
        fields.push(Field::Int64(self.window.validate_end.epoch_secs()));
        for sk in &self.signing_keys {
            fields.push(Field::bytes(&sk.currency));
            fields.push(Field::Uint64(sk.amount));
            fields.push(Field::bytes(sk.algorithm.as_str()));
            fields.push(Field::bytes(sk.public_key.as_bytes()));
        }
        Ok(CanonicalBytes::encode(&fields)?)
    }

    /// Sign with every signing key in list order, then the identity key.
    pub fn sign(&mut self, identity: &IdentityKey) -> Result<(), NetconfError> {
        let data = self.signable(identity)?;
        let mut signatures = Vec::with_capacity(self.signing_keys.len() + 1);
        for sk in &self.signing_keys {
            signatures.push(sk.sign(&data)?);
        }
        signatures.push(identity.sign(&data)?);
        self.signatures = signatures;
        Ok(())
    }

    /// Check every signature positionally. The identity signature is last.
    pub fn verify(&self, identity: &IdentityKey) -> Result<(), NetconfError> {
        let expected = self.signing_keys.len() + 1;
        if self.signatures.len() != expected {
            return Err(NetconfError::SignatureCountMismatch {
                expected,
                found: self.signatures.len(),
            });
        }
        let data = self.signable(identity)?;
        for (sk, sig) in self.signing_keys.iter().zip(&self.signatures) {
            sk.verify(&data, sig)
                .map_err(|source| NetconfError::EpochSignatureInvalid {
                    signer: format!("signing key {}", sk.dbc_type()),
                    source,
                })?;
        }
        identity
            .verify(&data, &self.signatures[expected - 1])
            .map_err(|source| NetconfError::EpochSignatureInvalid {
                signer: "identity key".to_string(),
                source,
            })
    }

    /// At most one signing key per DBC type.
    pub fn check_unique_keys(&self) -> Result<(), NetconfError> {
        let mut seen = BTreeSet::new();
        for sk in &self.signing_keys {
            let t = sk.dbc_type();
            if seen.contains(&t) {
                return Err(NetconfError::DuplicateSigningKey { dbc_type: t });
            }
            seen.insert(t);
        }
        Ok(())
    }

    /// The key for `dbc_type`, if any.
    pub fn signing_key(&self, dbc_type: &DbcType) -> Option<&SigningKey> {
        self.signing_keys
            .iter()
            .find(|sk| sk.currency == dbc_type.currency && sk.amount == dbc_type.amount)
    }
}

/// The published configuration of one mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Human readable name.
    pub description: String,
    /// Long-term identity key (public half only on disk).
    pub identity_key: IdentityKey,
    /// One entry per network epoch, from genesis on.
    pub epochs: Vec<MintEpoch>,
    /// How to reach the mint.
    pub urls: Vec<String>,
}

impl Mint {
    /// Onboard a mint: mirror every network epoch, key and sign all of them.
    ///
    /// `identity_key` must carry its private half.
    pub fn new(
        description: impl Into<String>,
        identity_key: &IdentityKey,
        urls: Vec<String>,
        network: &Network,
    ) -> Result<Self, NetconfError> {
        let mut mint = Self {
            description: description.into(),
            identity_key: identity_key.to_public(),
            epochs: network
                .epochs
                .iter()
                .map(|e| MintEpoch::new(e.window))
                .collect(),
            urls,
        };
        mint.generate_keys(network, 0)?;
        for epoch in &mut mint.epochs {
            epoch.sign(identity_key)?;
        }
        tracing::info!(mint = %mint.id(), epochs = mint.epochs.len(), "created mint key list");
        Ok(mint)
    }

    /// The mint's canonical ID.
    pub fn id(&self) -> MintId {
        self.identity_key.marshal_id()
    }

    /// Key every epoch from `start` on for each DBC type active in it that
    /// has no key yet. Earlier epochs are untouched.
    fn generate_keys(&mut self, network: &Network, start: usize) -> Result<(), NetconfError> {
        let mut catalog = network.catalog_upto(start)?;
        for (i, net_epoch) in network.epochs.iter().enumerate().skip(start) {
            catalog.apply(i, &net_epoch.dbc_types_added, &net_epoch.dbc_types_removed)?;
            let Some(epoch) = self.epochs.get_mut(i) else {
                break;
            };
            for t in catalog.iter() {
                if epoch.signing_key(t).is_none() {
                    tracing::debug!(epoch = i, dbc_type = %t, "generating signing key");
                    epoch.signing_keys.push(SigningKey::generate(t));
                }
            }
        }
        Ok(())
    }

    /// Append epochs for every network epoch this mint lacks, key them and
    /// sign them. Returns the number of epochs appended.
    ///
    /// Fails if an existing epoch's boundaries no longer match the network.
    pub fn extend(
        &mut self,
        identity_key: &IdentityKey,
        network: &Network,
    ) -> Result<usize, NetconfError> {
        if *identity_key != self.identity_key {
            return Err(NetconfError::IdentityKeyMismatch {
                expected: self.id(),
                found: identity_key.marshal_id(),
            });
        }
        self.validate()?;
        self.check_against(network)?;
        let start = self.epochs.len();
        if start == network.epochs.len() {
            return Ok(0);
        }
        self.epochs
            .extend(network.epochs[start..].iter().map(|e| MintEpoch::new(e.window)));
        self.generate_keys(network, start)?;
        for epoch in &mut self.epochs[start..] {
            epoch.sign(identity_key)?;
        }
        self.validate()?;
        let added = self.epochs.len() - start;
        tracing::info!(mint = %self.id(), added, "extended mint key list");
        Ok(added)
    }

    /// Existing epochs match the network's boundaries.
    pub fn check_against(&self, network: &Network) -> Result<(), NetconfError> {
        if self.epochs.len() > network.epochs.len() {
            return Err(NetconfError::MintEpochsExceedNetwork {
                mint: self.epochs.len(),
                network: network.epochs.len(),
            });
        }
        for (index, (mine, theirs)) in self.epochs.iter().zip(&network.epochs).enumerate() {
            if mine.window != theirs.window {
                return Err(NetconfError::MintEpochMismatch { index });
            }
        }
        Ok(())
    }

    /// Strip every signing key's private half.
    pub fn prune_priv_keys(&mut self) {
        for epoch in &mut self.epochs {
            for sk in &mut epoch.signing_keys {
                sk.prune();
            }
        }
    }

    /// Boundary chaining, per-epoch signatures and key uniqueness, and at
    /// least one URL.
    pub fn validate(&self) -> Result<(), NetconfError> {
        validate_chain(self.epochs.iter().map(|e| &e.window))?;
        for epoch in &self.epochs {
            epoch.window.validate()?;
            epoch.check_unique_keys()?;
            epoch.verify(&self.identity_key)?;
        }
        if self.urls.is_empty() {
            return Err(NetconfError::MissingUrls { id: self.id() });
        }
        Ok(())
    }

    // ─── Persistence ─────────────────────────────────────────────────

    /// Load a mint file. The result is not validated.
    pub fn load(path: &Path) -> Result<Self, NetconfError> {
        let mint: Self = store::load_json(path)?;
        tracing::debug!(path = %path.display(), mint = %mint.id(), "loaded mint");
        Ok(mint)
    }

    /// Write the mint file atomically.
    ///
    /// Private key lists must be written with [`FileMode::Private`].
    pub fn save(&self, path: &Path, mode: FileMode) -> Result<(), NetconfError> {
        store::save_json(path, self, mode)?;
        tracing::info!(path = %path.display(), mint = %self.id(), "saved mint");
        Ok(())
    }
}
