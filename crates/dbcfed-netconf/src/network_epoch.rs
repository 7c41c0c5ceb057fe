//! # Network Epochs
//!
//! One governance record: quorum parameters, the epoch window, and the
//! membership and catalog deltas that take effect in it.
//!
//! The `mint_*`, `dbc_type_*` and `set_quorum` methods are unchecked
//! primitives. They append to the delta lists without looking at the rest of
//! the network, so several edits can be batched before one validation. Use
//! [`Network::apply`](crate::Network::apply) to run them inside a
//! validate-edit-validate transaction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dbcfed_core::MintId;

use crate::dbc_type::{dbc_types_disjunct, DbcType};
use crate::error::NetconfError;
use crate::identity_key::IdentityKey;
use crate::key_replacement::KeyReplacement;
use crate::window::EpochWindow;

/// A verification epoch of the whole network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEpoch {
    /// Quorum M.
    pub quorum: u64,
    /// Total number of mints N.
    pub mint_count: u64,
    /// Signing and validation boundaries.
    #[serde(flatten)]
    pub window: EpochWindow,
    /// Mints joining in this epoch.
    #[serde(default)]
    pub mints_added: Vec<IdentityKey>,
    /// Mints leaving in this epoch.
    #[serde(default)]
    pub mints_removed: Vec<IdentityKey>,
    /// Identity key successions in this epoch.
    #[serde(default)]
    pub mints_replaced: Vec<KeyReplacement>,
    /// DBC types defined from this epoch on.
    #[serde(default)]
    pub dbc_types_added: Vec<DbcType>,
    /// DBC types withdrawn from this epoch on.
    #[serde(default)]
    pub dbc_types_removed: Vec<DbcType>,
}

impl NetworkEpoch {
    /// An epoch with no deltas.
    pub fn new(quorum: u64, mint_count: u64, window: EpochWindow) -> Self {
        Self {
            quorum,
            mint_count,
            window,
            mints_added: Vec::new(),
            mints_removed: Vec::new(),
            mints_replaced: Vec::new(),
            dbc_types_added: Vec::new(),
            dbc_types_removed: Vec::new(),
        }
    }

    /// Check every epoch-local invariant. `index` is reported in errors.
    pub fn validate(&self, index: usize) -> Result<(), NetconfError> {
        validate_quorum(self.quorum, self.mint_count)?;
        self.window.validate()?;
        if let Err(id) = self.mints_disjunct() {
            return Err(NetconfError::MintSetsOverlap { epoch: index, id });
        }
        if let Err(dbc_type) = self.dbc_types_disjunct() {
            return Err(NetconfError::DbcTypeSetsOverlap {
                epoch: index,
                dbc_type,
            });
        }
        for kr in &self.mints_replaced {
            kr.verify()?;
        }
        Ok(())
    }

    /// Added, removed, replaced-from and replaced-to IDs are pairwise
    /// disjoint. Returns the first ID found in two of them.
    pub fn mints_disjunct(&self) -> Result<(), MintId> {
        let sets: [BTreeSet<MintId>; 4] = [
            self.mints_added.iter().map(IdentityKey::marshal_id).collect(),
            self.mints_removed.iter().map(IdentityKey::marshal_id).collect(),
            self.mints_replaced.iter().map(KeyReplacement::old_id).collect(),
            self.mints_replaced.iter().map(KeyReplacement::new_id).collect(),
        ];
        for (i, a) in sets.iter().enumerate() {
            for b in &sets[i + 1..] {
                if let Some(id) = a.intersection(b).next() {
                    return Err(id.clone());
                }
            }
        }
        Ok(())
    }

    /// Added and removed DBC types are disjoint.
    pub fn dbc_types_disjunct(&self) -> Result<(), DbcType> {
        dbc_types_disjunct(&self.dbc_types_added, &self.dbc_types_removed)
    }

    // ─── Unchecked primitives ────────────────────────────────────────

    /// Record a mint joining.
    pub fn mint_add(&mut self, key: IdentityKey) {
        self.mints_added.push(key.to_public());
    }

    /// Record a mint leaving.
    pub fn mint_remove(&mut self, key: IdentityKey) {
        self.mints_removed.push(key.to_public());
    }

    /// Record an identity key succession.
    pub fn mint_replace(&mut self, replacement: KeyReplacement) {
        self.mints_replaced.push(replacement);
    }

    /// Record a DBC type being defined.
    pub fn dbc_type_add(&mut self, dbc_type: DbcType) {
        self.dbc_types_added.push(dbc_type);
    }

    /// Record a DBC type being withdrawn.
    pub fn dbc_type_remove(&mut self, dbc_type: DbcType) {
        self.dbc_types_removed.push(dbc_type);
    }

    /// Change quorum M and, optionally, mint count N.
    pub fn set_quorum(&mut self, quorum: u64, mint_count: Option<u64>) {
        self.quorum = quorum;
        if let Some(n) = mint_count {
            self.mint_count = n;
        }
    }
}

/// `M > 0`, `N > 0`, `M <= N` and `M > N/2`.
pub fn validate_quorum(m: u64, n: u64) -> Result<(), NetconfError> {
    if m == 0 {
        return Err(NetconfError::ZeroQuorum);
    }
    if n == 0 {
        return Err(NetconfError::ZeroMintCount);
    }
    if m > n {
        return Err(NetconfError::QuorumExceedsMintCount { m, n });
    }
    if m <= n / 2 {
        return Err(NetconfError::QuorumTooSmall { m, n });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dbcfed_core::Timestamp;

    fn window() -> EpochWindow {
        EpochWindow::starting_at(
            Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            Duration::days(30),
            Duration::days(30),
        )
        .unwrap()
    }

    fn epoch(m: u64, n: u64) -> NetworkEpoch {
        NetworkEpoch::new(m, n, window())
    }

    #[test]
    fn test_quorum_table() {
        assert!(matches!(epoch(0, 3).validate(0), Err(NetconfError::ZeroQuorum)));
        assert!(matches!(epoch(1, 0).validate(0), Err(NetconfError::ZeroMintCount)));
        assert!(matches!(
            epoch(4, 3).validate(0),
            Err(NetconfError::QuorumExceedsMintCount { m: 4, n: 3 })
        ));
        assert!(matches!(epoch(1, 2).validate(0), Err(NetconfError::QuorumTooSmall { .. })));
        assert!(matches!(
            epoch(5, 10).validate(0),
            Err(NetconfError::QuorumTooSmall { m: 5, n: 10 })
        ));
        epoch(6, 11).validate(0).unwrap();
        epoch(2, 3).validate(0).unwrap();
        epoch(1, 1).validate(0).unwrap();
    }

    #[test]
    fn test_zero_mint_count_reported_before_comparison() {
        assert!(matches!(validate_quorum(1, 0), Err(NetconfError::ZeroMintCount)));
    }

    #[test]
    fn test_window_checked() {
        let mut e = epoch(2, 3);
        e.window.validate_end = e.window.sign_end;
        assert!(matches!(
            e.validate(0),
            Err(NetconfError::SignEndNotBeforeValidateEnd { .. })
        ));
    }

    #[test]
    fn test_mint_sets_overlap() {
        let k = IdentityKey::generate();
        let mut e = epoch(2, 3);
        e.mint_add(k.clone());
        e.mint_remove(k.clone());
        let err = e.validate(4).unwrap_err();
        assert!(matches!(
            err,
            NetconfError::MintSetsOverlap { epoch: 4, ref id } if *id == k.marshal_id()
        ));
    }

    #[test]
    fn test_replace_to_overlapping_added() {
        let old = IdentityKey::generate();
        let new = IdentityKey::generate();
        let mut e = epoch(2, 3);
        e.mint_add(new.clone());
        e.mint_replace(KeyReplacement::create(&new, &old).unwrap());
        assert_eq!(e.mints_disjunct(), Err(new.marshal_id()));
    }

    #[test]
    fn test_dbc_type_sets_overlap() {
        let mut e = epoch(2, 3);
        e.dbc_type_add(DbcType::new("EUR", 100_000_000));
        e.dbc_type_remove(DbcType::new("EUR", 100_000_000));
        assert!(matches!(e.validate(0), Err(NetconfError::DbcTypeSetsOverlap { .. })));
    }

    #[test]
    fn test_invalid_replacement_rejected() {
        let old = IdentityKey::generate();
        let new = IdentityKey::generate();
        let third = IdentityKey::generate();
        let forged = KeyReplacement::create(&new, &third).unwrap();
        let mut e = epoch(2, 3);
        e.mint_replace(KeyReplacement::from_parts(new, old, forged.signature));
        assert!(matches!(e.validate(0), Err(NetconfError::KeyReplacementInvalid { .. })));
    }

    #[test]
    fn test_set_quorum() {
        let mut e = epoch(2, 3);
        e.set_quorum(3, None);
        assert_eq!((e.quorum, e.mint_count), (3, 3));
        e.set_quorum(3, Some(5));
        assert_eq!((e.quorum, e.mint_count), (3, 5));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(epoch(2, 3)).unwrap();
        assert_eq!(json["quorum"], 2);
        assert_eq!(json["mint_count"], 3);
        assert_eq!(json["sign_start"], "2026-01-01T00:00:00Z");
        assert_eq!(json["validate_end"], "2026-03-02T00:00:00Z");
        let back: NetworkEpoch = serde_json::from_value(json).unwrap();
        assert_eq!(back, epoch(2, 3));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn quorum_valid_iff_strict_majority(m in 0u64..64, n in 0u64..64) {
            let expected = m > 0 && n > 0 && m <= n && m > n / 2;
            prop_assert_eq!(validate_quorum(m, n).is_ok(), expected);
        }
    }
}
