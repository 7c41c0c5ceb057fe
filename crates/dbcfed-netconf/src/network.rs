//! # Network
//!
//! The ordered sequence of [`NetworkEpoch`]s. Epochs are only ever appended,
//! and only the last epoch may be edited, and only while its signing window
//! lies in the future.
//!
//! ## Replay
//!
//! Membership and catalog are never stored as such. They are recomputed by
//! replaying every epoch's deltas in order. Within an epoch the membership
//! order is removals, then replacements, then additions.
//!
//! ## Transactions
//!
//! [`Network::apply`] validates, clones, runs a batch of unchecked edits on
//! the clone and validates again. On failure the clone is dropped and the
//! caller still holds the original network.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use dbcfed_core::{MintId, Timestamp};

use crate::dbc_type::{DbcCatalog, DbcType};
use crate::error::NetconfError;
use crate::identity_key::IdentityKey;
use crate::network_epoch::NetworkEpoch;
use crate::store::{self, FileMode};
use crate::window::{validate_chain, EpochWindow};

/// The global list of verification epochs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Epochs in chronological order.
    pub epochs: Vec<NetworkEpoch>,
}

/// The mint membership after replaying some prefix of history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Membership {
    members: BTreeSet<MintId>,
}

impl Membership {
    /// Apply one epoch's membership deltas.
    pub fn apply(&mut self, index: usize, epoch: &NetworkEpoch) -> Result<(), NetconfError> {
        for key in &epoch.mints_removed {
            let id = key.marshal_id();
            if !self.members.remove(&id) {
                return Err(NetconfError::MintNotPresent { epoch: index, id });
            }
        }
        for kr in &epoch.mints_replaced {
            let old = kr.old_id();
            if !self.members.remove(&old) {
                return Err(NetconfError::MintNotPresent { epoch: index, id: old });
            }
            let new = kr.new_id();
            if self.contains(&new) {
                return Err(NetconfError::MintAlreadyPresent { epoch: index, id: new });
            }
            self.members.insert(new);
        }
        for key in &epoch.mints_added {
            let id = key.marshal_id();
            if self.contains(&id) {
                return Err(NetconfError::MintAlreadyPresent { epoch: index, id });
            }
            self.members.insert(id);
        }
        Ok(())
    }

    fn contains(&self, id: &MintId) -> bool {
        self.members.contains(id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Consume into the sorted ID set.
    pub fn into_ids(self) -> BTreeSet<MintId> {
        self.members
    }
}

impl Network {
    /// Genesis: a network with one seed epoch.
    ///
    /// The result is validated.
    pub fn start(
        quorum: u64,
        mint_count: u64,
        window: EpochWindow,
        mints: Vec<IdentityKey>,
        dbc_types: Vec<DbcType>,
    ) -> Result<Self, NetconfError> {
        let mut epoch = NetworkEpoch::new(quorum, mint_count, window);
        for key in mints {
            epoch.mint_add(key);
        }
        for t in dbc_types {
            epoch.dbc_type_add(t);
        }
        let network = Self {
            epochs: vec![epoch],
        };
        network.validate()?;
        Ok(network)
    }

    /// Validate every epoch, the transitions between them, and the full
    /// membership and catalog replay.
    pub fn validate(&self) -> Result<(), NetconfError> {
        if self.epochs.is_empty() {
            return Err(NetconfError::EmptyNetwork);
        }
        for (i, epoch) in self.epochs.iter().enumerate() {
            epoch.validate(i)?;
        }
        validate_chain(self.epochs.iter().map(|e| &e.window))?;
        self.replay(self.epochs.len())?;
        Ok(())
    }

    fn replay(&self, upto: usize) -> Result<(Membership, DbcCatalog), NetconfError> {
        let mut membership = Membership::default();
        let mut catalog = DbcCatalog::new();
        for (i, epoch) in self.epochs.iter().take(upto).enumerate() {
            membership.apply(i, epoch)?;
            catalog.apply(i, &epoch.dbc_types_added, &epoch.dbc_types_removed)?;
            tracing::trace!(
                epoch = i,
                mints = membership.len(),
                dbc_types = catalog.len(),
                "replayed epoch"
            );
        }
        Ok((membership, catalog))
    }

    /// Replay the catalog over the first `upto` epochs.
    pub fn catalog_upto(&self, upto: usize) -> Result<DbcCatalog, NetconfError> {
        let mut catalog = DbcCatalog::new();
        for (i, epoch) in self.epochs.iter().take(upto).enumerate() {
            catalog.apply(i, &epoch.dbc_types_added, &epoch.dbc_types_removed)?;
        }
        Ok(catalog)
    }

    /// The roster at the end of history.
    pub fn mints(&self) -> Result<BTreeSet<MintId>, NetconfError> {
        Ok(self.replay(self.epochs.len())?.0.into_ids())
    }

    /// The roster of the epoch signing at `now`.
    pub fn current_mints(&self, now: Timestamp) -> Result<BTreeSet<MintId>, NetconfError> {
        let current = self.current_epoch(now)?;
        Ok(self.replay(current + 1)?.0.into_ids())
    }

    /// Every mint ever named, including replaced and removed ones.
    pub fn all_mints(&self) -> BTreeSet<MintId> {
        let mut ids = BTreeSet::new();
        for epoch in &self.epochs {
            ids.extend(epoch.mints_added.iter().map(IdentityKey::marshal_id));
            for kr in &epoch.mints_replaced {
                ids.insert(kr.old_id());
                ids.insert(kr.new_id());
            }
        }
        ids
    }

    /// The catalog at the end of history, sorted.
    pub fn dbc_types(&self) -> Result<Vec<DbcType>, NetconfError> {
        Ok(self.catalog_upto(self.epochs.len())?.into_vec())
    }

    /// The last epoch.
    pub fn last_epoch(&self) -> Result<&NetworkEpoch, NetconfError> {
        self.epochs.last().ok_or(NetconfError::EmptyNetwork)
    }

    /// Index of the epoch whose signing window contains `now`.
    ///
    /// Fails when `now` is past the last epoch's sign end (governance is
    /// late) or before the first epoch's sign start.
    pub fn current_epoch(&self, now: Timestamp) -> Result<usize, NetconfError> {
        self.last_epoch()?;
        self.epochs
            .iter()
            .position(|e| e.window.is_signing(now))
            .ok_or(NetconfError::NoCurrentEpoch { now })
    }

    /// Succeeds only if the last epoch has not started signing yet.
    pub fn has_future(&self, now: Timestamp) -> Result<(), NetconfError> {
        let last = self.last_epoch()?;
        if last.window.sign_start > now {
            Ok(())
        } else {
            Err(NetconfError::NoFutureEpoch {
                sign_start: last.window.sign_start,
                now,
            })
        }
    }

    /// The epoch open for edits: the last one, if it lies in the future.
    pub fn open_epoch(&mut self, now: Timestamp) -> Result<&mut NetworkEpoch, NetconfError> {
        self.has_future(now)?;
        self.epochs.last_mut().ok_or(NetconfError::EmptyNetwork)
    }

    /// Append an epoch inheriting the previous quorum and mint count, with
    /// its signing window starting at the previous sign end.
    pub fn epoch_add(
        &mut self,
        signing_period: Duration,
        validation_period: Duration,
    ) -> Result<(), NetconfError> {
        let last = self.last_epoch()?;
        let window = last.window.successor(signing_period, validation_period)?;
        let epoch = NetworkEpoch::new(last.quorum, last.mint_count, window);
        self.epochs.push(epoch);
        Ok(())
    }

    /// Validate, run `edit` on a copy, validate the copy, return it.
    ///
    /// `self` is never modified.
    pub fn apply<F>(&self, edit: F) -> Result<Network, NetconfError>
    where
        F: FnOnce(&mut Network) -> Result<(), NetconfError>,
    {
        self.validate()?;
        let mut next = self.clone();
        edit(&mut next)?;
        next.validate()?;
        Ok(next)
    }

    // ─── Persistence ─────────────────────────────────────────────────

    /// Load a network file. The result is not validated.
    pub fn load(path: &Path) -> Result<Self, NetconfError> {
        let network: Self = store::load_json(path)?;
        tracing::info!(path = %path.display(), epochs = network.epochs.len(), "loaded network");
        Ok(network)
    }

    /// Write the network file atomically.
    pub fn save(&self, path: &Path) -> Result<(), NetconfError> {
        store::save_json(path, self, FileMode::Public)?;
        tracing::info!(path = %path.display(), epochs = self.epochs.len(), "saved network");
        Ok(())
    }
}
