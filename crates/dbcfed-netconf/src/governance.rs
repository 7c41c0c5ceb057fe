//! # Governance Transactions
//!
//! Each governance action is one [`Network::apply`] transaction over the
//! open epoch. The returned network is validated and ready to persist; the
//! input network is untouched whether the action succeeds or not.
//!
//! Adding an epoch is the only action that does not require an open epoch.

use chrono::Duration;

use dbcfed_core::{MintId, Timestamp};

use crate::dbc_type::DbcType;
use crate::error::NetconfError;
use crate::identity_key::IdentityKey;
use crate::key_replacement::KeyReplacement;
use crate::network::Network;

impl Network {
    /// Onboard a mint in the open epoch.
    pub fn add_mint(&self, now: Timestamp, key: &IdentityKey) -> Result<Network, NetconfError> {
        let next = self.apply(|n| {
            n.open_epoch(now)?.mint_add(key.clone());
            Ok(())
        })?;
        tracing::info!(mint = %key.marshal_id(), "mint added");
        Ok(next)
    }

    /// Remove a mint in the open epoch.
    pub fn remove_mint(&self, now: Timestamp, id: &MintId) -> Result<Network, NetconfError> {
        let key = IdentityKey::parse(id.as_str())?;
        let next = self.apply(|n| {
            n.open_epoch(now)?.mint_remove(key);
            Ok(())
        })?;
        tracing::info!(mint = %id, "mint removed");
        Ok(next)
    }

    /// Replace a mint's identity key in the open epoch.
    ///
    /// The proof is verified before it is appended.
    pub fn replace_mint(
        &self,
        now: Timestamp,
        replacement: KeyReplacement,
    ) -> Result<Network, NetconfError> {
        replacement.verify()?;
        let (old, new) = (replacement.old_id(), replacement.new_id());
        let next = self.apply(|n| {
            n.open_epoch(now)?.mint_replace(replacement);
            Ok(())
        })?;
        tracing::info!(old = %old, new = %new, "mint replaced");
        Ok(next)
    }

    /// Define a DBC type from the open epoch on.
    pub fn add_dbc_type(
        &self,
        now: Timestamp,
        dbc_type: DbcType,
    ) -> Result<Network, NetconfError> {
        let label = dbc_type.to_string();
        let next = self.apply(|n| {
            n.open_epoch(now)?.dbc_type_add(dbc_type);
            Ok(())
        })?;
        tracing::info!(dbc_type = %label, "DBC type added");
        Ok(next)
    }

    /// Withdraw a DBC type from the open epoch on.
    pub fn remove_dbc_type(
        &self,
        now: Timestamp,
        dbc_type: DbcType,
    ) -> Result<Network, NetconfError> {
        let label = dbc_type.to_string();
        let next = self.apply(|n| {
            n.open_epoch(now)?.dbc_type_remove(dbc_type);
            Ok(())
        })?;
        tracing::info!(dbc_type = %label, "DBC type removed");
        Ok(next)
    }

    /// Change the open epoch's quorum and, optionally, its mint count.
    pub fn change_quorum(
        &self,
        now: Timestamp,
        quorum: u64,
        mint_count: Option<u64>,
    ) -> Result<Network, NetconfError> {
        let next = self.apply(|n| {
            n.open_epoch(now)?.set_quorum(quorum, mint_count);
            Ok(())
        })?;
        tracing::info!(quorum, ?mint_count, "quorum changed");
        Ok(next)
    }

    /// Append a new epoch after the last one.
    pub fn add_epoch(
        &self,
        signing_period: Duration,
        validation_period: Duration,
    ) -> Result<Network, NetconfError> {
        let next = self.apply(|n| n.epoch_add(signing_period, validation_period))?;
        tracing::info!(epochs = next.epochs.len(), "epoch added");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::EpochWindow;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn eur(units: u64) -> DbcType {
        DbcType::new("EUR", units * 100_000_000)
    }

    fn month() -> Duration {
        Duration::days(30)
    }

    fn setup() -> (Network, Vec<IdentityKey>) {
        let keys: Vec<IdentityKey> = (0..3).map(|_| IdentityKey::generate()).collect();
        let window = EpochWindow::starting_at(ts("2026-01-01T00:00:00Z"), month(), month()).unwrap();
        let net = Network::start(2, 3, window, keys.clone(), vec![eur(1), eur(2), eur(5)]).unwrap();
        (net, keys)
    }

    fn before() -> Timestamp {
        ts("2025-12-15T00:00:00Z")
    }

    #[test]
    fn test_add_and_remove_mint() {
        let (net, keys) = setup();
        let newcomer = IdentityKey::generate();
        let net = net.change_quorum(before(), 3, Some(4)).unwrap();
        let net = net.add_mint(before(), &newcomer).unwrap();
        assert_eq!(net.mints().unwrap().len(), 4);

        let net = net.add_epoch(month(), month()).unwrap();
        let net = net.remove_mint(before(), &keys[0].marshal_id()).unwrap();
        let net = net.change_quorum(before(), 2, Some(3)).unwrap();
        let roster = net.mints().unwrap();
        assert_eq!(roster.len(), 3);
        assert!(!roster.contains(&keys[0].marshal_id()));
    }

    #[test]
    fn test_add_existing_mint_rejected() {
        let (net, keys) = setup();
        let err = net.add_mint(before(), &keys[1]).unwrap_err();
        assert!(matches!(err, NetconfError::MintAlreadyPresent { epoch: 0, .. }));
    }

    #[test]
    fn test_remove_unknown_mint_rejected() {
        let (net, _) = setup();
        let stranger = IdentityKey::generate().marshal_id();
        let err = net.remove_mint(before(), &stranger).unwrap_err();
        assert!(matches!(err, NetconfError::MintNotPresent { .. }));
    }

    #[test]
    fn test_replace_mint() {
        let (net, keys) = setup();
        let net = net.add_epoch(month(), month()).unwrap();
        let successor = IdentityKey::generate();
        let proof = KeyReplacement::create(&successor, &keys[2]).unwrap();
        let next = net.replace_mint(before(), proof.clone()).unwrap();
        let roster = next.mints().unwrap();
        assert!(roster.contains(&successor.marshal_id()));
        assert!(!roster.contains(&keys[2].marshal_id()));

        let wrong_old = KeyReplacement::from_parts(successor, keys[1].clone(), proof.signature);
        assert!(matches!(
            net.replace_mint(before(), wrong_old),
            Err(NetconfError::KeyReplacementInvalid { .. })
        ));
    }

    #[test]
    fn test_dbc_type_edits() {
        let (net, _) = setup();
        let net = net.add_epoch(month(), month()).unwrap();
        let net = net.add_dbc_type(before(), eur(10)).unwrap();
        let net = net.remove_dbc_type(before(), eur(1)).unwrap();
        assert_eq!(net.dbc_types().unwrap(), vec![eur(2), eur(5), eur(10)]);
        assert!(matches!(
            net.remove_dbc_type(before(), eur(1)),
            Err(NetconfError::DbcTypeNotPresent { epoch: 1, .. })
        ));
        assert!(matches!(
            net.add_dbc_type(before(), eur(2)),
            Err(NetconfError::DbcTypeAlreadyPresent { epoch: 1, .. })
        ));
        assert!(matches!(
            net.add_dbc_type(before(), eur(1)),
            Err(NetconfError::DbcTypeSetsOverlap { epoch: 1, .. })
        ));
    }

    #[test]
    fn test_edits_need_open_epoch() {
        let (net, _) = setup();
        let during = ts("2026-01-10T00:00:00Z");
        assert!(matches!(
            net.add_dbc_type(during, eur(10)),
            Err(NetconfError::NoFutureEpoch { .. })
        ));
        let net = net.add_epoch(month(), month()).unwrap();
        net.add_dbc_type(during, eur(10)).unwrap();
    }

    #[test]
    fn test_bad_quorum_change_rejected() {
        let (net, _) = setup();
        assert!(matches!(
            net.change_quorum(before(), 2, Some(4)),
            Err(NetconfError::QuorumTooSmall { m: 2, n: 4 })
        ));
    }
}
