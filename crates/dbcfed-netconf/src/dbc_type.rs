//! # DBC Types
//!
//! A DBC type is a denomination: a currency code plus a fixed amount in
//! minor units (8 digits after the point, so `100000000` is one unit).
//!
//! The catalog of valid types is never stored directly. It is derived by
//! replaying every epoch's added/removed deltas in order through
//! [`DbcCatalog`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::NetconfError;

/// A denomination certificates can be issued in.
///
/// Orders by currency, then amount.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DbcType {
    /// Currency code, usually ISO 4217.
    pub currency: String,
    /// Amount per DBC in minor units.
    pub amount: u64,
}

impl DbcType {
    /// Create a DBC type.
    pub fn new(currency: impl Into<String>, amount: u64) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }
}

impl std::fmt::Display for DbcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.currency, self.amount)
    }
}

impl std::str::FromStr for DbcType {
    type Err = NetconfError;

    /// Parse the `CURRENCY/AMOUNT` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: &str| NetconfError::DbcTypeParse {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (currency, amount) = s
            .split_once('/')
            .ok_or_else(|| parse_err("expected CURRENCY/AMOUNT"))?;
        if currency.is_empty() {
            return Err(parse_err("empty currency"));
        }
        let amount: u64 = amount.parse().map_err(|_| parse_err("amount is not a u64"))?;
        if amount == 0 {
            return Err(parse_err("amount is 0"));
        }
        Ok(Self::new(currency, amount))
    }
}

/// True when no DBC type is both added and removed.
pub fn dbc_types_disjunct(added: &[DbcType], removed: &[DbcType]) -> Result<(), DbcType> {
    let added: BTreeSet<&DbcType> = added.iter().collect();
    match removed.iter().find(|t| added.contains(t)) {
        Some(t) => Err(t.clone()),
        None => Ok(()),
    }
}

// ─── Catalog replay ──────────────────────────────────────────────────

/// The set of DBC types in force after replaying some prefix of history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbcCatalog {
    types: BTreeSet<DbcType>,
}

impl DbcCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one epoch's deltas. Removals are applied before additions.
    pub fn apply(
        &mut self,
        epoch: usize,
        added: &[DbcType],
        removed: &[DbcType],
    ) -> Result<(), NetconfError> {
        for t in removed {
            if !self.types.remove(t) {
                return Err(NetconfError::DbcTypeNotPresent {
                    epoch,
                    dbc_type: t.clone(),
                });
            }
        }
        for t in added {
            if !self.types.insert(t.clone()) {
                return Err(NetconfError::DbcTypeAlreadyPresent {
                    epoch,
                    dbc_type: t.clone(),
                });
            }
        }
        Ok(())
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &DbcType> {
        self.types.iter()
    }

    /// Number of defined types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are defined.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Consume into a sorted vector.
    pub fn into_vec(self) -> Vec<DbcType> {
        self.types.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(units: u64) -> DbcType {
        DbcType::new("EUR", units * 100_000_000)
    }

    #[test]
    fn test_display_and_order() {
        assert_eq!(eur(1).to_string(), "EUR/100000000");
        let mut v = vec![eur(5), DbcType::new("CHF", 1), eur(1)];
        v.sort();
        assert_eq!(v, vec![DbcType::new("CHF", 1), eur(1), eur(5)]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("EUR/100000000".parse::<DbcType>().unwrap(), eur(1));
        for bad in ["EUR", "/5", "EUR/x", "EUR/0", "EUR/-1"] {
            assert!(matches!(
                bad.parse::<DbcType>(),
                Err(NetconfError::DbcTypeParse { .. })
            ));
        }
    }

    #[test]
    fn test_disjunct() {
        assert!(dbc_types_disjunct(&[eur(1)], &[eur(2)]).is_ok());
        assert_eq!(dbc_types_disjunct(&[eur(1), eur(2)], &[eur(2)]), Err(eur(2)));
    }

    #[test]
    fn test_catalog_replay() {
        let mut c = DbcCatalog::new();
        c.apply(0, &[eur(1), eur(2), eur(5)], &[]).unwrap();
        c.apply(1, &[eur(10)], &[eur(2)]).unwrap();
        assert_eq!(c.into_vec(), vec![eur(1), eur(5), eur(10)]);
    }

    #[test]
    fn test_catalog_rejects_double_add() {
        let mut c = DbcCatalog::new();
        c.apply(0, &[eur(1)], &[]).unwrap();
        let err = c.apply(1, &[eur(1)], &[]).unwrap_err();
        assert!(matches!(err, NetconfError::DbcTypeAlreadyPresent { epoch: 1, .. }));
    }

    #[test]
    fn test_catalog_rejects_absent_removal() {
        let mut c = DbcCatalog::new();
        let err = c.apply(0, &[], &[eur(1)]).unwrap_err();
        assert!(matches!(err, NetconfError::DbcTypeNotPresent { epoch: 0, .. }));
    }
}
