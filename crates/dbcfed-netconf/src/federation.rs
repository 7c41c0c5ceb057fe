//! # Federation Assembly
//!
//! Loads the network plus whatever mint artifacts are present and decides
//! whether the federation can currently produce a quorum of signatures.
//!
//! A single unreadable or invalid mint artifact does not abort the load. It
//! is logged, recorded in [`Federation::warnings`] and left out; the quorum
//! check then decides whether enough good data remains.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dbcfed_core::{MintId, Timestamp};

use crate::error::NetconfError;
use crate::mint::Mint;
use crate::network::Network;
use crate::store;

/// Which mints to look for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Roster {
    /// Members of the epoch signing now.
    #[default]
    Current,
    /// Every mint ever named by the network.
    All,
}

/// A mint artifact that was left out of the federation.
#[derive(Debug)]
pub struct LoadWarning {
    /// The mint concerned.
    pub id: MintId,
    /// Where it was expected.
    pub path: PathBuf,
    /// What went wrong.
    pub error: NetconfError,
}

/// A network with the mint credential sets that could be loaded.
#[derive(Debug)]
pub struct Federation {
    /// The validated network.
    pub network: Network,
    /// Successfully loaded and validated mints.
    pub mints: BTreeMap<MintId, Mint>,
    /// Mints that were left out, and why.
    pub warnings: Vec<LoadWarning>,
}

impl Federation {
    /// Load `<dir>/federation.json` and `<dir>/mints/*.json`, then validate.
    pub fn load(dir: &Path, now: Timestamp, roster: Roster) -> Result<Self, NetconfError> {
        let network = Network::load(&store::network_path(dir))?;
        network.validate()?;
        let ids = match roster {
            Roster::Current => network.current_mints(now)?,
            Roster::All => network.all_mints(),
        };

        let mut mints = BTreeMap::new();
        let mut warnings = Vec::new();
        for id in ids {
            let path = store::mint_path(dir, &id);
            match load_mint(&path, &id) {
                Ok(mint) => {
                    mints.insert(id, mint);
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %error, "skipping mint");
                    warnings.push(LoadWarning { id, path, error });
                }
            }
        }

        let federation = Self {
            network,
            mints,
            warnings,
        };
        federation.validate(now)?;
        tracing::info!(
            mints = federation.mints.len(),
            warnings = federation.warnings.len(),
            "loaded federation"
        );
        Ok(federation)
    }

    /// Every loaded mint matches the network's boundaries, and at least M
    /// of them published keys for the current epoch.
    pub fn validate(&self, now: Timestamp) -> Result<(), NetconfError> {
        for mint in self.mints.values() {
            mint.check_against(&self.network)?;
        }
        let current = self.network.current_epoch(now)?;
        let available = self.epoch_mint_count(current);
        let quorum = self.network.epochs[current].quorum;
        if (available as u64) < quorum {
            return Err(NetconfError::QuorumNotReached {
                epoch: current,
                available,
                quorum,
            });
        }
        Ok(())
    }

    /// Number of loaded mints that published keys for epoch `index`.
    pub fn epoch_mint_count(&self, index: usize) -> usize {
        self.mints
            .values()
            .filter(|m| m.epochs.len() > index)
            .count()
    }

    /// [`Self::epoch_mint_count`] for every network epoch.
    pub fn epoch_mint_counts(&self) -> Vec<usize> {
        (0..self.network.epochs.len())
            .map(|i| self.epoch_mint_count(i))
            .collect()
    }
}

fn load_mint(path: &Path, id: &MintId) -> Result<Mint, NetconfError> {
    let mint = Mint::load(path)?;
    let found = mint.id();
    if &found != id {
        return Err(NetconfError::IdentityKeyMismatch {
            expected: id.clone(),
            found,
        });
    }
    mint.validate()?;
    Ok(mint)
}
