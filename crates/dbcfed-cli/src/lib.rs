//! # dbcfed-cli — Federation Operator Command Line
//!
//! Provides the `dbcfed` command-line interface over `dbcfed-netconf`.
//!
//! ## Subcommands
//!
//! - `dbcfed gov` — Governance edits to `federation.json`: genesis, epochs,
//!   quorum, membership and DBC types.
//! - `dbcfed mint` — Identity secrets, key replacement signatures and the
//!   private/public key list pair of a single mint.
//! - `dbcfed engine` — Federation validation as a signing engine sees it.
//!
//! Every mutating command follows the same pattern: load, validate, edit,
//! validate again, persist. Nothing is written if any stage fails.
//!
//! ```bash
//! dbcfed gov start -m 2 -n 3 --dbctype EUR/100000000 <mint-id> <mint-id> <mint-id>
//! dbcfed gov epoch add
//! dbcfed mint keylist extend
//! dbcfed engine validateconf -d /srv/federation
//! ```

pub mod engine;
pub mod gov;
pub mod mint;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use dbcfed_core::Timestamp;
use dbcfed_netconf::{store, NetconfConfig, Network};

/// Everything a handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded configuration.
    pub config: NetconfConfig,
    /// Federation directory holding `federation.json` and `mints/`.
    pub dir: PathBuf,
    /// Operator-local mint home, if one could be resolved.
    pub mint_home: Option<PathBuf>,
    /// The present moment for every timing check of this invocation.
    pub now: Timestamp,
}

impl Session {
    /// Assemble a session. `dir` falls back to the configured federation
    /// directory.
    pub fn new(
        config: NetconfConfig,
        dir: Option<&Path>,
        mint_home: Option<PathBuf>,
        now: Timestamp,
    ) -> Self {
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.federation_dir.clone());
        Self {
            config,
            dir,
            mint_home,
            now,
        }
    }

    /// Path of `federation.json`.
    pub fn network_path(&self) -> PathBuf {
        store::network_path(&self.dir)
    }

    /// The mint home, or an error telling the operator how to set one.
    pub fn mint_home(&self) -> Result<&Path> {
        self.mint_home.as_deref().context(
            "no mint home: pass --mint-home, set DBCFED_MINT_HOME or configure mint_home",
        )
    }

    /// Load and validate the network file.
    pub fn load_network(&self) -> Result<Network> {
        let path = self.network_path();
        let network = Network::load(&path)
            .with_context(|| format!("failed to load network: {}", path.display()))?;
        network
            .validate()
            .with_context(|| format!("invalid network: {}", path.display()))?;
        Ok(network)
    }
}
