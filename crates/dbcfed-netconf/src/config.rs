//! # Configuration
//!
//! Optional YAML file with governance defaults and directory locations.
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```yaml
//! signing_period_days: 30
//! validation_period_days: 30
//! default_quorum: 2
//! default_mint_count: 3
//! federation_dir: /srv/federation
//! mint_home: /var/lib/dbcfed-mint
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::NetconfError;

/// Environment variable overriding the mint home directory.
pub const MINT_HOME_ENV: &str = "DBCFED_MINT_HOME";

/// Mint home below `$HOME` when nothing else is configured.
pub const DEFAULT_MINT_HOME: &str = ".config/dbcfed-mint";

/// Governance defaults and directory locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetconfConfig {
    /// Length of a signing window in days.
    pub signing_period_days: u32,
    /// Length of a validation window in days.
    pub validation_period_days: u32,
    /// Quorum M for `gov start` when not given.
    pub default_quorum: u64,
    /// Mint count N for `gov start` when not given.
    pub default_mint_count: u64,
    /// Directory holding `federation.json` and `mints/`.
    pub federation_dir: PathBuf,
    /// Operator-local directory for secrets and private key lists.
    pub mint_home: Option<PathBuf>,
}

impl Default for NetconfConfig {
    fn default() -> Self {
        Self {
            signing_period_days: 30,
            validation_period_days: 30,
            default_quorum: 2,
            default_mint_count: 3,
            federation_dir: PathBuf::from("."),
            mint_home: None,
        }
    }
}

impl NetconfConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self, NetconfError> {
        let text = std::fs::read_to_string(path).map_err(|source| NetconfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| NetconfError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, NetconfError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Signing window length.
    pub fn signing_period(&self) -> Duration {
        Duration::days(i64::from(self.signing_period_days))
    }

    /// Validation window length.
    pub fn validation_period(&self) -> Duration {
        Duration::days(i64::from(self.validation_period_days))
    }

    /// Resolve the mint home: explicit flag, then `env`, then the config
    /// file, then `<home>/.config/dbcfed-mint`.
    pub fn resolve_mint_home(
        &self,
        flag: Option<&Path>,
        env: Option<OsString>,
        home: Option<OsString>,
    ) -> Option<PathBuf> {
        if let Some(p) = flag {
            return Some(p.to_path_buf());
        }
        if let Some(p) = env.filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(p));
        }
        if let Some(p) = &self.mint_home {
            return Some(p.clone());
        }
        home.filter(|v| !v.is_empty())
            .map(|h| PathBuf::from(h).join(DEFAULT_MINT_HOME))
    }

    /// [`Self::resolve_mint_home`] against the process environment.
    pub fn mint_home(&self, flag: Option<&Path>) -> Option<PathBuf> {
        self.resolve_mint_home(
            flag,
            std::env::var_os(MINT_HOME_ENV),
            std::env::var_os("HOME"),
        )
    }
}
