//! # Mint Identifiers
//!
//! `MintId` is the canonical string form of a mint identity key
//! (`<algorithm>-<base64url(pubkey)>`). It is the key of every membership
//! set and the file stem of every published mint artifact.
//!
//! The key-derived construction lives with the identity key itself; this
//! newtype only keeps mint IDs from being confused with other strings.

use serde::{Deserialize, Serialize};

/// Canonical identifier of a mint, derived from its identity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MintId(String);

impl MintId {
    /// Wrap an already-marshalled ID string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the mint's published artifact (`<id>.json`).
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl std::fmt::Display for MintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MintId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
