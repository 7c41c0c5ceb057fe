//! # dbcfed-netconf — Federation Trust Configuration
//!
//! The epoch, quorum and credential model of a federation of independent
//! mints issuing digital bearer certificates.
//!
//! ## Model
//!
//! - **Network** (`network.rs`, `network_epoch.rs`): the ordered sequence of
//!   governance epochs. Each epoch carries its quorum M-of-N, its signing and
//!   validation window, and the membership and DBC-type deltas taking effect
//!   in it. Membership and catalog are derived by replay.
//!
//! - **Governance** (`governance.rs`): load, validate, edit the open epoch,
//!   validate again. [`Network::apply`] is the transaction primitive.
//!
//! - **Identity** (`identity_key.rs`, `key_replacement.rs`): long-term mint
//!   keys, their canonical `MintId`, and signed successions.
//!
//! - **Mint credentials** (`mint.rs`, `signing_key.rs`): each mint mirrors
//!   the network epochs with per-DBC-type signing keys, chained to its
//!   identity key by a two-tier signature.
//!
//! - **Federation** (`federation.rs`): the network plus loadable mint
//!   artifacts, checked for quorum reachability at a given moment.
//!
//! ## Time
//!
//! Nothing here reads the wall clock. Operations that depend on the present
//! take a `Timestamp`.

pub mod config;
pub mod dbc_type;
pub mod error;
pub mod federation;
pub mod governance;
pub mod identity_key;
pub mod key_replacement;
pub mod mint;
pub mod network;
pub mod network_epoch;
pub mod signing_key;
pub mod store;
pub mod window;

pub use config::NetconfConfig;
pub use dbc_type::{DbcCatalog, DbcType};
pub use error::NetconfError;
pub use federation::{Federation, LoadWarning, Roster};
pub use identity_key::IdentityKey;
pub use key_replacement::KeyReplacement;
pub use mint::{Mint, MintEpoch};
pub use network::Network;
pub use network_epoch::NetworkEpoch;
pub use signing_key::SigningKey;
pub use store::FileMode;
pub use window::EpochWindow;
