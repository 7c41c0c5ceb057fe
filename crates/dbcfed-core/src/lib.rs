//! # dbcfed-core — Foundational Types for the Mint Federation
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate relies on for deterministic signing and time handling.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** ALL signature input flows through
//!    `CanonicalBytes::encode()` (an ordered list of typed [`Field`]s) or
//!    `CanonicalBytes::identity_binding()`. Signing raw bytes is impossible
//!    by construction, so a previously published signature can always be
//!    re-verified from the same field list.
//!
//! 2. **Closed field set.** [`Field`] is an enum over fixed-width integers,
//!    length-prefixed byte strings and skip markers. There is no runtime
//!    type inspection in the encoder.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision.
//!
//! 4. **Injected time.** Nothing in the core reads the wall clock directly;
//!    callers pass a `Timestamp` obtained from a [`Clock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dbcfed-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::{CanonicalBytes, CanonicalReader, Field};
pub use error::{CanonicalizationError, TemporalError};
pub use identity::MintId;
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
