//! # Network Configuration Errors
//!
//! Every violated invariant has its own variant so callers (and tests) can
//! match on the condition instead of on a message string. Validation returns
//! the first violation it finds.

use std::path::PathBuf;

use thiserror::Error;

use dbcfed_core::{CanonicalizationError, MintId, TemporalError, Timestamp};
use dbcfed_crypto::CryptoError;

use crate::dbc_type::DbcType;

/// Errors raised while validating, mutating, signing or persisting the
/// federation configuration.
#[derive(Error, Debug)]
pub enum NetconfError {
    // ─── Structural epoch errors ─────────────────────────────────────
    /// Quorum M is zero.
    #[error("quorum M is 0")]
    ZeroQuorum,

    /// Mint count N is zero.
    #[error("number of mints N is 0")]
    ZeroMintCount,

    /// Quorum M is greater than the number of mints N.
    #[error("quorum M={m} is greater than the number of mints N={n}")]
    QuorumExceedsMintCount {
        /// Quorum.
        m: u64,
        /// Mint count.
        n: u64,
    },

    /// Quorum M is not a strict majority of N.
    #[error("quorum M={m} too small for N={n} (must be > N/2)")]
    QuorumTooSmall {
        /// Quorum.
        m: u64,
        /// Mint count.
        n: u64,
    },

    /// Signing window does not start before it ends.
    #[error("sign start {sign_start} is not before sign end {sign_end}")]
    SignStartNotBeforeSignEnd {
        /// Start of the signing window.
        sign_start: Timestamp,
        /// End of the signing window.
        sign_end: Timestamp,
    },

    /// Validation window does not end after the signing window.
    #[error("sign end {sign_end} is not before validate end {validate_end}")]
    SignEndNotBeforeValidateEnd {
        /// End of the signing window.
        sign_end: Timestamp,
        /// End of the validation window.
        validate_end: Timestamp,
    },

    // ─── Epoch transitions ───────────────────────────────────────────
    /// Consecutive signing windows are not contiguous.
    #[error("epoch {index}: sign start {sign_start} does not match previous sign end {previous_sign_end}")]
    EpochBoundaryGap {
        /// Index of the later epoch.
        index: usize,
        /// Sign end of the epoch before it.
        previous_sign_end: Timestamp,
        /// Sign start of the later epoch.
        sign_start: Timestamp,
    },

    /// A validation window outlives the next signing window.
    #[error("epoch {index}: validate end {validate_end} is after next sign end {next_sign_end}")]
    ValidationOutlivesNextSigning {
        /// Index of the earlier epoch.
        index: usize,
        /// Its validate end.
        validate_end: Timestamp,
        /// Sign end of the epoch after it.
        next_sign_end: Timestamp,
    },

    // ─── Set integrity ───────────────────────────────────────────────
    /// A mint appears in more than one of the added/removed/replaced sets.
    #[error("epoch {epoch}: mint {id} appears in more than one membership change")]
    MintSetsOverlap {
        /// Epoch index.
        epoch: usize,
        /// The repeated mint.
        id: MintId,
    },

    /// A DBC type is both added and removed in one epoch.
    #[error("epoch {epoch}: DBC type {dbc_type} is both added and removed")]
    DbcTypeSetsOverlap {
        /// Epoch index.
        epoch: usize,
        /// The repeated DBC type.
        dbc_type: DbcType,
    },

    /// Adding (or replacing to) a mint that is already a member.
    #[error("epoch {epoch}: mint {id} is already a member")]
    MintAlreadyPresent {
        /// Epoch index.
        epoch: usize,
        /// The mint.
        id: MintId,
    },

    /// Removing (or replacing from) a mint that is not a member.
    #[error("epoch {epoch}: mint {id} is not a member")]
    MintNotPresent {
        /// Epoch index.
        epoch: usize,
        /// The mint.
        id: MintId,
    },

    /// Adding a DBC type that is already in the catalog.
    #[error("epoch {epoch}: DBC type {dbc_type} is already defined")]
    DbcTypeAlreadyPresent {
        /// Epoch index.
        epoch: usize,
        /// The DBC type.
        dbc_type: DbcType,
    },

    /// Removing a DBC type that is not in the catalog.
    #[error("epoch {epoch}: DBC type {dbc_type} is not defined")]
    DbcTypeNotPresent {
        /// Epoch index.
        epoch: usize,
        /// The DBC type.
        dbc_type: DbcType,
    },

    // ─── Cryptography ────────────────────────────────────────────────
    /// A key replacement proof does not verify under the old key.
    #[error("key replacement {old} -> {new} does not verify: {source}")]
    KeyReplacementInvalid {
        /// Replaced identity.
        old: MintId,
        /// Successor identity.
        new: MintId,
        /// Underlying verification failure.
        #[source]
        source: CryptoError,
    },

    /// Generic cryptographic failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A mint epoch signature does not verify.
    #[error("mint epoch signature by {signer} does not verify: {source}")]
    EpochSignatureInvalid {
        /// Which key was expected to have signed.
        signer: String,
        /// Underlying verification failure.
        #[source]
        source: CryptoError,
    },

    /// A mint epoch carries the wrong number of signatures.
    #[error("mint epoch has {found} signatures, expected {expected}")]
    SignatureCountMismatch {
        /// One per signing key plus the identity signature.
        expected: usize,
        /// Number present.
        found: usize,
    },

    // ─── Governance timing ───────────────────────────────────────────
    /// The last epoch's signing window has already started.
    #[error("no future epoch: last epoch started signing at {sign_start} (now {now})")]
    NoFutureEpoch {
        /// Sign start of the last epoch.
        sign_start: Timestamp,
        /// The present moment.
        now: Timestamp,
    },

    /// No epoch is signing at the present moment.
    #[error("no current epoch at {now}")]
    NoCurrentEpoch {
        /// The present moment.
        now: Timestamp,
    },

    // ─── Persistence ─────────────────────────────────────────────────
    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be parsed.
    #[error("config error in {}: {source}", path.display())]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The identity secret to use could not be determined.
    #[error("cannot select secret key in {}: {reason}", dir.display())]
    SecretSelection {
        /// Secrets directory.
        dir: PathBuf,
        /// Why no single secret was chosen.
        reason: String,
    },

    // ─── Supplementary ───────────────────────────────────────────────
    /// The network has no epochs.
    #[error("network has no epochs")]
    EmptyNetwork,

    /// A mint publishes no contact URL.
    #[error("mint {id} has no URLs")]
    MissingUrls {
        /// The mint.
        id: MintId,
    },

    /// A private key half is needed but was pruned or never loaded.
    #[error("missing private key for {what}")]
    MissingPrivateKey {
        /// The key concerned.
        what: String,
    },

    /// A stored private half does not belong to its public key.
    #[error("private key does not match public key for {what}")]
    PrivateKeyMismatch {
        /// The key concerned.
        what: String,
    },

    /// A marshalled identity key could not be parsed.
    #[error("cannot parse identity key {input:?}: {reason}")]
    IdentityKeyParse {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A `CURRENCY/AMOUNT` string could not be parsed.
    #[error("cannot parse DBC type {input:?}: {reason}")]
    DbcTypeParse {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A mint artifact is stored under an ID that its key does not marshal to.
    #[error("identity key {found} does not match expected {expected}")]
    IdentityKeyMismatch {
        /// ID derived from the file name.
        expected: MintId,
        /// ID derived from the key.
        found: MintId,
    },

    /// A mint epoch's boundaries differ from the network epoch at the same index.
    #[error("mint epoch {index} does not match network epoch boundaries")]
    MintEpochMismatch {
        /// Epoch index.
        index: usize,
    },

    /// A mint has more epochs than the network.
    #[error("mint has {mint} epochs but the network only {network}")]
    MintEpochsExceedNetwork {
        /// Mint epoch count.
        mint: usize,
        /// Network epoch count.
        network: usize,
    },

    /// Two signing keys in one mint epoch cover the same DBC type.
    #[error("duplicate signing key for DBC type {dbc_type}")]
    DuplicateSigningKey {
        /// The DBC type.
        dbc_type: DbcType,
    },

    /// Fewer mints published the current epoch than the quorum requires.
    #[error("epoch {epoch}: only {available} mints available, quorum is {quorum}")]
    QuorumNotReached {
        /// Current epoch index.
        epoch: usize,
        /// Mints with keys for that epoch.
        available: usize,
        /// Required quorum M.
        quorum: u64,
    },

    /// Canonical encoding failure.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// Timestamp arithmetic failure.
    #[error(transparent)]
    Temporal(#[from] TemporalError),
}
