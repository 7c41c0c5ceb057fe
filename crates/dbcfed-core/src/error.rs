//! # Error Types
//!
//! Leaf error types for canonical encoding and timestamp handling. Higher
//! crates wrap these with `#[from]` conversions.

use thiserror::Error;

/// Error while producing or reading canonical bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// A byte string does not fit the 32-bit length prefix.
    #[error("byte string of {0} bytes exceeds the 32-bit length prefix")]
    FieldTooLong(usize),

    /// The input ended before the field was complete.
    #[error("input truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to finish the field.
        needed: usize,
        /// Bytes remaining in the input.
        available: usize,
    },

    /// The tag byte does not match the expected field type.
    #[error("unexpected tag 0x{found:02x}, expected 0x{expected:02x}")]
    UnexpectedTag {
        /// Tag the reader expected.
        expected: u8,
        /// Tag found in the input.
        found: u8,
    },

    /// A decoded byte string length lies outside the caller's limits.
    #[error("byte string length {len} outside allowed range {min}..={max}")]
    LengthOutOfBounds {
        /// Decoded length.
        len: usize,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Error while parsing or computing a timestamp.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// The input is not RFC 3339 or does not use the `Z` suffix.
    #[error("invalid timestamp {input:?}: {reason}")]
    Invalid {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Adding a duration left the representable range.
    #[error("timestamp arithmetic overflow")]
    Overflow,
}
