//! # Canonical Encoding — Length-Prefixed Typed Field Lists
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that are signed or verified anywhere in the federation.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. It can only be
//! built by [`CanonicalBytes::encode()`] from an ordered list of [`Field`]s,
//! or by [`CanonicalBytes::identity_binding()`] for key-replacement proofs.
//! Every signing and verification function takes `&CanonicalBytes`, so a
//! signature can never be computed over ad hoc bytes that a verifier would
//! be unable to reproduce.
//!
//! ## Wire Form
//!
//! Big-endian, no implicit padding:
//!
//! ```text
//! Int16   0x01 | i16            (3 bytes)
//! Int32   0x02 | i32            (5 bytes)
//! Int64   0x03 | i64            (9 bytes)
//! Bytes   0x04 | u32 len | data (5 + len bytes)
//! Uint64  0x05 | u64            (9 bytes)
//! Skip(n) n zero bytes
//! ```
//!
//! The encoder computes the total size up front, allocates once and then
//! serializes the fields in order. The same field list always yields the
//! same bytes.

use crate::error::CanonicalizationError;
use crate::identity::MintId;

/// Tag byte of an encoded [`Field::Int16`].
pub const TAG_INT16: u8 = 0x01;
/// Tag byte of an encoded [`Field::Int32`].
pub const TAG_INT32: u8 = 0x02;
/// Tag byte of an encoded [`Field::Int64`].
pub const TAG_INT64: u8 = 0x03;
/// Tag byte of an encoded [`Field::Bytes`].
pub const TAG_BYTES: u8 = 0x04;
/// Tag byte of an encoded [`Field::Uint64`].
pub const TAG_UINT64: u8 = 0x05;

const BYTES_HEADER: usize = 5;

/// One typed value in a canonical field list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer (timestamps are encoded as Unix seconds).
    Int64(i64),
    /// Unsigned 64-bit integer (denomination amounts).
    Uint64(u64),
    /// Length-prefixed byte string.
    Bytes(Vec<u8>),
    /// `n` zero bytes with no tag.
    Skip(usize),
}

impl Field {
    /// Convenience constructor for a byte-string field.
    pub fn bytes(data: impl AsRef<[u8]>) -> Self {
        Self::Bytes(data.as_ref().to_vec())
    }

    /// Number of bytes this field occupies once encoded.
    pub fn encoded_size(&self) -> usize {
        match self {
            Self::Int16(_) => 3,
            Self::Int32(_) => 5,
            Self::Int64(_) | Self::Uint64(_) => 9,
            Self::Bytes(data) => BYTES_HEADER + data.len(),
            Self::Skip(n) => *n,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
        match self {
            Self::Int16(v) => {
                out.push(TAG_INT16);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Int32(v) => {
                out.push(TAG_INT32);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Int64(v) => {
                out.push(TAG_INT64);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Uint64(v) => {
                out.push(TAG_UINT64);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Bytes(data) => {
                let len = u32::try_from(data.len())
                    .map_err(|_| CanonicalizationError::FieldTooLong(data.len()))?;
                out.push(TAG_BYTES);
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(data);
            }
            Self::Skip(n) => out.resize(out.len() + n, 0),
        }
        Ok(())
    }
}

/// Total encoded size of a field list.
pub fn encoded_size(fields: &[Field]) -> usize {
    fields.iter().map(Field::encoded_size).sum()
}

/// Bytes produced exclusively by canonical encoding.
///
/// # Invariants
///
/// - Only constructible via [`CanonicalBytes::encode()`] and
///   [`CanonicalBytes::identity_binding()`].
/// - Encoding is a pure function of the field list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Encode an ordered field list.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FieldTooLong` if a byte string does
    /// not fit the 32-bit length prefix.
    pub fn encode(fields: &[Field]) -> Result<Self, CanonicalizationError> {
        let size = encoded_size(fields);
        let mut out = Vec::with_capacity(size);
        for field in fields {
            field.write_to(&mut out)?;
        }
        debug_assert_eq!(out.len(), size);
        Ok(Self(out))
    }

    /// The signable form of a mint identity: the UTF-8 bytes of its ID.
    ///
    /// Used for key-replacement proofs, where the old identity key signs
    /// the new key's ID.
    pub fn identity_binding(id: &MintId) -> Self {
        Self(id.as_str().as_bytes().to_vec())
    }

    /// Access the canonical bytes for signing or verification.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ─── Decoding ────────────────────────────────────────────────────────

/// Sequential reader over canonically encoded bytes.
///
/// The caller knows the field schema and reads fields in the same order
/// they were encoded.
#[derive(Debug, Clone)]
pub struct CanonicalReader<'a> {
    input: &'a [u8],
}

impl<'a> CanonicalReader<'a> {
    /// Start reading at the beginning of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    /// True once all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CanonicalizationError> {
        if self.input.len() < n {
            return Err(CanonicalizationError::Truncated {
                needed: n,
                available: self.input.len(),
            });
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    fn expect_tag(&mut self, expected: u8) -> Result<(), CanonicalizationError> {
        let found = *self.input.first().ok_or(CanonicalizationError::Truncated {
            needed: 1,
            available: 0,
        })?;
        if found != expected {
            return Err(CanonicalizationError::UnexpectedTag { expected, found });
        }
        self.input = &self.input[1..];
        Ok(())
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CanonicalizationError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    /// Read an [`Field::Int16`].
    pub fn read_int16(&mut self) -> Result<i16, CanonicalizationError> {
        self.ensure(3)?;
        self.expect_tag(TAG_INT16)?;
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    /// Read an [`Field::Int32`].
    pub fn read_int32(&mut self) -> Result<i32, CanonicalizationError> {
        self.ensure(5)?;
        self.expect_tag(TAG_INT32)?;
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    /// Read an [`Field::Int64`].
    pub fn read_int64(&mut self) -> Result<i64, CanonicalizationError> {
        self.ensure(9)?;
        self.expect_tag(TAG_INT64)?;
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    /// Read a [`Field::Uint64`].
    pub fn read_uint64(&mut self) -> Result<u64, CanonicalizationError> {
        self.ensure(9)?;
        self.expect_tag(TAG_UINT64)?;
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    /// Read a [`Field::Bytes`], borrowing from the input.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], CanonicalizationError> {
        self.read_bytes_limited(0, usize::MAX)
    }

    /// Read a [`Field::Bytes`] whose length must lie within `min..=max`.
    pub fn read_bytes_limited(
        &mut self,
        min: usize,
        max: usize,
    ) -> Result<&'a [u8], CanonicalizationError> {
        self.ensure(BYTES_HEADER)?;
        self.expect_tag(TAG_BYTES)?;
        let len = u32::from_be_bytes(self.take_array()?) as usize;
        if len < min || len > max {
            return Err(CanonicalizationError::LengthOutOfBounds { len, min, max });
        }
        self.take(len)
    }

    /// Consume a [`Field::Skip`] of `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), CanonicalizationError> {
        self.take(n).map(|_| ())
    }

    fn ensure(&self, n: usize) -> Result<(), CanonicalizationError> {
        if self.input.len() < n {
            return Err(CanonicalizationError::Truncated {
                needed: n,
                available: self.input.len(),
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field() -> impl Strategy<Value = Field> {
        prop_oneof![
            any::<i16>().prop_map(Field::Int16),
            any::<i32>().prop_map(Field::Int32),
            any::<i64>().prop_map(Field::Int64),
            any::<u64>().prop_map(Field::Uint64),
            prop::collection::vec(any::<u8>(), 0..64).prop_map(Field::Bytes),
            (0usize..8).prop_map(Field::Skip),
        ]
    }

    proptest! {
        /// Same field list, same bytes.
        #[test]
        fn encoding_is_deterministic(fields in prop::collection::vec(field(), 0..16)) {
            let a = CanonicalBytes::encode(&fields).unwrap();
            let b = CanonicalBytes::encode(&fields).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// The up-front size always matches the produced length.
        #[test]
        fn size_matches_output(fields in prop::collection::vec(field(), 0..16)) {
            let cb = CanonicalBytes::encode(&fields).unwrap();
            prop_assert_eq!(cb.len(), encoded_size(&fields));
        }

        /// The reader recovers every field when it follows the same schema.
        #[test]
        fn reader_recovers_fields(fields in prop::collection::vec(field(), 0..16)) {
            let cb = CanonicalBytes::encode(&fields).unwrap();
            let mut r = CanonicalReader::new(cb.as_bytes());
            for f in &fields {
                match f {
                    Field::Int16(v) => prop_assert_eq!(r.read_int16().unwrap(), *v),
                    Field::Int32(v) => prop_assert_eq!(r.read_int32().unwrap(), *v),
                    Field::Int64(v) => prop_assert_eq!(r.read_int64().unwrap(), *v),
                    Field::Uint64(v) => prop_assert_eq!(r.read_uint64().unwrap(), *v),
                    Field::Bytes(v) => prop_assert_eq!(r.read_bytes().unwrap(), v.as_slice()),
                    Field::Skip(n) => r.skip(*n).unwrap(),
                }
            }
            prop_assert!(r.is_empty());
        }
    }
}
