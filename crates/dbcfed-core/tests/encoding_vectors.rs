//! # Canonical Encoding Test Vectors
//!
//! Fixed byte vectors for the canonical encoder. Mint epoch signatures are
//! computed over this encoding and published; if any of these vectors
//! change, every previously distributed signature stops verifying.

use dbcfed_core::{CanonicalBytes, CanonicalReader, Field, MintId, Timestamp};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Vector 1: epoch header (algorithm, pubkey, three boundaries)
// ---------------------------------------------------------------------------

#[test]
fn test_vector_epoch_header() {
    let sign_start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
    let sign_end = Timestamp::parse("2026-01-31T00:00:00Z").unwrap();
    let validate_end = Timestamp::parse("2026-03-02T00:00:00Z").unwrap();

    let cb = CanonicalBytes::encode(&[
        Field::bytes("ed25519"),
        Field::bytes([0xabu8; 4]),
        Field::Int64(sign_start.epoch_secs()),
        Field::Int64(sign_end.epoch_secs()),
        Field::Int64(validate_end.epoch_secs()),
    ])
    .unwrap();

    assert_eq!(sign_start.epoch_secs(), 1_767_225_600);
    assert_eq!(
        hex(cb.as_bytes()),
        concat!(
            "0400000007", "65643235353139", // "ed25519"
            "0400000004", "abababab",       // pubkey
            "03", "000000006955b900",       // 2026-01-01
            "03", "00000000697d4600",       // 2026-01-31
            "03", "0000000069a4d300",       // 2026-03-02
        )
    );
}

// ---------------------------------------------------------------------------
// Vector 2: signing key entry (currency, amount, algorithm, pubkey)
// ---------------------------------------------------------------------------

#[test]
fn test_vector_signing_key_entry() {
    let cb = CanonicalBytes::encode(&[
        Field::bytes("EUR"),
        Field::Uint64(100_000_000),
        Field::bytes("ed25519"),
        Field::bytes([0x01u8, 0x02]),
    ])
    .unwrap();
    assert_eq!(
        hex(cb.as_bytes()),
        concat!(
            "0400000003", "455552",
            "05", "0000000005f5e100",
            "0400000007", "65643235353139",
            "0400000002", "0102",
        )
    );
}

// ---------------------------------------------------------------------------
// Vector 3: identity binding for key replacement
// ---------------------------------------------------------------------------

#[test]
fn test_vector_identity_binding() {
    let id = MintId::new("ed25519-OP9g4SgiS063CKSd4ZCNfWG0R6gihFmyFqxJwgmRApU");
    let cb = CanonicalBytes::identity_binding(&id);
    assert_eq!(cb.as_bytes(), id.as_str().as_bytes());
    assert_eq!(cb.len(), 51);
}

#[test]
fn test_vector_decodes_back() {
    let cb = CanonicalBytes::encode(&[Field::bytes("EUR"), Field::Uint64(200_000_000)]).unwrap();
    let mut reader = CanonicalReader::new(cb.as_bytes());
    assert_eq!(reader.read_bytes().unwrap(), b"EUR");
    assert_eq!(reader.read_uint64().unwrap(), 200_000_000);
    assert!(reader.is_empty());
}
