//! Cryptographic primitives for the oracle pusher.
//!
//! This module provides the low-level operations the signer and address
//! deriver are built on:
//! - BLAKE2b digests (20-byte identifiers, 32-byte signing digests)
//! - Elliptic-curve public key compression
//! - ECDSA signature format conversion and low-S canonicalization

pub mod keys;
pub mod signature;

pub use keys::compress_public_key;
pub use signature::{der_signature_to_raw, normalize_signature, RAW_SIGNATURE_LENGTH};

use blake2::digest::consts::{U20, U32};
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2b, Blake2bVar, Digest};

use crate::constants::{DIGEST_LENGTH, PUBLIC_KEY_HASH_LENGTH};
use crate::error::{OracleError, OracleResult};

/// Largest output BLAKE2b can produce.
const MAX_BLAKE2B_LENGTH: usize = 64;

/// Unkeyed BLAKE2b hash with an arbitrary output length (1..=64 bytes).
pub fn blake2b(input: &[u8], output_length: usize) -> OracleResult<Vec<u8>> {
    // Blake2bVar accepts a zero output size; an empty digest is never what a
    // caller wants, so reject it here along with oversized requests.
    if output_length == 0 || output_length > MAX_BLAKE2B_LENGTH {
        return Err(OracleError::invalid_input(format!(
            "bad blake2b length {output_length}"
        )));
    }
    let mut hasher = Blake2bVar::new(output_length)
        .map_err(|_| OracleError::invalid_input(format!("bad blake2b length {output_length}")))?;
    Update::update(&mut hasher, input);
    let mut out = vec![0u8; output_length];
    hasher
        .finalize_variable(&mut out)
        .map_err(|_| OracleError::internal("blake2b finalization failed"))?;
    Ok(out)
}

/// 20-byte BLAKE2b, the on-chain identifier form (addresses, key hashes).
pub fn blake2b_20(input: &[u8]) -> [u8; PUBLIC_KEY_HASH_LENGTH] {
    let mut hasher = Blake2b::<U20>::new();
    Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// 32-byte BLAKE2b, the signing digest form.
pub fn blake2b_32(input: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Blake2b::<U32>::new();
    Digest::update(&mut hasher, input);
    hasher.finalize().into()
}
