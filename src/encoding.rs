//! Base58check and hex codecs.
//!
//! Base58check here is the classic form: version prefix, payload, then the
//! first four bytes of a double-SHA256 checksum, all base58 encoded.

use sha2::{Digest, Sha256};

use crate::error::{OracleError, OracleResult};

/// Length of the trailing checksum in a base58check string.
const CHECKSUM_LENGTH: usize = 4;

/// Double-SHA256 checksum over the prefixed payload.
fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&second[..CHECKSUM_LENGTH]);
    out
}

/// Base58check encode `payload` under the given version `prefix`.
pub fn base58check_encode(payload: &[u8], prefix: &[u8]) -> String {
    let mut data = merge_bytes(prefix, payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    bs58::encode(data).into_string()
}

/// Decode a base58check string, returning the prefix and payload bytes.
///
/// Fails with `ChecksumMismatch` when the trailing four bytes do not match
/// the recomputed checksum of the leading bytes.
pub fn base58check_decode(input: &str) -> OracleResult<Vec<u8>> {
    let decoded = bs58::decode(input)
        .into_vec()
        .map_err(|e| OracleError::encoding_error(format!("invalid base58: {e}")))?;

    if decoded.len() < CHECKSUM_LENGTH {
        return Err(OracleError::invalid_input(
            "base58check input shorter than its checksum",
        ));
    }

    let (body, check) = decoded.split_at(decoded.len() - CHECKSUM_LENGTH);
    if checksum(body) != check {
        return Err(OracleError::checksum_mismatch(format!(
            "checksum mismatch in {input}"
        )));
    }

    Ok(body.to_vec())
}

/// Merge two byte slices into one owned buffer.
pub fn merge_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    merged
}

/// Convert a hex string to bytes. Fails on odd length or non-hex characters.
pub fn hex_to_bytes(input: &str) -> OracleResult<Vec<u8>> {
    hex::decode(input).map_err(|e| OracleError::invalid_hex(format!("invalid hex {input:?}: {e}")))
}

/// Convert bytes to a lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let prefix = [6u8, 161, 161];
        let payload = [0xABu8; 20];
        let encoded = base58check_encode(&payload, &prefix);
        let decoded = base58check_decode(&encoded).unwrap();
        assert_eq!(&decoded[..3], &prefix);
        assert_eq!(&decoded[3..], &payload);
    }

    #[test]
    fn empty_payload_round_trips() {
        let encoded = base58check_encode(&[], &[]);
        assert_eq!(base58check_decode(&encoded).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_corrupted_checksum() {
        let encoded = base58check_encode(&[1, 2, 3], &[7]);
        // Flip one character. '1' and '2' are both in the base58 alphabet.
        let corrupted = if encoded.ends_with('1') {
            format!("{}2", &encoded[..encoded.len() - 1])
        } else {
            format!("{}1", &encoded[..encoded.len() - 1])
        };
        let err = base58check_decode(&corrupted).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ChecksumMismatch);
    }

    #[test]
    fn decode_rejects_non_base58_characters() {
        let err = base58check_decode("0OIl").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::EncodingError);
    }

    #[test]
    fn decode_rejects_truncated_input() {
        // "2g" decodes to a single byte, shorter than any checksum.
        let err = base58check_decode("2g").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidInput);
    }

    #[test]
    fn known_address_decodes() {
        // A well-known Tezos tz1 address; prefix [6, 161, 159] plus 20 bytes.
        let decoded = base58check_decode("tz1LpmZmB1yJJBcCrBDLSAStmmugGDEghdVv").unwrap();
        assert_eq!(decoded.len(), 23);
        assert_eq!(&decoded[..3], &[6, 161, 159]);
    }

    #[test]
    fn hex_round_trip_and_errors() {
        assert_eq!(hex_to_bytes("00ff7f").unwrap(), vec![0x00, 0xff, 0x7f]);
        assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x7f]), "00ff7f");
        assert_eq!(
            hex_to_bytes("abc").unwrap_err().code,
            crate::ErrorCode::InvalidHex
        );
        assert_eq!(
            hex_to_bytes("zz").unwrap_err().code,
            crate::ErrorCode::InvalidHex
        );
    }

    #[test]
    fn merge_preserves_order() {
        assert_eq!(merge_bytes(&[1, 2], &[3]), vec![1, 2, 3]);
        assert_eq!(merge_bytes(&[], &[3]), vec![3]);
    }
}
