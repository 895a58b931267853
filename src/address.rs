//! Address derivation and base58check encodings of key material.
//!
//! Addresses of freshly originated contracts are purely derived data: the
//! operation group hash plus the origination index determine the address, so
//! it is known before any confirmation round trip.

use crate::constants::prefix;
use crate::crypto;
use crate::encoding;
use crate::error::OracleResult;

/// Number of hash-type prefix bytes to drop from a decoded operation hash.
const OPERATION_HASH_PREFIX_LENGTH: usize = 2;

/// Calculate the address of a contract originated by an operation group.
///
/// The decoded group hash, stripped of its 2-byte type prefix and extended
/// with the origination index as 4 big-endian bytes, is hashed to 20 bytes
/// and encoded under the contract-address prefix.
pub fn calculate_contract_address(
    operation_group_hash: &str,
    origination_index: u32,
) -> OracleResult<String> {
    let decoded = encoding::base58check_decode(operation_group_hash)?;
    if decoded.len() <= OPERATION_HASH_PREFIX_LENGTH {
        return Err(crate::OracleError::invalid_input(format!(
            "operation hash too short: {operation_group_hash}"
        )));
    }

    let mut derivation_input = decoded[OPERATION_HASH_PREFIX_LENGTH..].to_vec();
    derivation_input.extend_from_slice(&origination_index.to_be_bytes());

    let hash = crypto::blake2b_20(&derivation_input);
    Ok(encoding::base58check_encode(
        &hash,
        &prefix::SMART_CONTRACT_ADDRESS,
    ))
}

/// Derive the base58 public key hash (`tz2...`) of a compressed key.
pub fn public_key_hash(compressed_key: &[u8; 33]) -> String {
    let hash = crypto::blake2b_20(compressed_key);
    encoding::base58check_encode(&hash, &prefix::SECP256K1_PUBLIC_KEY_HASH)
}

/// Encode a compressed public key in its base58 form (`sppk...`).
pub fn encode_public_key(compressed_key: &[u8; 33]) -> String {
    encoding::base58check_encode(compressed_key, &prefix::SECP256K1_PUBLIC_KEY)
}

/// Encode a raw signature in its base58 form (`spsig1...`).
pub fn encode_signature(raw: &[u8; 64]) -> String {
    encoding::base58check_encode(raw, &prefix::SECP256K1_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    // An arbitrary but well-formed operation group hash (prefix [5, 116]
    // plus 32 bytes).
    fn sample_operation_hash() -> String {
        let payload = [0x5Au8; 32];
        encoding::base58check_encode(&payload, &[5, 116])
    }

    #[test]
    fn contract_addresses_carry_the_kt1_prefix() {
        let address = calculate_contract_address(&sample_operation_hash(), 0).unwrap();
        assert!(address.starts_with("KT1"), "got {address}");
        let decoded = encoding::base58check_decode(&address).unwrap();
        assert_eq!(decoded.len(), 23);
        assert_eq!(&decoded[..3], &prefix::SMART_CONTRACT_ADDRESS);
    }

    #[test]
    fn derivation_is_deterministic() {
        let hash = sample_operation_hash();
        assert_eq!(
            calculate_contract_address(&hash, 3).unwrap(),
            calculate_contract_address(&hash, 3).unwrap()
        );
    }

    #[test]
    fn origination_index_changes_the_address() {
        let hash = sample_operation_hash();
        let first = calculate_contract_address(&hash, 0).unwrap();
        let second = calculate_contract_address(&hash, 1).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn bad_hash_is_rejected() {
        assert!(calculate_contract_address("not-base58-0OIl", 0).is_err());
        // Valid base58check but nothing left after the type prefix.
        let tiny = encoding::base58check_encode(&[], &[5, 116]);
        assert!(calculate_contract_address(&tiny, 0).is_err());
    }

    #[test]
    fn public_key_encodings_use_expected_prefixes() {
        let key = [0x02u8; 33];
        assert!(encode_public_key(&key).starts_with("sppk"));
        assert!(public_key_hash(&key).starts_with("tz2"));
        assert!(encode_signature(&[0x01u8; 64]).starts_with("spsig1"));
    }
}
