//! Elliptic-curve public key compression.

use crate::error::{OracleError, OracleResult};

/// Length of an uncompressed SEC1 public key: marker plus two coordinates.
const UNCOMPRESSED_KEY_LENGTH: usize = 65;

/// Length of a compressed SEC1 public key: parity marker plus X coordinate.
pub const COMPRESSED_KEY_LENGTH: usize = 33;

/// SEC1 marker for an uncompressed point.
const UNCOMPRESSED_MARKER: u8 = 0x04;

/// Compress a 65-byte uncompressed EC public key to its 33-byte form.
///
/// The marker byte becomes 0x02 or 0x03 depending on the parity of the Y
/// coordinate, followed by the X coordinate. Pure byte manipulation; the
/// point is not validated against any curve.
pub fn compress_public_key(uncompressed: &[u8]) -> OracleResult<[u8; COMPRESSED_KEY_LENGTH]> {
    if uncompressed.len() != UNCOMPRESSED_KEY_LENGTH {
        return Err(OracleError::invalid_input(format!(
            "uncompressed key must be {UNCOMPRESSED_KEY_LENGTH} bytes, got {}",
            uncompressed.len()
        )));
    }
    if uncompressed[0] != UNCOMPRESSED_MARKER {
        return Err(OracleError::encoding_error(format!(
            "expected uncompressed-point marker 0x04, got {:#04x}",
            uncompressed[0]
        )));
    }

    // Parity of Y is the parity of its least significant byte.
    let parity_marker = if uncompressed[UNCOMPRESSED_KEY_LENGTH - 1] % 2 == 0 {
        0x02
    } else {
        0x03
    };

    let mut compressed = [0u8; COMPRESSED_KEY_LENGTH];
    compressed[0] = parity_marker;
    compressed[1..].copy_from_slice(&uncompressed[1..COMPRESSED_KEY_LENGTH]);
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    fn uncompressed_key(x: u8, y_last: u8) -> Vec<u8> {
        let mut key = vec![0x04];
        key.extend([x; 32]);
        key.extend([0x55; 31]);
        key.push(y_last);
        key
    }

    #[test]
    fn even_y_compresses_to_02_marker() {
        let key = uncompressed_key(0xAA, 0x10);
        let compressed = compress_public_key(&key).unwrap();
        assert_eq!(compressed[0], 0x02);
        assert_eq!(&compressed[1..], &[0xAA; 32]);
    }

    #[test]
    fn odd_y_compresses_to_03_marker() {
        let key = uncompressed_key(0xAA, 0x11);
        let compressed = compress_public_key(&key).unwrap();
        assert_eq!(compressed[0], 0x03);
    }

    #[test]
    fn compression_is_deterministic() {
        let key = uncompressed_key(0x42, 0x07);
        assert_eq!(
            compress_public_key(&key).unwrap(),
            compress_public_key(&key).unwrap()
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let err = compress_public_key(&[0x04; 64]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        let err = compress_public_key(&[0x04; 66]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn rejects_wrong_marker() {
        let mut key = uncompressed_key(0xAA, 0x10);
        key[0] = 0x02;
        let err = compress_public_key(&key).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodingError);
    }
}
