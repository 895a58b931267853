//! Minimal DER reader.
//!
//! Only covers the two shapes the custody service hands back: an ECDSA
//! signature (SEQUENCE of two INTEGERs) and a SubjectPublicKeyInfo (SEQUENCE
//! holding an algorithm SEQUENCE and a BIT STRING with the EC point).

use thiserror::Error;

use crate::error::OracleError;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_SEQUENCE: u8 = 0x30;

/// DER structural errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DerError {
    #[error("unexpected end of DER input")]
    Truncated,

    #[error("expected tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },

    #[error("unsupported DER length encoding")]
    UnsupportedLength,

    #[error("trailing bytes after DER element")]
    TrailingBytes,

    #[error("expected exactly two INTEGER elements in signature")]
    NotASignature,

    #[error("malformed SubjectPublicKeyInfo")]
    NotASubjectPublicKeyInfo,
}

impl From<DerError> for OracleError {
    fn from(err: DerError) -> Self {
        OracleError::malformed_der(err.to_string())
    }
}

/// One parsed DER element: its tag and raw content bytes.
#[derive(Debug, Clone, Copy)]
struct Element<'a> {
    tag: u8,
    content: &'a [u8],
}

/// Read one element off the front of `input`, returning it and the rest.
fn read_element(input: &[u8]) -> Result<(Element<'_>, &[u8]), DerError> {
    if input.len() < 2 {
        return Err(DerError::Truncated);
    }
    let tag = input[0];
    let first_len = input[1];
    let (length, header_len) = if first_len < 0x80 {
        (first_len as usize, 2)
    } else {
        // Long form: the low bits count the length octets. Two octets cover
        // every payload a key or signature can produce.
        let num_octets = (first_len & 0x7f) as usize;
        if num_octets == 0 || num_octets > 2 {
            return Err(DerError::UnsupportedLength);
        }
        if input.len() < 2 + num_octets {
            return Err(DerError::Truncated);
        }
        let mut length = 0usize;
        for &octet in &input[2..2 + num_octets] {
            length = (length << 8) | octet as usize;
        }
        (length, 2 + num_octets)
    };

    let end = header_len + length;
    if input.len() < end {
        return Err(DerError::Truncated);
    }
    Ok((
        Element {
            tag,
            content: &input[header_len..end],
        },
        &input[end..],
    ))
}

/// Read one element and require a specific tag.
fn expect_element(input: &[u8], tag: u8) -> Result<(Element<'_>, &[u8]), DerError> {
    let (element, rest) = read_element(input)?;
    if element.tag != tag {
        return Err(DerError::UnexpectedTag {
            expected: tag,
            found: element.tag,
        });
    }
    Ok((element, rest))
}

/// Strip the single leading 0x00 sign-padding byte DER adds to keep an
/// INTEGER non-negative when its high bit is set.
fn strip_sign_byte(content: &[u8]) -> &[u8] {
    match content.split_first() {
        Some((0x00, rest)) if !rest.is_empty() => rest,
        _ => content,
    }
}

/// An ECDSA signature decoded from its DER SEQUENCE form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaDerSignature {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

impl EcdsaDerSignature {
    /// Parse `SEQUENCE { INTEGER r, INTEGER s }`. Anything else, including
    /// extra elements inside the sequence, is `MalformedDer`.
    pub fn parse(der: &[u8]) -> Result<Self, DerError> {
        let (sequence, rest) = expect_element(der, TAG_SEQUENCE)?;
        if !rest.is_empty() {
            return Err(DerError::TrailingBytes);
        }

        let (r, after_r) = expect_element(sequence.content, TAG_INTEGER)
            .map_err(|_| DerError::NotASignature)?;
        let (s, after_s) =
            expect_element(after_r, TAG_INTEGER).map_err(|_| DerError::NotASignature)?;
        if !after_s.is_empty() {
            return Err(DerError::NotASignature);
        }

        Ok(Self {
            r: strip_sign_byte(r.content).to_vec(),
            s: strip_sign_byte(s.content).to_vec(),
        })
    }
}

/// Extract the uncompressed EC point from a DER SubjectPublicKeyInfo:
/// `SEQUENCE { SEQUENCE { OID.. }, BIT STRING point }`. The BIT STRING's
/// leading unused-bits octet is dropped.
pub fn subject_public_key(der: &[u8]) -> Result<Vec<u8>, DerError> {
    let (outer, rest) = expect_element(der, TAG_SEQUENCE)?;
    if !rest.is_empty() {
        return Err(DerError::TrailingBytes);
    }

    let (_algorithm, after_algorithm) = expect_element(outer.content, TAG_SEQUENCE)
        .map_err(|_| DerError::NotASubjectPublicKeyInfo)?;
    let (bit_string, after_key) = expect_element(after_algorithm, TAG_BIT_STRING)
        .map_err(|_| DerError::NotASubjectPublicKeyInfo)?;
    if !after_key.is_empty() {
        return Err(DerError::NotASubjectPublicKeyInfo);
    }

    match bit_string.content.split_first() {
        // Byte-aligned keys only: the unused-bits count must be zero.
        Some((0x00, point)) if !point.is_empty() => Ok(point.to_vec()),
        _ => Err(DerError::NotASubjectPublicKeyInfo),
    }
}
