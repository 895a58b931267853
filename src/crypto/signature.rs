//! ECDSA signature format conversion and canonicalization.

use secp256k1::ecdsa::Signature;

use crate::asn1::EcdsaDerSignature;
use crate::error::{OracleError, OracleResult};

/// Length of a raw `r || s` signature.
pub const RAW_SIGNATURE_LENGTH: usize = 64;

const COMPONENT_LENGTH: usize = 32;

/// Left-pad an integer component to its fixed 32-byte width.
fn pad_component(component: &[u8]) -> OracleResult<[u8; COMPONENT_LENGTH]> {
    if component.len() > COMPONENT_LENGTH {
        return Err(OracleError::malformed_der(format!(
            "signature component is {} bytes, expected at most {COMPONENT_LENGTH}",
            component.len()
        )));
    }
    let mut out = [0u8; COMPONENT_LENGTH];
    out[COMPONENT_LENGTH - component.len()..].copy_from_slice(component);
    Ok(out)
}

/// Convert a DER encoded ECDSA signature to its raw 64-byte `r || s` form.
///
/// DER's leading 0x00 sign-padding bytes are stripped and each component is
/// left-padded back to 32 bytes.
pub fn der_signature_to_raw(der: &[u8]) -> OracleResult<[u8; RAW_SIGNATURE_LENGTH]> {
    let decoded = EcdsaDerSignature::parse(der)?;
    let r = pad_component(&decoded.r)?;
    let s = pad_component(&decoded.s)?;

    let mut raw = [0u8; RAW_SIGNATURE_LENGTH];
    raw[..COMPONENT_LENGTH].copy_from_slice(&r);
    raw[COMPONENT_LENGTH..].copy_from_slice(&s);
    Ok(raw)
}

/// Canonicalize a raw signature to low-S form.
///
/// Custody services may return either of the two valid `s` values; chain
/// validation only accepts the lower one.
pub fn normalize_signature(raw: &[u8; RAW_SIGNATURE_LENGTH]) -> OracleResult<[u8; RAW_SIGNATURE_LENGTH]> {
    let mut signature = Signature::from_compact(raw)
        .map_err(|e| OracleError::encoding_error(format!("invalid compact signature: {e}")))?;
    signature.normalize_s();
    Ok(signature.serialize_compact())
}
