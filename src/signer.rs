//! Signer capability and the remote custody adapter.

use crate::address;
use crate::asn1;
use crate::crypto;
use crate::custody::{CustodyClient, SigningAlgorithm};
use crate::error::{OracleError, OracleResult};
use crate::logging;

/// A uniform signing capability over some key.
pub trait Signer {
    /// The base58 public key (`sppk...`).
    fn public_key(&self) -> &str;

    /// The base58 public key hash (`tz2...`).
    fn public_key_hash(&self) -> &str;

    /// Produce a raw, canonical 64-byte signature over arbitrary payload
    /// bytes.
    fn sign(&self, payload: &[u8]) -> OracleResult<[u8; 64]>;
}

/// Wraps a remote custody key as a `Signer`.
///
/// Construction fetches and transforms the public material once; signing
/// hashes the payload locally and sends only the digest to the custody
/// service. No private key material ever exists on this side.
pub struct RemoteSigner<C: CustodyClient> {
    custody: C,
    key_id: String,
    public_key: String,
    public_key_hash: String,
}

impl<C: CustodyClient> RemoteSigner<C> {
    /// Connect to a custody key: fetch its DER public key, extract and
    /// compress the EC point, and derive the base58 encodings.
    pub fn connect(custody: C, key_id: impl Into<String>) -> OracleResult<Self> {
        let key_id = key_id.into();

        let der = custody.public_key(&key_id).map_err(|e| {
            OracleError::remote_key_unavailable(format!(
                "could not retrieve public key for {key_id}"
            ))
            .with_details(e.to_string())
        })?;

        let uncompressed = asn1::subject_public_key(&der)?;
        let compressed = crypto::compress_public_key(&uncompressed)?;

        let public_key = address::encode_public_key(&compressed);
        let public_key_hash = address::public_key_hash(&compressed);
        logging::info(
            "signer",
            format!("connected to remote key {key_id} as {public_key_hash}"),
        );

        Ok(Self {
            custody,
            key_id,
            public_key,
            public_key_hash,
        })
    }

    /// Sign and return the signature in its base58 form (`spsig1...`).
    pub fn sign_to_base58(&self, payload: &[u8]) -> OracleResult<String> {
        let raw = self.sign(payload)?;
        Ok(address::encode_signature(&raw))
    }
}

impl<C: CustodyClient> Signer for RemoteSigner<C> {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn public_key_hash(&self) -> &str {
        &self.public_key_hash
    }

    fn sign(&self, payload: &[u8]) -> OracleResult<[u8; 64]> {
        // Only the digest crosses the wire, never the payload.
        let digest = crypto::blake2b_32(payload);

        let der = self
            .custody
            .sign_digest(&self.key_id, &digest, SigningAlgorithm::EcdsaSha256)
            .map_err(|e| {
                OracleError::remote_key_unavailable(format!(
                    "custody service failed to sign with {}",
                    self.key_id
                ))
                .with_details(e.to_string())
            })?;

        let raw = crypto::der_signature_to_raw(&der)?;
        crypto::normalize_signature(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records digests it is asked to sign and replays canned DER responses.
    struct FakeCustody {
        der_public_key: Vec<u8>,
        der_signature: Vec<u8>,
        signed_digests: RefCell<Vec<[u8; 32]>>,
        fail_public_key: bool,
        fail_sign: bool,
    }

    impl FakeCustody {
        fn new() -> Self {
            Self {
                der_public_key: spki_fixture(),
                der_signature: der_signature_fixture(),
                signed_digests: RefCell::new(Vec::new()),
                fail_public_key: false,
                fail_sign: false,
            }
        }
    }

    impl CustodyClient for FakeCustody {
        fn public_key(&self, _key_id: &str) -> OracleResult<Vec<u8>> {
            if self.fail_public_key {
                return Err(OracleError::network_error("custody offline"));
            }
            Ok(self.der_public_key.clone())
        }

        fn sign_digest(
            &self,
            _key_id: &str,
            digest: &[u8; 32],
            algorithm: SigningAlgorithm,
        ) -> OracleResult<Vec<u8>> {
            assert_eq!(algorithm, SigningAlgorithm::EcdsaSha256);
            if self.fail_sign {
                return Err(OracleError::network_error("custody offline"));
            }
            self.signed_digests.borrow_mut().push(*digest);
            Ok(self.der_signature.clone())
        }
    }

    /// SubjectPublicKeyInfo wrapping a fixed uncompressed point with even Y.
    fn spki_fixture() -> Vec<u8> {
        let mut point = vec![0x04];
        point.extend([0xAA; 32]);
        point.extend([0x10; 32]);

        let algorithm = [0x30, 0x03, 0x06, 0x01, 0x2A];
        let mut bit_string = vec![0x03, (point.len() + 1) as u8, 0x00];
        bit_string.extend_from_slice(&point);

        let mut body = algorithm.to_vec();
        body.extend(bit_string);

        let mut der = vec![0x30, 0x81, body.len() as u8];
        der.extend(body);
        der
    }

    /// DER signature with low-S components.
    fn der_signature_fixture() -> Vec<u8> {
        let mut der = vec![0x30, 0x08];
        der.extend([0x02, 0x02, 0x01, 0x23]); // r
        der.extend([0x02, 0x02, 0x00, 0x45]); // s, with a sign-padding byte
        der
    }

    #[test]
    fn connect_derives_public_material() {
        let signer = RemoteSigner::connect(FakeCustody::new(), "key-1").unwrap();
        assert!(signer.public_key().starts_with("sppk"));
        assert!(signer.public_key_hash().starts_with("tz2"));

        // Even Y coordinate compresses under the 0x02 marker.
        let expected = {
            let mut compressed = [0u8; 33];
            compressed[0] = 0x02;
            compressed[1..].copy_from_slice(&[0xAA; 32]);
            crate::address::encode_public_key(&compressed)
        };
        assert_eq!(signer.public_key(), expected);
    }

    #[test]
    fn sign_sends_digest_not_payload() {
        let signer = RemoteSigner::connect(FakeCustody::new(), "key-1").unwrap();
        let payload = b"forged operation bytes".to_vec();
        signer.sign(&payload).unwrap();

        let digests = signer.custody.signed_digests.borrow();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0], crypto::blake2b_32(&payload));
    }

    #[test]
    fn sign_converts_der_to_raw() {
        let signer = RemoteSigner::connect(FakeCustody::new(), "key-1").unwrap();
        let raw = signer.sign(b"payload").unwrap();
        // r = 0x0123 and s = 0x45, left-padded into 32-byte halves.
        assert_eq!(&raw[..30], &[0u8; 30]);
        assert_eq!(&raw[30..32], &[0x01, 0x23]);
        assert_eq!(raw[63], 0x45);
    }

    #[test]
    fn base58_signature_uses_spsig_prefix() {
        let signer = RemoteSigner::connect(FakeCustody::new(), "key-1").unwrap();
        let encoded = signer.sign_to_base58(b"payload").unwrap();
        assert!(encoded.starts_with("spsig1"));
    }

    #[test]
    fn unreachable_custody_is_remote_key_unavailable() {
        let mut custody = FakeCustody::new();
        custody.fail_public_key = true;
        let err = RemoteSigner::connect(custody, "key-1").err().unwrap();
        assert_eq!(err.code, crate::ErrorCode::RemoteKeyUnavailable);

        let mut custody = FakeCustody::new();
        custody.fail_sign = true;
        let signer = RemoteSigner::connect(custody, "key-1").unwrap();
        let err = signer.sign(b"payload").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::RemoteKeyUnavailable);
    }
}
