//! Remote custody service boundary.
//!
//! Private keys live inside a custody service (an HSM-backed KMS) and never
//! leave it. This crate only ever sends a 32-byte digest to be signed and
//! receives DER-encoded material back.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::encoding;
use crate::error::{OracleError, OracleResult};
use crate::logging;

/// Signing algorithms a custody key can be asked to apply to a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    EcdsaSha256,
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningAlgorithm::EcdsaSha256 => write!(f, "ECDSA_SHA_256"),
        }
    }
}

/// A remote custody service holding signing keys.
///
/// Both calls are fresh round trips; implementations must not cache or
/// persist private key material (they never see it in the first place).
pub trait CustodyClient {
    /// Fetch the DER-encoded (SubjectPublicKeyInfo) public key for a key id.
    fn public_key(&self, key_id: &str) -> OracleResult<Vec<u8>>;

    /// Sign a precomputed digest, returning a DER-encoded signature.
    fn sign_digest(
        &self,
        key_id: &str,
        digest: &[u8; 32],
        algorithm: SigningAlgorithm,
    ) -> OracleResult<Vec<u8>>;
}

/// Blocking HTTP client for a custody gateway.
///
/// Gateway surface: `GET {base}/keys/{id}` returns the hex DER public key,
/// `POST {base}/keys/{id}/sign` with a hex digest returns the hex DER
/// signature.
pub struct HttpCustodyClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
    public_key: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signature: String,
}

impl HttpCustodyClient {
    pub fn new(base_url: impl Into<String>) -> OracleResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("oracle-pusher/0.1")
            .build()
            .map_err(|e| OracleError::network_error(format!("failed to build client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl CustodyClient for HttpCustodyClient {
    fn public_key(&self, key_id: &str) -> OracleResult<Vec<u8>> {
        let url = format!("{}/keys/{key_id}", self.base_url);
        logging::debug("custody", format!("fetching public key for {key_id}"));

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(OracleError::remote_key_unavailable(format!(
                "custody service returned {} for key {key_id}",
                response.status()
            )));
        }

        let body: PublicKeyResponse = response.json()?;
        encoding::hex_to_bytes(&body.public_key)
    }

    fn sign_digest(
        &self,
        key_id: &str,
        digest: &[u8; 32],
        algorithm: SigningAlgorithm,
    ) -> OracleResult<Vec<u8>> {
        let url = format!("{}/keys/{key_id}/sign", self.base_url);
        logging::debug("custody", format!("requesting signature from {key_id}"));

        let body = serde_json::json!({
            "digest": encoding::bytes_to_hex(digest),
            "algorithm": algorithm.to_string(),
            "message_type": "DIGEST",
        });

        let response = self.client.post(&url).json(&body).send()?;
        if !response.status().is_success() {
            return Err(OracleError::remote_key_unavailable(format!(
                "custody service returned {} signing with key {key_id}",
                response.status()
            )));
        }

        let parsed: SignResponse = response.json()?;
        encoding::hex_to_bytes(&parsed.signature)
    }
}
