//! Node RPC boundary.
//!
//! `ChainRpc` is the seam the fee estimator and orchestration code talk
//! through; `NodeClient` is the concrete HTTP implementation against a
//! node's REST API. All calls are blocking request/response with explicit
//! timeouts; retries stay a caller concern.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{OracleError, OracleResult};
use crate::logging;
use crate::types::{BlockHeader, Operation, ResourceEstimate};

/// A syntactically valid signature used for dry-run estimation. The node
/// checks the shape, not the validity, when simulating.
const DUMMY_SIGNATURE: &str =
    "edsigtkpiSSschcaCt9pUVrpNPf7TTcgvgDEDD6NCEHMy8NNQJCGnMfLZzYoQj74yLjo9wx6MPVV29CvVzgi7qEcEUok3k7AuMg";

/// External node services consumed by this crate.
pub trait ChainRpc {
    /// Dry-run the batch and report aggregate gas and storage consumption.
    fn estimate_operation(&self, operations: &[Operation]) -> OracleResult<ResourceEstimate>;

    /// Serialize the batch against the given branch; returns hex bytes.
    fn forge_operations(&self, branch: &str, operations: &[Operation]) -> OracleResult<String>;

    /// Fetch the block header `offset` levels behind the chain head.
    fn head_block(&self, offset: u32) -> OracleResult<BlockHeader>;

    /// The last used counter for an account; the next operation uses +1.
    fn counter_for_account(&self, account: &str) -> OracleResult<u64>;

    /// The revealed public key of an account, if any.
    fn manager_key(&self, account: &str) -> OracleResult<Option<String>>;

    /// Broadcast a signed operation; returns the operation group hash.
    fn inject_operation(&self, signed_operation_hex: &str) -> OracleResult<String>;
}

/// Blocking HTTP client for a node's RPC surface.
pub struct NodeClient {
    base_url: String,
    chain: String,
    client: Client,
}

impl NodeClient {
    /// Connect to a node, addressing the `main` chain alias.
    pub fn new(base_url: impl Into<String>) -> OracleResult<Self> {
        Self::with_chain(base_url, "main")
    }

    pub fn with_chain(base_url: impl Into<String>, chain: impl Into<String>) -> OracleResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("oracle-pusher/0.1")
            .build()
            .map_err(|e| OracleError::network_error(format!("failed to build client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain: chain.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> OracleResult<T> {
        logging::debug("rpc", format!("GET {path}"));
        let response = self.client.get(self.url(path)).send()?;
        Self::check_status(path, &response)?;
        Ok(response.json()?)
    }

    fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> OracleResult<T> {
        logging::debug("rpc", format!("POST {path}"));
        let response = self.client.post(self.url(path)).json(body).send()?;
        Self::check_status(path, &response)?;
        Ok(response.json()?)
    }

    fn check_status(path: &str, response: &reqwest::blocking::Response) -> OracleResult<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::rpc_error(format!(
                "node returned {status} for {path}"
            )));
        }
        Ok(())
    }

    fn chain_id(&self) -> OracleResult<String> {
        self.get_json(&format!("/chains/{}/chain_id", self.chain))
    }

    /// Serialize a batch into run_operation contents, with limits as the
    /// node expects them.
    fn contents(operations: &[Operation]) -> OracleResult<serde_json::Value> {
        Ok(serde_json::to_value(operations)?)
    }
}

impl ChainRpc for NodeClient {
    fn estimate_operation(&self, operations: &[Operation]) -> OracleResult<ResourceEstimate> {
        let head = self.head_block(0)?;
        let chain_id = self.chain_id()?;

        let body = serde_json::json!({
            "operation": {
                "branch": head.hash,
                "contents": Self::contents(operations)?,
                "signature": DUMMY_SIGNATURE,
            },
            "chain_id": chain_id,
        });

        let path = format!(
            "/chains/{}/blocks/head/helpers/scripts/run_operation",
            self.chain
        );
        let result: RunOperationResult = self.post_json(&path, &body)?;
        result.aggregate()
    }

    fn forge_operations(&self, branch: &str, operations: &[Operation]) -> OracleResult<String> {
        let body = serde_json::json!({
            "branch": branch,
            "contents": Self::contents(operations)?,
        });
        let path = format!("/chains/{}/blocks/head/helpers/forge/operations", self.chain);
        self.post_json(&path, &body)
    }

    fn head_block(&self, offset: u32) -> OracleResult<BlockHeader> {
        self.get_json(&format!(
            "/chains/{}/blocks/head~{offset}/header",
            self.chain
        ))
    }

    fn counter_for_account(&self, account: &str) -> OracleResult<u64> {
        let counter: String = self.get_json(&format!(
            "/chains/{}/blocks/head/context/contracts/{account}/counter",
            self.chain
        ))?;
        counter
            .parse::<u64>()
            .map_err(|_| OracleError::parse_error(format!("bad counter value: {counter}")))
    }

    fn manager_key(&self, account: &str) -> OracleResult<Option<String>> {
        self.get_json(&format!(
            "/chains/{}/blocks/head/context/contracts/{account}/manager_key",
            self.chain
        ))
    }

    fn inject_operation(&self, signed_operation_hex: &str) -> OracleResult<String> {
        let path = format!("/injection/operation?chain={}", self.chain);
        let body = serde_json::Value::String(signed_operation_hex.to_string());
        let hash: String = self.post_json(&path, &body)?;
        logging::info("rpc", format!("injected operation {hash}"));
        Ok(hash)
    }
}

// =============================================================================
// run_operation response shape
// =============================================================================

#[derive(Debug, Deserialize)]
struct RunOperationResult {
    #[serde(default)]
    contents: Vec<AppliedContent>,
}

#[derive(Debug, Deserialize)]
struct AppliedContent {
    #[serde(default)]
    metadata: Option<ContentMetadata>,
}

#[derive(Debug, Deserialize)]
struct ContentMetadata {
    #[serde(default)]
    operation_result: Option<OperationResult>,
    #[serde(default)]
    internal_operation_results: Vec<InternalResult>,
}

#[derive(Debug, Deserialize)]
struct InternalResult {
    #[serde(default)]
    result: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
struct OperationResult {
    #[serde(default)]
    status: Option<String>,
    /// Newer protocols report milligas; older ones whole gas units.
    #[serde(default)]
    consumed_milligas: Option<String>,
    #[serde(default)]
    consumed_gas: Option<String>,
    #[serde(default)]
    paid_storage_size_diff: Option<String>,
}

impl OperationResult {
    fn gas(&self) -> OracleResult<u64> {
        if let Some(milligas) = &self.consumed_milligas {
            let value = Operation::parse_nat(milligas)?;
            return Ok(value.div_ceil(1000));
        }
        match &self.consumed_gas {
            Some(gas) => Operation::parse_nat(gas),
            None => Ok(0),
        }
    }

    fn storage(&self) -> OracleResult<u64> {
        match &self.paid_storage_size_diff {
            Some(diff) => Operation::parse_nat(diff),
            None => Ok(0),
        }
    }

    fn check_applied(&self) -> OracleResult<()> {
        match self.status.as_deref() {
            Some("applied") | None => Ok(()),
            Some(other) => Err(OracleError::rpc_error(format!(
                "operation simulation was not applied: {other}"
            ))),
        }
    }
}

impl RunOperationResult {
    /// Sum consumed gas and paid storage over every content and its internal
    /// results. Any non-applied result fails the whole estimate.
    fn aggregate(&self) -> OracleResult<ResourceEstimate> {
        let mut gas = 0u64;
        let mut storage_cost = 0u64;

        for content in &self.contents {
            let Some(metadata) = &content.metadata else {
                continue;
            };
            if let Some(result) = &metadata.operation_result {
                result.check_applied()?;
                gas += result.gas()?;
                storage_cost += result.storage()?;
            }
            for internal in &metadata.internal_operation_results {
                if let Some(result) = &internal.result {
                    result.check_applied()?;
                    gas += result.gas()?;
                    storage_cost += result.storage()?;
                }
            }
        }

        Ok(ResourceEstimate { gas, storage_cost })
    }
}
