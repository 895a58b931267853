//! Oracle Pusher Core Library
//!
//! Client-side machinery for keeping an on-chain price oracle current:
//! package price updates into operation batches, compute resource limits and
//! a converged minimum fee, sign through a remote custody service, and
//! derive addresses deterministically.
//!
//! # Architecture
//!
//! This crate provides:
//! - **encoding / asn1 / crypto**: base58check, hex, BLAKE2b, DER parsing,
//!   key compression, and signature canonicalization
//! - **address**: deterministic contract-address derivation
//! - **signer**: wraps a remote custody key as a uniform signing capability
//! - **fees**: gas/storage limits and fee convergence for operation batches
//! - **rpc / custody**: the blocking HTTP boundaries to the node and the
//!   custody service
//!
//! # Security
//!
//! Private keys never exist on this side of the custody boundary: signing
//! sends a 32-byte BLAKE2b digest to the custody service and transforms the
//! DER response into the chain's raw low-S form.
//!
//! # Example
//!
//! ```rust,ignore
//! use oracle_pusher::{NodeClient, OperationFeeEstimator, Operation};
//!
//! let node = NodeClient::new("https://node.example.com")?;
//! let estimator = OperationFeeEstimator::new(&node, false);
//! let batch = estimator.estimate_and_apply_fees(vec![
//!     Operation::contract_call(source, counter, oracle, "update", value),
//! ])?;
//! ```

pub mod address;
pub mod asn1;
pub mod constants;
pub mod crypto;
pub mod custody;
pub mod encoding;
pub mod error;
pub mod fees;
pub mod logging;
pub mod rpc;
pub mod signer;
pub mod types;

// Re-export key types for convenience
pub use error::{ErrorCode, OracleError, OracleResult};
pub use types::{BlockHeader, Operation, OperationKind, ResourceEstimate};

pub use address::{calculate_contract_address, public_key_hash};
pub use crypto::{compress_public_key, der_signature_to_raw, normalize_signature};
pub use custody::{CustodyClient, HttpCustodyClient, SigningAlgorithm};
pub use encoding::{base58check_decode, base58check_encode, bytes_to_hex, hex_to_bytes};
pub use fees::{FeePayer, OperationFeeEstimator};
pub use rpc::{ChainRpc, NodeClient};
pub use signer::{RemoteSigner, Signer};
