//! Shared types for the oracle pusher.
//!
//! All data structures that cross module boundaries are defined here for
//! consistent serialization. Chain quantities (fee, counter, limits, amounts)
//! are carried as decimal strings, matching the node's JSON API.

use serde::{Deserialize, Serialize};

use crate::constants;

// =============================================================================
// Operations
// =============================================================================

/// The kind of a chain-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Transaction,
    Origination,
    Reveal,
    Delegation,
}

impl OperationKind {
    pub fn is_origination(&self) -> bool {
        matches!(self, OperationKind::Origination)
    }
}

/// One chain-level action inside an operation group.
///
/// Constructed with `fee = "0"` and protocol-cap limits; the fee estimator
/// rewrites the limits and the group fee in place before signing. The
/// `counter` is assigned by the caller and must be contiguous and strictly
/// increasing per source account within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub source: String,
    pub fee: String,
    pub counter: String,
    pub gas_limit: String,
    pub storage_limit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<serde_json::Value>,
}

impl Operation {
    fn base(kind: OperationKind, source: impl Into<String>, counter: u64) -> Self {
        Self {
            kind,
            source: source.into(),
            fee: "0".to_string(),
            counter: counter.to_string(),
            gas_limit: constants::GAS_LIMIT.to_string(),
            storage_limit: constants::STORAGE_LIMIT.to_string(),
            amount: None,
            destination: None,
            parameters: None,
            public_key: None,
            balance: None,
            script: None,
        }
    }

    /// A plain transfer of `amount` mutez to `destination`.
    pub fn transaction(
        source: impl Into<String>,
        counter: u64,
        destination: impl Into<String>,
        amount: u64,
    ) -> Self {
        let mut op = Self::base(OperationKind::Transaction, source, counter);
        op.amount = Some(amount.to_string());
        op.destination = Some(destination.into());
        op
    }

    /// A zero-amount invocation of a contract entrypoint with a Micheline
    /// JSON argument.
    pub fn contract_call(
        source: impl Into<String>,
        counter: u64,
        contract: impl Into<String>,
        entrypoint: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        let mut op = Self::base(OperationKind::Transaction, source, counter);
        op.amount = Some("0".to_string());
        op.destination = Some(contract.into());
        op.parameters = Some(serde_json::json!({
            "entrypoint": entrypoint.into(),
            "value": value,
        }));
        op
    }

    /// A reveal of the account's public key, required once before the first
    /// signed operation from a fresh account.
    pub fn reveal(source: impl Into<String>, counter: u64, public_key: impl Into<String>) -> Self {
        let mut op = Self::base(OperationKind::Reveal, source, counter);
        op.public_key = Some(public_key.into());
        op
    }

    /// An origination of a new contract with the given initial script.
    pub fn origination(
        source: impl Into<String>,
        counter: u64,
        balance: u64,
        script: serde_json::Value,
    ) -> Self {
        let mut op = Self::base(OperationKind::Origination, source, counter);
        op.balance = Some(balance.to_string());
        op.script = Some(script);
        op
    }

    /// Parse a decimal-string field such as `fee` or `gas_limit`.
    pub fn parse_nat(value: &str) -> crate::OracleResult<u64> {
        value
            .parse::<u64>()
            .map_err(|_| crate::OracleError::parse_error(format!("not a natural number: {value}")))
    }
}

// =============================================================================
// Node responses
// =============================================================================

/// The network's report of what a batch would consume if executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEstimate {
    pub gas: u64,
    pub storage_cost: u64,
}

/// A recent chain head, fetched once per estimation pass. Only the hash is
/// relevant: it fixes the branch encoding and thus the forged byte length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub level: Option<u64>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Scale a decimal value to a whole number at the given power of ten,
/// dropping any remaining fraction: `scale_decimal(3.185, 2) == 318`.
///
/// Price feed values are non-negative; negative and NaN inputs saturate to
/// zero rather than wrapping.
pub fn scale_decimal(value: f64, scale: u32) -> u64 {
    (value * 10f64.powi(scale as i32)).trunc() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_start_with_zero_fee_and_cap_limits() {
        let op = Operation::transaction("tz2Source", 7, "tz2Dest", 1);
        assert_eq!(op.fee, "0");
        assert_eq!(op.counter, "7");
        assert_eq!(op.gas_limit, constants::GAS_LIMIT.to_string());
        assert_eq!(op.storage_limit, constants::STORAGE_LIMIT.to_string());
        assert!(!op.kind.is_origination());
    }

    #[test]
    fn contract_call_serializes_entrypoint_parameters() {
        let op = Operation::contract_call(
            "tz2Source",
            1,
            "KT1Oracle",
            "update",
            serde_json::json!([]),
        );
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "transaction");
        assert_eq!(json["parameters"]["entrypoint"], "update");
        // Absent fields stay off the wire entirely.
        assert!(json.get("public_key").is_none());
    }

    #[test]
    fn reveal_carries_public_key() {
        let op = Operation::reveal("tz2Source", 3, "sppk7abc");
        assert_eq!(op.kind, OperationKind::Reveal);
        assert_eq!(op.public_key.as_deref(), Some("sppk7abc"));
    }

    #[test]
    fn parse_nat_rejects_garbage() {
        assert_eq!(Operation::parse_nat("1290").unwrap(), 1290);
        assert!(Operation::parse_nat("-1").is_err());
        assert!(Operation::parse_nat("12a").is_err());
    }

    #[test]
    fn scale_drops_remaining_fraction() {
        assert_eq!(scale_decimal(3.18, 2), 318);
        assert_eq!(scale_decimal(3.185, 2), 318);
        assert_eq!(scale_decimal(0.0, 6), 0);
    }

    #[test]
    fn scale_saturates_bad_inputs_to_zero() {
        assert_eq!(scale_decimal(-3.18, 2), 0);
        assert_eq!(scale_decimal(-0.001, 6), 0);
        assert_eq!(scale_decimal(f64::NAN, 2), 0);
    }
}
