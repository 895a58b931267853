//! Fee Estimator
//!
//! Sets gas/storage limits and a converged fee on a batch of operations so
//! the node will accept and prioritize the group.
//!
//! There is no closed-form fee formula: the required fee depends on the
//! serialized byte length, which depends on the encoded fee value itself. The
//! estimator therefore iterates until the applied fee covers the recomputed
//! requirement.

use crate::constants::{
    FEE_PER_BYTE_NANOTEZ, FEE_PER_GAS_UNIT_NANOTEZ, GAS_SAFETY_MARGIN, MINIMUM_FEE_NANOTEZ,
    NANOTEZ_PER_MUTEZ, ORIGINATION_BURN_COST, SIGNATURE_SIZE_BYTES, STORAGE_SAFETY_MARGIN,
};
use crate::error::{OracleError, OracleResult};
use crate::logging;
use crate::rpc::ChainRpc;
use crate::types::{BlockHeader, Operation};

/// Ceiling on fee convergence iterations. The encoded fee field grows at
/// most logarithmically while the requirement grows linearly in size, so
/// hitting this bound means an encoding-growth bug, not a large batch.
pub const MAX_FEE_ITERATIONS: u32 = 20;

/// Which operation in a group settles the group-level fee and carries the
/// group resource budget. Group fees are additive over the batch, so a
/// single payer suffices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeePayer {
    #[default]
    FirstOperation,
}

impl FeePayer {
    fn index(&self, _operations: &[Operation]) -> usize {
        match self {
            FeePayer::FirstOperation => 0,
        }
    }
}

/// Applies fee estimations to batches of operations.
pub struct OperationFeeEstimator<'a, R: ChainRpc> {
    rpc: &'a R,
    zero_fees: bool,
    fee_payer: FeePayer,
}

impl<'a, R: ChainRpc> OperationFeeEstimator<'a, R> {
    /// `zero_fees` leaves every fee at zero (for private networks that do
    /// not enforce the minimum-fee policy) while still applying limits.
    pub fn new(rpc: &'a R, zero_fees: bool) -> Self {
        Self {
            rpc,
            zero_fees,
            fee_payer: FeePayer::default(),
        }
    }

    pub fn with_fee_payer(mut self, fee_payer: FeePayer) -> Self {
        self.fee_payer = fee_payer;
        self
    }

    /// Set gas/storage limits and a fee on a group of operations.
    ///
    /// The batch is mutated in place and returned. On failure the batch may
    /// be partially mutated and must not be reused.
    pub fn estimate_and_apply_fees(
        &self,
        mut operations: Vec<Operation>,
    ) -> OracleResult<Vec<Operation>> {
        if operations.is_empty() {
            return Err(OracleError::invalid_input("cannot estimate an empty batch"));
        }
        let payer = self.fee_payer.index(&operations);

        // Start every operation from a zero fee so estimation is idempotent.
        for operation in operations.iter_mut() {
            operation.fee = "0".to_string();
        }

        // One estimate over the entire batch.
        let consumed = self.rpc.estimate_operation(&operations)?;
        let gas_with_margin = consumed.gas + GAS_SAFETY_MARGIN;
        let mut storage_with_margin = consumed.storage_cost + STORAGE_SAFETY_MARGIN;

        // Origination operations burn extra storage for the new contract,
        // wherever they sit in the batch.
        for operation in &operations {
            if operation.kind.is_origination() {
                storage_with_margin += ORIGINATION_BURN_COST;
            }
        }

        // The payer operation carries the group's resource budget.
        operations[payer].gas_limit = gas_with_margin.to_string();
        operations[payer].storage_limit = storage_with_margin.to_string();

        if self.zero_fees {
            return Ok(operations);
        }

        // Grab the block head once so the branch encoding stays constant
        // across iterations.
        let head = self.rpc.head_block(0)?;

        // Loop until the applied fee covers its own encoding cost.
        let mut iterations = 0u32;
        let mut required_fee = self.calculate_required_fee(&operations, &head)?;
        let mut current_fee = Self::calculate_current_fees(&operations)?;
        while current_fee < required_fee {
            iterations += 1;
            if iterations > MAX_FEE_ITERATIONS {
                return Err(OracleError::convergence_failure(format!(
                    "fee did not converge after {MAX_FEE_ITERATIONS} iterations"
                )));
            }

            operations[payer].fee = required_fee.to_string();
            logging::debug(
                "fees",
                format!("iteration {iterations}: applied fee {required_fee}"),
            );

            // A larger fee value can lengthen the serialized batch, which in
            // turn raises the requirement.
            required_fee = self.calculate_required_fee(&operations, &head)?;
            current_fee = Self::calculate_current_fees(&operations)?;
        }

        Ok(operations)
    }

    /// The fee currently applied across the batch, in mutez.
    fn calculate_current_fees(operations: &[Operation]) -> OracleResult<u64> {
        let mut total = 0u64;
        for operation in operations {
            total += Operation::parse_nat(&operation.fee)?;
        }
        Ok(total)
    }

    /// The minimum acceptable fee for the batch, in mutez.
    fn calculate_required_fee(
        &self,
        operations: &[Operation],
        head: &BlockHeader,
    ) -> OracleResult<u64> {
        let gas_fee_nanotez = Self::calculate_gas_fees(operations)?;

        let operation_size = self.calculate_serialized_byte_length(operations, head)?;
        let byte_fee_nanotez = FEE_PER_BYTE_NANOTEZ * operation_size;

        let required_nanotez = MINIMUM_FEE_NANOTEZ + gas_fee_nanotez + byte_fee_nanotez;
        Ok(required_nanotez.div_ceil(NANOTEZ_PER_MUTEZ))
    }

    /// The gas component of the fee, in nanotez, over all limits in the
    /// batch.
    fn calculate_gas_fees(operations: &[Operation]) -> OracleResult<u64> {
        let mut total = 0u64;
        for operation in operations {
            total += Operation::parse_nat(&operation.gas_limit)? * FEE_PER_GAS_UNIT_NANOTEZ;
        }
        Ok(total)
    }

    /// Size in bytes of the forged batch plus its (future) signature.
    fn calculate_serialized_byte_length(
        &self,
        operations: &[Operation],
        head: &BlockHeader,
    ) -> OracleResult<u64> {
        let forged = self.rpc.forge_operations(&head.hash, operations)?;
        Ok(forged.len() as u64 / 2 + SIGNATURE_SIZE_BYTES)
    }
}
