//! Fee Estimation Module
//!
//! Computes gas limits, storage limits, and the converged minimum fee for an
//! operation batch before it is signed and broadcast.

mod estimator;

pub use estimator::{FeePayer, OperationFeeEstimator, MAX_FEE_ITERATIONS};
