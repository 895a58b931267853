//! Unified error types for the oracle pusher.
//!
//! All errors flow through this module for consistent handling. Remote
//! failures are propagated unchanged so retry policy stays a caller concern.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all oracle pusher operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl OracleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_hex(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidHex, msg)
    }

    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChecksumMismatch, msg)
    }

    pub fn encoding_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncodingError, msg)
    }

    pub fn malformed_der(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedDer, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    pub fn remote_key_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RemoteKeyUnavailable, msg)
    }

    pub fn convergence_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConvergenceFailure, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for OracleError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors: always local, never retried
    InvalidInput,
    InvalidHex,
    ParseError,

    // Structural encoding violations: fatal to the current operation
    EncodingError,
    ChecksumMismatch,
    MalformedDer,

    // Remote service errors: propagated unchanged, retries are a caller concern
    NetworkError,
    RpcError,
    RemoteKeyUnavailable,

    // Implementation invariant violations
    ConvergenceFailure,
    Internal,
}

impl ErrorCode {
    /// Whether a retry by the caller could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError | ErrorCode::RpcError)
    }
}

/// Result type alias for oracle pusher operations
pub type OracleResult<T> = Result<T, OracleError>;

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::network_error(err.to_string())
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        OracleError::parse_error(err.to_string())
    }
}
