//! Protocol constants for the fee model and base58 prefixes.
//!
//! Fee values are expressed in nanotez (1 mutez = 1000 nanotez). The node
//! enforces `minimum + gas * per_gas + bytes * per_byte` as the acceptance
//! floor for an operation group; see `fees::estimator`.

/// The cost per byte of serialized operation, in nanotez.
pub const FEE_PER_BYTE_NANOTEZ: u64 = 1000;

/// The cost per gas unit used, in nanotez.
pub const FEE_PER_GAS_UNIT_NANOTEZ: u64 = 100;

/// The minimum fee for an operation, in nanotez.
pub const MINIMUM_FEE_NANOTEZ: u64 = 100_000;

/// The number of nanotez per mutez.
pub const NANOTEZ_PER_MUTEZ: u64 = 1000;

/// The maximum amount of gas that can be used in an operation.
pub const GAS_LIMIT: u64 = 1_040_000;

/// The maximum amount of storage that can be added in an operation.
pub const STORAGE_LIMIT: u64 = 60_000;

/// The length of a signature in bytes, added on top of the forged payload.
pub const SIGNATURE_SIZE_BYTES: u64 = 64;

/// The storage burn applied when a contract is originated.
pub const ORIGINATION_BURN_COST: u64 = 257;

/// A safety margin applied to gas estimates.
pub const GAS_SAFETY_MARGIN: u64 = 100;

/// A safety margin applied to storage estimates.
pub const STORAGE_SAFETY_MARGIN: u64 = 20;

/// The length of a public key hash in bytes.
pub const PUBLIC_KEY_HASH_LENGTH: usize = 20;

/// The length of a signing digest in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Base58check version prefixes.
pub mod prefix {
    /// Prefix for a secp256k1 public key (`sppk`).
    pub const SECP256K1_PUBLIC_KEY: [u8; 4] = [3, 254, 226, 86];

    /// Prefix for a secp256k1 public key hash (`tz2`).
    pub const SECP256K1_PUBLIC_KEY_HASH: [u8; 3] = [6, 161, 161];

    /// Prefix for a secp256k1 signature (`spsig1`).
    pub const SECP256K1_SIGNATURE: [u8; 5] = [13, 115, 101, 19, 63];

    /// Prefix for a smart contract address (`KT1`).
    pub const SMART_CONTRACT_ADDRESS: [u8; 3] = [2, 90, 121];
}
