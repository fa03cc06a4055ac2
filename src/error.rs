//! Error types for the library

use thiserror::Error;

/// Everything that can go wrong in key handling, encryption or decryption.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No registry entry for this (category, block count) pair
    #[error("no parameter set for security category {category} with {block_count} circulant blocks")]
    ParameterRange {
        /// Requested security category
        category: u8,
        /// Requested number of circulant blocks
        block_count: usize,
    },

    /// Every encryption attempt ran out of constant-weight capacity
    #[error("constant-weight encoding failed after {attempts} attempts")]
    EncodingExhausted {
        /// Seeds tried
        attempts: usize,
    },

    /// The syndrome was still non-zero when the round budget ran out
    #[error("bit-flipping decoder did not converge within {rounds} rounds")]
    DecodingFailure {
        /// Rounds run
        rounds: usize,
    },

    /// End-of-data marker missing, or plaintext not byte aligned
    #[error("padding marker missing or malformed")]
    MalformedPadding,

    /// Message larger than the parameter set can carry
    #[error("plaintext of {bits} bits exceeds the capacity of {max} bits")]
    PlaintextTooLarge {
        /// Plaintext size in bits
        bits: usize,
        /// Largest accepted size in bits
        max: usize,
    },

    /// Key or ciphertext of the wrong size
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Object being parsed
        what: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// The decoder produced an error vector of the wrong weight
    #[error("decoded error vector has weight {actual}, expected {expected}")]
    ErrorWeight {
        /// Designed error weight `t`
        expected: usize,
        /// Weight found
        actual: usize,
    },

    /// Recomputed digest does not match the one carried in the ciphertext
    #[error("digest check failed")]
    DigestMismatch,
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
