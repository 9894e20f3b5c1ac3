//! Cryptographic error types.

use thiserror::Error;

/// Errors raised by the mesh crypto primitives and key types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material has the wrong size
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Block or nonce has the wrong size
    #[error("invalid block length: expected {expected}, got {actual}")]
    InvalidBlockLength {
        /// Expected length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// MIC size other than 4 or 8 bytes
    #[error("unsupported mic length {0}")]
    InvalidTagLength(usize),

    /// Key material is not valid hex
    #[error("invalid hex key: {0}")]
    InvalidHex(String),

    /// AES-CCM could not process the input
    #[error("ccm encryption failed")]
    Encryption,

    /// MIC did not verify
    #[error("authentication failed")]
    Authentication,

    /// Caller violated an API contract
    #[error("contract violation: {0}")]
    Contract(&'static str),
}

/// Result alias for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
