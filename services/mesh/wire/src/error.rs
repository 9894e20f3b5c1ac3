//! Wire protocol error types.

use mesh_crypto::CryptoError;
use thiserror::Error;

/// Wire protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Incomplete PDU (need more data)
    #[error("incomplete pdu")]
    Incomplete,

    /// Field value out of range or malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// MIC did not verify
    #[error("authentication failed")]
    Authentication,

    /// PDU was not produced with the supplied key
    #[error("key mismatch: {0}")]
    KeyMismatch(&'static str),

    /// Operation deliberately not supported
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Caller violated an API contract
    #[error("contract violation: {0}")]
    Contract(&'static str),

    /// Unknown PDU type
    #[error("unknown type {0}")]
    Type(u8),

    /// Frame check sequence mismatch
    #[error("fcs mismatch: expected {expected:#04x}, got {actual:#04x}")]
    Fcs {
        /// Checksum carried in the PDU
        expected: u8,
        /// Checksum computed over the payload
        actual: u8,
    },

    /// Declared length disagrees with the data
    #[error("length mismatch: expected {expected}, got {actual}")]
    Length {
        /// Declared length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Crypto layer failure
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),
}

impl WireError {
    /// Map a CCM failure, keeping authentication errors distinguishable
    pub(crate) fn from_ccm(err: CryptoError) -> Self {
        match err {
            CryptoError::Authentication => WireError::Authentication,
            other => WireError::Crypto(other),
        }
    }
}

/// Result alias for wire operations
pub type WireResult<T> = Result<T, WireError>;
