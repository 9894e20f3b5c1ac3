//! Access layer error types.

use thiserror::Error;

/// Access message codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Message ended before all parameters were read
    #[error("incomplete message")]
    Incomplete,

    /// Field value out of range or malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// Value does not name a variant of an enumerated field
    #[error("invalid {name} value {value:#x}")]
    Enum {
        /// Name of the enumerated type
        name: &'static str,
        /// Raw value read from the message
        value: i64,
    },

    /// Opcode not owned by the model family
    #[error("unknown opcode {0:#x}")]
    Opcode(u32),

    /// Bytes left over after the last parameter
    #[error("{0} trailing bytes")]
    Trailing(usize),
}

/// Result alias for access codec operations
pub type AccessResult<T> = Result<T, AccessError>;
