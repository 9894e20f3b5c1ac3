//! Keyring error types.

use mesh_access::AccessError;
use mesh_crypto::CryptoError;
use mesh_wire::WireError;
use thiserror::Error;

/// Keyring errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyringError {
    /// No network key with this index
    #[error("network key {0:#05x} not configured")]
    UnknownNetKey(u16),

    /// No application key with this index
    #[error("application key {0:#05x} not configured")]
    UnknownAppKey(u16),

    /// No device key for this node address
    #[error("no device key for node {0:#06x}")]
    UnknownDevKey(u16),

    /// Application key used with a network key it is not bound to
    #[error("app key {app_key_index:#05x} bound to net key {bound:#05x}, not {net_key_index:#05x}")]
    Binding {
        /// Application key index
        app_key_index: u16,
        /// Network key the application key is bound to
        bound: u16,
        /// Network key that was requested
        net_key_index: u16,
    },

    /// Key material could not be loaded
    #[error("key {index:#06x}: {source}")]
    Key {
        /// Key index, or node address for device keys
        index: u16,
        /// Underlying failure
        #[source]
        source: CryptoError,
    },

    /// No configured key combination decodes the PDU
    #[error("no configured key decodes the pdu")]
    NoMatchingKey,

    /// Access payload could not be encoded
    #[error("access: {0}")]
    Access(#[from] AccessError),

    /// Transport or network layer failure
    #[error("wire: {0}")]
    Wire(#[from] WireError),
}

/// Result alias for keyring operations
pub type KeyringResult<T> = Result<T, KeyringError>;
