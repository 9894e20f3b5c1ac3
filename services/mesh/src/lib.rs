//! Bluetooth mesh codecs, cryptography and keyring for host side tools.
//!
//! This crate ties the layer crates together and adds what a tool talking
//! to a mesh network needs around them:
//!
//! - **Re-exports**: [`crypto`], [`wire`] and [`access`] layers under one roof
//! - **Configuration**: Node address, IV index and keys from YAML or TOML
//! - **Keyring**: Unpack network PDUs by trying every configured key that fits
//! - **Logging**: Console formatter with component and level columns
//!
//! ## Data Flow
//!
//! ```text
//! access::AccessMessage ──encode──> payload ──wire::AccessMessage──> NetworkMessage::pack
//!                                                                          │
//!                                   Keyring::unpack <── network pdus <─────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod keyring;
pub mod logging;

pub use mesh_access as access;
pub use mesh_crypto as crypto;
pub use mesh_wire as wire;

// Re-export main types
pub use config::MeshConfig;
pub use error::{KeyringError, KeyringResult};
pub use keyring::{AccessKeyId, Keyring, Unpacked};
pub use logging::{init_logging, MeshLogFormatter};
