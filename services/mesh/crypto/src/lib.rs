//! AES primitives, key derivation, key types and nonces for Bluetooth mesh.
//!
//! This crate provides the cryptographic building blocks shared by the mesh
//! transport, network, beacon and provisioning codecs.
//!
//! ## Features
//!
//! - **Primitives**: AES-CMAC, AES-CCM with 32 or 64-bit MIC, single-block AES-ECB
//! - **Key Derivation**: the `s1`, `k1`, `k2`, `k3` and `k4` functions
//! - **Keys**: network, application and device keys with lazily cached derived material
//! - **Nonces**: network, application, device, proxy and solicitation nonces
//!
//! ## Key Material
//!
//! ```text
//! NetworkKey ─┬─ k2(N, 0x00) ──> NID, EncryptionKey, PrivacyKey
//!             ├─ k3(N) ────────> Network ID
//!             ├─ k1(N, "nkik") > IdentityKey
//!             └─ k1(N, "nkbk") > BeaconKey
//! ApplicationKey ── k4(A) ─────> AID
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kdf;
pub mod keys;
pub mod nonce;
pub mod primitives;

// Re-export main types
pub use error::{CryptoError, CryptoResult};
pub use kdf::{k1, k2, k3, k4, s1, EncryptionKeys};
pub use keys::{AccessKey, ApplicationKey, DeviceKey, NetworkKey};
pub use nonce::{Nonce, NonceBytes, NonceType};
pub use primitives::{
    aes_ccm_decrypt, aes_ccm_encrypt, aes_cmac, aes_cmac_parts, aes_ecb, Block, BLOCK_SIZE,
    KEY_SIZE, NONCE_SIZE,
};
