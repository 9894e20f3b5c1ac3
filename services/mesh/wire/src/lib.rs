//! Bluetooth mesh PDU codecs: lower/upper transport, network, beacons and
//! provisioning.
//!
//! This crate turns transport layer messages into encrypted, obfuscated
//! network PDUs and back, using the keys and nonces from `mesh-crypto`.
//! Access layer payloads are opaque bytes here; see `mesh-access` for their
//! schemas.
//!
//! ## Features
//!
//! - **Transport Variants**: Access, Control, Proxy Configuration, Solicitation and Segment Ack
//! - **Segmentation**: SeqZero/SegO/SegN packing with lazy segment iterators
//! - **Network Framing**: AES-CCM encryption and AES-ECB header obfuscation
//! - **IV Index Recovery**: IVI bit resolution against the local IV index
//! - **Beacons**: Secure Network (authenticated) and Unprovisioned Device
//! - **Provisioning**: PDU codec, generic provisioning with CRC-8 FCS, session crypto
//! - **Zero-Copy I/O**: Uses `Bytes`/`BytesMut` for minimal allocations
//!
//! ## Wire Format
//!
//! ```text
//! +----------------------+----------------------------+
//! | IVI:1 NID:7          | clear                      |
//! +----------------------+----------------------------+
//! | CTL:1 TTL:7          |                            |
//! | SEQ:24               | obfuscated with            |
//! | SRC:16               | e(privacy_key, iv||sample) |
//! +----------------------+----------------------------+
//! | DST:16               |                            |
//! | lower transport PDU  | encrypted with             |
//! | NetMIC (4 or 8)      | encryption_key             |
//! +----------------------+----------------------------+
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod beacon;
pub mod error;
pub mod network;
pub mod provisioning;
pub mod transport;

// Re-export main types
pub use beacon::{
    Beacon, BeaconType, OobInformation, SecureNetworkBeacon, UnprovisionedDeviceBeacon,
    BEACON_AUTH_SIZE, SECURE_BEACON_SIZE, URI_HASH_SIZE,
};
pub use error::{WireError, WireResult};
pub use network::{
    NetworkMessage, NetworkPdu, NetworkPdus, PackOptions, MAX_SEQ, NETWORK_HEADER_SIZE,
};
pub use provisioning::{
    GenericProvisioningPdu, ProvisioningPdu, ProvisioningTransaction, SessionKeys,
};
pub use transport::{
    AccessMessage, ControlMessage, LowerTransportPdu, ProxyConfigMessage, SegmentAckMessage,
    SegmentHeader, Segments, SolicitationMessage, TransportMessage, MAX_SEGMENTS,
    MAX_TRANSPORT_PDU, SEGMENT_SIZE,
};
