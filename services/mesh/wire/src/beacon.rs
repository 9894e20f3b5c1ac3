//! Mesh beacons.
//!
//! ```text
//! Secure Network:   | 01 | flags | network id (8B) | iv index (4B BE) | auth (8B) |
//! Unprovisioned:    | 00 | uuid (16B) | oob (2B BE) | uri hash (4B, optional) |
//! ```

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use mesh_crypto::{aes_cmac, NetworkKey};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{WireError, WireResult};

/// Size of a secure network beacon without the type byte and auth
pub const SECURE_BEACON_SIZE: usize = 13;

/// Size of the truncated beacon authentication value
pub const BEACON_AUTH_SIZE: usize = 8;

/// Size of the unprovisioned device beacon URI hash
pub const URI_HASH_SIZE: usize = 4;

/// Beacon type carried in the first byte of a beacon
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeaconType {
    /// Unprovisioned device beacon
    UnprovisionedDevice = 0x00,
    /// Secure network beacon
    SecureNetwork = 0x01,
}

impl TryFrom<u8> for BeaconType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(BeaconType::UnprovisionedDevice),
            0x01 => Ok(BeaconType::SecureNetwork),
            _ => Err(WireError::Type(value)),
        }
    }
}

/// Secure network beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureNetworkBeacon {
    /// Key refresh procedure in progress
    pub key_refresh: bool,
    /// IV update procedure in progress
    pub iv_update: bool,
    /// Current IV index of the network
    pub iv_index: u32,
    /// Network ID derived from the network key
    pub network_id: [u8; 8],
}

impl SecureNetworkBeacon {
    /// Create a beacon for `net_key`
    pub fn new(net_key: &NetworkKey, key_refresh: bool, iv_update: bool, iv_index: u32) -> Self {
        Self {
            key_refresh,
            iv_update,
            iv_index,
            network_id: *net_key.network_id(),
        }
    }

    fn flags(&self) -> u8 {
        (u8::from(self.iv_update) << 1) | u8::from(self.key_refresh)
    }

    /// Beacon body and its authentication value
    pub fn pack(&self, net_key: &NetworkKey) -> ([u8; SECURE_BEACON_SIZE], [u8; BEACON_AUTH_SIZE]) {
        let mut beacon = [0u8; SECURE_BEACON_SIZE];
        beacon[0] = self.flags();
        beacon[1..9].copy_from_slice(&self.network_id);
        beacon[9..13].copy_from_slice(&self.iv_index.to_be_bytes());

        let mut auth = [0u8; BEACON_AUTH_SIZE];
        auth.copy_from_slice(&aes_cmac(net_key.beacon_key(), &beacon)[..BEACON_AUTH_SIZE]);
        (beacon, auth)
    }

    /// Split a beacon body and authentication value
    pub fn unpack(data: &[u8]) -> WireResult<(Self, [u8; BEACON_AUTH_SIZE])> {
        let expected = SECURE_BEACON_SIZE + BEACON_AUTH_SIZE;
        if data.len() != expected {
            return Err(WireError::Length {
                expected,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let flags = buf.get_u8();
        let mut network_id = [0u8; 8];
        buf.copy_to_slice(&mut network_id);
        let iv_index = buf.get_u32();
        let mut auth = [0u8; BEACON_AUTH_SIZE];
        buf.copy_to_slice(&mut auth);

        let beacon = Self {
            key_refresh: flags & 0x01 != 0,
            iv_update: flags & 0x02 != 0,
            iv_index,
            network_id,
        };
        Ok((beacon, auth))
    }

    /// Check `auth` against the value computed with `net_key`
    pub fn verify(&self, auth: &[u8], net_key: &NetworkKey) -> bool {
        let (_, expected) = self.pack(net_key);
        auth.len() == BEACON_AUTH_SIZE && bool::from(expected[..].ct_eq(auth))
    }
}

bitflags! {
    /// Out-of-band information advertised by an unprovisioned device
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OobInformation: u16 {
        /// Other location
        const OTHER = 1 << 0;
        /// Electronic / URI
        const ELECTRONIC_URI = 1 << 1;
        /// 2D machine-readable code
        const MACHINE_READABLE_2D = 1 << 2;
        /// Bar code
        const BAR_CODE = 1 << 3;
        /// Near Field Communication
        const NFC = 1 << 4;
        /// Number
        const NUMBER = 1 << 5;
        /// String
        const STRING = 1 << 6;
        /// Certificate-based provisioning supported
        const CERTIFICATE = 1 << 7;
        /// Provisioning records available
        const PROVISIONING_RECORDS = 1 << 8;
        /// On box
        const ON_BOX = 1 << 11;
        /// Inside box
        const INSIDE_BOX = 1 << 12;
        /// On piece of paper
        const ON_PAPER = 1 << 13;
        /// Inside manual
        const INSIDE_MANUAL = 1 << 14;
        /// On device
        const ON_DEVICE = 1 << 15;
    }
}

/// Unprovisioned device beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnprovisionedDeviceBeacon {
    /// Device UUID
    pub uuid: Uuid,
    /// OOB information
    pub oob: OobInformation,
    /// Hash of the associated URI
    pub uri_hash: Option<[u8; URI_HASH_SIZE]>,
}

impl UnprovisionedDeviceBeacon {
    /// Create a beacon; a URI hash must be exactly four bytes
    pub fn new(uuid: Uuid, oob: OobInformation, uri_hash: Option<&[u8]>) -> WireResult<Self> {
        let uri_hash = uri_hash
            .map(|hash| {
                <[u8; URI_HASH_SIZE]>::try_from(hash).map_err(|_| {
                    WireError::Validation(format!(
                        "uri hash must be {URI_HASH_SIZE} bytes, got {}",
                        hash.len()
                    ))
                })
            })
            .transpose()?;

        Ok(Self { uuid, oob, uri_hash })
    }

    /// Encode the beacon body
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.uuid.as_bytes());
        buf.put_u16(self.oob.bits());
        if let Some(hash) = self.uri_hash {
            buf.put_slice(&hash);
        }
    }

    /// Decode the beacon body
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        if buf.len() < 18 {
            return Err(WireError::Incomplete);
        }

        let mut uuid = [0u8; 16];
        buf.copy_to_slice(&mut uuid);
        let oob = OobInformation::from_bits_retain(buf.get_u16());

        let uri_hash = match buf.len() {
            0 => None,
            URI_HASH_SIZE => {
                let mut hash = [0u8; URI_HASH_SIZE];
                buf.copy_to_slice(&mut hash);
                Some(hash)
            }
            other => {
                return Err(WireError::Validation(format!(
                    "uri hash must be {URI_HASH_SIZE} bytes, got {other}"
                )))
            }
        };

        Ok(Self {
            uuid: Uuid::from_bytes(uuid),
            oob,
            uri_hash,
        })
    }
}

/// Beacon with its type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Beacon {
    /// Unprovisioned device beacon
    UnprovisionedDevice(UnprovisionedDeviceBeacon),
    /// Secure network beacon and its authentication value
    SecureNetwork {
        /// Beacon fields
        beacon: SecureNetworkBeacon,
        /// Authentication value
        auth: [u8; BEACON_AUTH_SIZE],
    },
}

impl Beacon {
    /// Authenticated secure network beacon
    pub fn secure(beacon: SecureNetworkBeacon, net_key: &NetworkKey) -> Self {
        let (_, auth) = beacon.pack(net_key);
        Beacon::SecureNetwork { beacon, auth }
    }

    /// Beacon type
    pub fn beacon_type(&self) -> BeaconType {
        match self {
            Beacon::UnprovisionedDevice(_) => BeaconType::UnprovisionedDevice,
            Beacon::SecureNetwork { .. } => BeaconType::SecureNetwork,
        }
    }

    /// Encode the beacon including its type byte
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.beacon_type() as u8);
        match self {
            Beacon::UnprovisionedDevice(beacon) => beacon.encode(buf),
            Beacon::SecureNetwork { beacon, auth } => {
                buf.put_u8(beacon.flags());
                buf.put_slice(&beacon.network_id);
                buf.put_u32(beacon.iv_index);
                buf.put_slice(auth);
            }
        }
    }

    /// Decode a beacon including its type byte
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        if buf.is_empty() {
            return Err(WireError::Incomplete);
        }

        match BeaconType::try_from(buf.get_u8())? {
            BeaconType::UnprovisionedDevice => {
                UnprovisionedDeviceBeacon::decode(buf).map(Beacon::UnprovisionedDevice)
            }
            BeaconType::SecureNetwork => {
                let body = buf.split_to(buf.len());
                let (beacon, auth) = SecureNetworkBeacon::unpack(&body)?;
                Ok(Beacon::SecureNetwork { beacon, auth })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net_key() -> NetworkKey {
        NetworkKey::from_hex("7dd7364cd842ad18c17c2b820c84c3d6").unwrap()
    }

    #[test]
    fn test_secure_network_beacon_pack() {
        let net_key = net_key();
        let beacon = SecureNetworkBeacon::new(&net_key, false, false, 0x12345678);

        let (body, auth) = beacon.pack(&net_key);
        assert_eq!(hex::encode(body), "003ecaff672f67337012345678");
        assert_eq!(hex::encode(auth), "8ea261582f364f6f");
        assert!(beacon.verify(&auth, &net_key));
    }

    #[test]
    fn test_secure_network_beacon_iv_update() {
        let net_key = net_key();
        let beacon = SecureNetworkBeacon::new(&net_key, false, true, 0x12345679);

        let mut buf = BytesMut::new();
        Beacon::secure(beacon, &net_key).encode(&mut buf);
        assert_eq!(
            hex::encode(&buf),
            "01023ecaff672f67337012345679c2af80ad072a135c"
        );

        let decoded = Beacon::decode(&mut buf.freeze()).unwrap();
        match decoded {
            Beacon::SecureNetwork { beacon: parsed, auth } => {
                assert_eq!(parsed, beacon);
                assert!(parsed.verify(&auth, &net_key));
            }
            other => panic!("unexpected beacon {other:?}"),
        }
    }

    #[test]
    fn test_secure_network_beacon_mutation() {
        let net_key = net_key();
        let beacon = SecureNetworkBeacon::new(&net_key, true, false, 0x00000001);
        let (_, auth) = beacon.pack(&net_key);

        let mut mutated = beacon;
        mutated.iv_index ^= 1;
        assert!(!mutated.verify(&auth, &net_key));

        let other = NetworkKey::from_hex("f7a2a44f8e8a8029064f173ddc1e2b00").unwrap();
        assert!(!beacon.verify(&auth, &other));
        assert!(!beacon.verify(&auth[..7], &net_key));
    }

    #[test]
    fn test_secure_network_beacon_length() {
        assert_eq!(
            SecureNetworkBeacon::unpack(&[0u8; 20]).unwrap_err(),
            WireError::Length {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn test_unprovisioned_beacon() {
        let uuid = Uuid::parse_str("70cf7c97-32a3-45b6-9149-4810d2e9cbf4").unwrap();
        let beacon = UnprovisionedDeviceBeacon::new(
            uuid,
            OobInformation::NUMBER | OobInformation::ON_DEVICE,
            Some(&[0xd9, 0x74, 0x78, 0xb3]),
        )
        .unwrap();

        let mut buf = BytesMut::new();
        Beacon::UnprovisionedDevice(beacon).encode(&mut buf);
        assert_eq!(
            hex::encode(&buf),
            "0070cf7c9732a345b691494810d2e9cbf48020d97478b3"
        );

        let decoded = Beacon::decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, Beacon::UnprovisionedDevice(beacon));
    }

    #[test]
    fn test_unprovisioned_beacon_without_uri() {
        let mut data = Bytes::from(hex::decode("70cf7c9732a345b691494810d2e9cbf40000").unwrap());
        let beacon = UnprovisionedDeviceBeacon::decode(&mut data).unwrap();
        assert_eq!(beacon.oob, OobInformation::empty());
        assert_eq!(beacon.uri_hash, None);
    }

    #[test]
    fn test_unprovisioned_beacon_rejects_uri_hash_length() {
        let uuid = Uuid::nil();
        assert!(matches!(
            UnprovisionedDeviceBeacon::new(uuid, OobInformation::empty(), Some(&[1, 2, 3])),
            Err(WireError::Validation(_))
        ));

        let raw = hex::decode("70cf7c9732a345b691494810d2e9cbf40000aabb").unwrap();
        let mut data = Bytes::from(raw);
        assert!(matches!(
            UnprovisionedDeviceBeacon::decode(&mut data),
            Err(WireError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_beacon_type() {
        let mut data = Bytes::from_static(&[0x02, 0x00]);
        assert_eq!(Beacon::decode(&mut data).unwrap_err(), WireError::Type(0x02));
    }
}
