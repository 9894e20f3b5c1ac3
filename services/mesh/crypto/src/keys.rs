//! Network, application and device keys.
//!
//! Each key wraps a 16-byte secret. Derived material is computed on first
//! access and cached for the lifetime of the key; a new secret always means a
//! new key value.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{k1, k2, k3, k4, s1, EncryptionKeys};
use crate::primitives::{Block, KEY_SIZE};

fn parse_secret(bytes: &[u8]) -> CryptoResult<Block> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })
}

fn parse_hex(s: &str) -> CryptoResult<Block> {
    let mut raw = hex::decode(s.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    let secret = parse_secret(&raw);
    raw.zeroize();
    secret
}

/// Key usable for upper transport encryption of access messages
pub trait AccessKey: Send + Sync {
    /// Raw key material
    fn secret(&self) -> &Block;

    /// 6-bit application key identifier, zero for device keys
    fn aid(&self) -> u8;

    /// Whether this is an application key (AKF bit)
    fn is_application_key(&self) -> bool;
}

/// Network key and the material derived from it
#[derive(Clone)]
pub struct NetworkKey {
    secret: Block,
    encryption_keys: OnceCell<EncryptionKeys>,
    network_id: OnceCell<[u8; 8]>,
    identity_key: OnceCell<Block>,
    beacon_key: OnceCell<Block>,
}

impl NetworkKey {
    /// Create a network key from its secret
    pub fn new(secret: Block) -> Self {
        Self {
            secret,
            encryption_keys: OnceCell::new(),
            network_id: OnceCell::new(),
            identity_key: OnceCell::new(),
            beacon_key: OnceCell::new(),
        }
    }

    /// Create a network key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        parse_secret(bytes).map(Self::new)
    }

    /// Create a network key from a hex string
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        parse_hex(s).map(Self::new)
    }

    /// Raw key material
    pub fn secret(&self) -> &Block {
        &self.secret
    }

    /// Managed flooding credentials: NID, encryption key and privacy key
    pub fn encryption_keys(&self) -> &EncryptionKeys {
        self.encryption_keys.get_or_init(|| k2(&self.secret, &[0x00]))
    }

    /// 7-bit network identifier carried in every network PDU
    pub fn nid(&self) -> u8 {
        self.encryption_keys().nid
    }

    /// 64-bit network ID advertised in secure network beacons
    pub fn network_id(&self) -> &[u8; 8] {
        self.network_id.get_or_init(|| k3(&self.secret))
    }

    /// Key used for node identity advertising
    pub fn identity_key(&self) -> &Block {
        self.identity_key
            .get_or_init(|| k1(&self.secret, &s1(b"nkik"), b"id128\x01"))
    }

    /// Key used to authenticate secure network beacons
    pub fn beacon_key(&self) -> &Block {
        self.beacon_key
            .get_or_init(|| k1(&self.secret, &s1(b"nkbk"), b"id128\x01"))
    }

    /// Friendship credentials for a friend/LPN pair
    pub fn friendship_keys(
        &self,
        lpn_address: u16,
        friend_address: u16,
        lpn_counter: u16,
        friend_counter: u16,
    ) -> EncryptionKeys {
        let mut p = [0u8; 9];
        p[0] = 0x01;
        p[1..3].copy_from_slice(&lpn_address.to_be_bytes());
        p[3..5].copy_from_slice(&friend_address.to_be_bytes());
        p[5..7].copy_from_slice(&lpn_counter.to_be_bytes());
        p[7..9].copy_from_slice(&friend_counter.to_be_bytes());
        k2(&self.secret, &p)
    }
}

/// Application key
#[derive(Clone)]
pub struct ApplicationKey {
    secret: Block,
    aid: OnceCell<u8>,
}

impl ApplicationKey {
    /// Create an application key from its secret
    pub fn new(secret: Block) -> Self {
        Self {
            secret,
            aid: OnceCell::new(),
        }
    }

    /// Create an application key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        parse_secret(bytes).map(Self::new)
    }

    /// Create an application key from a hex string
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        parse_hex(s).map(Self::new)
    }
}

impl AccessKey for ApplicationKey {
    fn secret(&self) -> &Block {
        &self.secret
    }

    fn aid(&self) -> u8 {
        *self.aid.get_or_init(|| k4(&self.secret))
    }

    fn is_application_key(&self) -> bool {
        true
    }
}

/// Device key, shared between a node and its provisioner
#[derive(Clone)]
pub struct DeviceKey {
    secret: Block,
}

impl DeviceKey {
    /// Create a device key from its secret
    pub fn new(secret: Block) -> Self {
        Self { secret }
    }

    /// Create a device key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        parse_secret(bytes).map(Self::new)
    }

    /// Create a device key from a hex string
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        parse_hex(s).map(Self::new)
    }
}

impl AccessKey for DeviceKey {
    fn secret(&self) -> &Block {
        &self.secret
    }

    fn aid(&self) -> u8 {
        0
    }

    fn is_application_key(&self) -> bool {
        false
    }
}

macro_rules! key_common {
    ($name:ident, $($cache:ident),*) => {
        impl Drop for $name {
            fn drop(&mut self) {
                self.secret.zeroize();
                $(
                    if let Some(mut cached) = self.$cache.take() {
                        cached.zeroize();
                    }
                )*
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.secret.ct_eq(&other.secret).into()
            }
        }

        impl Eq for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

key_common!(NetworkKey, encryption_keys, network_id, identity_key, beacon_key);
key_common!(ApplicationKey, aid);
key_common!(DeviceKey,);

#[cfg(test)]
mod tests {
    use super::*;

    const NET_KEY: &str = "7dd7364cd842ad18c17c2b820c84c3d6";
    const APP_KEY: &str = "63964771734fbd76e3b40519d1d94a48";

    #[test]
    fn test_network_key_derivations() {
        let key = NetworkKey::from_hex(NET_KEY).unwrap();

        assert_eq!(key.nid(), 0x68);
        assert_eq!(
            hex::encode(key.encryption_keys().encryption_key),
            "0953fa93e7caac9638f58820220a398e"
        );
        assert_eq!(
            hex::encode(key.encryption_keys().privacy_key),
            "8b84eedec100067d670971dd2aa700cf"
        );
        assert_eq!(hex::encode(key.network_id()), "3ecaff672f673370");
        assert_eq!(
            hex::encode(key.identity_key()),
            "84396c435ac48560b5965385253e210c"
        );
        assert_eq!(
            hex::encode(key.beacon_key()),
            "5423d967da639a99cb02231a83f7d254"
        );
    }

    #[test]
    fn test_friendship_keys() {
        let key = NetworkKey::from_hex(NET_KEY).unwrap();
        let keys = key.friendship_keys(0x0203, 0x0405, 0x0000, 0x072f);

        assert_eq!(keys.nid, 0x03);
        assert_eq!(
            hex::encode(keys.encryption_key),
            "821a5b44264090ba65461a3d9436e528"
        );
        assert_eq!(
            hex::encode(keys.privacy_key),
            "b963a20809b13834aac0a5431a6a8a0d"
        );
    }

    #[test]
    fn test_derivation_is_cached() {
        let key = NetworkKey::from_hex(NET_KEY).unwrap();
        let first = key.encryption_keys() as *const EncryptionKeys;
        let second = key.encryption_keys() as *const EncryptionKeys;
        assert_eq!(first, second);
    }

    #[test]
    fn test_application_key_aid() {
        let key: ApplicationKey = APP_KEY.parse().unwrap();
        assert_eq!(key.aid(), 0x26);
        assert!(key.is_application_key());
    }

    #[test]
    fn test_device_key_has_no_aid() {
        let key = DeviceKey::from_hex(APP_KEY).unwrap();
        assert_eq!(key.aid(), 0);
        assert!(!key.is_application_key());
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            NetworkKey::from_slice(&[0u8; 15]),
            Err(CryptoError::InvalidKeyLength {
                expected: 16,
                actual: 15
            })
        );
        assert!(matches!(
            ApplicationKey::from_hex("zz"),
            Err(CryptoError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key = NetworkKey::from_hex(NET_KEY).unwrap();
        let shown = format!("{key:?}");
        assert_eq!(shown, "NetworkKey { .. }");
    }

    #[test]
    fn test_equality_by_secret() {
        let a = ApplicationKey::from_hex(APP_KEY).unwrap();
        let b = ApplicationKey::from_hex(APP_KEY).unwrap();
        let _ = a.aid();
        assert_eq!(a, b);
        assert_ne!(a, ApplicationKey::new([0u8; 16]));
    }
}
