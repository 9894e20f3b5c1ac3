//! Key material for a local node and key-candidate PDU decoding.
//!
//! The keyring holds every network, application and device key from a
//! [`MeshConfig`]. Incoming network PDUs are matched against the keys by
//! NID first and by AKF/AID second, so the caller never has to know which
//! subnet or application a PDU belongs to.
//!
//! ```text
//! network pdu ──NID──> network keys ──decrypt──> transport pdu
//!                                                    │
//!                       app keys bound to subnet <──AKF/AID──> device keys of src/dst
//! ```

use std::collections::BTreeMap;

use bytes::Bytes;
use mesh_access::{AccessError, AccessMessage as AccessPayload};
use mesh_crypto::{AccessKey, ApplicationKey, DeviceKey, NetworkKey};
use mesh_wire::{
    AccessMessage, NetworkMessage, NetworkPdu, NetworkPdus, PackOptions, TransportMessage,
    WireError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MeshConfig;
use crate::error::{KeyringError, KeyringResult};

/// Key that protected an access message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum AccessKeyId {
    /// Application key with this index
    Application(u16),
    /// Device key of the node with this address
    Device(u16),
}

/// Network PDU decoded by the keyring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    /// Index of the network key that decrypted the PDU
    pub net_key_index: u16,
    /// Key that opened the upper transport PDU, access messages only
    pub access_key: Option<AccessKeyId>,
    /// IV index the sender used
    pub iv_index: u32,
    /// Network sequence number
    pub seq: u32,
    /// Decoded message
    pub message: NetworkMessage,
}

impl Unpacked {
    /// Parse the access payload, if this is an access message
    pub fn access(&self) -> Option<Result<AccessPayload, AccessError>> {
        match &self.message.message {
            TransportMessage::Access(message) => {
                Some(AccessPayload::decode(&mut message.payload.clone()))
            }
            _ => None,
        }
    }
}

struct BoundAppKey {
    net_key_index: u16,
    key: ApplicationKey,
}

/// Keys of the local node
pub struct Keyring {
    unicast_address: u16,
    iv_index: u32,
    default_ttl: u8,
    net_keys: BTreeMap<u16, NetworkKey>,
    app_keys: BTreeMap<u16, BoundAppKey>,
    dev_keys: BTreeMap<u16, DeviceKey>,
}

impl Keyring {
    /// Materialize the keys of a configuration
    pub fn from_config(config: &MeshConfig) -> KeyringResult<Self> {
        let mut net_keys = BTreeMap::new();
        for entry in &config.net_keys {
            let key = NetworkKey::from_hex(entry.key.expose()).map_err(|source| KeyringError::Key {
                index: entry.index,
                source,
            })?;
            net_keys.insert(entry.index, key);
        }

        let mut app_keys = BTreeMap::new();
        for entry in &config.app_keys {
            if !net_keys.contains_key(&entry.net_key_index) {
                return Err(KeyringError::UnknownNetKey(entry.net_key_index));
            }
            let key = ApplicationKey::from_hex(entry.key.expose()).map_err(|source| {
                KeyringError::Key {
                    index: entry.index,
                    source,
                }
            })?;
            app_keys.insert(
                entry.index,
                BoundAppKey {
                    net_key_index: entry.net_key_index,
                    key,
                },
            );
        }

        let mut dev_keys = BTreeMap::new();
        for entry in &config.dev_keys {
            let key = DeviceKey::from_hex(entry.key.expose()).map_err(|source| KeyringError::Key {
                index: entry.address,
                source,
            })?;
            dev_keys.insert(entry.address, key);
        }

        crate::component_debug!(
            "keyring",
            net_keys = net_keys.len(),
            app_keys = app_keys.len(),
            dev_keys = dev_keys.len(),
            "keyring loaded"
        );

        Ok(Self {
            unicast_address: config.unicast_address,
            iv_index: config.iv_index,
            default_ttl: config.default_ttl,
            net_keys,
            app_keys,
            dev_keys,
        })
    }

    /// Address messages are sent from
    pub fn unicast_address(&self) -> u16 {
        self.unicast_address
    }

    /// Current IV index
    pub fn iv_index(&self) -> u32 {
        self.iv_index
    }

    /// Move to another IV index
    pub fn set_iv_index(&mut self, iv_index: u32) {
        self.iv_index = iv_index;
    }

    /// Network key by index
    pub fn net_key(&self, index: u16) -> KeyringResult<&NetworkKey> {
        self.net_keys.get(&index).ok_or(KeyringError::UnknownNetKey(index))
    }

    /// Application key by index, with the network key index it is bound to
    pub fn app_key(&self, index: u16) -> KeyringResult<(u16, &ApplicationKey)> {
        self.app_keys
            .get(&index)
            .map(|bound| (bound.net_key_index, &bound.key))
            .ok_or(KeyringError::UnknownAppKey(index))
    }

    /// Device key of a node
    pub fn dev_key(&self, address: u16) -> KeyringResult<&DeviceKey> {
        self.dev_keys.get(&address).ok_or(KeyringError::UnknownDevKey(address))
    }

    /// Decrypt and decode a network PDU with whichever configured keys fit.
    ///
    /// Network keys are tried in index order among those whose NID matches
    /// the PDU. An authentication failure moves on to the next network key.
    /// For access messages the application keys bound to that network key
    /// are tried, then the device keys of the source and destination.
    pub fn unpack(&self, data: &[u8], proxy: bool) -> KeyringResult<Unpacked> {
        let (_, nid) = NetworkPdu::ivi_nid(data)?;

        for (&net_key_index, net_key) in self.net_keys.iter().filter(|(_, key)| key.nid() == nid) {
            let pdu = match NetworkPdu::decrypt(net_key, self.iv_index, data, proxy) {
                Ok(pdu) => pdu,
                Err(WireError::Authentication) | Err(WireError::KeyMismatch(_)) => {
                    debug!(net_key_index, "network key rejected pdu");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if pdu.proxy || pdu.ctl {
                let message = pdu.open(None)?;
                return Ok(Unpacked {
                    net_key_index,
                    access_key: None,
                    iv_index: pdu.iv_index,
                    seq: pdu.seq,
                    message: NetworkMessage { message },
                });
            }

            for (id, key) in self.access_key_candidates(net_key_index, pdu.src, pdu.dst) {
                match pdu.open(Some(key)) {
                    Ok(message) => {
                        debug!(
                            net_key_index,
                            ?id,
                            src = pdu.src,
                            dst = pdu.dst,
                            seq = pdu.seq,
                            "access pdu opened"
                        );
                        return Ok(Unpacked {
                            net_key_index,
                            access_key: Some(id),
                            iv_index: pdu.iv_index,
                            seq: pdu.seq,
                            message: NetworkMessage { message },
                        });
                    }
                    Err(WireError::KeyMismatch(_)) | Err(WireError::Authentication) => continue,
                    Err(err) => return Err(err.into()),
                }
            }

            crate::component_warn!(
                "keyring",
                net_key_index,
                src = pdu.src,
                seq = pdu.seq,
                "no access key opens pdu"
            );
        }

        Err(KeyringError::NoMatchingKey)
    }

    fn access_key_candidates(
        &self,
        net_key_index: u16,
        src: u16,
        dst: u16,
    ) -> impl Iterator<Item = (AccessKeyId, &dyn AccessKey)> + '_ {
        let app_keys = self
            .app_keys
            .iter()
            .filter(move |(_, bound)| bound.net_key_index == net_key_index)
            .map(|(&index, bound)| (AccessKeyId::Application(index), &bound.key as &dyn AccessKey));

        let mut owners = vec![src];
        if dst != src {
            owners.push(dst);
        }
        let dev_keys = owners.into_iter().filter_map(move |address| {
            self.dev_keys
                .get(&address)
                .map(|key| (AccessKeyId::Device(address), key as &dyn AccessKey))
        });

        app_keys.chain(dev_keys)
    }

    /// Encode an access message and pack it into network PDUs.
    ///
    /// The message is sent from the local unicast address with `ttl`, or
    /// the configured default TTL when `None`.
    #[allow(clippy::too_many_arguments)]
    pub fn pack_access(
        &self,
        net_key_index: u16,
        key: AccessKeyId,
        dst: u16,
        ttl: Option<u8>,
        payload: &AccessPayload,
        seq: u32,
        options: &PackOptions,
    ) -> KeyringResult<NetworkPdus<'_>> {
        let net_key = self.net_key(net_key_index)?;
        let access_key: &dyn AccessKey = match key {
            AccessKeyId::Application(index) => {
                let (bound, app_key) = self.app_key(index)?;
                if bound != net_key_index {
                    return Err(KeyringError::Binding {
                        app_key_index: index,
                        bound,
                        net_key_index,
                    });
                }
                app_key
            }
            AccessKeyId::Device(address) => self.dev_key(address)?,
        };

        let payload: Bytes = payload.to_bytes()?;
        let message = NetworkMessage::new(AccessMessage::new(
            self.unicast_address,
            dst,
            ttl.unwrap_or(self.default_ttl),
            payload,
        ));

        Ok(message.pack(Some(access_key), net_key, seq, self.iv_index, options)?)
    }
}
