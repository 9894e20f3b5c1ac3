//! Network PDU framing.
//!
//! ```text
//! +-----+-----+---------------------------------+------------------------------+
//! | IVI | NID | CTL|TTL, SEQ, SRC (obfuscated)  | DST + TransportPDU + NetMIC  |
//! | 1b  | 7b  | 6 bytes                         | AES-CCM, MIC 4B (8B if CTL)  |
//! +-----+-----+---------------------------------+------------------------------+
//! ```
//!
//! The header is obfuscated with `AES-ECB(PrivacyKey, 0^40 || IV || pdu[0..7])`.

use bytes::{BufMut, Bytes, BytesMut};
use mesh_crypto::{
    aes_ccm_decrypt, aes_ccm_encrypt, aes_ecb, AccessKey, EncryptionKeys, NetworkKey, Nonce,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::{WireError, WireResult};
use crate::transport::{
    AccessMessage, ControlMessage, ProxyConfigMessage, Segments, TransportMessage,
};

/// Size of the obfuscated network header
pub const NETWORK_HEADER_SIZE: usize = 6;

/// Largest sequence number (24 bits)
pub const MAX_SEQ: u32 = 0x00ff_ffff;

/// Bytes of the encrypted PDU mixed into the privacy random
const PRIVACY_SAMPLE: usize = 7;

/// Which nonce protects the network PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NonceKind {
    Network,
    Proxy,
    Solicitation,
}

fn network_nonce(
    kind: NonceKind,
    nonce: Nonce,
    seq: u32,
    iv_index: u32,
) -> WireResult<[u8; 13]> {
    Ok(match kind {
        NonceKind::Network => nonce.network(seq, iv_index),
        NonceKind::Proxy => nonce.proxy(seq, iv_index),
        NonceKind::Solicitation => nonce.solicitation(seq, iv_index)?,
    })
}

fn privacy_mask(
    privacy_key: &[u8; 16],
    iv_index: u32,
    sample: &[u8],
) -> [u8; NETWORK_HEADER_SIZE] {
    let mut random = [0u8; 16];
    random[5..9].copy_from_slice(&iv_index.to_be_bytes());
    random[9..16].copy_from_slice(&sample[..PRIVACY_SAMPLE]);

    let pecb = aes_ecb(privacy_key, &random);
    let mut mask = [0u8; NETWORK_HEADER_SIZE];
    mask.copy_from_slice(&pecb[..NETWORK_HEADER_SIZE]);
    mask
}

/// Options for [`NetworkMessage::pack`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Sequence number for the upper transport layer, defaults to the network sequence
    pub transport_seq: Option<u32>,
    /// Segment offsets already acknowledged by the receiver
    pub skip_segments: SmallVec<[u8; 8]>,
    /// Request a 64-bit transport MIC
    pub szmic: bool,
    /// Segment even when the PDU would fit unsegmented
    pub force_segmented: bool,
}

/// Network message wrapping one transport message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMessage {
    /// Transport layer message
    pub message: TransportMessage,
}

impl NetworkMessage {
    /// Wrap a transport message
    pub fn new(message: impl Into<TransportMessage>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Encrypt and frame the message.
    ///
    /// Yields one `(sequence, network_pdu)` pair per transmitted segment;
    /// network sequence numbers are consecutive starting at `seq`.
    pub fn pack<'a>(
        &self,
        key: Option<&dyn AccessKey>,
        net_key: &'a NetworkKey,
        seq: u32,
        iv_index: u32,
        options: &PackOptions,
    ) -> WireResult<NetworkPdus<'a>> {
        let message = &self.message;

        if message.ttl() > 0x7f {
            return Err(WireError::Validation(format!("ttl {:#04x} exceeds 0x7f", message.ttl())));
        }

        let kind = match message {
            TransportMessage::ProxyConfig(_) => NonceKind::Proxy,
            TransportMessage::Solicitation(_) => NonceKind::Solicitation,
            _ => NonceKind::Network,
        };

        if kind == NonceKind::Solicitation && iv_index != 0 {
            return Err(WireError::Contract("solicitation requires iv index 0"));
        }

        let transport_seq = options.transport_seq.unwrap_or(seq);
        let segments = message.segments(
            key,
            transport_seq,
            iv_index,
            options.szmic,
            options.force_segmented,
        )?;

        let skipped = options
            .skip_segments
            .iter()
            .filter(|s| usize::from(**s) < segments.len())
            .count();
        let remaining = segments.len().saturating_sub(skipped);
        if remaining > 0 && seq.saturating_add(remaining as u32 - 1) > MAX_SEQ {
            return Err(WireError::Validation(format!("sequence {seq:#08x} exhausted")));
        }

        debug!(
            src = message.src(),
            dst = message.dst(),
            seq,
            transport_seq,
            segments = segments.len(),
            skipped = options.skip_segments.len(),
            "packing network message"
        );

        Ok(NetworkPdus {
            keys: net_key.encryption_keys(),
            kind,
            nonce: message.nonce(),
            ctl: message.ctl(),
            ttl: message.ttl(),
            src: message.src(),
            dst: message.dst(),
            iv_index,
            seq,
            skip: options.skip_segments.clone(),
            segments: segments.enumerate(),
        })
    }

    /// Deobfuscate, decrypt and decode a network PDU
    pub fn unpack(
        key: Option<&dyn AccessKey>,
        net_key: &NetworkKey,
        local_iv_index: u32,
        data: &[u8],
        proxy: bool,
    ) -> WireResult<(u32, u32, Self)> {
        let pdu = NetworkPdu::decrypt(net_key, local_iv_index, data, proxy)?;
        let message = pdu.open(key)?;
        Ok((pdu.iv_index, pdu.seq, Self { message }))
    }
}

/// Lazy sequence of encrypted network PDUs
pub struct NetworkPdus<'a> {
    keys: &'a EncryptionKeys,
    kind: NonceKind,
    nonce: Nonce,
    ctl: bool,
    ttl: u8,
    src: u16,
    dst: u16,
    iv_index: u32,
    seq: u32,
    skip: SmallVec<[u8; 8]>,
    segments: std::iter::Enumerate<Segments>,
}

impl NetworkPdus<'_> {
    fn encrypt(&self, seq: u32, lower: &[u8]) -> WireResult<Bytes> {
        let nonce = network_nonce(self.kind, self.nonce, seq, self.iv_index)?;

        let mut plain = BytesMut::with_capacity(2 + lower.len());
        plain.put_u16(self.dst);
        plain.put_slice(lower);

        let tag_len = if self.ctl { 8 } else { 4 };
        let network_pdu = aes_ccm_encrypt(&self.keys.encryption_key, &nonce, &plain, &[], tag_len)?;
        if network_pdu.len() < PRIVACY_SAMPLE {
            return Err(WireError::Incomplete);
        }

        let mut header = [0u8; NETWORK_HEADER_SIZE];
        header[0] = (u8::from(self.ctl) << 7) | (self.ttl & 0x7f);
        header[1..4].copy_from_slice(&seq.to_be_bytes()[1..]);
        header[4..6].copy_from_slice(&self.src.to_be_bytes());

        let mask = privacy_mask(&self.keys.privacy_key, self.iv_index, &network_pdu);

        let mut out = BytesMut::with_capacity(1 + NETWORK_HEADER_SIZE + network_pdu.len());
        out.put_u8((((self.iv_index & 1) as u8) << 7) | (self.keys.nid & 0x7f));
        for (byte, mask) in header.iter().zip(mask.iter()) {
            out.put_u8(byte ^ mask);
        }
        out.put_slice(&network_pdu);

        trace!(seq, len = out.len(), "network pdu");
        Ok(out.freeze())
    }
}

impl Iterator for NetworkPdus<'_> {
    type Item = WireResult<(u32, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, lower) = self
            .segments
            .by_ref()
            .find(|(index, _)| !self.skip.iter().any(|s| usize::from(*s) == *index))?;

        let seq = self.seq;
        self.seq += 1;
        Some(self.encrypt(seq, &lower).map(|pdu| (seq, pdu)))
    }
}

/// Decrypted network PDU before transport decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPdu {
    /// IV index the PDU was decrypted with
    pub iv_index: u32,
    /// Control flag
    pub ctl: bool,
    /// Time to live
    pub ttl: u8,
    /// Network sequence number
    pub seq: u32,
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Received over a proxy connection
    pub proxy: bool,
    /// Lower transport PDU
    pub transport_pdu: Bytes,
}

impl NetworkPdu {
    /// IVI bit and NID from the first byte
    pub fn ivi_nid(data: &[u8]) -> WireResult<(bool, u8)> {
        let first = *data.first().ok_or(WireError::Incomplete)?;
        Ok((first & 0x80 != 0, first & 0x7f))
    }

    /// IV index the sender used, given the local IV index and the IVI bit
    pub fn resolve_iv_index(local_iv_index: u32, ivi: bool) -> WireResult<u32> {
        if (local_iv_index & 1 == 1) == ivi {
            return Ok(local_iv_index);
        }
        local_iv_index
            .checked_sub(1)
            .ok_or_else(|| WireError::Validation("iv index underflow".to_string()))
    }

    /// Deobfuscate the header and decrypt with `net_key`
    pub fn decrypt(
        net_key: &NetworkKey,
        local_iv_index: u32,
        data: &[u8],
        proxy: bool,
    ) -> WireResult<Self> {
        if data.len() < 1 + NETWORK_HEADER_SIZE + PRIVACY_SAMPLE {
            return Err(WireError::Incomplete);
        }

        let keys = net_key.encryption_keys();
        let (ivi, nid) = Self::ivi_nid(data)?;
        if nid != keys.nid {
            return Err(WireError::KeyMismatch("nid"));
        }

        let iv_index = Self::resolve_iv_index(local_iv_index, ivi)?;
        if iv_index != local_iv_index {
            debug!(local_iv_index, iv_index, "using previous iv index");
        }

        let network_pdu = &data[1 + NETWORK_HEADER_SIZE..];
        let mask = privacy_mask(&keys.privacy_key, iv_index, network_pdu);

        let mut header = [0u8; NETWORK_HEADER_SIZE];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = data[1 + i] ^ mask[i];
        }

        let ctl = header[0] & 0x80 != 0;
        let ttl = header[0] & 0x7f;
        let seq = u32::from_be_bytes([0, header[1], header[2], header[3]]);
        let src = u16::from_be_bytes([header[4], header[5]]);

        let context = Nonce::new(src, 0x0000, ttl, ctl);
        let nonce = if proxy {
            context.proxy(seq, iv_index)
        } else {
            context.network(seq, iv_index)
        };

        let tag_len = if ctl { 8 } else { 4 };
        let plain = aes_ccm_decrypt(&keys.encryption_key, &nonce, network_pdu, &[], tag_len)
            .map_err(|err| {
                warn!(src, seq, "network pdu failed authentication");
                WireError::from_ccm(err)
            })?;

        if plain.len() < 2 {
            return Err(WireError::Incomplete);
        }
        let dst = u16::from_be_bytes([plain[0], plain[1]]);
        let transport_pdu = Bytes::copy_from_slice(&plain[2..]);

        Ok(Self {
            iv_index,
            ctl,
            ttl,
            seq,
            src,
            dst,
            proxy,
            transport_pdu,
        })
    }

    /// Decode the transport PDU.
    ///
    /// Access PDUs are checked against the AKF/AID of `key` and fail with
    /// [`WireError::KeyMismatch`] when they were sent with another key.
    pub fn open(&self, key: Option<&dyn AccessKey>) -> WireResult<TransportMessage> {
        if self.proxy {
            return ProxyConfigMessage::decrypt(self.src, self.dst, self.ttl, &self.transport_pdu)
                .map(TransportMessage::ProxyConfig);
        }

        if self.ctl {
            return ControlMessage::decrypt(self.src, self.dst, self.ttl, &self.transport_pdu);
        }

        let key = key.ok_or(WireError::Contract("access message requires a key"))?;
        AccessMessage::decrypt(
            key,
            self.src,
            self.dst,
            self.ttl,
            self.seq,
            self.iv_index,
            &self.transport_pdu,
        )
        .map(TransportMessage::Access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{SegmentAckMessage, SolicitationMessage};
    use mesh_crypto::{ApplicationKey, DeviceKey};
    use smallvec::smallvec;

    const IV_INDEX: u32 = 0x12345678;

    fn net_key() -> NetworkKey {
        NetworkKey::from_hex("7dd7364cd842ad18c17c2b820c84c3d6").unwrap()
    }

    fn app_key() -> ApplicationKey {
        ApplicationKey::from_hex("63964771734fbd76e3b40519d1d94a48").unwrap()
    }

    fn dev_key() -> DeviceKey {
        DeviceKey::from_hex("9d6dd0e96eb25dc19a40ed9914f8f03f").unwrap()
    }

    fn packed(
        message: &NetworkMessage,
        key: Option<&dyn AccessKey>,
        seq: u32,
        iv_index: u32,
        options: &PackOptions,
    ) -> Vec<(u32, String)> {
        let net_key = net_key();
        message
            .pack(key, &net_key, seq, iv_index, options)
            .unwrap()
            .map(|item| item.map(|(seq, pdu)| (seq, hex::encode(pdu))))
            .collect::<WireResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_access_message_pack() {
        let app_key = app_key();
        let message = NetworkMessage::new(AccessMessage::new(
            0x1201,
            0xffff,
            3,
            hex::decode("0400000000").unwrap(),
        ));

        assert_eq!(
            packed(&message, Some(&app_key), 7, IV_INDEX, &PackOptions::default()),
            vec![(7, "6848cba437860e5673728a627fb938535508e21a6baf57".to_string())]
        );
    }

    #[test]
    fn test_access_message_unpack() {
        let app_key = app_key();
        let data = hex::decode("6848cba437860e5673728a627fb938535508e21a6baf57").unwrap();

        let (iv_index, seq, message) =
            NetworkMessage::unpack(Some(&app_key), &net_key(), IV_INDEX, &data, false).unwrap();

        assert_eq!(iv_index, IV_INDEX);
        assert_eq!(seq, 7);
        assert_eq!(
            message,
            NetworkMessage::new(AccessMessage::new(
                0x1201,
                0xffff,
                3,
                hex::decode("0400000000").unwrap()
            ))
        );
    }

    #[test]
    fn test_control_message_pack() {
        let message = NetworkMessage::new(ControlMessage::new(
            0x1201,
            0xfffd,
            0,
            0x03,
            hex::decode("4b50057e400000010000").unwrap(),
        ));

        assert_eq!(
            packed(&message, None, 1, IV_INDEX, &PackOptions::default()),
            vec![(
                1,
                "68eca487516765b5e5bfdacbaf6cb7fb6bff871f035444ce83a670df".to_string()
            )]
        );
    }

    #[test]
    fn test_control_message_unpack() {
        let data = hex::decode("68eca487516765b5e5bfdacbaf6cb7fb6bff871f035444ce83a670df").unwrap();
        let (_, seq, message) =
            NetworkMessage::unpack(None, &net_key(), IV_INDEX, &data, false).unwrap();

        assert_eq!(seq, 1);
        assert_eq!(
            message.message,
            TransportMessage::Control(ControlMessage::new(
                0x1201,
                0xfffd,
                0,
                0x03,
                hex::decode("4b50057e400000010000").unwrap()
            ))
        );
    }

    #[test]
    fn test_segmented_pack_uses_consecutive_sequence() {
        let dev_key = dev_key();
        let message = NetworkMessage::new(AccessMessage::new(
            0x0003,
            0x1201,
            4,
            hex::decode("0056341263964771734fbd76e3b40519d1d94a48").unwrap(),
        ));

        assert_eq!(
            packed(&message, Some(&dev_key), 0x3129ab, IV_INDEX, &PackOptions::default()),
            vec![
                (
                    0x3129ab,
                    "68cab5c5348a230afba8c63d4e686364979deaf4fd40961145939cda0e".to_string()
                ),
                (
                    0x3129ac,
                    "681615b5dd4a846cae0c032bf0746f44f1b8cc8ce5edc57e55beed49c0".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_retransmission_skips_acknowledged_segments() {
        let dev_key = dev_key();
        let message = NetworkMessage::new(AccessMessage::new(
            0x0003,
            0x1201,
            4,
            hex::decode("0056341263964771734fbd76e3b40519d1d94a48").unwrap(),
        ));
        let options = PackOptions {
            transport_seq: Some(0x3129ab),
            skip_segments: smallvec![0],
            ..Default::default()
        };

        assert_eq!(
            packed(&message, Some(&dev_key), 0x3129b0, IV_INDEX, &options),
            vec![(
                0x3129b0,
                "686fcc7ee15357020428a4fe57f61293cb626a5a36f9356e180e73061f".to_string()
            )]
        );
    }

    #[test]
    fn test_segment_ack_pack() {
        let message = NetworkMessage::new(SegmentAckMessage::new(
            0x1201,
            0x0003,
            0x0b,
            0x09ab,
            [0, 1],
            false,
        ));

        assert_eq!(
            packed(&message, None, 0x42, IV_INDEX, &PackOptions::default()),
            vec![(0x42, "68dfe503cd843b8c3eea8c7a7b9f171fe3cdc230db12f09e".to_string())]
        );
    }

    #[test]
    fn test_segment_ack_unpack() {
        let data = hex::decode("68dfe503cd843b8c3eea8c7a7b9f171fe3cdc230db12f09e").unwrap();
        let (_, _, message) =
            NetworkMessage::unpack(None, &net_key(), IV_INDEX, &data, false).unwrap();

        match message.message {
            TransportMessage::SegmentAck(ack) => {
                assert_eq!(ack.seq_zero, 0x09ab);
                assert_eq!(ack.acked_segments().collect::<Vec<_>>(), vec![0, 1]);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_proxy_config_roundtrip() {
        let message =
            NetworkMessage::new(ProxyConfigMessage::new(0x1201, 0x0000, 0, 0x00, vec![0x00]));
        let pdus = packed(&message, None, 1, IV_INDEX, &PackOptions::default());
        assert_eq!(pdus, vec![(1, "68fd29465d2a26ef9a3d8c5c7e90e86e34e401".to_string())]);

        let data = hex::decode(&pdus[0].1).unwrap();
        let (_, _, unpacked) =
            NetworkMessage::unpack(None, &net_key(), IV_INDEX, &data, true).unwrap();
        assert_eq!(unpacked, message);
    }

    #[test]
    fn test_solicitation_pack() {
        let message =
            NetworkMessage::new(SolicitationMessage::new(0x1201, 0xfffb, 0, Bytes::new()));
        assert_eq!(
            packed(&message, None, 0x42, 0, &PackOptions::default()),
            vec![(0x42, "68c536fde15e6692ca41f38137d81f3b30".to_string())]
        );

        let net_key = net_key();
        assert_eq!(
            message
                .pack(None, &net_key, 0x42, 1, &PackOptions::default())
                .err(),
            Some(WireError::Contract("solicitation requires iv index 0"))
        );
    }

    #[test]
    fn test_iv_index_resolution() {
        assert_eq!(NetworkPdu::resolve_iv_index(0x12345678, false).unwrap(), 0x12345678);
        assert_eq!(NetworkPdu::resolve_iv_index(0x12345679, false).unwrap(), 0x12345678);
        assert_eq!(NetworkPdu::resolve_iv_index(0x12345679, true).unwrap(), 0x12345679);
        assert!(NetworkPdu::resolve_iv_index(0, true).is_err());

        let app_key = app_key();
        let data = hex::decode("6848cba437860e5673728a627fb938535508e21a6baf57").unwrap();
        let (iv_index, _, _) =
            NetworkMessage::unpack(Some(&app_key), &net_key(), IV_INDEX + 1, &data, false).unwrap();
        assert_eq!(iv_index, IV_INDEX);
    }

    #[test]
    fn test_unpack_nid_mismatch() {
        let app_key = app_key();
        let other = NetworkKey::from_hex("f7a2a44f8e8a8029064f173ddc1e2b00").unwrap();
        let data = hex::decode("6848cba437860e5673728a627fb938535508e21a6baf57").unwrap();

        assert_eq!(
            NetworkMessage::unpack(Some(&app_key), &other, IV_INDEX, &data, false),
            Err(WireError::KeyMismatch("nid"))
        );
    }

    #[test]
    fn test_unpack_tampered() {
        let app_key = app_key();
        let mut data = hex::decode("6848cba437860e5673728a627fb938535508e21a6baf57").unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;

        assert_eq!(
            NetworkMessage::unpack(Some(&app_key), &net_key(), IV_INDEX, &data, false),
            Err(WireError::Authentication)
        );
    }

    #[test]
    fn test_unpack_wrong_application_key() {
        let other = ApplicationKey::from_hex("3216d1509884b533248541792b877f98").unwrap();
        let data = hex::decode("6848cba437860e5673728a627fb938535508e21a6baf57").unwrap();

        assert_eq!(
            NetworkMessage::unpack(Some(&other), &net_key(), IV_INDEX, &data, false),
            Err(WireError::KeyMismatch("aid"))
        );
    }

    #[test]
    fn test_pack_rejects_ttl() {
        let app_key = app_key();
        let net_key = net_key();
        let message = NetworkMessage::new(AccessMessage::new(0x1201, 0xffff, 0x80, vec![0x04]));
        assert!(matches!(
            message.pack(Some(&app_key), &net_key, 7, IV_INDEX, &PackOptions::default()),
            Err(WireError::Validation(_))
        ));
    }
}
