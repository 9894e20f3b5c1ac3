//! Upper and lower transport PDUs.
//!
//! Each transport message variant knows its opcode prefix and how its upper
//! transport PDU is produced. [`Segments`] turns the upper PDU into lower
//! transport PDUs, either one unsegmented PDU or up to 32 segments.
//!
//! ```text
//! unsegmented: | SEG=0 | prefix:7 | payload (<= 15B)                       |
//! segmented:   | SEG=1 | prefix:7 | SZMIC:1 | SeqZero:13 | SegO:5 | SegN:5 | chunk (<= 12B) |
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use mesh_crypto::{aes_ccm_decrypt, aes_ccm_encrypt, AccessKey, Nonce};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{WireError, WireResult};

/// Largest upper transport PDU sent unsegmented
pub const MAX_TRANSPORT_PDU: usize = 15;

/// Payload bytes carried by one segment
pub const SEGMENT_SIZE: usize = 12;

/// Maximum number of segments in one message (SegN is 5 bits)
pub const MAX_SEGMENTS: usize = 32;

/// Control opcode of the Segment Acknowledgment message
pub const SEGMENT_ACK_OPCODE: u8 = 0x00;

/// Upper bound for the long MIC upgrade
const LONG_MIC_LIMIT: usize = 376;

/// Segmentation fields following the first byte of a segmented PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentHeader {
    /// Size of the transport MIC, true for 64 bits
    pub szmic: bool,
    /// Low 13 bits of the first sequence number of the message
    pub seq_zero: u16,
    /// Segment offset
    pub seg_o: u8,
    /// Last segment number
    pub seg_n: u8,
}

impl SegmentHeader {
    /// Pack into the 24-bit wire value
    pub fn pack(self) -> u32 {
        (u32::from(self.szmic) << 23)
            | ((u32::from(self.seq_zero) & 0x1fff) << 10)
            | ((u32::from(self.seg_o) & 0x1f) << 5)
            | (u32::from(self.seg_n) & 0x1f)
    }

    /// Unpack from the 24-bit wire value
    pub fn unpack(value: u32) -> Self {
        Self {
            szmic: (value >> 23) & 0x01 != 0,
            seq_zero: ((value >> 10) & 0x1fff) as u16,
            seg_o: ((value >> 5) & 0x1f) as u8,
            seg_n: (value & 0x1f) as u8,
        }
    }
}

/// Parsed lower transport PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerTransportPdu {
    /// 7-bit opcode prefix (AKF|AID or control opcode)
    pub prefix: u8,
    /// Segmentation fields when SEG is set
    pub segment: Option<SegmentHeader>,
    /// Segment or unsegmented payload
    pub data: Bytes,
}

impl LowerTransportPdu {
    /// Decode a lower transport PDU
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        if buf.is_empty() {
            return Err(WireError::Incomplete);
        }

        let first = buf.get_u8();
        let prefix = first & 0x7f;

        let segment = if first & 0x80 != 0 {
            if buf.len() < 3 {
                return Err(WireError::Incomplete);
            }
            let raw = (u32::from(buf.get_u16()) << 8) | u32::from(buf.get_u8());
            Some(SegmentHeader::unpack(raw))
        } else {
            None
        };

        Ok(Self {
            prefix,
            segment,
            data: buf.split_to(buf.len()),
        })
    }
}

/// Lazy sequence of lower transport PDUs
#[derive(Debug, Clone)]
pub struct Segments {
    prefix: Option<u8>,
    upper: Bytes,
    header: Option<SegmentHeader>,
    index: usize,
    count: usize,
}

impl Segments {
    fn new(
        prefix: Option<u8>,
        upper: Bytes,
        seq: u32,
        szmic: bool,
        force_segmented: bool,
    ) -> WireResult<Self> {
        let prefix = match prefix {
            Some(prefix) => prefix,
            None => {
                return Ok(Self {
                    prefix: None,
                    upper,
                    header: None,
                    index: 0,
                    count: 1,
                })
            }
        };

        if upper.len() <= MAX_TRANSPORT_PDU && !force_segmented {
            return Ok(Self {
                prefix: Some(prefix),
                upper,
                header: None,
                index: 0,
                count: 1,
            });
        }

        let count = upper.len().div_ceil(SEGMENT_SIZE).max(1);
        if count > MAX_SEGMENTS {
            return Err(WireError::Validation(format!(
                "upper transport pdu of {} bytes needs {} segments",
                upper.len(),
                count
            )));
        }

        debug!(len = upper.len(), count, "segmenting upper transport pdu");

        Ok(Self {
            prefix: Some(prefix),
            upper,
            header: Some(SegmentHeader {
                szmic,
                seq_zero: (seq & 0x1fff) as u16,
                seg_o: 0,
                seg_n: (count - 1) as u8,
            }),
            index: 0,
            count,
        })
    }

    /// Whether the PDUs carry segmentation headers
    pub fn is_segmented(&self) -> bool {
        self.header.is_some()
    }
}

impl Iterator for Segments {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let Some(prefix) = self.prefix else {
            return Some(self.upper.clone());
        };

        let Some(header) = self.header else {
            let mut buf = BytesMut::with_capacity(1 + self.upper.len());
            buf.put_u8(prefix & 0x7f);
            buf.put_slice(&self.upper);
            return Some(buf.freeze());
        };

        let start = index * SEGMENT_SIZE;
        let end = (start + SEGMENT_SIZE).min(self.upper.len());
        let chunk = self.upper.slice(start.min(end)..end);

        let header = SegmentHeader {
            seg_o: index as u8,
            ..header
        }
        .pack();

        let mut buf = BytesMut::with_capacity(4 + chunk.len());
        buf.put_u8(0x80 | (prefix & 0x7f));
        buf.put_u16((header >> 8) as u16);
        buf.put_u8(header as u8);
        buf.put_slice(&chunk);

        trace!(seg_o = index, len = chunk.len(), "lower transport segment");
        Some(buf.freeze())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Segments {}

fn unsegmented(pdu: &[u8], what: &'static str) -> WireResult<LowerTransportPdu> {
    let lower = LowerTransportPdu::decode(&mut Bytes::copy_from_slice(pdu))?;
    if lower.segment.is_some() {
        return Err(WireError::Unsupported(what));
    }
    Ok(lower)
}

/// Access message carrying an encrypted access payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMessage {
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Time to live
    pub ttl: u8,
    /// Access layer payload (opcode and parameters)
    pub payload: Bytes,
}

impl AccessMessage {
    /// Create an access message
    pub fn new(src: u16, dst: u16, ttl: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            src,
            dst,
            ttl,
            payload: payload.into(),
        }
    }

    /// Nonce context for this message
    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.src, self.dst, self.ttl, false)
    }

    /// AKF and AID opcode prefix for `key`
    pub fn prefix(key: &dyn AccessKey) -> u8 {
        (u8::from(key.is_application_key()) << 6) | (key.aid() & 0x3f)
    }

    /// Whether a long MIC is used for this payload
    pub fn use_long_mic(&self, szmic: bool) -> bool {
        let len = self.payload.len();
        if (SEGMENT_SIZE..LONG_MIC_LIMIT).contains(&len) {
            let short = (len + 4).div_ceil(SEGMENT_SIZE);
            let long = (len + 8).div_ceil(SEGMENT_SIZE);
            szmic || short == long
        } else {
            szmic
        }
    }

    /// Encrypt the payload into an upper transport PDU, returning the MIC size used
    pub fn upper_transport_pdu(
        &self,
        key: &dyn AccessKey,
        seq: u32,
        iv_index: u32,
        szmic: bool,
    ) -> WireResult<(Bytes, bool)> {
        let szmic = self.use_long_mic(szmic);
        let nonce = if key.is_application_key() {
            self.nonce().application(seq, iv_index, szmic)
        } else {
            self.nonce().device(seq, iv_index, szmic)
        };

        let tag_len = if szmic { 8 } else { 4 };
        let sealed = aes_ccm_encrypt(key.secret(), &nonce, &self.payload, &[], tag_len)?;
        Ok((Bytes::from(sealed), szmic))
    }

    /// Lower transport PDUs for this message
    pub fn segments(
        &self,
        key: &dyn AccessKey,
        seq: u32,
        iv_index: u32,
        szmic: bool,
        force_segmented: bool,
    ) -> WireResult<Segments> {
        let (upper, szmic) = self.upper_transport_pdu(key, seq, iv_index, szmic)?;
        Segments::new(Some(Self::prefix(key)), upper, seq, szmic, force_segmented)
    }

    /// Decrypt an unsegmented lower transport PDU
    pub fn decrypt(
        key: &dyn AccessKey,
        src: u16,
        dst: u16,
        ttl: u8,
        seq: u32,
        iv_index: u32,
        pdu: &[u8],
    ) -> WireResult<Self> {
        let lower = unsegmented(pdu, "segmented access message")?;

        let akf = lower.prefix & 0x40 != 0;
        let aid = lower.prefix & 0x3f;
        if akf != key.is_application_key() {
            return Err(WireError::KeyMismatch("akf"));
        }
        if aid != key.aid() {
            return Err(WireError::KeyMismatch("aid"));
        }

        let nonce = Nonce::new(src, dst, ttl, false);
        let nonce = if akf {
            nonce.application(seq, iv_index, false)
        } else {
            nonce.device(seq, iv_index, false)
        };

        let payload = aes_ccm_decrypt(key.secret(), &nonce, &lower.data, &[], 4)
            .map_err(WireError::from_ccm)?;

        Ok(Self::new(src, dst, ttl, payload))
    }
}

/// Transport control message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Time to live
    pub ttl: u8,
    /// 7-bit control opcode
    pub opcode: u8,
    /// Control parameters
    pub payload: Bytes,
}

impl ControlMessage {
    /// Create a control message
    pub fn new(src: u16, dst: u16, ttl: u8, opcode: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            src,
            dst,
            ttl,
            opcode,
            payload: payload.into(),
        }
    }

    /// Nonce context for this message
    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.src, self.dst, self.ttl, true)
    }

    /// Lower transport PDUs for this message
    pub fn segments(&self, seq: u32, szmic: bool, force_segmented: bool) -> WireResult<Segments> {
        if szmic {
            return Err(WireError::Unsupported("szmic on control message"));
        }
        if self.opcode > 0x7f {
            return Err(WireError::Validation(format!(
                "control opcode {:#04x} exceeds 7 bits",
                self.opcode
            )));
        }
        Segments::new(
            Some(self.opcode),
            self.payload.clone(),
            seq,
            false,
            force_segmented,
        )
    }

    /// Decode an unsegmented lower transport control PDU.
    ///
    /// Segment acknowledgments come back as [`TransportMessage::SegmentAck`].
    pub fn decrypt(src: u16, dst: u16, ttl: u8, pdu: &[u8]) -> WireResult<TransportMessage> {
        let lower = unsegmented(pdu, "segmented control message")?;

        if lower.prefix == SEGMENT_ACK_OPCODE {
            let ack = SegmentAckMessage::decode(src, dst, ttl, &lower.data)?;
            return Ok(TransportMessage::SegmentAck(ack));
        }

        Ok(TransportMessage::Control(Self::new(
            src,
            dst,
            ttl,
            lower.prefix,
            lower.data,
        )))
    }
}

/// Proxy configuration message, never segmented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfigMessage {
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Time to live
    pub ttl: u8,
    /// 7-bit proxy configuration opcode
    pub opcode: u8,
    /// Parameters
    pub payload: Bytes,
}

impl ProxyConfigMessage {
    /// Create a proxy configuration message
    pub fn new(src: u16, dst: u16, ttl: u8, opcode: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            src,
            dst,
            ttl,
            opcode,
            payload: payload.into(),
        }
    }

    /// Nonce context for this message
    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.src, self.dst, self.ttl, true)
    }

    /// The single lower transport PDU for this message.
    ///
    /// The destination must be the unassigned address.
    pub fn segments(&self, seq: u32, force_segmented: bool) -> WireResult<Segments> {
        if force_segmented || self.payload.len() > MAX_TRANSPORT_PDU {
            return Err(WireError::Unsupported("segmented proxy configuration message"));
        }
        if self.dst != 0x0000 {
            return Err(WireError::Validation(format!(
                "proxy configuration destination {:#06x} is not unassigned",
                self.dst
            )));
        }
        Segments::new(Some(self.opcode & 0x7f), self.payload.clone(), seq, false, false)
    }

    /// Decode an unsegmented proxy configuration PDU
    pub fn decrypt(src: u16, dst: u16, ttl: u8, pdu: &[u8]) -> WireResult<Self> {
        let lower = unsegmented(pdu, "segmented proxy configuration message")?;
        Ok(Self::new(src, dst, ttl, lower.prefix, lower.data))
    }
}

/// Solicitation PDU, carried without any transport header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitationMessage {
    /// Source address
    pub src: u16,
    /// Solicitation destination address
    pub dst: u16,
    /// Time to live
    pub ttl: u8,
    /// Transport payload, usually empty
    pub payload: Bytes,
}

impl SolicitationMessage {
    /// Create a solicitation message
    pub fn new(src: u16, dst: u16, ttl: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            src,
            dst,
            ttl,
            payload: payload.into(),
        }
    }

    /// Nonce context for this message
    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.src, self.dst, self.ttl, true)
    }

    /// The single PDU for this message
    pub fn segments(&self, seq: u32, force_segmented: bool) -> WireResult<Segments> {
        if force_segmented {
            return Err(WireError::Unsupported("segmented solicitation"));
        }
        Segments::new(None, self.payload.clone(), seq, false, false)
    }
}

/// Segment Acknowledgment control message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAckMessage {
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Time to live
    pub ttl: u8,
    /// SeqZero of the acknowledged message
    pub seq_zero: u16,
    /// Acknowledgment sent by a friend on behalf of a low power node
    pub obo: bool,
    /// Bit `i` set when segment `i` was received
    pub block_ack: u32,
}

impl SegmentAckMessage {
    /// Create an acknowledgment for the given segment offsets
    pub fn new(
        src: u16,
        dst: u16,
        ttl: u8,
        seq_zero: u16,
        acked: impl IntoIterator<Item = u8>,
        obo: bool,
    ) -> Self {
        let block_ack = acked
            .into_iter()
            .filter(|seg| usize::from(*seg) < MAX_SEGMENTS)
            .fold(0u32, |acc, seg| acc | (1 << seg));

        Self {
            src,
            dst,
            ttl,
            seq_zero: seq_zero & 0x1fff,
            obo,
            block_ack,
        }
    }

    /// Segment offsets marked as received
    pub fn acked_segments(&self) -> impl Iterator<Item = u8> + '_ {
        (0..MAX_SEGMENTS as u8).filter(move |seg| self.block_ack & (1 << seg) != 0)
    }

    /// Control parameters: `[OBO:1][SeqZero:13][RFU:2][BlockAck:32]`
    pub fn payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(6);
        buf.put_u16((u16::from(self.obo) << 15) | ((self.seq_zero & 0x1fff) << 2));
        buf.put_u32(self.block_ack);
        buf.freeze()
    }

    /// Decode the control parameters
    pub fn decode(src: u16, dst: u16, ttl: u8, payload: &[u8]) -> WireResult<Self> {
        if payload.len() != 6 {
            return Err(WireError::Length {
                expected: 6,
                actual: payload.len(),
            });
        }

        let mut buf = payload;
        let head = buf.get_u16();
        let block_ack = buf.get_u32();

        Ok(Self {
            src,
            dst,
            ttl,
            seq_zero: (head >> 2) & 0x1fff,
            obo: head & 0x8000 != 0,
            block_ack,
        })
    }

    /// Equivalent generic control message
    pub fn as_control(&self) -> ControlMessage {
        ControlMessage::new(
            self.src,
            self.dst,
            self.ttl,
            SEGMENT_ACK_OPCODE,
            self.payload(),
        )
    }
}

/// Any transport layer message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportMessage {
    /// Access message
    Access(AccessMessage),
    /// Control message
    Control(ControlMessage),
    /// Proxy configuration message
    ProxyConfig(ProxyConfigMessage),
    /// Solicitation PDU
    Solicitation(SolicitationMessage),
    /// Segment acknowledgment
    SegmentAck(SegmentAckMessage),
}

impl TransportMessage {
    /// Source address
    pub fn src(&self) -> u16 {
        match self {
            Self::Access(m) => m.src,
            Self::Control(m) => m.src,
            Self::ProxyConfig(m) => m.src,
            Self::Solicitation(m) => m.src,
            Self::SegmentAck(m) => m.src,
        }
    }

    /// Destination address
    pub fn dst(&self) -> u16 {
        match self {
            Self::Access(m) => m.dst,
            Self::Control(m) => m.dst,
            Self::ProxyConfig(m) => m.dst,
            Self::Solicitation(m) => m.dst,
            Self::SegmentAck(m) => m.dst,
        }
    }

    /// Time to live
    pub fn ttl(&self) -> u8 {
        match self {
            Self::Access(m) => m.ttl,
            Self::Control(m) => m.ttl,
            Self::ProxyConfig(m) => m.ttl,
            Self::Solicitation(m) => m.ttl,
            Self::SegmentAck(m) => m.ttl,
        }
    }

    /// Control flag, false only for access messages
    pub fn ctl(&self) -> bool {
        !matches!(self, Self::Access(_))
    }

    /// Nonce context for this message
    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.src(), self.dst(), self.ttl(), self.ctl())
    }

    /// Lower transport PDUs for this message.
    ///
    /// Access messages require an application or device key.
    pub fn segments(
        &self,
        key: Option<&dyn AccessKey>,
        seq: u32,
        iv_index: u32,
        szmic: bool,
        force_segmented: bool,
    ) -> WireResult<Segments> {
        match self {
            Self::Access(m) => {
                let key = key.ok_or(WireError::Contract("access message requires a key"))?;
                m.segments(key, seq, iv_index, szmic, force_segmented)
            }
            Self::Control(m) => m.segments(seq, szmic, force_segmented),
            Self::ProxyConfig(m) => m.segments(seq, force_segmented),
            Self::Solicitation(m) => m.segments(seq, force_segmented),
            Self::SegmentAck(m) => m.as_control().segments(seq, szmic, force_segmented),
        }
    }
}

impl From<AccessMessage> for TransportMessage {
    fn from(message: AccessMessage) -> Self {
        Self::Access(message)
    }
}

impl From<ControlMessage> for TransportMessage {
    fn from(message: ControlMessage) -> Self {
        Self::Control(message)
    }
}

impl From<ProxyConfigMessage> for TransportMessage {
    fn from(message: ProxyConfigMessage) -> Self {
        Self::ProxyConfig(message)
    }
}

impl From<SolicitationMessage> for TransportMessage {
    fn from(message: SolicitationMessage) -> Self {
        Self::Solicitation(message)
    }
}

impl From<SegmentAckMessage> for TransportMessage {
    fn from(message: SegmentAckMessage) -> Self {
        Self::SegmentAck(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_crypto::{ApplicationKey, DeviceKey};

    const IV_INDEX: u32 = 0x12345678;

    fn app_key() -> ApplicationKey {
        ApplicationKey::from_hex("63964771734fbd76e3b40519d1d94a48").unwrap()
    }

    fn dev_key() -> DeviceKey {
        DeviceKey::from_hex("9d6dd0e96eb25dc19a40ed9914f8f03f").unwrap()
    }

    fn hex_list(segments: Segments) -> Vec<String> {
        segments.map(hex::encode).collect()
    }

    #[test]
    fn test_segment_header_pack_unpack() {
        let header = SegmentHeader {
            szmic: true,
            seq_zero: 0x1fff,
            seg_o: 3,
            seg_n: 31,
        };
        assert_eq!(SegmentHeader::unpack(header.pack()), header);
    }

    #[test]
    fn test_device_key_segments() {
        let message = AccessMessage::new(
            0x0003,
            0x1201,
            4,
            hex::decode("0056341263964771734fbd76e3b40519d1d94a48").unwrap(),
        );

        let segments = message
            .segments(&dev_key(), 0x3129ab, IV_INDEX, false, false)
            .unwrap();
        assert!(segments.is_segmented());
        assert_eq!(segments.len(), 2);
        assert_eq!(
            hex_list(segments),
            vec![
                "8026ac01ee9dddfd2169326d23f3afdf",
                "8026ac21cfdc18c52fdef772e0e17308"
            ]
        );
    }

    #[test]
    fn test_segmentation_threshold() {
        // 11 byte payload plus 4 byte MIC fits in one PDU
        let message = AccessMessage::new(0x1201, 0xc000, 4, vec![0u8; 11]);
        let segments = message.segments(&app_key(), 0x10, IV_INDEX, false, false).unwrap();
        assert!(!segments.is_segmented());
        assert_eq!(segments.len(), 1);

        // 12 bytes need segmentation
        let message = AccessMessage::new(0x1201, 0xc000, 4, vec![0u8; 12]);
        let segments = message.segments(&app_key(), 0x10, IV_INDEX, false, false).unwrap();
        assert!(segments.is_segmented());
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_control_threshold() {
        let fifteen = ControlMessage::new(0x1201, 0xfffd, 0, 0x0a, vec![0u8; 15]);
        assert_eq!(fifteen.segments(1, false, false).unwrap().len(), 1);

        let sixteen = ControlMessage::new(0x1201, 0xfffd, 0, 0x0a, vec![0u8; 16]);
        let segments: Vec<Bytes> = sixteen.segments(1, false, false).unwrap().collect();
        assert_eq!(segments.len(), 2);
        let mut last = segments[1].clone();
        let lower = LowerTransportPdu::decode(&mut last).unwrap();
        assert_eq!(lower.segment.unwrap().seg_n, 1);
        assert_eq!(lower.segment.unwrap().seg_o, 1);
        assert_eq!(lower.data.len(), 4);
    }

    #[test]
    fn test_long_mic_upgrade() {
        let app_key = app_key();
        for (len, expected) in [(11, false), (12, true), (16, true), (20, false), (30, false)] {
            let message = AccessMessage::new(0x1201, 0xc000, 4, vec![0u8; len]);
            assert_eq!(message.use_long_mic(false), expected, "length {len}");
            let (upper, szmic) = message
                .upper_transport_pdu(&app_key, 0x10, IV_INDEX, false)
                .unwrap();
            assert_eq!(szmic, expected);
            assert_eq!(upper.len(), len + if expected { 8 } else { 4 });
        }

        let message = AccessMessage::new(0x1201, 0xc000, 4, vec![0u8; 376]);
        assert!(!message.use_long_mic(false));
        assert!(message.use_long_mic(true));
    }

    #[test]
    fn test_long_mic_sets_szmic_bit() {
        let message = AccessMessage::new(0x1201, 0xc000, 4, (0u8..16).collect::<Vec<_>>());
        let segments = message.segments(&app_key(), 0x10, IV_INDEX, false, false).unwrap();
        let segments = hex_list(segments);
        assert_eq!(
            segments,
            vec![
                "e68040015b141b856a3f37c96f83aa0e",
                "e6804021979692ce4c1e4b4760b03eb9"
            ]
        );
    }

    #[test]
    fn test_too_many_segments() {
        let message = ControlMessage::new(0x1201, 0xfffd, 0, 0x0a, vec![0u8; 32 * 12 + 1]);
        assert!(matches!(
            message.segments(0, false, false),
            Err(WireError::Validation(_))
        ));
    }

    #[test]
    fn test_control_rejects_szmic() {
        let message = ControlMessage::new(0x1201, 0xfffd, 0, 0x0a, vec![0u8; 4]);
        assert_eq!(
            message.segments(1, true, false).unwrap_err(),
            WireError::Unsupported("szmic on control message")
        );
    }

    #[test]
    fn test_proxy_config_rejects_segmentation() {
        let message = ProxyConfigMessage::new(0x1201, 0x0000, 0, 0x00, vec![0x00]);
        assert!(message.segments(1, true).is_err());

        let long = ProxyConfigMessage::new(0x1201, 0x0000, 0, 0x01, vec![0u8; 16]);
        assert!(matches!(
            long.segments(1, false),
            Err(WireError::Unsupported(_))
        ));
    }

    #[test]
    fn test_solicitation_has_no_header() {
        let message = SolicitationMessage::new(0x1201, 0xfffb, 0, Bytes::new());
        let segments: Vec<Bytes> = message.segments(0x42, false).unwrap().collect();
        assert_eq!(segments, vec![Bytes::new()]);
    }

    #[test]
    fn test_access_decrypt_roundtrip() {
        let key = app_key();
        let message = AccessMessage::new(0x1201, 0xffff, 3, hex::decode("0400000000").unwrap());
        let pdu = message
            .segments(&key, 7, IV_INDEX, false, false)
            .unwrap()
            .next()
            .unwrap();

        let decoded = AccessMessage::decrypt(&key, 0x1201, 0xffff, 3, 7, IV_INDEX, &pdu).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_access_decrypt_key_mismatch() {
        let message = AccessMessage::new(0x1201, 0xffff, 3, vec![0x04, 0x00]);
        let pdu = message
            .segments(&app_key(), 7, IV_INDEX, false, false)
            .unwrap()
            .next()
            .unwrap();

        assert_eq!(
            AccessMessage::decrypt(&dev_key(), 0x1201, 0xffff, 3, 7, IV_INDEX, &pdu),
            Err(WireError::KeyMismatch("akf"))
        );

        let other = ApplicationKey::from_hex("3216d1509884b533248541792b877f98").unwrap();
        assert_eq!(
            AccessMessage::decrypt(&other, 0x1201, 0xffff, 3, 7, IV_INDEX, &pdu),
            Err(WireError::KeyMismatch("aid"))
        );
    }

    #[test]
    fn test_access_decrypt_tampered() {
        let key = app_key();
        let message = AccessMessage::new(0x1201, 0xffff, 3, vec![0x04, 0x00]);
        let pdu = message
            .segments(&key, 7, IV_INDEX, false, false)
            .unwrap()
            .next()
            .unwrap();
        let mut tampered = pdu.to_vec();
        tampered[2] ^= 0x01;

        assert_eq!(
            AccessMessage::decrypt(&key, 0x1201, 0xffff, 3, 7, IV_INDEX, &tampered),
            Err(WireError::Authentication)
        );
    }

    #[test]
    fn test_segmented_decrypt_unsupported() {
        let pdu = hex::decode("8026ac01ee9dddfd2169326d23f3afdf").unwrap();
        assert_eq!(
            AccessMessage::decrypt(&dev_key(), 0x0003, 0x1201, 4, 0x3129ab, IV_INDEX, &pdu),
            Err(WireError::Unsupported("segmented access message"))
        );
        assert_eq!(
            ControlMessage::decrypt(0x0003, 0x1201, 4, &pdu),
            Err(WireError::Unsupported("segmented control message"))
        );
    }

    #[test]
    fn test_segment_ack_payload() {
        let ack = SegmentAckMessage::new(0x1201, 0x0003, 0x0b, 0x09ab, [0, 1], false);
        assert_eq!(hex::encode(ack.payload()), "26ac00000003");
        assert_eq!(ack.acked_segments().collect::<Vec<_>>(), vec![0, 1]);

        let obo = SegmentAckMessage::new(0x1201, 0x0003, 0x0b, 0x0001, [31], true);
        assert_eq!(hex::encode(obo.payload()), "800480000000");
    }

    #[test]
    fn test_control_decrypt_dispatches_segment_ack() {
        let ack = SegmentAckMessage::new(0x1201, 0x0003, 0x0b, 0x09ab, [0, 1], false);
        let pdu = ack
            .as_control()
            .segments(0x42, false, false)
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(hex::encode(&pdu), "0026ac00000003");

        let decoded = ControlMessage::decrypt(0x1201, 0x0003, 0x0b, &pdu).unwrap();
        assert_eq!(decoded, TransportMessage::SegmentAck(ack));
    }

    #[test]
    fn test_transport_message_ctl() {
        let access: TransportMessage = AccessMessage::new(1, 2, 3, Bytes::new()).into();
        let control: TransportMessage = ControlMessage::new(1, 2, 3, 0x0a, Bytes::new()).into();
        assert!(!access.ctl());
        assert!(control.ctl());
        assert!(matches!(
            access.segments(None, 0, 0, false, false),
            Err(WireError::Contract(_))
        ));
    }
}
