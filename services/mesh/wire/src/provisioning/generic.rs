//! Generic provisioning layer.
//!
//! A provisioning PDU travels as one Transaction Start segment followed by
//! zero or more Continuation segments. Bearer control PDUs manage the link
//! and are never segmented.
//!
//! ```text
//! Start:        [SegN:6][00] [total_length:16] [FCS:8] [data <= 20]
//! Ack:          [000000][01]
//! Continuation: [index:6][10] [data <= 23]
//! Control:      [opcode:6][11] [parameters]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc::{Algorithm, Crc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::pdu::ProvisioningPdu;
use crate::error::{WireError, WireResult};

/// Payload bytes carried by a Transaction Start segment
pub const START_SEGMENT_SIZE: usize = 20;

/// Payload bytes carried by a Transaction Continuation segment
pub const CONTINUATION_SEGMENT_SIZE: usize = 23;

/// Largest segment number representable in 6 bits
pub const MAX_SEGMENT_NUMBER: u8 = 0x3f;

/// Provisioning frame check sequence: CRC-8, polynomial 0x07, reflected
pub const CRC_8_MESH_FCS: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x07,
    init: 0xff,
    refin: true,
    refout: true,
    xorout: 0xff,
    check: 0x2f,
    residue: 0xcf,
};

/// Shared frame check calculator
pub const MESH_FCS: Crc<u8> = Crc::<u8>::new(&CRC_8_MESH_FCS);

/// Compute the frame check sequence of a provisioning PDU
pub fn fcs(data: &[u8]) -> u8 {
    MESH_FCS.checksum(data)
}

/// Generic provisioning control format
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenericProvisioningPduType {
    /// Transaction Start
    Start = 0x00,
    /// Transaction Acknowledgment
    Ack = 0x01,
    /// Transaction Continuation
    Continuation = 0x02,
    /// Provisioning Bearer Control
    Control = 0x03,
}

impl From<u8> for GenericProvisioningPduType {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0x00 => GenericProvisioningPduType::Start,
            0x01 => GenericProvisioningPduType::Ack,
            0x02 => GenericProvisioningPduType::Continuation,
            _ => GenericProvisioningPduType::Control,
        }
    }
}

/// Bearer control opcode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BearerOpcode {
    /// Open a link to a device
    LinkOpen = 0x00,
    /// Acknowledge a link open
    LinkAck = 0x01,
    /// Close a link
    LinkClose = 0x02,
}

impl TryFrom<u8> for BearerOpcode {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(BearerOpcode::LinkOpen),
            0x01 => Ok(BearerOpcode::LinkAck),
            0x02 => Ok(BearerOpcode::LinkClose),
            _ => Err(WireError::Type(value)),
        }
    }
}

/// Reason carried by Link Close
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkCloseReason {
    /// Provisioning completed
    Success = 0x00,
    /// Provisioning transaction timed out
    Timeout = 0x01,
    /// Provisioning failed
    Fail = 0x02,
}

impl TryFrom<u8> for LinkCloseReason {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(LinkCloseReason::Success),
            0x01 => Ok(LinkCloseReason::Timeout),
            0x02 => Ok(LinkCloseReason::Fail),
            _ => Err(WireError::Validation(format!(
                "invalid link close reason {value:#04x}"
            ))),
        }
    }
}

/// Provisioning bearer control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "opcode", rename_all = "snake_case")]
pub enum BearerControl {
    /// Link Open
    LinkOpen {
        /// Device being provisioned
        device_uuid: Uuid,
    },
    /// Link Ack
    LinkAck,
    /// Link Close
    LinkClose {
        /// Why the link was closed
        reason: LinkCloseReason,
    },
}

impl BearerControl {
    /// Bearer opcode of this message
    pub fn opcode(&self) -> BearerOpcode {
        match self {
            BearerControl::LinkOpen { .. } => BearerOpcode::LinkOpen,
            BearerControl::LinkAck => BearerOpcode::LinkAck,
            BearerControl::LinkClose { .. } => BearerOpcode::LinkClose,
        }
    }
}

/// Generic provisioning PDU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gpcf", rename_all = "snake_case")]
pub enum GenericProvisioningPdu {
    /// First segment of a transaction
    TransactionStart {
        /// Index of the last segment
        last_segment_number: u8,
        /// Length of the reassembled provisioning PDU
        total_length: u16,
        /// CRC-8 of the reassembled provisioning PDU
        frame_check: u8,
        /// Segment payload
        data: Bytes,
    },
    /// Transaction acknowledgment
    TransactionAck,
    /// Subsequent segment of a transaction
    TransactionContinuation {
        /// Index of this segment
        segment_index: u8,
        /// Segment payload
        data: Bytes,
    },
    /// Link management
    BearerControl(BearerControl),
}

impl GenericProvisioningPdu {
    /// Generic provisioning control format of this PDU
    pub fn gpcf(&self) -> GenericProvisioningPduType {
        match self {
            GenericProvisioningPdu::TransactionStart { .. } => GenericProvisioningPduType::Start,
            GenericProvisioningPdu::TransactionAck => GenericProvisioningPduType::Ack,
            GenericProvisioningPdu::TransactionContinuation { .. } => {
                GenericProvisioningPduType::Continuation
            }
            GenericProvisioningPdu::BearerControl(_) => GenericProvisioningPduType::Control,
        }
    }

    /// Encode into a buffer
    pub fn encode(&self, buf: &mut BytesMut) {
        let gpcf = self.gpcf() as u8;
        match self {
            GenericProvisioningPdu::TransactionStart {
                last_segment_number,
                total_length,
                frame_check,
                data,
            } => {
                buf.put_u8(((last_segment_number & MAX_SEGMENT_NUMBER) << 2) | gpcf);
                buf.put_u16(*total_length);
                buf.put_u8(*frame_check);
                buf.put_slice(data);
            }
            GenericProvisioningPdu::TransactionAck => buf.put_u8(gpcf),
            GenericProvisioningPdu::TransactionContinuation {
                segment_index,
                data,
            } => {
                buf.put_u8(((segment_index & MAX_SEGMENT_NUMBER) << 2) | gpcf);
                buf.put_slice(data);
            }
            GenericProvisioningPdu::BearerControl(control) => {
                buf.put_u8(((control.opcode() as u8) << 2) | gpcf);
                match control {
                    BearerControl::LinkOpen { device_uuid } => {
                        buf.put_slice(device_uuid.as_bytes())
                    }
                    BearerControl::LinkAck => {}
                    BearerControl::LinkClose { reason } => buf.put_u8(*reason as u8),
                }
            }
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a single generic provisioning PDU
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        if buf.is_empty() {
            return Err(WireError::Incomplete);
        }

        let first = buf.get_u8();
        let upper = first >> 2;

        match GenericProvisioningPduType::from(first) {
            GenericProvisioningPduType::Start => {
                if buf.len() < 3 {
                    return Err(WireError::Incomplete);
                }
                let total_length = buf.get_u16();
                let frame_check = buf.get_u8();
                let data = buf.split_to(buf.len());
                if data.len() > START_SEGMENT_SIZE {
                    return Err(WireError::Validation(format!(
                        "start segment carries {} bytes",
                        data.len()
                    )));
                }
                Ok(GenericProvisioningPdu::TransactionStart {
                    last_segment_number: upper,
                    total_length,
                    frame_check,
                    data,
                })
            }
            GenericProvisioningPduType::Ack => {
                if upper != 0 || !buf.is_empty() {
                    return Err(WireError::Validation(
                        "transaction ack carries data".to_string(),
                    ));
                }
                Ok(GenericProvisioningPdu::TransactionAck)
            }
            GenericProvisioningPduType::Continuation => {
                let data = buf.split_to(buf.len());
                if data.is_empty() || data.len() > CONTINUATION_SEGMENT_SIZE {
                    return Err(WireError::Validation(format!(
                        "continuation segment carries {} bytes",
                        data.len()
                    )));
                }
                Ok(GenericProvisioningPdu::TransactionContinuation {
                    segment_index: upper,
                    data,
                })
            }
            GenericProvisioningPduType::Control => {
                let control = match BearerOpcode::try_from(upper)? {
                    BearerOpcode::LinkOpen => {
                        if buf.len() != 16 {
                            return Err(WireError::Length {
                                expected: 16,
                                actual: buf.len(),
                            });
                        }
                        let mut uuid = [0u8; 16];
                        buf.copy_to_slice(&mut uuid);
                        BearerControl::LinkOpen {
                            device_uuid: Uuid::from_bytes(uuid),
                        }
                    }
                    BearerOpcode::LinkAck => {
                        if !buf.is_empty() {
                            return Err(WireError::Length {
                                expected: 0,
                                actual: buf.len(),
                            });
                        }
                        BearerControl::LinkAck
                    }
                    BearerOpcode::LinkClose => {
                        if buf.len() != 1 {
                            return Err(WireError::Length {
                                expected: 1,
                                actual: buf.len(),
                            });
                        }
                        BearerControl::LinkClose {
                            reason: LinkCloseReason::try_from(buf.get_u8())?,
                        }
                    }
                };
                Ok(GenericProvisioningPdu::BearerControl(control))
            }
        }
    }
}

/// Segmentation and reassembly of provisioning PDUs
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisioningTransaction;

impl ProvisioningTransaction {
    /// Split a provisioning PDU into a Transaction Start and its continuations
    pub fn pack(pdu: &ProvisioningPdu) -> WireResult<Vec<GenericProvisioningPdu>> {
        let payload = pdu.to_bytes();
        let total_length = payload.len();

        let continuation_bytes = total_length.saturating_sub(START_SEGMENT_SIZE);
        let last_segment_number = continuation_bytes.div_ceil(CONTINUATION_SEGMENT_SIZE);
        if last_segment_number > usize::from(MAX_SEGMENT_NUMBER) {
            return Err(WireError::Validation(format!(
                "provisioning pdu of {total_length} bytes needs too many segments"
            )));
        }

        let mut segments = Vec::with_capacity(last_segment_number + 1);
        let head = total_length.min(START_SEGMENT_SIZE);
        segments.push(GenericProvisioningPdu::TransactionStart {
            last_segment_number: last_segment_number as u8,
            total_length: total_length as u16,
            frame_check: fcs(&payload),
            data: payload.slice(..head),
        });

        for (index, chunk) in payload[head..]
            .chunks(CONTINUATION_SEGMENT_SIZE)
            .enumerate()
        {
            let start = head + index * CONTINUATION_SEGMENT_SIZE;
            segments.push(GenericProvisioningPdu::TransactionContinuation {
                segment_index: (index + 1) as u8,
                data: payload.slice(start..start + chunk.len()),
            });
        }

        debug!(
            pdu_type = ?pdu.pdu_type(),
            total_length,
            segments = segments.len(),
            "packed provisioning transaction"
        );
        Ok(segments)
    }

    /// Reassemble and decode a provisioning PDU from its segments.
    ///
    /// Segments may arrive in any order; exactly one Transaction Start and
    /// one continuation per index up to its last segment number are required.
    pub fn unpack<'a, I>(segments: I) -> WireResult<ProvisioningPdu>
    where
        I: IntoIterator<Item = &'a GenericProvisioningPdu>,
    {
        let mut start = None;
        let mut continuations: Vec<(u8, &Bytes)> = Vec::new();

        for segment in segments {
            match segment {
                GenericProvisioningPdu::TransactionStart {
                    last_segment_number,
                    total_length,
                    frame_check,
                    data,
                } => {
                    if start.is_some() {
                        return Err(WireError::Validation(
                            "duplicate transaction start".to_string(),
                        ));
                    }
                    start = Some((*last_segment_number, *total_length, *frame_check, data));
                }
                GenericProvisioningPdu::TransactionContinuation {
                    segment_index,
                    data,
                } => continuations.push((*segment_index, data)),
                other => {
                    return Err(WireError::Validation(format!(
                        "unexpected {:?} in transaction",
                        other.gpcf()
                    )))
                }
            }
        }

        let (last_segment_number, total_length, frame_check, head) =
            start.ok_or(WireError::Incomplete)?;

        continuations.sort_by_key(|(index, _)| *index);
        let indices_match = continuations.len() == usize::from(last_segment_number)
            && continuations
                .iter()
                .zip(1..)
                .all(|((index, _), expected)| *index == expected);
        if !indices_match {
            return Err(WireError::Validation(format!(
                "transaction expects continuations 1..={last_segment_number}"
            )));
        }

        let mut payload = BytesMut::with_capacity(usize::from(total_length));
        payload.put_slice(head);
        for (_, data) in &continuations {
            payload.put_slice(data);
        }

        if payload.len() != usize::from(total_length) {
            return Err(WireError::Length {
                expected: usize::from(total_length),
                actual: payload.len(),
            });
        }

        let actual = fcs(&payload);
        if actual != frame_check {
            return Err(WireError::Fcs {
                expected: frame_check,
                actual,
            });
        }

        ProvisioningPdu::decode(&mut payload.freeze())
    }
}

/// PB-ADV bearer PDU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbAdvPdu {
    /// Link identifier
    pub link_id: u32,
    /// Transaction number
    pub transaction_id: u8,
    /// Carried generic provisioning PDU
    pub pdu: GenericProvisioningPdu,
}

impl PbAdvPdu {
    /// Encode into a buffer
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.link_id);
        buf.put_u8(self.transaction_id);
        self.pdu.encode(buf);
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a PB-ADV PDU
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        if buf.len() < 6 {
            return Err(WireError::Incomplete);
        }

        let link_id = buf.get_u32();
        let transaction_id = buf.get_u8();
        let pdu = GenericProvisioningPdu::decode(buf)?;

        Ok(Self {
            link_id,
            transaction_id,
            pdu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::pdu::PublicKey;

    fn bytes(s: &str) -> Bytes {
        Bytes::from(hex::decode(s).unwrap())
    }

    fn encoded(segments: &[GenericProvisioningPdu]) -> Vec<String> {
        segments.iter().map(|s| hex::encode(s.to_bytes())).collect()
    }

    const DEVICE_KEY: &str = "f465e43ff23d3f1b9dc7dfc04da8758184dbc966204796eccf0d6cf5e16500cc\
                              0201d048bcbbd899eeefc424164e33c201c2b010ca6b4d43a8a155cad8ecb279";

    #[test]
    fn test_fcs_parameters() {
        assert_eq!(fcs(b"123456789"), 0x2f);
        assert_eq!(fcs(&[0x00, 0x00]), 0x14);
        assert_eq!(fcs(&hex::decode("020000000000").unwrap()), 0x64);
    }

    #[test]
    fn test_pack_single_segment() {
        let segments =
            ProvisioningTransaction::pack(&ProvisioningPdu::Invite { attention: 0 }).unwrap();
        assert_eq!(encoded(&segments), vec!["000002140000"]);

        let segments = ProvisioningTransaction::pack(&ProvisioningPdu::Random {
            random: bytes("8b19ac31d58b124c946209b5db1021b9"),
        })
        .unwrap();
        assert_eq!(
            encoded(&segments),
            vec!["000011d3068b19ac31d58b124c946209b5db1021b9"]
        );
    }

    #[test]
    fn test_pack_public_key_three_segments() {
        let key = PublicKey::from_slice(&hex::decode(DEVICE_KEY).unwrap()).unwrap();
        let segments = ProvisioningTransaction::pack(&ProvisioningPdu::PublicKey(key)).unwrap();

        assert_eq!(
            encoded(&segments),
            vec![
                "08004110\
                 03f465e43ff23d3f1b9dc7dfc04da8758184dbc9",
                "0666204796eccf0d6cf5e16500cc0201d048bcbbd899eeef",
                "0ac424164e33c201c2b010ca6b4d43a8a155cad8ecb279",
            ]
        );
    }

    #[test]
    fn test_unpack_out_of_order() {
        let key = PublicKey::from_slice(&hex::decode(DEVICE_KEY).unwrap()).unwrap();
        let pdu = ProvisioningPdu::PublicKey(key);
        let mut segments = ProvisioningTransaction::pack(&pdu).unwrap();
        segments.reverse();

        assert_eq!(ProvisioningTransaction::unpack(&segments).unwrap(), pdu);
    }

    #[test]
    fn test_unpack_data_segments() {
        let segments = [
            bytes("0400228b07d0bd7f4a89a2ff6222af59a90a60ad58acfe31"),
            bytes("0623356f5cec2973e0ec50783b10c7"),
        ]
        .into_iter()
        .map(|mut b| GenericProvisioningPdu::decode(&mut b).unwrap())
        .collect::<Vec<_>>();

        let pdu = ProvisioningTransaction::unpack(&segments).unwrap();
        assert_eq!(
            hex::encode(pdu.to_bytes()),
            "07d0bd7f4a89a2ff6222af59a90a60ad58acfe3123356f5cec2973e0ec50783b10c7"
        );
    }

    #[test]
    fn test_unpack_rejects_bad_fcs() {
        let mut segment = bytes("000002150000");
        let segment = GenericProvisioningPdu::decode(&mut segment).unwrap();

        assert_eq!(
            ProvisioningTransaction::unpack([&segment]),
            Err(WireError::Fcs {
                expected: 0x15,
                actual: 0x14
            })
        );
    }

    #[test]
    fn test_unpack_rejects_missing_segment() {
        let key = PublicKey::from_slice(&hex::decode(DEVICE_KEY).unwrap()).unwrap();
        let mut segments = ProvisioningTransaction::pack(&ProvisioningPdu::PublicKey(key)).unwrap();
        segments.remove(1);

        assert!(matches!(
            ProvisioningTransaction::unpack(&segments),
            Err(WireError::Validation(_))
        ));
        assert_eq!(
            ProvisioningTransaction::unpack(&segments[1..]),
            Err(WireError::Incomplete)
        );
    }

    #[test]
    fn test_unpack_rejects_length_mismatch() {
        let mut segment = bytes("000003140000");
        let segment = GenericProvisioningPdu::decode(&mut segment).unwrap();

        assert_eq!(
            ProvisioningTransaction::unpack([&segment]),
            Err(WireError::Length {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_bearer_control() {
        let open = GenericProvisioningPdu::BearerControl(BearerControl::LinkOpen {
            device_uuid: Uuid::parse_str("70cf7c97-32a3-45b6-9149-4810d2e9cbf4").unwrap(),
        });
        assert_eq!(hex::encode(open.to_bytes()), "0370cf7c9732a345b691494810d2e9cbf4");

        let ack = GenericProvisioningPdu::BearerControl(BearerControl::LinkAck);
        assert_eq!(hex::encode(ack.to_bytes()), "07");

        let close = GenericProvisioningPdu::BearerControl(BearerControl::LinkClose {
            reason: LinkCloseReason::Success,
        });
        assert_eq!(hex::encode(close.to_bytes()), "0b00");

        for pdu in [open, ack, close] {
            assert_eq!(GenericProvisioningPdu::decode(&mut pdu.to_bytes()).unwrap(), pdu);
        }
    }

    #[test]
    fn test_transaction_ack() {
        assert_eq!(
            GenericProvisioningPdu::decode(&mut bytes("01")).unwrap(),
            GenericProvisioningPdu::TransactionAck
        );
        assert!(GenericProvisioningPdu::decode(&mut bytes("05")).is_err());
    }

    #[test]
    fn test_unknown_bearer_opcode() {
        assert_eq!(
            GenericProvisioningPdu::decode(&mut bytes("0f")),
            Err(WireError::Type(0x03))
        );
    }

    #[test]
    fn test_pb_adv() {
        let pdu = PbAdvPdu {
            link_id: 0x01020304,
            transaction_id: 0x80,
            pdu: GenericProvisioningPdu::TransactionAck,
        };
        assert_eq!(hex::encode(pdu.to_bytes()), "010203048001");
        assert_eq!(PbAdvPdu::decode(&mut pdu.to_bytes()).unwrap(), pdu);
        assert_eq!(PbAdvPdu::decode(&mut bytes("0102030480")), Err(WireError::Incomplete));
    }
}
