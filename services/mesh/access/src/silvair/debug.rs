//! Silvair Debug model, vendor opcode 0xF53601.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{
    get_bytes, get_greedy_str, get_padded_str, get_u16, get_u24, get_u32, get_u8, invalid,
    put_padded_str, put_u24, Codec,
};
use crate::error::AccessResult;

const TASK_NAME_LEN: usize = 8;
const TASK_RESERVED_LEN: usize = 4;

/// Fault record reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFault {
    /// Uptime at which the fault happened
    pub time: u32,
    /// Fault description
    pub fault: String,
}

impl Codec for LastFault {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u32_le(self.time);
        buf.put_slice(self.fault.as_bytes());
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            time: get_u32(buf)?,
            fault: get_greedy_str(buf)?,
        })
    }
}

/// Stack high water mark of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Task name, at most eight bytes
    pub name: String,
    /// Stack high water mark
    pub high_water_mark: u16,
}

impl Codec for TaskStats {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_padded_str(buf, &self.name, TASK_NAME_LEN)?;
        buf.put_u16_le(self.high_water_mark);
        buf.put_bytes(0, TASK_RESERVED_LEN);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let name = get_padded_str(buf, TASK_NAME_LEN)?;
        let high_water_mark = get_u16(buf)?;
        get_bytes(buf, TASK_RESERVED_LEN)?;
        Ok(Self {
            name,
            high_water_mark,
        })
    }
}

/// Firmware version string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FirmwareVersion(pub String);

impl Codec for FirmwareVersion {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_slice(self.0.as_bytes());
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_greedy_str(buf).map(Self)
    }
}

/// ARAP list capacity and occupancy.
///
/// Older firmware reports both as single bytes; the two byte form is
/// always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArapSize {
    /// List capacity
    pub capacity: u16,
    /// Entries in use
    pub size: u16,
}

impl Codec for ArapSize {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.capacity);
        buf.put_u16_le(self.size);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        if buf.remaining() >= 4 {
            Ok(Self {
                capacity: get_u16(buf)?,
                size: get_u16(buf)?,
            })
        } else {
            Ok(Self {
                capacity: u16::from(get_u8(buf)?),
                size: u16::from(get_u8(buf)?),
            })
        }
    }
}

/// Replay protection entry of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArapNode {
    /// Unicast address, 15 bits
    pub address: u16,
    /// IV index parity
    pub ivi: bool,
    /// Last sequence number, 24 bits
    pub sequence: u32,
}

impl Codec for ArapNode {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        if self.address > 0x7fff {
            return Err(invalid("arap address", self.address));
        }
        buf.put_u16_le(self.address | (u16::from(self.ivi) << 15));
        put_u24(buf, self.sequence)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let packed = get_u16(buf)?;
        Ok(Self {
            address: packed & 0x7fff,
            ivi: packed & 0x8000 != 0,
            sequence: get_u24(buf)?,
        })
    }
}

/// One page of the ARAP list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArapContent {
    /// Page carried by this message
    pub current_page: u8,
    /// Last available page
    pub last_page: u8,
    /// Entries on the page
    pub nodes: Vec<ArapNode>,
}

impl Codec for ArapContent {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.current_page);
        buf.put_u8(self.last_page);
        self.nodes.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            current_page: get_u8(buf)?,
            last_page: get_u8(buf)?,
            nodes: Vec::decode(buf)?,
        })
    }
}

access_messages! {
    /// Debug sub-opcodes
    subopcode DebugSubOpcode;
    /// Debug payloads
    payload DebugPayload {
        /// Read the RSSI threshold
        RssiThresholdGet = 0x00,
        /// Set the RSSI threshold
        RssiThresholdSet(u8) = 0x01,
        /// RSSI threshold
        RssiThresholdStatus(u8) = 0x02,
        /// Run a radio test sending the given packet count
        RadioTest(u8) = 0x03,
        /// Read the timeslot TX power
        TimeslotTxPowerGet = 0x04,
        /// Set the timeslot TX power
        TimeslotTxPowerSet(u8) = 0x05,
        /// Timeslot TX power
        TimeslotTxPowerStatus(u8) = 0x06,
        /// Read the softdevice TX power
        SoftdeviceTxPowerGet = 0x07,
        /// Set the softdevice TX power
        SoftdeviceTxPowerSet(u8) = 0x08,
        /// Softdevice TX power
        SoftdeviceTxPowerStatus(u8) = 0x09,
        /// Read the uptime
        UptimeGet = 0x0a,
        /// Uptime in seconds
        UptimeStatus(u32) = 0x0b,
        /// Read the last software fault
        LastSwFaultGet = 0x0c,
        /// Clear the last software fault
        LastSwFaultClear = 0x0d,
        /// Last software fault
        LastSwFaultStatus(LastFault) = 0x0e,
        /// Read task statistics
        SystemStatsGet = 0x0f,
        /// Task statistics
        SystemStatsStatus(Vec<TaskStats>) = 0x10,
        /// Read the last allocation fault
        LastMallocFaultGet = 0x11,
        /// Clear the last allocation fault
        LastMallocFaultClear = 0x12,
        /// Last allocation fault
        LastMallocFaultStatus(LastFault) = 0x13,
        /// Read the last flash storage fault
        LastFdsFaultGet = 0x14,
        /// Clear the last flash storage fault
        LastFdsFaultClear = 0x15,
        /// Last flash storage fault
        LastFdsFaultStatus(LastFault) = 0x16,
        /// Read the bytes left before garbage collection
        BytesBeforeGarbageCollectorGet = 0x17,
        /// Bytes left before garbage collection
        BytesBeforeGarbageCollectorStatus(u16) = 0x18,
        /// Read the provisioned application version
        ProvisionedAppVersionGet = 0x19,
        /// Provisioned application version
        ProvisionedAppVersionStatus(u16) = 0x1a,
        /// Read the full firmware version
        FullFirmwareVersionGet = 0x1b,
        /// Full firmware version
        FullFirmwareVersionStatus(FirmwareVersion) = 0x1c,
        /// Read the IV index
        IvIndexGet = 0x1d,
        /// IV index
        IvIndexStatus(u32) = 0x1e,
        /// Read the garbage collection counter
        GarbageCollectorCounterGet = 0x1f,
        /// Garbage collection counter
        GarbageCollectorCounterStatus(u16) = 0x20,
        /// Read the ARAP list size
        ArapListSizeGet = 0x21,
        /// ARAP list size
        ArapListSizeStatus(ArapSize) = 0x22,
        /// Read one page of the ARAP list
        ArapListContentGet(u8) = 0x23,
        /// One page of the ARAP list
        ArapListContentStatus(ArapContent) = 0x24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(raw: &[u8]) -> DebugPayload {
        let payload = DebugPayload::decode(&mut Bytes::copy_from_slice(raw)).unwrap();
        let mut buf = BytesMut::new();
        payload.encode(&mut buf).unwrap();
        assert_eq!(&buf[..], raw);
        payload
    }

    #[test]
    fn test_simple_payloads() {
        assert_eq!(roundtrip(&[0x00]), DebugPayload::RssiThresholdGet);
        assert_eq!(roundtrip(&[0x15]), DebugPayload::LastFdsFaultClear);
        assert_eq!(roundtrip(&[0x01, 0x80]), DebugPayload::RssiThresholdSet(0x80));
        assert_eq!(roundtrip(&[0x03, 0x01]), DebugPayload::RadioTest(1));
        assert_eq!(roundtrip(&[0x09, 0x04]), DebugPayload::SoftdeviceTxPowerStatus(4));
        assert_eq!(roundtrip(&[0x23, 0x02]), DebugPayload::ArapListContentGet(2));
        assert_eq!(
            roundtrip(&[0x0b, 0xa2, 0xd0, 0x02, 0x00]),
            DebugPayload::UptimeStatus(184482)
        );
        assert_eq!(
            roundtrip(&[0x18, 0xf8, 0x2e]),
            DebugPayload::BytesBeforeGarbageCollectorStatus(12024)
        );
        assert_eq!(
            roundtrip(&[0x1e, 0x05, 0x00, 0x00, 0x00]),
            DebugPayload::IvIndexStatus(5)
        );
    }

    #[test]
    fn test_strings() {
        let raw = [&[0x0e, 0x0a, 0x00, 0x00, 0x00][..], &b"Power OFF [7]"[..]].concat();
        assert_eq!(
            roundtrip(&raw),
            DebugPayload::LastSwFaultStatus(LastFault {
                time: 10,
                fault: "Power OFF [7]".into(),
            })
        );

        let raw = [&[0x1c][..], &b"2.12.0-rc4-6c74b4d"[..]].concat();
        assert_eq!(
            roundtrip(&raw),
            DebugPayload::FullFirmwareVersionStatus(FirmwareVersion("2.12.0-rc4-6c74b4d".into()))
        );
    }

    #[test]
    fn test_system_stats() {
        let raw = [
            &[0x10][..],
            &b"HEAP\0\0\0\0\x88J\0\0\0\0"[..],
            &b"Tmr Svc\0(\x02\0\0\0\0"[..],
            &b"IDLE\0\0\0\0\xf4\0\0\0\0\0"[..],
        ]
        .concat();
        let DebugPayload::SystemStatsStatus(stats) = roundtrip(&raw) else {
            panic!("expected system stats");
        };
        let marks: Vec<_> = stats
            .iter()
            .map(|task| (task.name.as_str(), task.high_water_mark))
            .collect();
        assert_eq!(marks, vec![("HEAP", 19080), ("Tmr Svc", 552), ("IDLE", 244)]);
    }

    #[test]
    fn test_arap_size() {
        assert_eq!(
            roundtrip(&hex::decode("22feff0100").unwrap()),
            DebugPayload::ArapListSizeStatus(ArapSize {
                capacity: 65534,
                size: 1,
            })
        );

        let short = DebugPayload::decode(&mut Bytes::from_static(&[0x22, 0x7e, 0x0e])).unwrap();
        assert_eq!(
            short,
            DebugPayload::ArapListSizeStatus(ArapSize {
                capacity: 126,
                size: 14,
            })
        );
        let mut buf = BytesMut::new();
        short.encode(&mut buf).unwrap();
        assert_eq!(hex::encode(buf), "227e000e00");
    }

    #[test]
    fn test_arap_content() {
        assert_eq!(
            roundtrip(&hex::decode("2400000700700c028000580000").unwrap()),
            DebugPayload::ArapListContentStatus(ArapContent {
                current_page: 0,
                last_page: 0,
                nodes: vec![
                    ArapNode {
                        address: 0x0007,
                        ivi: false,
                        sequence: 0x020c70,
                    },
                    ArapNode {
                        address: 0x0080,
                        ivi: false,
                        sequence: 0x58,
                    },
                ],
            })
        );

        let DebugPayload::ArapListContentStatus(content) =
            roundtrip(&hex::decode("2400008080580000").unwrap())
        else {
            panic!("expected arap content");
        };
        assert_eq!(
            content.nodes,
            vec![ArapNode {
                address: 0x0080,
                ivi: true,
                sequence: 0x58,
            }]
        );
    }

    #[test]
    fn test_unknown_subopcode() {
        assert!(DebugPayload::decode(&mut Bytes::from_static(&[0x25])).is_err());
    }
}
