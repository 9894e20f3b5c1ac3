//! Silvair Debug v2 model, vendor opcode 0xEB3601.
//!
//! Every message names a parameter and a page, followed by a list of
//! self-describing values.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{
    get_array, get_counted, get_prefixed, get_u8, invalid, put_counted, put_prefixed, Codec,
};
use crate::error::{AccessError, AccessResult};

mesh_enum! {
    /// Debug v2 request kind
    pub enum DebugV2SubOpcode: u8 {
        /// Read a parameter
        Get = 0x00,
        /// Write a parameter
        Set = 0x01,
        /// Parameter value
        Status = 0x02,
        /// Reset a parameter
        Clear = 0x03,
    }
}

/// Debug v2 parameter identifier; unlisted values are carried as is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugV2ParameterType(pub u8);

impl DebugV2ParameterType {
    /// Parameters that can be read
    pub const GETABLE_PARAMETER_LIST: Self = Self(0x00);
    /// Parameters that can be written
    pub const SETABLE_PARAMETER_LIST: Self = Self(0x01);
    /// Value types of writable parameters
    pub const SETTABLE_PARAMETER_TYPE_LIST: Self = Self(0x02);
    /// Parameters that can be cleared
    pub const CLEARABLE_PARAMETER_LIST: Self = Self(0x03);
    /// RSSI threshold
    pub const RSSI_THRESHOLD: Self = Self(0x08);
    /// Uptime
    pub const UPTIME: Self = Self(0x09);
    /// Replay protection list
    pub const MESH_RPL_LIST_CONTENT: Self = Self(0x0a);
    /// Received time synchronisation messages
    pub const TIME_SYNC_MSG_LIST: Self = Self(0x0b);
    /// First time synchronisation
    pub const FIRST_TIME_SYNC_TIMESTAMP: Self = Self(0x0c);
    /// Last time synchronisation
    pub const LAST_TIME_SYNC_TIME: Self = Self(0x0d);
    /// Last time recovery
    pub const LAST_TIME_RECOVERY_TIME: Self = Self(0x0e);
    /// Recalled scheduler events
    pub const RECALLED_EVENTS_TIME: Self = Self(0x0f);
    /// Reset monitor counters
    pub const RESET_MONITOR_COUNTERS: Self = Self(0x10);
    /// Time recovery counter
    pub const TIME_RECOVERY_COUNTER: Self = Self(0x11);
    /// Occupancy event counter
    pub const OCCUPANCY_EVENTS_COUNTER: Self = Self(0x12);
    /// Occupancy history
    pub const OCCUPANCY_HISTORY: Self = Self(0x13);
    /// Occupancy history resolution
    pub const OCCUPANCY_HISTORY_RESOLUTION: Self = Self(0x14);
    /// Radio statistics per channel
    pub const RADIO_STATS_PER_CHANNEL: Self = Self(0x15);
    /// Queue statistics
    pub const QUEUES_STATS: Self = Self(0x16);
}

/// Self-describing value, tagged on the wire by a data type byte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", content = "parameter", rename_all = "snake_case")]
pub enum DebugV2Value {
    /// Unsigned 8-bit
    Uint8(u8),
    /// Unsigned 16-bit
    Uint16(u16),
    /// Unsigned 32-bit
    Uint32(u32),
    /// Unsigned 64-bit
    Uint64(u64),
    /// Signed 8-bit
    Int8(i8),
    /// Signed 16-bit
    Int16(i16),
    /// Signed 32-bit
    Int32(i32),
    /// Signed 64-bit
    Int64(i64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Enumerated value
    Enum(u8),
    /// Length-prefixed UTF-8 string
    String(String),
    /// Count-prefixed byte array
    Array(Vec<u8>),
    /// Marker without a value
    Invalid,
}

impl DebugV2Value {
    /// Data type byte
    pub fn data_type(&self) -> u8 {
        match self {
            DebugV2Value::Uint8(_) => 0x00,
            DebugV2Value::Uint16(_) => 0x01,
            DebugV2Value::Uint32(_) => 0x02,
            DebugV2Value::Uint64(_) => 0x03,
            DebugV2Value::Int8(_) => 0x04,
            DebugV2Value::Int16(_) => 0x05,
            DebugV2Value::Int32(_) => 0x06,
            DebugV2Value::Int64(_) => 0x07,
            DebugV2Value::Float(_) => 0x08,
            DebugV2Value::Double(_) => 0x09,
            DebugV2Value::Enum(_) => 0x0a,
            DebugV2Value::String(_) => 0x0b,
            DebugV2Value::Array(_) => 0x0c,
            DebugV2Value::Invalid => 0xff,
        }
    }
}

impl Codec for DebugV2Value {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.data_type());
        match self {
            DebugV2Value::Uint8(v) | DebugV2Value::Enum(v) => buf.put_u8(*v),
            DebugV2Value::Uint16(v) => buf.put_u16_le(*v),
            DebugV2Value::Uint32(v) => buf.put_u32_le(*v),
            DebugV2Value::Uint64(v) => buf.put_u64_le(*v),
            DebugV2Value::Int8(v) => buf.put_i8(*v),
            DebugV2Value::Int16(v) => buf.put_i16_le(*v),
            DebugV2Value::Int32(v) => buf.put_i32_le(*v),
            DebugV2Value::Int64(v) => buf.put_i64_le(*v),
            DebugV2Value::Float(v) => buf.put_f32_le(*v),
            DebugV2Value::Double(v) => buf.put_f64_le(*v),
            DebugV2Value::String(v) => put_prefixed(buf, v.as_bytes())?,
            DebugV2Value::Array(v) => put_counted(buf, v)?,
            DebugV2Value::Invalid => {}
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let data_type = get_u8(buf)?;
        Ok(match data_type {
            0x00 => DebugV2Value::Uint8(get_u8(buf)?),
            0x01 => DebugV2Value::Uint16(u16::from_le_bytes(get_array(buf)?)),
            0x02 => DebugV2Value::Uint32(u32::from_le_bytes(get_array(buf)?)),
            0x03 => DebugV2Value::Uint64(u64::from_le_bytes(get_array(buf)?)),
            0x04 => DebugV2Value::Int8(i8::from_le_bytes(get_array(buf)?)),
            0x05 => DebugV2Value::Int16(i16::from_le_bytes(get_array(buf)?)),
            0x06 => DebugV2Value::Int32(i32::from_le_bytes(get_array(buf)?)),
            0x07 => DebugV2Value::Int64(i64::from_le_bytes(get_array(buf)?)),
            0x08 => DebugV2Value::Float(f32::from_le_bytes(get_array(buf)?)),
            0x09 => DebugV2Value::Double(f64::from_le_bytes(get_array(buf)?)),
            0x0a => DebugV2Value::Enum(get_u8(buf)?),
            0x0b => {
                let raw = get_prefixed(buf)?;
                DebugV2Value::String(
                    String::from_utf8(raw.to_vec()).map_err(|_| invalid("utf-8 string", "bytes"))?,
                )
            }
            0x0c => DebugV2Value::Array(get_counted(buf)?),
            0xff => DebugV2Value::Invalid,
            other => {
                return Err(AccessError::Enum {
                    name: "DebugV2DataType",
                    value: i64::from(other),
                })
            }
        })
    }
}

/// Debug v2 message parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugV2Params {
    /// Request kind
    pub subopcode: DebugV2SubOpcode,
    /// Parameter addressed
    pub parameter_type: DebugV2ParameterType,
    /// Page of a multi-page parameter
    pub page_number: u8,
    /// Values, empty for requests
    pub values: Vec<DebugV2Value>,
}

impl Codec for DebugV2Params {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.subopcode.encode(buf)?;
        buf.put_u8(self.parameter_type.0);
        buf.put_u8(self.page_number);
        self.values.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            subopcode: DebugV2SubOpcode::decode(buf)?,
            parameter_type: DebugV2ParameterType(get_u8(buf)?),
            page_number: get_u8(buf)?,
            values: Vec::decode(buf)?,
        })
    }
}
