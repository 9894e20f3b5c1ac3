//! Sensor and Sensor Setup models.
//!
//! Marshalled sensor data comes in two formats:
//!
//! ```text
//! Format A:  | len-1 (4) | id[2:0] (3) | 0 |  id[10:3] (8) |  value
//! Format B:  | len-1 (7)               | 1 |  id (16, LE)   |  value
//! ```
//!
//! Values of properties with a known characteristic are typed, the rest
//! stay raw. Column, series and cadence values are sized by the
//! characteristic of their property and kept as raw bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::adapters::{get_u12_pair, put_u12_pair};
use crate::codec::{get_bytes, get_u16, get_u8, invalid, Codec};
use crate::error::{AccessError, AccessResult};
use crate::properties::{PropertyId, PropertyValue};

/// Largest property identifier expressible in format A
pub const MAX_FORMAT_A_PROPERTY_ID: u16 = 0x07ff;

mesh_enum! {
    /// Sampling function of a sensor
    pub enum SensorSampling: u8 {
        /// Unspecified
        Unspecified = 0x00,
        /// Instantaneous
        Instantaneous = 0x01,
        /// Arithmetic mean
        ArithmeticMean = 0x02,
        /// Root mean square
        Rms = 0x03,
        /// Maximum
        Maximum = 0x04,
        /// Minimum
        Minimum = 0x05,
        /// Accumulated
        Accumulated = 0x06,
        /// Count
        Count = 0x07,
    }
}

mesh_enum! {
    /// Access rights of a sensor setting
    pub enum SensorSettingAccess: u8 {
        /// Setting can be read
        ReadOnly = 0x01,
        /// Setting can be read and written
        ReadWrite = 0x03,
    }
}

/// Width of raw values of `property_id`, taken from its characteristic
fn value_width(property_id: PropertyId) -> AccessResult<usize> {
    property_id
        .characteristic()
        .map(|characteristic| characteristic.width())
        .ok_or_else(|| {
            AccessError::Validation(format!("unknown value width for property {property_id}"))
        })
}

fn put_sized(buf: &mut BytesMut, what: &str, raw: &Bytes, width: usize) -> AccessResult<()> {
    if raw.len() != width {
        return Err(AccessError::Validation(format!(
            "{what} of {} bytes, expected {width}",
            raw.len()
        )));
    }
    buf.put_slice(raw);
    Ok(())
}

/// Sensor descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    /// Sensor property
    pub property_id: PropertyId,
    /// Negative tolerance, 12 bits
    pub negative_tolerance: u16,
    /// Positive tolerance, 12 bits
    pub positive_tolerance: u16,
    /// Sampling function
    pub sampling_function: SensorSampling,
    /// Measurement period, log-encoded
    pub measurement_period: u8,
    /// Update interval, log-encoded
    pub update_interval: u8,
}

impl Codec for SensorDescriptor {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        put_u12_pair(buf, self.negative_tolerance, self.positive_tolerance)?;
        self.sampling_function.encode(buf)?;
        buf.put_u8(self.measurement_period);
        buf.put_u8(self.update_interval);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let (negative_tolerance, positive_tolerance) = get_u12_pair(buf)?;
        Ok(Self {
            property_id,
            negative_tolerance,
            positive_tolerance,
            sampling_function: SensorSampling::decode(buf)?,
            measurement_period: get_u8(buf)?,
            update_interval: get_u8(buf)?,
        })
    }
}

/// Descriptors, or the single property that was asked for and not found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDescriptorStatus {
    /// Known descriptors
    Descriptors(Vec<SensorDescriptor>),
    /// Property not supported by the server
    NotFound(PropertyId),
}

impl Codec for SensorDescriptorStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            Self::Descriptors(descriptors) => descriptors.encode(buf),
            Self::NotFound(property_id) => property_id.encode(buf),
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        if buf.remaining() == 2 {
            return PropertyId::decode(buf).map(Self::NotFound);
        }
        Vec::decode(buf).map(Self::Descriptors)
    }
}

/// Marshalled sensor data header format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDataFormat {
    /// Two byte header, 11-bit property, up to 16 value bytes
    A,
    /// Three byte header, 16-bit property, up to 128 value bytes
    B,
}

/// Single sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Header format
    pub format: SensorDataFormat,
    /// Sensor property
    pub property_id: PropertyId,
    /// Reading
    pub value: PropertyValue,
}

impl SensorData {
    /// Reading with the shortest header able to carry `property_id`
    pub fn new(property_id: PropertyId, value: PropertyValue) -> Self {
        let format = if property_id.0 <= MAX_FORMAT_A_PROPERTY_ID {
            SensorDataFormat::A
        } else {
            SensorDataFormat::B
        };
        Self {
            format,
            property_id,
            value,
        }
    }
}

impl Codec for SensorData {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        let mut value = BytesMut::new();
        self.value.encode(self.property_id, &mut value)?;
        let id = self.property_id.0;
        let len = value.len();

        match self.format {
            SensorDataFormat::A => {
                if !(1..=16).contains(&len) {
                    return Err(invalid("format A value length", len));
                }
                if id > MAX_FORMAT_A_PROPERTY_ID {
                    return Err(invalid("format A property", self.property_id));
                }
                buf.put_u8(((len - 1) as u8) << 1 | ((id & 0x07) as u8) << 5);
                buf.put_u8((id >> 3) as u8);
            }
            SensorDataFormat::B => {
                if !(1..=128).contains(&len) {
                    return Err(invalid("format B value length", len));
                }
                buf.put_u8(((len - 1) as u8) << 1 | 0x01);
                buf.put_u16_le(id);
            }
        }
        buf.put_slice(&value);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let header = get_u8(buf)?;
        let (format, len, property_id) = if header & 0x01 == 0 {
            let high = u16::from(get_u8(buf)?);
            let id = u16::from(header >> 5) | high << 3;
            (SensorDataFormat::A, usize::from((header >> 1) & 0x0f) + 1, id)
        } else {
            let id = get_u16(buf)?;
            (SensorDataFormat::B, usize::from(header >> 1) + 1, id)
        };
        let property_id = PropertyId(property_id);

        let mut raw = get_bytes(buf, len)?;
        let value = PropertyValue::decode(property_id, &mut raw)?;
        if raw.has_remaining() {
            return Err(AccessError::Validation(format!(
                "sensor data length {len} does not match property {property_id}"
            )));
        }
        Ok(Self {
            format,
            property_id,
            value,
        })
    }
}

/// Raw X value of a column request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorColumnGet {
    /// Sensor property
    pub property_id: PropertyId,
    /// Raw X value identifying the column
    pub raw_value_x: Bytes,
}

impl Codec for SensorColumnGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        self.raw_value_x.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            property_id: PropertyId::decode(buf)?,
            raw_value_x: Bytes::decode(buf)?,
        })
    }
}

/// Width and Y value of a series column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorColumnValues {
    /// Column width
    pub column_width: Bytes,
    /// Raw Y value
    pub raw_value_y: Bytes,
}

/// Column state, values absent when the column does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorColumnStatus {
    /// Sensor property
    pub property_id: PropertyId,
    /// Raw X value
    pub raw_value_x: Bytes,
    /// Column width and Y value
    pub values: Option<SensorColumnValues>,
}

impl Codec for SensorColumnStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        let width = value_width(self.property_id)?;
        put_sized(buf, "raw value x", &self.raw_value_x, width)?;
        if let Some(values) = &self.values {
            put_sized(buf, "column width", &values.column_width, width)?;
            put_sized(buf, "raw value y", &values.raw_value_y, width)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let width = value_width(property_id)?;
        let raw_value_x = get_bytes(buf, width)?;
        let values = if buf.has_remaining() {
            Some(SensorColumnValues {
                column_width: get_bytes(buf, width)?,
                raw_value_y: get_bytes(buf, width)?,
            })
        } else {
            None
        };
        Ok(Self {
            property_id,
            raw_value_x,
            values,
        })
    }
}

/// Inclusive X range of a series request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSeriesRange {
    /// Lower raw X value
    pub raw_value_x1: Bytes,
    /// Upper raw X value
    pub raw_value_x2: Bytes,
}

/// Series request, optionally limited to a range of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSeriesGet {
    /// Sensor property
    pub property_id: PropertyId,
    /// Column range
    pub range: Option<SensorSeriesRange>,
}

impl Codec for SensorSeriesGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        if let Some(range) = &self.range {
            let width = value_width(self.property_id)?;
            put_sized(buf, "raw value x1", &range.raw_value_x1, width)?;
            put_sized(buf, "raw value x2", &range.raw_value_x2, width)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let range = if buf.has_remaining() {
            let width = value_width(property_id)?;
            Some(SensorSeriesRange {
                raw_value_x1: get_bytes(buf, width)?,
                raw_value_x2: get_bytes(buf, width)?,
            })
        } else {
            None
        };
        Ok(Self { property_id, range })
    }
}

/// Single column of a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorColumn {
    /// Raw X value
    pub raw_value_x: Bytes,
    /// Column width
    pub column_width: Bytes,
    /// Raw Y value
    pub raw_value_y: Bytes,
}

/// Series of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSeriesStatus {
    /// Sensor property
    pub property_id: PropertyId,
    /// Columns in ascending X order
    pub columns: Vec<SensorColumn>,
}

impl Codec for SensorSeriesStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        if self.columns.is_empty() {
            return Ok(());
        }
        let width = value_width(self.property_id)?;
        for column in &self.columns {
            put_sized(buf, "raw value x", &column.raw_value_x, width)?;
            put_sized(buf, "column width", &column.column_width, width)?;
            put_sized(buf, "raw value y", &column.raw_value_y, width)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let mut columns = Vec::new();
        if buf.has_remaining() {
            let width = value_width(property_id)?;
            while buf.has_remaining() {
                columns.push(SensorColumn {
                    raw_value_x: get_bytes(buf, width)?,
                    column_width: get_bytes(buf, width)?,
                    raw_value_y: get_bytes(buf, width)?,
                });
            }
        }
        Ok(Self {
            property_id,
            columns,
        })
    }
}

/// Change of a reading that triggers a status publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTrigger {
    /// Deltas in the format of the property characteristic
    Value {
        /// Decrease triggering a publication
        delta_down: Bytes,
        /// Increase triggering a publication
        delta_up: Bytes,
    },
    /// Unitless deltas in units of 0.01 %
    Percent {
        /// Decrease triggering a publication
        delta_down: u16,
        /// Increase triggering a publication
        delta_up: u16,
    },
}

/// Publication cadence of a sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCadence {
    /// Sensor property
    pub property_id: PropertyId,
    /// Divisor of the publish period inside the fast cadence range, 7 bits
    pub fast_cadence_period_divisor: u8,
    /// Status trigger deltas
    pub trigger: StatusTrigger,
    /// Minimum interval between publications as a power of two milliseconds
    pub status_min_interval: u8,
    /// Low bound of the fast cadence range
    pub fast_cadence_low: Bytes,
    /// High bound of the fast cadence range
    pub fast_cadence_high: Bytes,
}

impl Codec for SensorCadence {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        if self.fast_cadence_period_divisor > 0x7f {
            return Err(invalid(
                "fast cadence period divisor",
                self.fast_cadence_period_divisor,
            ));
        }
        let width = value_width(self.property_id)?;
        self.property_id.encode(buf)?;
        match &self.trigger {
            StatusTrigger::Value {
                delta_down,
                delta_up,
            } => {
                buf.put_u8(self.fast_cadence_period_divisor);
                put_sized(buf, "trigger delta down", delta_down, width)?;
                put_sized(buf, "trigger delta up", delta_up, width)?;
            }
            StatusTrigger::Percent {
                delta_down,
                delta_up,
            } => {
                buf.put_u8(0x80 | self.fast_cadence_period_divisor);
                buf.put_u16_le(*delta_down);
                buf.put_u16_le(*delta_up);
            }
        }
        buf.put_u8(self.status_min_interval);
        put_sized(buf, "fast cadence low", &self.fast_cadence_low, width)?;
        put_sized(buf, "fast cadence high", &self.fast_cadence_high, width)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let width = value_width(property_id)?;
        let packed = get_u8(buf)?;
        let trigger = if packed & 0x80 == 0 {
            StatusTrigger::Value {
                delta_down: get_bytes(buf, width)?,
                delta_up: get_bytes(buf, width)?,
            }
        } else {
            StatusTrigger::Percent {
                delta_down: get_u16(buf)?,
                delta_up: get_u16(buf)?,
            }
        };
        Ok(Self {
            property_id,
            fast_cadence_period_divisor: packed & 0x7f,
            trigger,
            status_min_interval: get_u8(buf)?,
            fast_cadence_low: get_bytes(buf, width)?,
            fast_cadence_high: get_bytes(buf, width)?,
        })
    }
}

/// Cadence state, or the property whose cadence is not supported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCadenceStatus {
    /// Cadence in effect
    Cadence(SensorCadence),
    /// Cadence not supported for the property
    NotSupported(PropertyId),
}

impl Codec for SensorCadenceStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            Self::Cadence(cadence) => cadence.encode(buf),
            Self::NotSupported(property_id) => property_id.encode(buf),
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        if buf.remaining() == 2 {
            return PropertyId::decode(buf).map(Self::NotSupported);
        }
        SensorCadence::decode(buf).map(Self::Cadence)
    }
}

/// Settings available for a sensor property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSettings {
    /// Sensor property
    pub property_id: PropertyId,
    /// Setting properties
    pub setting_property_ids: Vec<PropertyId>,
}

impl Codec for SensorSettings {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        self.setting_property_ids.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            property_id: PropertyId::decode(buf)?,
            setting_property_ids: Vec::decode(buf)?,
        })
    }
}

/// Sensor and setting property pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSettingGet {
    /// Sensor property
    pub property_id: PropertyId,
    /// Setting property
    pub setting_property_id: PropertyId,
}

impl Codec for SensorSettingGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        self.setting_property_id.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            property_id: PropertyId::decode(buf)?,
            setting_property_id: PropertyId::decode(buf)?,
        })
    }
}

/// New value of a sensor setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettingSet {
    /// Sensor property
    pub property_id: PropertyId,
    /// Setting property
    pub setting_property_id: PropertyId,
    /// Setting value
    pub value: PropertyValue,
}

impl Codec for SensorSettingSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        self.setting_property_id.encode(buf)?;
        self.value.encode(self.setting_property_id, buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let setting_property_id = PropertyId::decode(buf)?;
        Ok(Self {
            property_id,
            setting_property_id,
            value: PropertyValue::decode(setting_property_id, buf)?,
        })
    }
}

/// Access and value of an existing setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettingState {
    /// Access rights
    pub access: SensorSettingAccess,
    /// Setting value
    pub value: PropertyValue,
}

/// Setting state, absent when the setting does not exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettingStatus {
    /// Sensor property
    pub property_id: PropertyId,
    /// Setting property
    pub setting_property_id: PropertyId,
    /// Access and value
    pub setting: Option<SensorSettingState>,
}

impl Codec for SensorSettingStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.property_id.encode(buf)?;
        self.setting_property_id.encode(buf)?;
        if let Some(setting) = &self.setting {
            setting.access.encode(buf)?;
            setting.value.encode(self.setting_property_id, buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let property_id = PropertyId::decode(buf)?;
        let setting_property_id = PropertyId::decode(buf)?;
        let setting = if buf.has_remaining() {
            Some(SensorSettingState {
                access: SensorSettingAccess::decode(buf)?,
                value: PropertyValue::decode(setting_property_id, buf)?,
            })
        } else {
            None
        };
        Ok(Self {
            property_id,
            setting_property_id,
            setting,
        })
    }
}

access_messages! {
    /// Sensor opcodes, setup opcodes included
    opcode SensorOpcode;
    /// Sensor messages
    message SensorMessage {
        /// Sensor descriptors
        DescriptorStatus(SensorDescriptorStatus) = 0x51,
        /// Sensor readings
        Status(Vec<SensorData>) = 0x52,
        /// Column state
        ColumnStatus(SensorColumnStatus) = 0x53,
        /// Series state
        SeriesStatus(SensorSeriesStatus) = 0x54,
        /// Set cadence
        CadenceSet(SensorCadence) = 0x55,
        /// Set cadence without acknowledgement
        CadenceSetUnacknowledged(SensorCadence) = 0x56,
        /// Cadence state
        CadenceStatus(SensorCadenceStatus) = 0x57,
        /// Setting properties of a sensor
        SettingsStatus(SensorSettings) = 0x58,
        /// Set a setting
        SettingSet(SensorSettingSet) = 0x59,
        /// Set a setting without acknowledgement
        SettingSetUnacknowledged(SensorSettingSet) = 0x5a,
        /// Setting state
        SettingStatus(SensorSettingStatus) = 0x5b,
        /// Read descriptors of one or all sensors
        DescriptorGet(Option<PropertyId>) = 0x8230,
        /// Read one or all sensors
        Get(Option<PropertyId>) = 0x8231,
        /// Read a column
        ColumnGet(SensorColumnGet) = 0x8232,
        /// Read a series
        SeriesGet(SensorSeriesGet) = 0x8233,
        /// Read cadence
        CadenceGet(PropertyId) = 0x8234,
        /// Read setting properties
        SettingsGet(PropertyId) = 0x8235,
        /// Read a setting
        SettingGet(SensorSettingGet) = 0x8236,
    }
}
