//! Light CTL and Light CTL Setup models.
//!
//! Temperature is in kelvin, 800..=20000; delta UV is a signed 16-bit
//! distance from the black body curve.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::{Range, RangeStatus};
use crate::codec::{get_i16, get_u16, Codec};
use crate::error::AccessResult;
use crate::generic::{StateSet, StateStatus};

/// Lightness, temperature and delta UV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlState {
    /// Lightness
    pub lightness: u16,
    /// Color temperature
    pub temperature: u16,
    /// Delta UV
    pub delta_uv: i16,
}

impl Codec for CtlState {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.lightness);
        buf.put_u16_le(self.temperature);
        buf.put_i16_le(self.delta_uv);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            lightness: get_u16(buf)?,
            temperature: get_u16(buf)?,
            delta_uv: get_i16(buf)?,
        })
    }
}

/// Lightness and temperature reported by a CTL status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlPresent {
    /// Lightness
    pub lightness: u16,
    /// Color temperature
    pub temperature: u16,
}

impl Codec for CtlPresent {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.lightness);
        buf.put_u16_le(self.temperature);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            lightness: get_u16(buf)?,
            temperature: get_u16(buf)?,
        })
    }
}

/// Temperature and delta UV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlTemperature {
    /// Color temperature
    pub temperature: u16,
    /// Delta UV
    pub delta_uv: i16,
}

impl Codec for CtlTemperature {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.temperature);
        buf.put_i16_le(self.delta_uv);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            temperature: get_u16(buf)?,
            delta_uv: get_i16(buf)?,
        })
    }
}

access_messages! {
    /// Light CTL opcodes, setup opcodes included
    opcode LightCtlOpcode;
    /// Light CTL messages
    message LightCtlMessage {
        /// Read CTL state
        Get = 0x825d,
        /// Set CTL state
        Set(StateSet<CtlState>) = 0x825e,
        /// Set CTL state without acknowledgement
        SetUnacknowledged(StateSet<CtlState>) = 0x825f,
        /// CTL state
        Status(StateStatus<CtlPresent>) = 0x8260,
        /// Read CTL temperature
        TemperatureGet = 0x8261,
        /// Read CTL temperature range
        TemperatureRangeGet = 0x8262,
        /// CTL temperature range
        TemperatureRangeStatus(RangeStatus<Range>) = 0x8263,
        /// Set CTL temperature
        TemperatureSet(StateSet<CtlTemperature>) = 0x8264,
        /// Set CTL temperature without acknowledgement
        TemperatureSetUnacknowledged(StateSet<CtlTemperature>) = 0x8265,
        /// CTL temperature
        TemperatureStatus(StateStatus<CtlTemperature>) = 0x8266,
        /// Read default CTL state
        DefaultGet = 0x8267,
        /// Default CTL state
        DefaultStatus(CtlState) = 0x8268,
        /// Set default CTL state
        DefaultSet(CtlState) = 0x8269,
        /// Set default CTL state without acknowledgement
        DefaultSetUnacknowledged(CtlState) = 0x826a,
        /// Set CTL temperature range
        TemperatureRangeSet(Range) = 0x826b,
        /// Set CTL temperature range without acknowledgement
        TemperatureRangeSetUnacknowledged(Range) = 0x826c,
    }
}
