//! Light HSL and Light HSL Setup models.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::RangeStatus;
use crate::adapters::TransitionTime;
use crate::codec::{get_u16, Codec};
use crate::error::AccessResult;
use crate::generic::{StateSet, StateStatus};

/// Lightness, hue and saturation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HslState {
    /// Lightness
    pub lightness: u16,
    /// Hue
    pub hue: u16,
    /// Saturation
    pub saturation: u16,
}

impl Codec for HslState {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.lightness);
        buf.put_u16_le(self.hue);
        buf.put_u16_le(self.saturation);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            lightness: get_u16(buf)?,
            hue: get_u16(buf)?,
            saturation: get_u16(buf)?,
        })
    }
}

/// HSL state with the remaining transition time, when one is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HslStatus {
    /// Present or target state
    #[serde(flatten)]
    pub state: HslState,
    /// Remaining transition time
    pub remaining_time: Option<TransitionTime>,
}

impl Codec for HslStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.state.encode(buf)?;
        self.remaining_time.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            state: HslState::decode(buf)?,
            remaining_time: Option::decode(buf)?,
        })
    }
}

/// Hue and saturation ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HslRange {
    /// Lowest hue
    pub hue_range_min: u16,
    /// Highest hue
    pub hue_range_max: u16,
    /// Lowest saturation
    pub saturation_range_min: u16,
    /// Highest saturation
    pub saturation_range_max: u16,
}

impl Codec for HslRange {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        for value in [
            self.hue_range_min,
            self.hue_range_max,
            self.saturation_range_min,
            self.saturation_range_max,
        ] {
            buf.put_u16_le(value);
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            hue_range_min: get_u16(buf)?,
            hue_range_max: get_u16(buf)?,
            saturation_range_min: get_u16(buf)?,
            saturation_range_max: get_u16(buf)?,
        })
    }
}

access_messages! {
    /// Light HSL opcodes, setup opcodes included
    opcode LightHslOpcode;
    /// Light HSL messages
    message LightHslMessage {
        /// Read HSL state
        Get = 0x826d,
        /// Read hue
        HueGet = 0x826e,
        /// Set hue
        HueSet(StateSet<u16>) = 0x826f,
        /// Set hue without acknowledgement
        HueSetUnacknowledged(StateSet<u16>) = 0x8270,
        /// Hue
        HueStatus(StateStatus<u16>) = 0x8271,
        /// Read saturation
        SaturationGet = 0x8272,
        /// Set saturation
        SaturationSet(StateSet<u16>) = 0x8273,
        /// Set saturation without acknowledgement
        SaturationSetUnacknowledged(StateSet<u16>) = 0x8274,
        /// Saturation
        SaturationStatus(StateStatus<u16>) = 0x8275,
        /// Set HSL state
        Set(StateSet<HslState>) = 0x8276,
        /// Set HSL state without acknowledgement
        SetUnacknowledged(StateSet<HslState>) = 0x8277,
        /// Present HSL state
        Status(HslStatus) = 0x8278,
        /// Read target HSL state
        TargetGet = 0x8279,
        /// Target HSL state
        TargetStatus(HslStatus) = 0x827a,
        /// Read default HSL state
        DefaultGet = 0x827b,
        /// Default HSL state
        DefaultStatus(HslState) = 0x827c,
        /// Read hue and saturation ranges
        RangeGet = 0x827d,
        /// Hue and saturation ranges
        RangeStatus(RangeStatus<HslRange>) = 0x827e,
        /// Set default HSL state
        DefaultSet(HslState) = 0x827f,
        /// Set default HSL state without acknowledgement
        DefaultSetUnacknowledged(HslState) = 0x8280,
        /// Set hue and saturation ranges
        RangeSet(HslRange) = 0x8281,
        /// Set hue and saturation ranges without acknowledgement
        RangeSetUnacknowledged(HslRange) = 0x8282,
    }
}
