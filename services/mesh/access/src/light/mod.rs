//! Lighting models: Light Lightness, Light CTL and Light HSL, setup
//! messages included.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u16, Codec};
use crate::config::StatusCode;
use crate::error::AccessResult;

pub mod ctl;
pub mod hsl;
pub mod lightness;

pub use ctl::{LightCtlMessage, LightCtlOpcode};
pub use hsl::{LightHslMessage, LightHslOpcode};
pub use lightness::{LightLightnessMessage, LightLightnessOpcode};

/// Inclusive range of a 16-bit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound
    pub range_min: u16,
    /// Upper bound
    pub range_max: u16,
}

impl Range {
    /// Create a range
    pub fn new(range_min: u16, range_max: u16) -> Self {
        Self {
            range_min,
            range_max,
        }
    }
}

impl Codec for Range {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.range_min);
        buf.put_u16_le(self.range_max);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            range_min: get_u16(buf)?,
            range_max: get_u16(buf)?,
        })
    }
}

/// Result of a range set, with the range now in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeStatus<R> {
    /// Status code
    pub status: StatusCode,
    /// Range in effect
    #[serde(flatten)]
    pub range: R,
}

impl<R: Codec> Codec for RangeStatus<R> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.range.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            range: R::decode(buf)?,
        })
    }
}
