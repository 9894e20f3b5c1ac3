//! Silvair Light Extended Controller model, vendor opcode 0xF63601.
//!
//! Extends the Light LC controller with auto-resume properties and exposes
//! the controller's synchronisation integral.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u16, get_u24, get_u8, invalid, put_u24, Codec};
use crate::error::AccessResult;

mesh_enum! {
    /// Controller property identifier
    pub enum LecPropertyId: u16 {
        /// Resume automatic control after a manual override
        AutoResumeMode = 0xff71,
        /// Delay before resuming automatic control
        AutoResumeTimer = 0xff72,
    }
}

/// Controller property with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", content = "value", rename_all = "snake_case")]
pub enum LecProperty {
    /// Auto-resume enabled
    AutoResumeMode(bool),
    /// Auto-resume delay, millisecond resolution
    AutoResumeTimer(Duration),
}

impl LecProperty {
    /// Identifier of this property
    pub fn id(&self) -> LecPropertyId {
        match self {
            LecProperty::AutoResumeMode(_) => LecPropertyId::AutoResumeMode,
            LecProperty::AutoResumeTimer(_) => LecPropertyId::AutoResumeTimer,
        }
    }
}

impl Codec for LecProperty {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.id().encode(buf)?;
        match self {
            LecProperty::AutoResumeMode(enabled) => buf.put_u8(u8::from(*enabled)),
            LecProperty::AutoResumeTimer(timer) => {
                let millis = u32::try_from(timer.as_millis())
                    .map_err(|_| invalid("auto resume timer", format!("{timer:?}")))?;
                put_u24(buf, millis)?;
            }
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(match LecPropertyId::decode(buf)? {
            LecPropertyId::AutoResumeMode => LecProperty::AutoResumeMode(get_u8(buf)? != 0),
            LecPropertyId::AutoResumeTimer => {
                LecProperty::AutoResumeTimer(Duration::from_millis(u64::from(get_u24(buf)?)))
            }
        })
    }
}

/// Synchronisation integral of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncIntegral(pub u16);

impl Codec for SyncIntegral {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_u16(buf).map(Self)
    }
}

access_messages! {
    /// Light extended controller sub-opcodes
    subopcode LecSubOpcode;
    /// Light extended controller payloads
    payload LecPayload {
        /// Read a property
        PropertyGet(LecPropertyId) = 0x00,
        /// Write a property
        PropertySet(LecProperty) = 0x01,
        /// Write a property without acknowledgement
        PropertySetUnacknowledged(LecProperty) = 0x02,
        /// Property value
        PropertyStatus(LecProperty) = 0x03,
        /// Read the synchronisation integral
        SyncIntegralGet = 0x08,
        /// Synchronisation integral
        SyncIntegralStatus(SyncIntegral) = 0x09,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(hex_str: &str) -> LecPayload {
        let raw = hex::decode(hex_str).unwrap();
        let payload = LecPayload::decode(&mut Bytes::from(raw.clone())).unwrap();
        let mut buf = BytesMut::new();
        payload.encode(&mut buf).unwrap();
        assert_eq!(buf.to_vec(), raw);
        payload
    }

    #[test]
    fn test_properties() {
        assert_eq!(
            roundtrip("0071ff"),
            LecPayload::PropertyGet(LecPropertyId::AutoResumeMode)
        );
        assert_eq!(
            roundtrip("0171ff01"),
            LecPayload::PropertySet(LecProperty::AutoResumeMode(true))
        );
        assert_eq!(
            roundtrip("0272ff102700"),
            LecPayload::PropertySetUnacknowledged(LecProperty::AutoResumeTimer(
                Duration::from_secs(10)
            ))
        );
        assert_eq!(
            roundtrip("0372ff000000"),
            LecPayload::PropertyStatus(LecProperty::AutoResumeTimer(Duration::ZERO))
        );
    }

    #[test]
    fn test_sync_integral() {
        assert_eq!(roundtrip("08"), LecPayload::SyncIntegralGet);
        assert_eq!(roundtrip("093412"), LecPayload::SyncIntegralStatus(SyncIntegral(0x1234)));
    }

    #[test]
    fn test_timer_out_of_range() {
        let property = LecProperty::AutoResumeTimer(Duration::from_secs(20_000));
        assert!(property.encode(&mut BytesMut::new()).is_err());
        assert!(LecPayload::decode(&mut Bytes::from_static(&[0x00, 0x73, 0xff])).is_err());
    }
}
