//! Generic Battery model.
//!
//! ```text
//! [level:8][time_to_discharge:24][time_to_charge:24][flags:8]
//! flags: [serviceability:2][charging:2][indicator:2][presence:2]
//! ```
//!
//! All-ones values of the level and time fields mean "unknown".

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u24, get_u8, invalid, put_u24, Codec};
use crate::error::AccessResult;

const UNKNOWN_LEVEL: u8 = 0xff;
const UNKNOWN_TIME: u32 = 0xff_ffff;

mesh_enum! {
    /// Battery presence
    pub enum BatteryPresence: u8 {
        /// Not present
        NotPresent = 0b00,
        /// Present and removable
        PresentRemovable = 0b01,
        /// Present and not removable
        PresentNonRemovable = 0b10,
        /// Unknown
        Unknown = 0b11,
    }
}

mesh_enum! {
    /// Battery charge level indicator
    pub enum BatteryIndicator: u8 {
        /// Critically low
        CriticallyLow = 0b00,
        /// Low
        Low = 0b01,
        /// Good
        Good = 0b10,
        /// Unknown
        Unknown = 0b11,
    }
}

mesh_enum! {
    /// Battery charging state
    pub enum BatteryCharging: u8 {
        /// Not chargeable
        NotChargeable = 0b00,
        /// Chargeable, not charging
        NotCharging = 0b01,
        /// Charging
        Charging = 0b10,
        /// Unknown
        Unknown = 0b11,
    }
}

mesh_enum! {
    /// Battery serviceability
    pub enum BatteryServiceability: u8 {
        /// Reserved
        Rfu = 0b00,
        /// No service required
        NotRequired = 0b01,
        /// Service required
        Required = 0b10,
        /// Unknown
        Unknown = 0b11,
    }
}

/// Packed battery state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryFlags {
    /// Presence
    pub presence: BatteryPresence,
    /// Charge indicator
    pub indicator: BatteryIndicator,
    /// Charging state
    pub charging: BatteryCharging,
    /// Serviceability
    pub serviceability: BatteryServiceability,
}

impl Codec for BatteryFlags {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(
            (u8::from(self.serviceability) << 6)
                | (u8::from(self.charging) << 4)
                | (u8::from(self.indicator) << 2)
                | u8::from(self.presence),
        );
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let value = get_u8(buf)?;
        Ok(Self {
            presence: BatteryPresence::try_from(value & 0b11)?,
            indicator: BatteryIndicator::try_from((value >> 2) & 0b11)?,
            charging: BatteryCharging::try_from((value >> 4) & 0b11)?,
            serviceability: BatteryServiceability::try_from(value >> 6)?,
        })
    }
}

/// Battery status, `None` where the node reports an unknown value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Charge level in percent
    pub battery_level: Option<u8>,
    /// Minutes until discharged
    pub time_to_discharge: Option<u32>,
    /// Minutes until charged
    pub time_to_charge: Option<u32>,
    /// State flags
    pub flags: BatteryFlags,
}

fn put_time(buf: &mut BytesMut, what: &str, value: Option<u32>) -> AccessResult<()> {
    match value {
        Some(UNKNOWN_TIME) => Err(invalid(what, UNKNOWN_TIME)),
        Some(minutes) => put_u24(buf, minutes),
        None => put_u24(buf, UNKNOWN_TIME),
    }
}

fn get_time(buf: &mut Bytes) -> AccessResult<Option<u32>> {
    Ok(Some(get_u24(buf)?).filter(|minutes| *minutes != UNKNOWN_TIME))
}

impl Codec for BatteryStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self.battery_level {
            Some(UNKNOWN_LEVEL) => return Err(invalid("battery level", UNKNOWN_LEVEL)),
            level => buf.put_u8(level.unwrap_or(UNKNOWN_LEVEL)),
        }
        put_time(buf, "time to discharge", self.time_to_discharge)?;
        put_time(buf, "time to charge", self.time_to_charge)?;
        self.flags.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            battery_level: Some(get_u8(buf)?).filter(|level| *level != UNKNOWN_LEVEL),
            time_to_discharge: get_time(buf)?,
            time_to_charge: get_time(buf)?,
            flags: BatteryFlags::decode(buf)?,
        })
    }
}

access_messages! {
    /// Generic Battery opcodes
    opcode GenericBatteryOpcode;
    /// Generic Battery messages
    message GenericBatteryMessage {
        /// Read the battery state
        Get = 0x8223,
        /// Battery state
        Status(BatteryStatus) = 0x8224,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(hex_str: &str) -> GenericBatteryMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = GenericBatteryMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_status() {
        let message = roundtrip("822432b40000fefe0062");
        assert_eq!(
            message,
            GenericBatteryMessage::Status(BatteryStatus {
                battery_level: Some(50),
                time_to_discharge: Some(0xb4),
                time_to_charge: Some(0xfefe),
                flags: BatteryFlags {
                    presence: BatteryPresence::PresentNonRemovable,
                    indicator: BatteryIndicator::CriticallyLow,
                    charging: BatteryCharging::Charging,
                    serviceability: BatteryServiceability::NotRequired,
                },
            })
        );
    }

    #[test]
    fn test_status_unknown_values() {
        let GenericBatteryMessage::Status(status) = roundtrip("8224ffbbaa00ffffffdb") else {
            panic!("expected status");
        };
        assert_eq!(status.battery_level, None);
        assert_eq!(status.time_to_discharge, Some(0xaabb));
        assert_eq!(status.time_to_charge, None);
        assert_eq!(status.flags.presence, BatteryPresence::Unknown);
        assert_eq!(status.flags.indicator, BatteryIndicator::Good);
        assert_eq!(status.flags.charging, BatteryCharging::NotCharging);
        assert_eq!(status.flags.serviceability, BatteryServiceability::Unknown);
    }

    #[test]
    fn test_reserved_marker_not_encodable() {
        let mut status = BatteryStatus {
            battery_level: Some(0xff),
            time_to_discharge: None,
            time_to_charge: None,
            flags: BatteryFlags {
                presence: BatteryPresence::Unknown,
                indicator: BatteryIndicator::Unknown,
                charging: BatteryCharging::Unknown,
                serviceability: BatteryServiceability::Unknown,
            },
        };
        assert!(GenericBatteryMessage::Status(status).to_bytes().is_err());

        status.battery_level = Some(100);
        status.time_to_charge = Some(UNKNOWN_TIME);
        assert!(GenericBatteryMessage::Status(status).to_bytes().is_err());
    }
}
