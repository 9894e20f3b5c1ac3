//! Bluetooth mesh access layer: opcodes and typed message parameters.
//!
//! Each model family is a closed opcode enum paired with a message enum
//! whose variants carry the parameters of that opcode. [`AccessMessage`]
//! routes a raw access payload to the family owning its opcode.
//!
//! ## Features
//!
//! - **Opcode Framing**: 1, 2 and 3 byte opcodes, vendor company identifiers
//! - **SIG Models**: Configuration, Health, Generic, Light, Scene, Sensor, Time and Scheduler
//! - **Device Properties**: Property identifiers with typed characteristic values
//! - **Vendor Models**: Silvair debug, gateway, diagnostic, controller and scheduler models
//! - **Strict Validation**: Enumerated fields, address kinds and ranges checked both ways
//! - **Serde Support**: Every message serializes with its opcode as a tag
//!
//! ## Wire Format
//!
//! ```text
//! +----------------------------+--------------------------------+
//! | opcode (1, 2 or 3 bytes)   | parameters (little endian)     |
//! +----------------------------+--------------------------------+
//! | 0xxxxxxx                   | SIG, single byte               |
//! | 10xxxxxx xxxxxxxx          | SIG, two bytes                 |
//! | 11xxxxxx cccccccc cccccccc | vendor, company id LE          |
//! +----------------------------+--------------------------------+
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

#[macro_use]
mod macros;

pub mod adapters;
pub mod codec;
pub mod config;
pub mod error;
pub mod generic;
pub mod health;
pub mod light;
pub mod opcode;
pub mod properties;
pub mod scene;
pub mod scheduler;
pub mod sensor;
pub mod silvair;
pub mod time;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigMessage, ConfigOpcode};
use crate::generic::{
    GenericBatteryMessage, GenericBatteryOpcode, GenericDefaultTransitionTimeMessage,
    GenericDefaultTransitionTimeOpcode, GenericLevelMessage, GenericLevelOpcode,
    GenericOnOffMessage, GenericOnOffOpcode, GenericPowerOnOffMessage, GenericPowerOnOffOpcode,
};
use crate::health::{HealthMessage, HealthOpcode};
use crate::light::ctl::{LightCtlMessage, LightCtlOpcode};
use crate::light::hsl::{LightHslMessage, LightHslOpcode};
use crate::light::lightness::{LightLightnessMessage, LightLightnessOpcode};
use crate::scene::{SceneMessage, SceneOpcode};
use crate::scheduler::{SchedulerMessage, SchedulerOpcode};
use crate::sensor::{SensorMessage, SensorOpcode};
use crate::silvair::{SilvairMessage, SilvairOpcode};
use crate::time::{TimeMessage, TimeOpcode};

// Re-export main types
pub use codec::Codec;
pub use error::{AccessError, AccessResult};
pub use opcode::{get_opcode, put_opcode, vendor_company};

/// Access message of any known family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "message", rename_all = "snake_case")]
pub enum AccessMessage {
    /// Configuration model
    Config(ConfigMessage),
    /// Health model
    Health(HealthMessage),
    /// Generic OnOff
    GenericOnOff(GenericOnOffMessage),
    /// Generic Level
    GenericLevel(GenericLevelMessage),
    /// Generic Default Transition Time
    GenericDefaultTransitionTime(GenericDefaultTransitionTimeMessage),
    /// Generic Power OnOff
    GenericPowerOnOff(GenericPowerOnOffMessage),
    /// Generic Battery
    GenericBattery(GenericBatteryMessage),
    /// Light Lightness
    LightLightness(LightLightnessMessage),
    /// Light CTL
    LightCtl(LightCtlMessage),
    /// Light HSL
    LightHsl(LightHslMessage),
    /// Scene
    Scene(SceneMessage),
    /// Sensor
    Sensor(SensorMessage),
    /// Time
    Time(TimeMessage),
    /// Scheduler
    Scheduler(SchedulerMessage),
    /// Silvair vendor models
    Silvair(SilvairMessage),
    /// Opcode no known family owns; parameters are kept as received
    Unknown {
        /// Raw opcode
        opcode: u32,
        /// Undecoded parameters
        params: Bytes,
    },
}

/// Try each family in turn; the first whose opcode enum accepts the value
/// decodes the parameters.
macro_rules! route {
    ($opcode:expr, $buf:expr, { $( $variant:ident: $family:ident => $message:ident, )+ }) => {
        $(
            if let Ok(opcode) = $family::try_from($opcode) {
                return $message::decode_params(opcode, $buf).map(AccessMessage::$variant);
            }
        )+
    };
}

impl AccessMessage {
    /// Decode an opcode and its parameters
    pub fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let opcode = get_opcode(buf)?;

        route!(opcode, buf, {
            Config: ConfigOpcode => ConfigMessage,
            Health: HealthOpcode => HealthMessage,
            GenericOnOff: GenericOnOffOpcode => GenericOnOffMessage,
            GenericLevel: GenericLevelOpcode => GenericLevelMessage,
            GenericDefaultTransitionTime:
                GenericDefaultTransitionTimeOpcode => GenericDefaultTransitionTimeMessage,
            GenericPowerOnOff: GenericPowerOnOffOpcode => GenericPowerOnOffMessage,
            GenericBattery: GenericBatteryOpcode => GenericBatteryMessage,
            LightLightness: LightLightnessOpcode => LightLightnessMessage,
            LightCtl: LightCtlOpcode => LightCtlMessage,
            LightHsl: LightHslOpcode => LightHslMessage,
            Scene: SceneOpcode => SceneMessage,
            Sensor: SensorOpcode => SensorMessage,
            Time: TimeOpcode => TimeMessage,
            Scheduler: SchedulerOpcode => SchedulerMessage,
            Silvair: SilvairOpcode => SilvairMessage,
        });

        debug!("unknown access opcode {opcode:#x}");
        Ok(AccessMessage::Unknown {
            opcode,
            params: buf.split_to(buf.len()),
        })
    }

    /// Numeric opcode of this message
    pub fn opcode(&self) -> u32 {
        match self {
            AccessMessage::Config(message) => message.opcode().value(),
            AccessMessage::Health(message) => message.opcode().value(),
            AccessMessage::GenericOnOff(message) => message.opcode().value(),
            AccessMessage::GenericLevel(message) => message.opcode().value(),
            AccessMessage::GenericDefaultTransitionTime(message) => message.opcode().value(),
            AccessMessage::GenericPowerOnOff(message) => message.opcode().value(),
            AccessMessage::GenericBattery(message) => message.opcode().value(),
            AccessMessage::LightLightness(message) => message.opcode().value(),
            AccessMessage::LightCtl(message) => message.opcode().value(),
            AccessMessage::LightHsl(message) => message.opcode().value(),
            AccessMessage::Scene(message) => message.opcode().value(),
            AccessMessage::Sensor(message) => message.opcode().value(),
            AccessMessage::Time(message) => message.opcode().value(),
            AccessMessage::Scheduler(message) => message.opcode().value(),
            AccessMessage::Silvair(message) => message.opcode().value(),
            AccessMessage::Unknown { opcode, .. } => *opcode,
        }
    }

    /// Encode the opcode followed by the parameters
    pub fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            AccessMessage::Config(message) => message.encode(buf),
            AccessMessage::Health(message) => message.encode(buf),
            AccessMessage::GenericOnOff(message) => message.encode(buf),
            AccessMessage::GenericLevel(message) => message.encode(buf),
            AccessMessage::GenericDefaultTransitionTime(message) => message.encode(buf),
            AccessMessage::GenericPowerOnOff(message) => message.encode(buf),
            AccessMessage::GenericBattery(message) => message.encode(buf),
            AccessMessage::LightLightness(message) => message.encode(buf),
            AccessMessage::LightCtl(message) => message.encode(buf),
            AccessMessage::LightHsl(message) => message.encode(buf),
            AccessMessage::Scene(message) => message.encode(buf),
            AccessMessage::Sensor(message) => message.encode(buf),
            AccessMessage::Time(message) => message.encode(buf),
            AccessMessage::Scheduler(message) => message.encode(buf),
            AccessMessage::Silvair(message) => message.encode(buf),
            AccessMessage::Unknown { opcode, params } => {
                put_opcode(*opcode, buf)?;
                buf.put_slice(params);
                Ok(())
            }
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> AccessResult<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{FaultStatus, FaultTest};

    fn roundtrip(hex_str: &str) -> AccessMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = AccessMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_health_dispatch() {
        assert_eq!(
            roundtrip("04003601030405"),
            AccessMessage::Health(HealthMessage::CurrentStatus(FaultStatus {
                test_id: 0,
                company_id: 0x0136,
                fault_array: vec![3, 4, 5],
            }))
        );
        let message = roundtrip("8032013601");
        assert_eq!(
            message,
            AccessMessage::Health(HealthMessage::FaultTest(FaultTest {
                test_id: 1,
                company_id: 0x0136,
            }))
        );
        assert_eq!(message.opcode(), 0x8032);
    }

    #[test]
    fn test_family_dispatch() {
        assert!(matches!(roundtrip("8201"), AccessMessage::GenericOnOff(_)));
        assert!(matches!(roundtrip("8249"), AccessMessage::Scheduler(_)));
        assert!(matches!(roundtrip("8237"), AccessMessage::Time(_)));
        assert!(matches!(roundtrip("f5360100"), AccessMessage::Silvair(_)));
    }

    #[test]
    fn test_unknown_opcode() {
        let message = roundtrip("c0112233");
        assert_eq!(
            message,
            AccessMessage::Unknown {
                opcode: 0xc01122,
                params: Bytes::from_static(&[0x33]),
            }
        );
        assert_eq!(message.opcode(), 0xc01122);
    }

    #[test]
    fn test_known_opcode_with_bad_params() {
        let raw = hex::decode("8032").unwrap();
        assert_eq!(
            AccessMessage::decode(&mut Bytes::from(raw)),
            Err(AccessError::Incomplete)
        );
    }

    #[test]
    fn test_json_shape() {
        let message = roundtrip("8201");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["family"], "generic_on_off");
        assert_eq!(json["message"]["opcode"], "get");
    }
}
