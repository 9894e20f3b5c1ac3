//! Silvair vendor models.
//!
//! Every model uses a single three byte vendor opcode carrying the Silvair
//! company identifier; most multiplex their messages with a one byte
//! sub-opcode at the start of the parameters.

pub mod debug;
pub mod debug_v2;
pub mod gateway_config;
pub mod light_extended_controller;
pub mod network_diagnostic;
pub mod rrule_scheduler;

use debug::DebugPayload;
use debug_v2::DebugV2Params;
use emergency_lighting_test::EltPayload;
use gateway_config::GatewayConfigPayload;
use light_extended_controller::LecPayload;
use network_diagnostic::{NetworkDiagnosticPayload, NetworkDiagnosticSetupPayload};
use rrule_scheduler::RRuleSchedulerPayload;

/// Silvair Bluetooth SIG company identifier
pub const SILVAIR_COMPANY_ID: u16 = 0x0136;

access_messages! {
    /// Silvair vendor opcodes
    opcode SilvairOpcode;
    /// Silvair vendor messages
    message SilvairMessage {
        /// RRule scheduler
        RRuleScheduler(RRuleSchedulerPayload) = 0xe83601,
        /// Emergency lighting test
        EmergencyLightingTest(EltPayload) = 0xe93601,
        /// Debug, second revision
        DebugV2(DebugV2Params) = 0xeb3601,
        /// Gateway configuration
        GatewayConfig(GatewayConfigPayload) = 0xf03601,
        /// Debug
        Debug(DebugPayload) = 0xf53601,
        /// Light extended controller
        LightExtendedController(LecPayload) = 0xf63601,
        /// Network diagnostic server
        NetworkDiagnostic(NetworkDiagnosticPayload) = 0xfc3601,
        /// Network diagnostic setup server
        NetworkDiagnosticSetup(NetworkDiagnosticSetupPayload) = 0xfd3601,
    }
}

impl SilvairOpcode {
    /// Company identifier carried in the low two opcode bytes
    pub const fn company_id(self) -> u16 {
        let value = self.value();
        (((value & 0xff) << 8) | ((value >> 8) & 0xff)) as u16
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::error::AccessError;

    fn roundtrip(hex_str: &str) -> SilvairMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = SilvairMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_vendor_dispatch() {
        assert_eq!(
            roundtrip("f5360100"),
            SilvairMessage::Debug(DebugPayload::RssiThresholdGet)
        );
        assert_eq!(
            roundtrip("f6360108"),
            SilvairMessage::LightExtendedController(LecPayload::SyncIntegralGet)
        );
        assert_eq!(
            roundtrip("e836010c"),
            SilvairMessage::RRuleScheduler(RRuleSchedulerPayload::ListGet)
        );
        assert_eq!(
            roundtrip("fd360100"),
            SilvairMessage::NetworkDiagnosticSetup(NetworkDiagnosticSetupPayload::PublicationGet)
        );

        let SilvairMessage::DebugV2(params) = roundtrip("eb36010209000200102030") else {
            panic!("expected debug v2");
        };
        assert_eq!(params.values.len(), 1);
    }

    #[test]
    fn test_company_id() {
        for opcode in [
            SilvairOpcode::RRuleScheduler,
            SilvairOpcode::GatewayConfig,
            SilvairOpcode::NetworkDiagnosticSetup,
        ] {
            assert_eq!(opcode.company_id(), SILVAIR_COMPANY_ID);
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let raw = hex::decode("f536010001").unwrap();
        assert!(SilvairMessage::decode(&mut Bytes::from(raw)).is_err());

        let raw = hex::decode("f1360100").unwrap();
        assert!(matches!(
            SilvairMessage::decode(&mut Bytes::from(raw)),
            Err(AccessError::Opcode(0xf13601))
        ));
    }
}
