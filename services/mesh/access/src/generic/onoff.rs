//! Generic OnOff model.

use super::{StateSet, StateStatus};

access_messages! {
    /// Generic OnOff opcodes
    opcode GenericOnOffOpcode;
    /// Generic OnOff messages
    message GenericOnOffMessage {
        /// Read the OnOff state
        Get = 0x8201,
        /// Set the OnOff state
        Set(StateSet<u8>) = 0x8202,
        /// Set the OnOff state without acknowledgement
        SetUnacknowledged(StateSet<u8>) = 0x8203,
        /// OnOff state
        Status(StateStatus<u8>) = 0x8204,
    }
}
