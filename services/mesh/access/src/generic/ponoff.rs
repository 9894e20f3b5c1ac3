//! Generic Power OnOff and Power OnOff Setup models.

mesh_enum! {
    /// Element state after powering up
    pub enum OnPowerUp: u8 {
        /// Off
        Off = 0x00,
        /// Default state
        Default = 0x01,
        /// Last known state
        Restore = 0x02,
    }
}

access_messages! {
    /// Generic Power OnOff opcodes, setup opcodes included
    opcode GenericPowerOnOffOpcode;
    /// Generic Power OnOff messages
    message GenericPowerOnOffMessage {
        /// Read the OnPowerUp state
        Get = 0x8211,
        /// OnPowerUp state
        Status(OnPowerUp) = 0x8212,
        /// Set the OnPowerUp state
        Set(OnPowerUp) = 0x8213,
        /// Set the OnPowerUp state without acknowledgement
        SetUnacknowledged(OnPowerUp) = 0x8214,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::error::AccessError;

    #[test]
    fn test_set_and_status() {
        let message = GenericPowerOnOffMessage::Set(OnPowerUp::Restore);
        assert_eq!(hex::encode(message.to_bytes().unwrap()), "821302");

        let mut raw = Bytes::from_static(&[0x82, 0x12, 0x01]);
        assert_eq!(
            GenericPowerOnOffMessage::decode(&mut raw).unwrap(),
            GenericPowerOnOffMessage::Status(OnPowerUp::Default)
        );
    }

    #[test]
    fn test_invalid_state() {
        let mut raw = Bytes::from_static(&[0x82, 0x14, 0x03]);
        assert_eq!(
            GenericPowerOnOffMessage::decode(&mut raw),
            Err(AccessError::Enum {
                name: "OnPowerUp",
                value: 3
            })
        );
    }
}
