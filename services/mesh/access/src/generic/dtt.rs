//! Generic Default Transition Time model.

use crate::adapters::KnownTransitionTime;

access_messages! {
    /// Generic Default Transition Time opcodes
    opcode GenericDefaultTransitionTimeOpcode;
    /// Generic Default Transition Time messages
    message GenericDefaultTransitionTimeMessage {
        /// Read the default transition time
        Get = 0x820d,
        /// Set the default transition time
        Set(KnownTransitionTime) = 0x820e,
        /// Set the default transition time without acknowledgement
        SetUnacknowledged(KnownTransitionTime) = 0x820f,
        /// Default transition time
        Status(KnownTransitionTime) = 0x8210,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::adapters::{StepResolution, TransitionTime};

    fn decode(hex_str: &str) -> crate::error::AccessResult<GenericDefaultTransitionTimeMessage> {
        GenericDefaultTransitionTimeMessage::decode(&mut Bytes::from(hex::decode(hex_str).unwrap()))
    }

    #[test]
    fn test_set() {
        assert_eq!(
            decode("820e00").unwrap(),
            GenericDefaultTransitionTimeMessage::Set(KnownTransitionTime(TransitionTime::IMMEDIATE))
        );

        let GenericDefaultTransitionTimeMessage::Set(KnownTransitionTime(tt)) =
            decode("820e3e").unwrap()
        else {
            panic!("expected set");
        };
        assert_eq!(tt.duration(), Some(Duration::from_millis(6200)));

        let message = GenericDefaultTransitionTimeMessage::SetUnacknowledged(KnownTransitionTime(
            TransitionTime::new(StepResolution::Seconds10, 8),
        ));
        assert_eq!(hex::encode(message.to_bytes().unwrap()), "820f88");
    }

    #[test]
    fn test_unknown_rejected() {
        assert!(decode("82103f").is_err());
        assert!(decode("8210fe").is_ok());

        let unknown = KnownTransitionTime(TransitionTime::UNKNOWN);
        let message = GenericDefaultTransitionTimeMessage::Status(unknown);
        assert!(message.to_bytes().is_err());
    }
}
