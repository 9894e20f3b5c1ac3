//! Generic Level model.
//!
//! Level and move values are signed 16-bit; delta values are signed 32-bit
//! so a delta can span the whole level range.

use super::{StateSet, StateStatus};

access_messages! {
    /// Generic Level opcodes
    opcode GenericLevelOpcode;
    /// Generic Level messages
    message GenericLevelMessage {
        /// Read the level
        Get = 0x8205,
        /// Set the level
        Set(StateSet<i16>) = 0x8206,
        /// Set the level without acknowledgement
        SetUnacknowledged(StateSet<i16>) = 0x8207,
        /// Level state
        Status(StateStatus<i16>) = 0x8208,
        /// Change the level by a delta
        DeltaSet(StateSet<i32>) = 0x8209,
        /// Change the level by a delta without acknowledgement
        DeltaSetUnacknowledged(StateSet<i32>) = 0x820a,
        /// Start moving the level at a rate of delta per transition time
        MoveSet(StateSet<i16>) = 0x820b,
        /// Start moving the level without acknowledgement
        MoveSetUnacknowledged(StateSet<i16>) = 0x820c,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn roundtrip(hex_str: &str) -> GenericLevelMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = GenericLevelMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_level_set_bounds() {
        assert_eq!(
            roundtrip("8206ff7f22"),
            GenericLevelMessage::Set(StateSet::new(i16::MAX, 0x22))
        );
        assert_eq!(
            roundtrip("8206008022"),
            GenericLevelMessage::Set(StateSet::new(i16::MIN, 0x22))
        );
        let GenericLevelMessage::SetUnacknowledged(set) = roundtrip("8207000031323c") else {
            panic!("expected set");
        };
        assert!(set.transition.is_some());
    }

    #[test]
    fn test_delta_set() {
        assert_eq!(
            roundtrip("8209ffffff7f22"),
            GenericLevelMessage::DeltaSet(StateSet::new(i32::MAX, 0x22))
        );
        assert_eq!(
            roundtrip("82090000008022"),
            GenericLevelMessage::DeltaSet(StateSet::new(i32::MIN, 0x22))
        );
    }

    #[test]
    fn test_move_set() {
        assert_eq!(
            roundtrip("820b010022"),
            GenericLevelMessage::MoveSet(StateSet::new(1, 0x22))
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(
            roundtrip("8208ff7f"),
            GenericLevelMessage::Status(StateStatus::steady(i16::MAX))
        );
        let GenericLevelMessage::Status(status) = roundtrip("82080000ff004a") else {
            panic!("expected status");
        };
        assert_eq!(status.target.unwrap().target, 0x00ff);
    }

    #[test]
    fn test_status_partial_target_is_incomplete() {
        let raw = hex::decode("82080000ff00").unwrap();
        assert!(GenericLevelMessage::decode(&mut Bytes::from(raw)).is_err());
    }
}
