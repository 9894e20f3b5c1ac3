//! Light Lightness and Light Lightness Setup models.

use super::{Range, RangeStatus};
use crate::generic::{StateSet, StateStatus};

access_messages! {
    /// Light Lightness opcodes, setup opcodes included
    opcode LightLightnessOpcode;
    /// Light Lightness messages
    message LightLightnessMessage {
        /// Read perceived lightness
        Get = 0x824b,
        /// Set perceived lightness
        Set(StateSet<u16>) = 0x824c,
        /// Set perceived lightness without acknowledgement
        SetUnacknowledged(StateSet<u16>) = 0x824d,
        /// Perceived lightness
        Status(StateStatus<u16>) = 0x824e,
        /// Read linear lightness
        LinearGet = 0x824f,
        /// Set linear lightness
        LinearSet(StateSet<u16>) = 0x8250,
        /// Set linear lightness without acknowledgement
        LinearSetUnacknowledged(StateSet<u16>) = 0x8251,
        /// Linear lightness
        LinearStatus(StateStatus<u16>) = 0x8252,
        /// Read last non-zero lightness
        LastGet = 0x8253,
        /// Last non-zero lightness
        LastStatus(u16) = 0x8254,
        /// Read default lightness
        DefaultGet = 0x8255,
        /// Default lightness
        DefaultStatus(u16) = 0x8256,
        /// Read lightness range
        RangeGet = 0x8257,
        /// Lightness range
        RangeStatus(RangeStatus<Range>) = 0x8258,
        /// Set default lightness
        DefaultSet(u16) = 0x8259,
        /// Set default lightness without acknowledgement
        DefaultSetUnacknowledged(u16) = 0x825a,
        /// Set lightness range
        RangeSet(Range) = 0x825b,
        /// Set lightness range without acknowledgement
        RangeSetUnacknowledged(Range) = 0x825c,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::adapters::{Delay, StepResolution, Transition, TransitionTime};
    use crate::config::StatusCode;
    use crate::generic::Target;

    fn roundtrip(hex_str: &str) -> LightLightnessMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = LightLightnessMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_set() {
        assert_eq!(
            roundtrip("824cbbaa22"),
            LightLightnessMessage::Set(StateSet::new(0xaabb, 0x22))
        );
        assert_eq!(
            roundtrip("824d000031323c"),
            LightLightnessMessage::SetUnacknowledged(StateSet {
                state: 0,
                tid: 0x31,
                transition: Some(Transition::new(
                    TransitionTime::new(StepResolution::Milliseconds100, 50),
                    Delay(0x3c)
                )),
            })
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(
            roundtrip("824e4400"),
            LightLightnessMessage::Status(StateStatus::steady(0x44))
        );
        assert_eq!(
            roundtrip("824e000031c80f"),
            LightLightnessMessage::Status(StateStatus {
                present: 0,
                target: Some(Target::new(
                    0xc831,
                    TransitionTime::new(StepResolution::Milliseconds100, 15)
                )),
            })
        );
        assert!(matches!(
            roundtrip("82520000ddbb4c"),
            LightLightnessMessage::LinearStatus(_)
        ));
    }

    #[test]
    fn test_range() {
        assert_eq!(
            roundtrip("82580011118888"),
            LightLightnessMessage::RangeStatus(RangeStatus {
                status: StatusCode::Success,
                range: Range::new(0x1111, 0x8888),
            })
        );
        assert_eq!(
            roundtrip("825ccdab3412"),
            LightLightnessMessage::RangeSetUnacknowledged(Range::new(0xabcd, 0x1234))
        );
    }

    #[test]
    fn test_default() {
        assert_eq!(roundtrip("8259bbaa"), LightLightnessMessage::DefaultSet(0xaabb));
        assert_eq!(roundtrip("82560000"), LightLightnessMessage::DefaultStatus(0));
        assert_eq!(roundtrip("8253"), LightLightnessMessage::LastGet);
    }
}
