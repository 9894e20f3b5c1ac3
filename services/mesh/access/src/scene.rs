//! Scene and Scene Setup models.
//!
//! Scene number 0 is prohibited in recall and store requests; status
//! messages use it for "no scene".

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::adapters::{KnownTransitionTime, Transition};
use crate::codec::{get_u16, get_u8, invalid, Codec};
use crate::error::AccessResult;

mesh_enum! {
    /// Scene operation status
    pub enum SceneStatusCode: u8 {
        /// Success
        Success = 0x00,
        /// Scene register full
        RegisterFull = 0x01,
        /// Scene not found
        NotFound = 0x02,
    }
}

/// Non-zero scene number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneNumber(pub u16);

impl Codec for SceneNumber {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        if self.0 == 0 {
            return Err(invalid("scene number", 0));
        }
        buf.put_u16_le(self.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        match get_u16(buf)? {
            0 => Err(invalid("scene number", 0)),
            scene => Ok(Self(scene)),
        }
    }
}

/// Scene recall request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecall {
    /// Scene to recall
    pub scene_number: SceneNumber,
    /// Transaction identifier
    pub tid: u8,
    /// Transition time and delay
    pub transition: Option<Transition>,
}

impl Codec for SceneRecall {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.scene_number.encode(buf)?;
        buf.put_u8(self.tid);
        self.transition.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            scene_number: SceneNumber::decode(buf)?,
            tid: get_u8(buf)?,
            transition: Option::decode(buf)?,
        })
    }
}

/// Scene being transitioned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTarget {
    /// Target scene
    pub target_scene: u16,
    /// Time left until the target scene is reached
    pub remaining_time: KnownTransitionTime,
}

impl Codec for SceneTarget {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.target_scene);
        self.remaining_time.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            target_scene: get_u16(buf)?,
            remaining_time: KnownTransitionTime::decode(buf)?,
        })
    }
}

/// Current scene and an optional transition target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStatus {
    /// Status code
    pub status_code: SceneStatusCode,
    /// Current scene, 0 for none
    pub current_scene: u16,
    /// Target while a transition is running
    pub target: Option<SceneTarget>,
}

impl Codec for SceneStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status_code.encode(buf)?;
        buf.put_u16_le(self.current_scene);
        self.target.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status_code: SceneStatusCode::decode(buf)?,
            current_scene: get_u16(buf)?,
            target: Option::decode(buf)?,
        })
    }
}

/// Scene register contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRegisterStatus {
    /// Status code
    pub status_code: SceneStatusCode,
    /// Current scene, 0 for none
    pub current_scene: u16,
    /// Stored scene numbers
    pub scenes: Vec<u16>,
}

impl Codec for SceneRegisterStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status_code.encode(buf)?;
        buf.put_u16_le(self.current_scene);
        self.scenes.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status_code: SceneStatusCode::decode(buf)?,
            current_scene: get_u16(buf)?,
            scenes: Vec::decode(buf)?,
        })
    }
}

access_messages! {
    /// Scene opcodes, setup opcodes included
    opcode SceneOpcode;
    /// Scene messages
    message SceneMessage {
        /// Current scene
        Status(SceneStatus) = 0x5e,
        /// Read current scene
        Get = 0x8241,
        /// Recall a scene
        Recall(SceneRecall) = 0x8242,
        /// Recall a scene without acknowledgement
        RecallUnacknowledged(SceneRecall) = 0x8243,
        /// Read the scene register
        RegisterGet = 0x8244,
        /// Scene register
        RegisterStatus(SceneRegisterStatus) = 0x8245,
        /// Store the current state as a scene
        Store(SceneNumber) = 0x8246,
        /// Store a scene without acknowledgement
        StoreUnacknowledged(SceneNumber) = 0x8247,
        /// Delete a scene
        Delete(u16) = 0x829e,
        /// Delete a scene without acknowledgement
        DeleteUnacknowledged(u16) = 0x829f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Delay, StepResolution, TransitionTime};

    fn roundtrip(hex_str: &str) -> SceneMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = SceneMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_recall() {
        assert_eq!(
            roundtrip("824201001e"),
            SceneMessage::Recall(SceneRecall {
                scene_number: SceneNumber(1),
                tid: 30,
                transition: None,
            })
        );
        assert_eq!(
            roundtrip("824301001ef23c"),
            SceneMessage::RecallUnacknowledged(SceneRecall {
                scene_number: SceneNumber(1),
                tid: 30,
                transition: Some(Transition::new(
                    TransitionTime::new(StepResolution::Minutes10, 50),
                    Delay(0x3c)
                )),
            })
        );
    }

    #[test]
    fn test_prohibited_scene_number() {
        let recall = SceneRecall {
            scene_number: SceneNumber(0),
            tid: 30,
            transition: None,
        };
        assert!(SceneMessage::Recall(recall).to_bytes().is_err());
        assert!(SceneMessage::Store(SceneNumber(0)).to_bytes().is_err());

        let raw = hex::decode("82460000").unwrap();
        assert!(SceneMessage::decode(&mut Bytes::from(raw)).is_err());

        assert_eq!(roundtrip("829e0000"), SceneMessage::Delete(0));
    }

    #[test]
    fn test_status() {
        assert_eq!(
            roundtrip("5e000100"),
            SceneMessage::Status(SceneStatus {
                status_code: SceneStatusCode::Success,
                current_scene: 1,
                target: None,
            })
        );

        let SceneMessage::Status(status) = roundtrip("5e0001000200f2") else {
            panic!("expected status");
        };
        let target = status.target.unwrap();
        assert_eq!(target.target_scene, 2);
        assert_eq!(
            target.remaining_time.0.duration(),
            Some(std::time::Duration::from_secs(30000))
        );
    }

    #[test]
    fn test_register_status() {
        let raw = format!("824500010001000200{}", "0000".repeat(14));
        let SceneMessage::RegisterStatus(register) = roundtrip(&raw) else {
            panic!("expected register status");
        };
        assert_eq!(register.scenes.len(), 16);
        assert_eq!(&register.scenes[..3], &[1, 2, 0]);

        assert_eq!(
            roundtrip("8245020000"),
            SceneMessage::RegisterStatus(SceneRegisterStatus {
                status_code: SceneStatusCode::NotFound,
                current_scene: 0,
                scenes: vec![],
            })
        );
    }
}
