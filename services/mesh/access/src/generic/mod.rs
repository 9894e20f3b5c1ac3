//! Generic models: OnOff, Level, Battery, Power OnOff and Default
//! Transition Time.
//!
//! Set messages share a `[state][tid]` prefix followed by optional
//! transition parameters; status messages carry an optional target state
//! with the remaining transition time.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::adapters::{Transition, TransitionTime};
use crate::codec::Codec;
use crate::error::AccessResult;

pub mod battery;
pub mod dtt;
pub mod level;
pub mod onoff;
pub mod ponoff;

pub use battery::{BatteryFlags, BatteryStatus, GenericBatteryMessage, GenericBatteryOpcode};
pub use dtt::{GenericDefaultTransitionTimeMessage, GenericDefaultTransitionTimeOpcode};
pub use level::{GenericLevelMessage, GenericLevelOpcode};
pub use onoff::{GenericOnOffMessage, GenericOnOffOpcode};
pub use ponoff::{GenericPowerOnOffMessage, GenericPowerOnOffOpcode, OnPowerUp};

/// Target state of a transition in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target<T> {
    /// State the element is moving to
    pub target: T,
    /// Time left until the target is reached, possibly unknown
    pub remaining_time: TransitionTime,
}

impl<T> Target<T> {
    /// Create a target state
    pub fn new(target: T, remaining_time: TransitionTime) -> Self {
        Self {
            target,
            remaining_time,
        }
    }
}

impl<T: Codec> Codec for Target<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.target.encode(buf)?;
        self.remaining_time.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            target: T::decode(buf)?,
            remaining_time: TransitionTime::decode(buf)?,
        })
    }
}

/// Status with a present state and an optional transition target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStatus<T> {
    /// Present state
    pub present: T,
    /// Target and remaining time while a transition is running
    pub target: Option<Target<T>>,
}

impl<T> StateStatus<T> {
    /// Status with no transition in progress
    pub fn steady(present: T) -> Self {
        Self {
            present,
            target: None,
        }
    }
}

impl<T: Codec> Codec for StateStatus<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.present.encode(buf)?;
        self.target.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            present: T::decode(buf)?,
            target: Option::decode(buf)?,
        })
    }
}

/// Set message: new state, transaction identifier and optional transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSet<T> {
    /// Requested state
    pub state: T,
    /// Transaction identifier
    pub tid: u8,
    /// Transition time and delay, the default transition time when absent
    pub transition: Option<Transition>,
}

impl<T> StateSet<T> {
    /// Set message without transition parameters
    pub fn new(state: T, tid: u8) -> Self {
        Self {
            state,
            tid,
            transition: None,
        }
    }
}

impl<T: Codec> Codec for StateSet<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.state.encode(buf)?;
        self.tid.encode(buf)?;
        self.transition.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            state: T::decode(buf)?,
            tid: u8::decode(buf)?,
            transition: Option::decode(buf)?,
        })
    }
}
