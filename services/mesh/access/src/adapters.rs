//! Field adapters shared by several model families.
//!
//! Each adapter maps a packed wire representation onto a typed value and
//! validates ranges in both directions:
//!
//! * [`TransitionTime`]: `[resolution:2][steps:6]`, steps 0x3f meaning unknown
//! * [`Delay`]: 5 ms units
//! * [`LogScale`]: `0 <-> 0`, `n <-> 2^(n-1)`, `0xff <-> infinity` where allowed
//! * [`Retransmit`]: `[interval_steps:5][count:3]`, interval `(steps + 1) * BASE` ms
//! * key indexes: 12-bit values, packed in pairs into three bytes

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u16, get_u24, get_u8, invalid, need, put_u24, Codec};
use crate::error::{AccessError, AccessResult};

/// Largest valid TTL
pub const MAX_TTL: u8 = 0x7f;

/// Largest 12-bit key index
pub const MAX_KEY_INDEX: u16 = 0x0fff;

/// Transition time steps value meaning "unknown"
pub const UNKNOWN_STEPS: u8 = 0x3f;

/// Largest number of steps of a known transition time
pub const MAX_STEPS: u8 = 0x3e;

mesh_enum! {
    /// Step resolution of a transition time or publish period
    pub enum StepResolution: u8 {
        /// 100 milliseconds
        Milliseconds100 = 0b00,
        /// 1 second
        Seconds1 = 0b01,
        /// 10 seconds
        Seconds10 = 0b10,
        /// 10 minutes
        Minutes10 = 0b11,
    }
}

impl StepResolution {
    const ALL: [StepResolution; 4] = [
        StepResolution::Milliseconds100,
        StepResolution::Seconds1,
        StepResolution::Seconds10,
        StepResolution::Minutes10,
    ];

    /// Length of one step
    pub const fn step(self) -> Duration {
        match self {
            StepResolution::Milliseconds100 => Duration::from_millis(100),
            StepResolution::Seconds1 => Duration::from_secs(1),
            StepResolution::Seconds10 => Duration::from_secs(10),
            StepResolution::Minutes10 => Duration::from_secs(600),
        }
    }

    fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 0b11)]
    }
}

/// Generic transition time: a step count at a step resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionTime {
    /// Step resolution
    pub resolution: StepResolution,
    /// Number of steps, 0x3f for unknown
    pub steps: u8,
}

impl TransitionTime {
    /// Zero length transition
    pub const IMMEDIATE: TransitionTime = TransitionTime::new(StepResolution::Milliseconds100, 0);

    /// Unknown or undeterminable transition
    pub const UNKNOWN: TransitionTime =
        TransitionTime::new(StepResolution::Milliseconds100, UNKNOWN_STEPS);

    /// Create a transition time
    pub const fn new(resolution: StepResolution, steps: u8) -> Self {
        Self { resolution, steps }
    }

    /// Finest representation of `duration`, rounding down to whole steps
    pub fn from_duration(duration: Duration) -> AccessResult<Self> {
        let millis = duration.as_millis();
        for resolution in StepResolution::ALL {
            let step = resolution.step().as_millis();
            if millis <= step * u128::from(MAX_STEPS) {
                return Ok(Self::new(resolution, (millis / step) as u8));
            }
        }
        Err(invalid("transition time", format!("{duration:?}")))
    }

    /// True when the steps field carries the unknown marker
    pub fn is_unknown(&self) -> bool {
        self.steps == UNKNOWN_STEPS
    }

    /// Duration of the transition, `None` when unknown
    pub fn duration(&self) -> Option<Duration> {
        (!self.is_unknown()).then(|| self.resolution.step() * u32::from(self.steps))
    }

    /// Packed `[resolution:2][steps:6]` byte
    pub fn to_byte(self) -> AccessResult<u8> {
        if self.steps > UNKNOWN_STEPS {
            return Err(invalid("transition steps", self.steps));
        }
        Ok((u8::from(self.resolution) << 6) | self.steps)
    }

    /// Unpack a transition time byte
    pub fn from_byte(value: u8) -> Self {
        Self::new(StepResolution::from_bits(value >> 6), value & 0x3f)
    }

    /// Reject the unknown marker
    pub(crate) fn known(self) -> AccessResult<Self> {
        if self.steps > MAX_STEPS {
            return Err(invalid("transition steps", self.steps));
        }
        Ok(self)
    }
}

/// Transition times in status messages may be unknown
impl Codec for TransitionTime {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.to_byte()?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self::from_byte(get_u8(buf)?))
    }
}

/// Transition time that must be known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownTransitionTime(pub TransitionTime);

impl Codec for KnownTransitionTime {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.0.known()?.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        TransitionTime::decode(buf)?.known().map(Self)
    }
}

/// Message execution delay in 5 millisecond steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delay(pub u8);

impl Delay {
    /// Delay as a duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(5 * u64::from(self.0))
    }

    /// Delay from a duration, rounding down to 5 ms
    pub fn from_duration(duration: Duration) -> AccessResult<Self> {
        u8::try_from(duration.as_millis() / 5)
            .map(Self)
            .map_err(|_| invalid("delay", format!("{duration:?}")))
    }
}

/// Optional transition parameters of generic set messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Transition time, never unknown
    pub transition_time: TransitionTime,
    /// Delay before the transition starts
    pub delay: Delay,
}

impl Transition {
    /// Create transition parameters
    pub fn new(transition_time: TransitionTime, delay: Delay) -> Self {
        Self {
            transition_time,
            delay,
        }
    }
}

impl Codec for Transition {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.transition_time.known()?.encode(buf)?;
        buf.put_u8(self.delay.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        need(buf, 2)?;
        let transition_time = TransitionTime::decode(buf)?.known()?;
        let delay = Delay(get_u8(buf)?);
        Ok(Self::new(transition_time, delay))
    }
}

/// Value of a logarithmic counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogValue {
    /// Finite value
    Finite(u32),
    /// Counter runs forever
    Infinite,
}

/// Logarithmic encoding of heartbeat counts and periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogScale {
    /// Largest raw exponent accepted
    pub max_value: u8,
    /// Raw 0xff stands for infinity
    pub infinity: bool,
}

impl LogScale {
    /// Raw value standing for infinity
    pub const INFINITY: u8 = 0xff;

    /// Create a scale
    pub const fn new(max_value: u8, infinity: bool) -> Self {
        Self {
            max_value,
            infinity,
        }
    }

    /// Expand a raw exponent
    pub fn decode(&self, raw: u8) -> AccessResult<LogValue> {
        match raw {
            0 => Ok(LogValue::Finite(0)),
            Self::INFINITY if self.infinity => Ok(LogValue::Infinite),
            raw if raw > self.max_value => Err(AccessError::Validation(format!(
                "max value exceeded, expecting at most {}: {raw}",
                self.max_value
            ))),
            raw => Ok(LogValue::Finite(1 << (raw - 1))),
        }
    }

    /// Compress a value, rounding down to a power of two
    pub fn encode(&self, value: LogValue) -> AccessResult<u8> {
        let value = match value {
            LogValue::Infinite if self.infinity => return Ok(Self::INFINITY),
            LogValue::Infinite => {
                return Err(AccessError::Validation("infinity is not allowed".into()))
            }
            LogValue::Finite(0) => return Ok(0),
            LogValue::Finite(value) => value,
        };

        let raw = (u32::BITS - value.leading_zeros()) as u8;
        let exceeds = raw > self.max_value || (raw == self.max_value && !value.is_power_of_two());
        if exceeds {
            return Err(AccessError::Validation(format!(
                "max value exceeded, expecting at most {}: {value}",
                self.max_value
            )));
        }
        Ok(raw)
    }

    /// Expand a raw exponent that can never be infinite
    pub(crate) fn decode_finite(&self, raw: u8) -> AccessResult<u32> {
        match self.decode(raw)? {
            LogValue::Finite(value) => Ok(value),
            LogValue::Infinite => Err(invalid("log scaled value", raw)),
        }
    }
}

/// Retransmission parameters with an interval step of `BASE` milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Retransmit<const BASE: u16> {
    /// Number of retransmissions, up to 7
    pub count: u8,
    /// Interval between retransmissions in milliseconds
    pub interval: u16,
}

/// Network and relay retransmission, 10 ms steps
pub type NetworkRetransmit = Retransmit<10>;

/// Model publication retransmission, 50 ms steps
pub type PublishRetransmit = Retransmit<50>;

impl<const BASE: u16> Retransmit<BASE> {
    /// Create retransmission parameters
    pub const fn new(count: u8, interval: u16) -> Self {
        Self { count, interval }
    }

    /// Packed `[interval_steps:5][count:3]` byte
    pub fn to_byte(&self) -> AccessResult<u8> {
        if self.count > 7 {
            return Err(invalid("retransmit count", self.count));
        }
        if self.interval == 0 || self.interval > 0x20 * BASE || self.interval % BASE != 0 {
            return Err(AccessError::Validation(format!(
                "retransmit interval must be a multiple of {BASE} up to {}: {}",
                0x20 * BASE,
                self.interval
            )));
        }
        let steps = (self.interval / BASE - 1) as u8;
        Ok((steps << 3) | self.count)
    }

    /// Unpack a retransmit byte
    pub fn from_byte(value: u8) -> Self {
        Self::new(value & 0x07, (u16::from(value >> 3) + 1) * BASE)
    }
}

impl<const BASE: u16> Codec for Retransmit<BASE> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.to_byte()?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self::from_byte(get_u8(buf)?))
    }
}

/// Validate a TTL
pub fn ttl(value: u8) -> AccessResult<u8> {
    if value > MAX_TTL {
        return Err(invalid("ttl", value));
    }
    Ok(value)
}

/// Time to live field, at most 0x7f
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl(pub u8);

impl Codec for Ttl {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(ttl(self.0)?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        ttl(get_u8(buf)?).map(Self)
    }
}

/// Single 12-bit key index stored in two bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyIndex(pub u16);

impl Codec for KeyIndex {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_key_index(buf, self.0)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_key_index(buf).map(Self)
    }
}

/// Validate a 12-bit key index
pub fn key_index(value: u16) -> AccessResult<u16> {
    if value > MAX_KEY_INDEX {
        return Err(invalid("key index", value));
    }
    Ok(value)
}

/// Read a single key index, discarding the four padding bits
pub(crate) fn get_key_index(buf: &mut Bytes) -> AccessResult<u16> {
    Ok(get_u16(buf)? & MAX_KEY_INDEX)
}

pub(crate) fn put_key_index(buf: &mut BytesMut, value: u16) -> AccessResult<()> {
    buf.put_u16_le(key_index(value)?);
    Ok(())
}

/// Read two 12-bit values packed into three bytes, low value first
pub(crate) fn get_u12_pair(buf: &mut Bytes) -> AccessResult<(u16, u16)> {
    let packed = get_u24(buf)?;
    Ok(((packed & 0xfff) as u16, (packed >> 12) as u16))
}

pub(crate) fn put_u12_pair(buf: &mut BytesMut, low: u16, high: u16) -> AccessResult<()> {
    put_u24(buf, u32::from(key_index(low)?) | (u32::from(key_index(high)?) << 12))
}

/// Network and application key index pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyIndexPair {
    /// Network key index
    pub net_key_index: u16,
    /// Application key index
    pub app_key_index: u16,
}

impl Codec for KeyIndexPair {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_u12_pair(buf, self.net_key_index, self.app_key_index)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let (net_key_index, app_key_index) = get_u12_pair(buf)?;
        Ok(Self {
            net_key_index,
            app_key_index,
        })
    }
}

/// Sorted list of key indexes, packed two per three bytes with a two byte
/// tail for an odd count
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyIndices(pub Vec<u16>);

impl KeyIndices {
    /// Create a list, sorting the indexes
    pub fn new(indices: impl IntoIterator<Item = u16>) -> Self {
        let mut indices: Vec<u16> = indices.into_iter().collect();
        indices.sort_unstable();
        Self(indices)
    }
}

impl Codec for KeyIndices {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        let mut sorted = self.0.clone();
        sorted.sort_unstable();

        let mut chunks = sorted.chunks_exact(2);
        for pair in &mut chunks {
            put_u12_pair(buf, pair[1], pair[0])?;
        }
        if let [last] = chunks.remainder() {
            put_key_index(buf, *last)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let mut indices = Vec::new();
        while buf.len() >= 3 {
            let (second, first) = get_u12_pair(buf)?;
            indices.push(first);
            indices.push(second);
        }
        match buf.len() {
            0 => {}
            2 => indices.push(get_key_index(buf)?),
            _ => return Err(AccessError::Incomplete),
        }
        indices.sort_unstable();
        Ok(Self(indices))
    }
}

/// Unassigned address
pub const UNASSIGNED_ADDRESS: u16 = 0x0000;

/// All-nodes fixed group address
pub const ALL_NODES_ADDRESS: u16 = 0xffff;

/// Mesh address classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    /// 0x0000
    Unassigned,
    /// 0x0001..=0x7fff
    Unicast,
    /// 0x8000..=0xbfff
    Virtual,
    /// 0xc000..=0xfeff
    Group,
    /// 0xff00..=0xfffb
    Rfu,
    /// 0xfffc
    AllProxies,
    /// 0xfffd
    AllFriends,
    /// 0xfffe
    AllRelays,
    /// 0xffff
    AllNodes,
}

impl AddressType {
    /// Classify `address`
    pub fn of(address: u16) -> Self {
        match address {
            UNASSIGNED_ADDRESS => AddressType::Unassigned,
            0xff00..=0xfffb => AddressType::Rfu,
            0xfffc => AddressType::AllProxies,
            0xfffd => AddressType::AllFriends,
            0xfffe => AddressType::AllRelays,
            ALL_NODES_ADDRESS => AddressType::AllNodes,
            a if a & 0xc000 == 0xc000 => AddressType::Group,
            a if a & 0x8000 != 0 => AddressType::Virtual,
            _ => AddressType::Unicast,
        }
    }

    /// Group address, including the fixed groups
    pub fn is_group(self) -> bool {
        matches!(
            self,
            AddressType::Group
                | AddressType::Rfu
                | AddressType::AllProxies
                | AddressType::AllFriends
                | AddressType::AllRelays
                | AddressType::AllNodes
        )
    }
}

/// Address validators applied on both encode and decode
pub mod address {
    use super::AddressType;
    use crate::codec::invalid;
    use crate::error::AccessResult;

    fn check(address: u16, ok: bool, what: &str) -> AccessResult<u16> {
        if ok {
            Ok(address)
        } else {
            Err(invalid(what, format!("{address:#06x}")))
        }
    }

    /// Unicast address
    pub fn unicast(address: u16) -> AccessResult<u16> {
        check(address, AddressType::of(address) == AddressType::Unicast, "unicast address")
    }

    /// Anything but a virtual address
    pub fn not_virtual(address: u16) -> AccessResult<u16> {
        check(address, AddressType::of(address) != AddressType::Virtual, "non-virtual address")
    }

    /// Address a model may subscribe to
    pub fn subscription(address: u16) -> AccessResult<u16> {
        let ok = !matches!(
            AddressType::of(address),
            AddressType::Unassigned
                | AddressType::Unicast
                | AddressType::AllNodes
                | AddressType::Virtual
        );
        check(address, ok, "subscription address")
    }

    /// Address reported in a subscription status
    pub fn status_subscription(address: u16) -> AccessResult<u16> {
        let ok = !matches!(
            AddressType::of(address),
            AddressType::Unicast | AddressType::AllNodes
        );
        check(address, ok, "subscription status address")
    }

    /// Unicast or unassigned address
    pub fn unicast_or_unassigned(address: u16) -> AccessResult<u16> {
        let ok = matches!(
            AddressType::of(address),
            AddressType::Unicast | AddressType::Unassigned
        );
        check(address, ok, "unicast or unassigned address")
    }

    /// Unicast, unassigned or group address. The fixed groups are not accepted.
    pub fn unicast_unassigned_or_group(address: u16) -> AccessResult<u16> {
        let ok = matches!(
            AddressType::of(address),
            AddressType::Unicast | AddressType::Unassigned | AddressType::Group
        );
        check(address, ok, "unicast, unassigned or group address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T: Codec>(value: &T) -> Vec<u8> {
        let mut buf = BytesMut::new();
        value.encode(&mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn test_transition_time_byte() {
        let tt = TransitionTime::from_byte(0x4a);
        assert_eq!(tt.resolution, StepResolution::Seconds1);
        assert_eq!(tt.steps, 10);
        assert_eq!(tt.duration(), Some(Duration::from_secs(10)));
        assert_eq!(tt.to_byte().unwrap(), 0x4a);

        assert!(TransitionTime::from_byte(0x3f).is_unknown());
        assert_eq!(TransitionTime::from_byte(0xff).duration(), None);
    }

    #[test]
    fn test_transition_time_from_duration() {
        let tt = TransitionTime::from_duration(Duration::from_millis(1500)).unwrap();
        assert_eq!(tt, TransitionTime::new(StepResolution::Milliseconds100, 15));

        let tt = TransitionTime::from_duration(Duration::from_secs(30)).unwrap();
        assert_eq!(tt, TransitionTime::new(StepResolution::Seconds1, 30));

        let tt = TransitionTime::from_duration(Duration::from_secs(3600)).unwrap();
        assert_eq!(tt, TransitionTime::new(StepResolution::Minutes10, 6));

        assert!(TransitionTime::from_duration(Duration::from_secs(600 * 63)).is_err());
    }

    #[test]
    fn test_transition_rejects_unknown() {
        let mut buf = Bytes::from_static(&[0x3f, 0x00]);
        assert!(Transition::decode(&mut buf).is_err());

        let mut buf = Bytes::from_static(&[0x3e, 0x14]);
        let transition = Transition::decode(&mut buf).unwrap();
        assert_eq!(transition.transition_time.steps, 0x3e);
        assert_eq!(transition.delay.duration(), Duration::from_millis(100));

        let mut out = BytesMut::new();
        let unknown = Transition::new(TransitionTime::UNKNOWN, Delay(0));
        assert!(unknown.encode(&mut out).is_err());
    }

    #[test]
    fn test_log_scale_decode() {
        let scale = LogScale::new(0x10, true);
        assert_eq!(scale.decode(0).unwrap(), LogValue::Finite(0));
        assert_eq!(scale.decode(1).unwrap(), LogValue::Finite(1));
        assert_eq!(scale.decode(3).unwrap(), LogValue::Finite(4));
        assert_eq!(scale.decode(0x10).unwrap(), LogValue::Finite(0x8000));
        assert_eq!(scale.decode(0xff).unwrap(), LogValue::Infinite);
        assert!(scale.decode(0x11).is_err());

        let finite = LogScale::new(0x10, false);
        assert!(finite.decode(0xff).is_err());
    }

    #[test]
    fn test_log_scale_encode() {
        let scale = LogScale::new(0x10, true);
        assert_eq!(scale.encode(LogValue::Finite(0)).unwrap(), 0);
        assert_eq!(scale.encode(LogValue::Finite(8)).unwrap(), 4);
        assert_eq!(scale.encode(LogValue::Finite(0x8000)).unwrap(), 0x10);
        assert_eq!(scale.encode(LogValue::Infinite).unwrap(), 0xff);
        assert!(scale.encode(LogValue::Finite(0x8001)).is_err());
        assert!(scale.encode(LogValue::Finite(0x10000)).is_err());

        let finite = LogScale::new(0x10, false);
        assert!(finite.encode(LogValue::Infinite).is_err());
    }

    #[test]
    fn test_retransmit() {
        let network = NetworkRetransmit::from_byte(0xf9);
        assert_eq!(network, NetworkRetransmit::new(1, 320));
        assert_eq!(network.to_byte().unwrap(), 0xf9);

        let publish = PublishRetransmit::from_byte(0x07);
        assert_eq!(publish, PublishRetransmit::new(7, 50));

        assert!(NetworkRetransmit::new(8, 10).to_byte().is_err());
        assert!(NetworkRetransmit::new(0, 0).to_byte().is_err());
        assert!(NetworkRetransmit::new(0, 15).to_byte().is_err());
        assert!(NetworkRetransmit::new(0, 330).to_byte().is_err());
        assert_eq!(NetworkRetransmit::new(0, 320).to_byte().unwrap(), 0xf8);
    }

    #[test]
    fn test_key_index_pair() {
        let pair = KeyIndexPair {
            net_key_index: 1,
            app_key_index: 1,
        };
        assert_eq!(encoded(&pair), vec![0x01, 0x10, 0x00]);

        let mut buf = Bytes::from_static(&[0x01, 0x10, 0x00]);
        assert_eq!(KeyIndexPair::decode(&mut buf).unwrap(), pair);

        let mut out = BytesMut::new();
        let bad = KeyIndexPair {
            net_key_index: 0x1000,
            app_key_index: 0,
        };
        assert!(bad.encode(&mut out).is_err());
    }

    #[test]
    fn test_key_indices_packing() {
        assert_eq!(encoded(&KeyIndices::new([11, 66])), hex::decode("42b000").unwrap());
        assert_eq!(
            encoded(&KeyIndices::new([88, 45, 67])),
            hex::decode("43d0025800").unwrap()
        );
        assert_eq!(
            encoded(&KeyIndices::new([0x123, 0x456, 0x789])),
            hex::decode("5634128907").unwrap()
        );

        let mut buf = Bytes::from(hex::decode("5634128907").unwrap());
        assert_eq!(
            KeyIndices::decode(&mut buf).unwrap(),
            KeyIndices(vec![0x123, 0x456, 0x789])
        );

        let mut buf = Bytes::from_static(&[0x56, 0x34, 0x12, 0x89]);
        assert_eq!(KeyIndices::decode(&mut buf), Err(AccessError::Incomplete));
    }

    #[test]
    fn test_address_types() {
        assert_eq!(AddressType::of(0x0000), AddressType::Unassigned);
        assert_eq!(AddressType::of(0x0001), AddressType::Unicast);
        assert_eq!(AddressType::of(0x8123), AddressType::Virtual);
        assert_eq!(AddressType::of(0xc000), AddressType::Group);
        assert_eq!(AddressType::of(0xff00), AddressType::Rfu);
        assert_eq!(AddressType::of(0xfffd), AddressType::AllFriends);
        assert_eq!(AddressType::of(0xffff), AddressType::AllNodes);
        assert!(AddressType::AllNodes.is_group());
        assert!(!AddressType::Virtual.is_group());
    }

    #[test]
    fn test_address_validators() {
        assert!(address::unicast(0x0201).is_ok());
        assert!(address::unicast(0x0000).is_err());
        assert!(address::not_virtual(0x8001).is_err());
        assert!(address::subscription(0xc001).is_ok());
        assert!(address::subscription(0xffff).is_err());
        assert!(address::subscription(0x0001).is_err());
        assert!(address::status_subscription(0x0000).is_ok());
        assert!(address::status_subscription(0x0001).is_err());
        assert!(address::unicast_or_unassigned(0x0000).is_ok());
        assert!(address::unicast_or_unassigned(0xc000).is_err());
        assert!(address::unicast_unassigned_or_group(0xc000).is_ok());
        assert!(address::unicast_unassigned_or_group(0xfeff).is_ok());
        assert!(address::unicast_unassigned_or_group(0x8000).is_err());
        assert!(address::unicast_unassigned_or_group(0xff00).is_err());
    }

    #[test]
    fn test_heartbeat_destination_rejects_fixed_groups() {
        for fixed in 0xfffc..=0xffff {
            assert!(address::unicast_unassigned_or_group(fixed).is_err(), "{fixed:#06x}");
        }
    }

    #[test]
    fn test_ttl() {
        assert_eq!(ttl(0x7f).unwrap(), 0x7f);
        assert!(ttl(0x80).is_err());
    }
}
