//! Time and Time Setup models.
//!
//! Mesh time counts TAI seconds since 2000-01-01T00:00:00 with 1/256 s
//! sub-second resolution. A zero TAI seconds value means the time is not
//! known, and the message then carries only the seconds field.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u16, get_u40, get_u8, invalid, put_u40, Codec};
use crate::error::AccessResult;

/// Seconds between the Unix epoch and the mesh epoch
pub const MESH_EPOCH_OFFSET: i64 = 946_684_800;

/// Raw time zone offset meaning UTC
pub const TIME_ZONE_OFFSET_ZERO: u8 = 0x40;

/// Raw TAI-UTC delta meaning zero seconds
pub const TAI_UTC_DELTA_ZERO: u16 = 0xff;

/// TAI-UTC delta in effect since 2017
pub const CURRENT_TAI_UTC_DELTA: i64 = 37;

/// Largest raw TAI-UTC delta
pub const MAX_TAI_UTC_DELTA: u16 = 0x7fff;

const SECONDS_IN_15_MINUTES: i64 = 15 * 60;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

mesh_enum! {
    /// Role of a node in time propagation
    pub enum TimeRole: u8 {
        /// Does not take part
        None = 0x00,
        /// Publishes time from an external source
        TimeAuthority = 0x01,
        /// Relays time
        TimeRelay = 0x02,
        /// Receives time
        TimeClient = 0x03,
    }
}

/// Offset encoded by a raw time zone value, in 15 minute steps
pub fn time_zone_offset(raw: u8) -> Duration {
    Duration::seconds((i64::from(raw) - i64::from(TIME_ZONE_OFFSET_ZERO)) * SECONDS_IN_15_MINUTES)
}

/// Raw time zone value of `offset`, which must be a whole number of 15 minutes
pub fn time_zone_offset_raw(offset: Duration) -> AccessResult<u8> {
    let seconds = offset.num_seconds();
    if seconds % SECONDS_IN_15_MINUTES != 0 {
        return Err(invalid("time zone offset", offset));
    }
    u8::try_from(seconds / SECONDS_IN_15_MINUTES + i64::from(TIME_ZONE_OFFSET_ZERO))
        .map_err(|_| invalid("time zone offset", offset))
}

/// TAI-UTC delta encoded by a raw value
pub fn tai_utc_delta(raw: u16) -> Duration {
    Duration::seconds(i64::from(raw) - i64::from(TAI_UTC_DELTA_ZERO))
}

/// Raw value of a TAI-UTC delta in whole seconds
pub fn tai_utc_delta_raw(delta: Duration) -> AccessResult<u16> {
    u16::try_from(delta.num_seconds() + i64::from(TAI_UTC_DELTA_ZERO))
        .ok()
        .filter(|raw| *raw <= MAX_TAI_UTC_DELTA)
        .ok_or_else(|| invalid("tai-utc delta", delta))
}

/// Time state carried by Time Set and Time Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeState {
    /// TAI seconds since the mesh epoch, 40 bits, zero if not known
    pub tai_seconds: u64,
    /// Fraction of a second in 1/256 s
    pub subsecond: u8,
    /// Accuracy in 10 ms steps
    pub uncertainty: u8,
    /// Time comes from a time authority
    pub time_authority: bool,
    /// Raw TAI-UTC delta, 15 bits
    pub tai_utc_delta: u16,
    /// Raw local time zone offset
    pub time_zone_offset: u8,
}

impl TimeState {
    /// Time not known
    pub const UNKNOWN: TimeState = TimeState {
        tai_seconds: 0,
        subsecond: 0,
        uncertainty: 0,
        time_authority: false,
        tai_utc_delta: 0,
        time_zone_offset: 0,
    };

    /// Whether the state carries a time
    pub fn is_known(&self) -> bool {
        self.tai_seconds != 0
    }

    /// Accuracy of the time
    pub fn uncertainty(&self) -> Duration {
        Duration::milliseconds(i64::from(self.uncertainty) * 10)
    }

    /// Local date and time, `None` when not known
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        if !self.is_known() {
            return None;
        }
        tai_to_datetime(self.tai_seconds, self.subsecond, self.time_zone_offset)
    }

    /// Inverse of [`TimeState::to_datetime`]
    pub fn from_datetime(
        date: DateTime<FixedOffset>,
        uncertainty: Duration,
        tai_utc_delta: Duration,
        time_authority: bool,
    ) -> AccessResult<Self> {
        let (tai_seconds, subsecond, time_zone_offset) = datetime_to_tai(date)?;
        let uncertainty = u8::try_from(uncertainty.num_milliseconds() / 10)
            .map_err(|_| invalid("uncertainty", uncertainty))?;

        Ok(Self {
            tai_seconds,
            subsecond,
            uncertainty,
            time_authority,
            tai_utc_delta: tai_utc_delta_raw(tai_utc_delta)?,
            time_zone_offset,
        })
    }
}

/// Local date and time of a mesh timestamp.
///
/// TAI seconds are read as local seconds since the mesh epoch and rendered
/// at the raw time zone offset.
pub fn tai_to_datetime(
    tai_seconds: u64,
    subsecond: u8,
    zone_offset: u8,
) -> Option<DateTime<FixedOffset>> {
    let zone = time_zone_offset(zone_offset);
    let offset = FixedOffset::east_opt(i32::try_from(zone.num_seconds()).ok()?)?;
    let seconds = i64::try_from(tai_seconds).ok()? + MESH_EPOCH_OFFSET + zone.num_seconds();
    let nanos = i64::from(subsecond) * NANOS_PER_SECOND / 256;
    let utc = DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)?;
    Some(utc.with_timezone(&offset))
}

/// TAI seconds, subsecond and raw time zone offset of `date`
pub fn datetime_to_tai(date: DateTime<FixedOffset>) -> AccessResult<(u64, u8, u8)> {
    let zone = i64::from(date.offset().local_minus_utc());
    let mut seconds = date.timestamp() - MESH_EPOCH_OFFSET - zone;
    let mut subsecond =
        (i64::from(date.timestamp_subsec_nanos()) * 256 + NANOS_PER_SECOND / 2) / NANOS_PER_SECOND;
    if subsecond == 256 {
        seconds += 1;
        subsecond = 0;
    }
    let tai_seconds = u64::try_from(seconds)
        .ok()
        .filter(|tai| *tai <= 0xff_ffff_ffff)
        .ok_or_else(|| invalid("tai seconds", seconds))?;
    Ok((
        tai_seconds,
        subsecond as u8,
        time_zone_offset_raw(Duration::seconds(zone))?,
    ))
}

impl Codec for TimeState {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_u40(buf, self.tai_seconds)?;
        if !self.is_known() {
            return Ok(());
        }
        if self.tai_utc_delta > MAX_TAI_UTC_DELTA {
            return Err(invalid("tai-utc delta", self.tai_utc_delta));
        }
        buf.put_u8(self.subsecond);
        buf.put_u8(self.uncertainty);
        buf.put_u16_le(self.tai_utc_delta << 1 | u16::from(self.time_authority));
        buf.put_u8(self.time_zone_offset);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let tai_seconds = get_u40(buf)?;
        if tai_seconds == 0 {
            return Ok(Self::UNKNOWN);
        }
        let subsecond = get_u8(buf)?;
        let uncertainty = get_u8(buf)?;
        let packed = get_u16(buf)?;
        Ok(Self {
            tai_seconds,
            subsecond,
            uncertainty,
            time_authority: packed & 0x01 != 0,
            tai_utc_delta: packed >> 1,
            time_zone_offset: get_u8(buf)?,
        })
    }
}

/// Scheduled time zone change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneSet {
    /// Raw offset after the change
    pub time_zone_offset_new: u8,
    /// TAI seconds of the change, 40 bits
    pub tai_of_zone_change: u64,
}

impl Codec for TimeZoneSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.time_zone_offset_new);
        put_u40(buf, self.tai_of_zone_change)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            time_zone_offset_new: get_u8(buf)?,
            tai_of_zone_change: get_u40(buf)?,
        })
    }
}

/// Current time zone and any scheduled change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneStatus {
    /// Raw offset in effect
    pub time_zone_offset_current: u8,
    /// Scheduled change
    #[serde(flatten)]
    pub change: TimeZoneSet,
}

impl Codec for TimeZoneStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.time_zone_offset_current);
        self.change.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            time_zone_offset_current: get_u8(buf)?,
            change: TimeZoneSet::decode(buf)?,
        })
    }
}

fn get_padded_delta(buf: &mut Bytes) -> AccessResult<u16> {
    Ok(get_u16(buf)? & MAX_TAI_UTC_DELTA)
}

fn put_padded_delta(buf: &mut BytesMut, delta: u16) -> AccessResult<()> {
    if delta > MAX_TAI_UTC_DELTA {
        return Err(invalid("tai-utc delta", delta));
    }
    buf.put_u16_le(delta);
    Ok(())
}

/// Scheduled TAI-UTC delta change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaiUtcDeltaSet {
    /// Raw delta after the change, 15 bits
    pub tai_utc_delta_new: u16,
    /// TAI seconds of the change, 40 bits
    pub tai_of_delta_change: u64,
}

impl Codec for TaiUtcDeltaSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_padded_delta(buf, self.tai_utc_delta_new)?;
        put_u40(buf, self.tai_of_delta_change)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            tai_utc_delta_new: get_padded_delta(buf)?,
            tai_of_delta_change: get_u40(buf)?,
        })
    }
}

/// Current TAI-UTC delta and any scheduled change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaiUtcDeltaStatus {
    /// Raw delta in effect, 15 bits
    pub tai_utc_delta_current: u16,
    /// Scheduled change
    #[serde(flatten)]
    pub change: TaiUtcDeltaSet,
}

impl Codec for TaiUtcDeltaStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_padded_delta(buf, self.tai_utc_delta_current)?;
        self.change.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            tai_utc_delta_current: get_padded_delta(buf)?,
            change: TaiUtcDeltaSet::decode(buf)?,
        })
    }
}

access_messages! {
    /// Time opcodes, setup opcodes included
    opcode TimeOpcode;
    /// Time messages
    message TimeMessage {
        /// Set the time
        Set(TimeState) = 0x5c,
        /// Current time
        Status(TimeState) = 0x5d,
        /// Read the time
        Get = 0x8237,
        /// Read the time role
        RoleGet = 0x8238,
        /// Set the time role
        RoleSet(TimeRole) = 0x8239,
        /// Time role
        RoleStatus(TimeRole) = 0x823a,
        /// Read the time zone
        ZoneGet = 0x823b,
        /// Schedule a time zone change
        ZoneSet(TimeZoneSet) = 0x823c,
        /// Time zone
        ZoneStatus(TimeZoneStatus) = 0x823d,
        /// Read the TAI-UTC delta
        TaiUtcDeltaGet = 0x823e,
        /// Schedule a TAI-UTC delta change
        TaiUtcDeltaSet(TaiUtcDeltaSet) = 0x823f,
        /// TAI-UTC delta
        TaiUtcDeltaStatus(TaiUtcDeltaStatus) = 0x8240,
    }
}
