//! Scheduler and Scheduler Setup models.
//!
//! Actions carry a calendar start and an iCalendar style recurrence with
//! signed `BY*` selectors.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_i16, get_i8, get_u16, get_u8, Codec};
use crate::error::AccessResult;

/// Calendar start of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStart {
    /// Year
    pub year: u16,
    /// Month
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
}

impl Codec for ScheduleStart {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.year);
        buf.put_slice(&[self.month, self.day, self.hour, self.minute, self.second]);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            year: get_u16(buf)?,
            month: get_u8(buf)?,
            day: get_u8(buf)?,
            hour: get_u8(buf)?,
            minute: get_u8(buf)?,
            second: get_u8(buf)?,
        })
    }
}

/// Recurrence rule of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// Frequency
    pub frequency: u8,
    /// Occurrences to skip
    pub skip: u8,
    /// Interval between occurrences
    pub interval: u16,
}

impl Codec for Recurrence {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.frequency);
        buf.put_u8(self.skip);
        buf.put_u16_le(self.interval);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            frequency: get_u8(buf)?,
            skip: get_u8(buf)?,
            interval: get_u16(buf)?,
        })
    }
}

/// Scheduler register entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerAction {
    /// Register index
    pub index: u8,
    /// First occurrence
    pub start: ScheduleStart,
    /// Recurrence
    pub recurrence: Recurrence,
    /// Second selector
    pub by_second: i8,
    /// Minute selector
    pub by_minute: i8,
    /// Hour selector
    pub by_hour: i8,
    /// Weekday selector
    pub by_day: i8,
    /// Day of month selector
    pub by_month_day: i8,
    /// Day of year selector
    pub by_year_day: i16,
    /// Week number selector
    pub by_week_no: i8,
    /// Month selector
    pub by_month: i8,
    /// Position within the set
    pub by_set_pos: i16,
}

impl Codec for SchedulerAction {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.index);
        self.start.encode(buf)?;
        self.recurrence.encode(buf)?;
        buf.put_i8(self.by_second);
        buf.put_i8(self.by_minute);
        buf.put_i8(self.by_hour);
        buf.put_i8(self.by_day);
        buf.put_i8(self.by_month_day);
        buf.put_i16_le(self.by_year_day);
        buf.put_i8(self.by_week_no);
        buf.put_i8(self.by_month);
        buf.put_i16_le(self.by_set_pos);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            index: get_u8(buf)?,
            start: ScheduleStart::decode(buf)?,
            recurrence: Recurrence::decode(buf)?,
            by_second: get_i8(buf)?,
            by_minute: get_i8(buf)?,
            by_hour: get_i8(buf)?,
            by_day: get_i8(buf)?,
            by_month_day: get_i8(buf)?,
            by_year_day: get_i16(buf)?,
            by_week_no: get_i8(buf)?,
            by_month: get_i8(buf)?,
            by_set_pos: get_i16(buf)?,
        })
    }
}

access_messages! {
    /// Scheduler opcodes, setup opcodes included
    opcode SchedulerOpcode;
    /// Scheduler messages
    message SchedulerMessage {
        /// Action status
        ActionStatus = 0x5f,
        /// Store an action
        ActionSet(SchedulerAction) = 0x60,
        /// Store an action without acknowledgement
        ActionSetUnacknowledged(SchedulerAction) = 0x61,
        /// Read a scheduled action
        ActionGet = 0x8248,
        /// Read the register
        Get = 0x8249,
        /// Register status
        Status = 0x824a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(hex_str: &str) -> SchedulerMessage {
        let raw = hex::decode(hex_str).unwrap();
        let message = SchedulerMessage::decode(&mut Bytes::from(raw.clone())).unwrap();
        assert_eq!(message.to_bytes().unwrap().to_vec(), raw);
        message
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(roundtrip("8249"), SchedulerMessage::Get);
        assert_eq!(roundtrip("824a"), SchedulerMessage::Status);
        assert_eq!(roundtrip("8248"), SchedulerMessage::ActionGet);
        assert_eq!(roundtrip("5f"), SchedulerMessage::ActionStatus);
    }

    #[test]
    fn test_action_set() {
        let action = SchedulerAction {
            index: 3,
            start: ScheduleStart {
                year: 2024,
                month: 6,
                day: 1,
                hour: 22,
                minute: 30,
                second: 0,
            },
            recurrence: Recurrence {
                frequency: 3,
                skip: 0,
                interval: 1,
            },
            by_second: 0,
            by_minute: 30,
            by_hour: 22,
            by_day: -1,
            by_month_day: 0,
            by_year_day: -100,
            by_week_no: 0,
            by_month: 6,
            by_set_pos: 0,
        };
        assert_eq!(
            roundtrip("6003e8070601161e0003000100001e16ff009cff00060000"),
            SchedulerMessage::ActionSet(action)
        );
        assert_eq!(
            SchedulerMessage::ActionSetUnacknowledged(action).to_bytes().unwrap().len(),
            1 + 23
        );
    }

    #[test]
    fn test_truncated_action() {
        let raw = hex::decode("6003e807").unwrap();
        assert!(SchedulerMessage::decode(&mut Bytes::from(raw)).is_err());
    }
}
