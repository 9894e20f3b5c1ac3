//! Silvair RRule Scheduler model, vendor opcode 0xE83601.
//!
//! Register entries bind action slots to an RFC 5545 style recurrence rule
//! set. Each rule is a one byte rule identifier followed by its value.
//!
//! Calendar values are packed into 40 bits, least significant byte first:
//!
//! ```text
//!  39      34 33      28 27    23 22    18 17   14 13              0
//! +----------+----------+--------+--------+-------+-----------------+
//! |  second  |  minute  |  hour  |  day   | month |      year       |
//! +----------+----------+--------+--------+-------+-----------------+
//! ```

use std::collections::BTreeSet;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::codec::{
    get_counted, get_prefixed, get_u16, get_u40, get_u8, invalid, put_counted, put_prefixed,
    put_u40, Codec,
};
use crate::error::AccessResult;

mesh_enum! {
    /// Recurrence rule identifier
    pub enum RuleId: u8 {
        /// Frequency
        Freq = 0x00,
        /// Last occurrence
        Until = 0x01,
        /// Number of occurrences
        Count = 0x02,
        /// Interval between occurrences
        Interval = 0x03,
        /// Second selector
        BySecond = 0x04,
        /// Minute selector
        ByMinute = 0x05,
        /// Hour selector
        ByHour = 0x06,
        /// Weekday selector
        ByDay = 0x07,
        /// Day of month selector
        ByMonthDay = 0x08,
        /// Day of year selector
        ByYearDay = 0x09,
        /// Week number selector
        ByWeekNo = 0x0a,
        /// Month bitmap
        ByMonth = 0x0b,
        /// Position within the set
        BySetPos = 0x0c,
        /// First occurrence
        DtStart = 0x0d,
        /// Additional occurrences
        ExplicitRdate = 0x0e,
        /// Excluded occurrences
        ExclusionsRdate = 0x0f,
    }
}

mesh_enum! {
    /// Recurrence frequency
    pub enum Frequency: u8 {
        /// Every second
        Secondly = 0x00,
        /// Every minute
        Minutely = 0x01,
        /// Every hour
        Hourly = 0x02,
        /// Every day
        Daily = 0x03,
        /// Every week
        Weekly = 0x04,
        /// Every month
        Monthly = 0x05,
        /// Every year
        Yearly = 0x06,
    }
}

mesh_enum! {
    /// Weekday relative to the current occurrence
    pub enum RelativeDay: i8 {
        /// Previous Sunday
        PreviousSunday = -7,
        /// Previous Saturday
        PreviousSaturday = -6,
        /// Previous Friday
        PreviousFriday = -5,
        /// Previous Thursday
        PreviousThursday = -4,
        /// Previous Wednesday
        PreviousWednesday = -3,
        /// Previous Tuesday
        PreviousTuesday = -2,
        /// Previous Monday
        PreviousMonday = -1,
        /// Next Monday
        NextMonday = 1,
        /// Next Tuesday
        NextTuesday = 2,
        /// Next Wednesday
        NextWednesday = 3,
        /// Next Thursday
        NextThursday = 4,
        /// Next Friday
        NextFriday = 5,
        /// Next Saturday
        NextSaturday = 6,
        /// Next Sunday
        NextSunday = 7,
    }
}

mesh_enum! {
    /// Scheduler activity
    pub enum SchedulerMode: u8 {
        /// Entries are not executed
        Disabled = 0x00,
        /// Entries are executed
        Enabled = 0x01,
    }
}

mesh_enum! {
    /// Result of a register entry operation
    pub enum RRuleStatusCode: u8 {
        /// Success
        Success = 0x00,
        /// Unknown slot
        InvalidSlot = 0x01,
        /// Slot parameters rejected
        InvalidSlotParameters = 0x02,
        /// Unknown rule
        InvalidRule = 0x03,
        /// Rule value rejected
        InvalidRuleValue = 0x04,
        /// Register is full
        RegisterSizeExceeded = 0x05,
        /// Entry could not be stored
        StorageFailure = 0x06,
    }
}

/// Calendar value without a time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleDateTime {
    /// Year, 14 bits
    pub year: u16,
    /// Month, 4 bits
    pub month: u8,
    /// Day of month, 5 bits
    pub day: u8,
    /// Hour, 5 bits
    pub hour: u8,
    /// Minute, 6 bits
    pub minute: u8,
    /// Second, 6 bits
    pub second: u8,
}

impl RuleDateTime {
    /// Convert to a calendar date, `None` when the fields name no real date
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }

    /// Take the calendar fields of `date`, dropping fractional seconds
    pub fn from_naive(date: NaiveDateTime) -> AccessResult<Self> {
        let year = u16::try_from(date.year())
            .ok()
            .filter(|year| *year <= 0x3fff)
            .ok_or_else(|| invalid("rule year", date.year()))?;
        Ok(Self {
            year,
            month: date.month() as u8,
            day: date.day() as u8,
            hour: date.hour() as u8,
            minute: date.minute() as u8,
            second: date.second() as u8,
        })
    }
}

impl Codec for RuleDateTime {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        let fields = [
            ("year", u64::from(self.year), 14),
            ("month", u64::from(self.month), 4),
            ("day", u64::from(self.day), 5),
            ("hour", u64::from(self.hour), 5),
            ("minute", u64::from(self.minute), 6),
            ("second", u64::from(self.second), 6),
        ];
        let mut packed = 0u64;
        let mut shift = 0;
        for (name, value, width) in fields {
            if value >> width != 0 {
                return Err(invalid(name, value));
            }
            packed |= value << shift;
            shift += width;
        }
        put_u40(buf, packed)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let packed = get_u40(buf)?;
        let field = |shift: u32, width: u32| (packed >> shift) & ((1 << width) - 1);
        Ok(Self {
            year: field(0, 14) as u16,
            month: field(14, 4) as u8,
            day: field(18, 5) as u8,
            hour: field(23, 5) as u8,
            minute: field(28, 6) as u8,
            second: field(34, 6) as u8,
        })
    }
}

/// One recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule_id", content = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Frequency
    Freq(Frequency),
    /// Last occurrence
    Until(RuleDateTime),
    /// Number of occurrences
    Count(u16),
    /// Interval between occurrences
    Interval(u16),
    /// Seconds
    BySecond(Vec<u8>),
    /// Minutes
    ByMinute(Vec<u8>),
    /// Hours
    ByHour(Vec<u8>),
    /// Weekdays
    ByDay(Vec<RelativeDay>),
    /// Days of month, negative counting from the end
    ByMonthDay(Vec<i8>),
    /// Days of year, negative counting from the end
    ByYearDay(Vec<i16>),
    /// Week numbers, negative counting from the end
    ByWeekNo(Vec<i8>),
    /// Month bitmap
    ByMonth(u16),
    /// Positions within the set
    BySetPos(Vec<i16>),
    /// First occurrence
    DtStart(RuleDateTime),
    /// Additional occurrences
    ExplicitRdate(Vec<RuleDateTime>),
    /// Excluded occurrences
    ExclusionsRdate(Vec<RuleDateTime>),
}

impl Rule {
    /// Identifier of this rule
    pub fn id(&self) -> RuleId {
        match self {
            Rule::Freq(_) => RuleId::Freq,
            Rule::Until(_) => RuleId::Until,
            Rule::Count(_) => RuleId::Count,
            Rule::Interval(_) => RuleId::Interval,
            Rule::BySecond(_) => RuleId::BySecond,
            Rule::ByMinute(_) => RuleId::ByMinute,
            Rule::ByHour(_) => RuleId::ByHour,
            Rule::ByDay(_) => RuleId::ByDay,
            Rule::ByMonthDay(_) => RuleId::ByMonthDay,
            Rule::ByYearDay(_) => RuleId::ByYearDay,
            Rule::ByWeekNo(_) => RuleId::ByWeekNo,
            Rule::ByMonth(_) => RuleId::ByMonth,
            Rule::BySetPos(_) => RuleId::BySetPos,
            Rule::DtStart(_) => RuleId::DtStart,
            Rule::ExplicitRdate(_) => RuleId::ExplicitRdate,
            Rule::ExclusionsRdate(_) => RuleId::ExclusionsRdate,
        }
    }
}

impl Codec for Rule {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.id().encode(buf)?;
        match self {
            Rule::Freq(frequency) => frequency.encode(buf),
            Rule::Until(date) | Rule::DtStart(date) => date.encode(buf),
            Rule::Count(value) | Rule::Interval(value) | Rule::ByMonth(value) => {
                buf.put_u16_le(*value);
                Ok(())
            }
            Rule::BySecond(values) | Rule::ByMinute(values) | Rule::ByHour(values) => {
                put_counted(buf, values)
            }
            Rule::ByDay(days) => put_counted(buf, days),
            Rule::ByMonthDay(values) | Rule::ByWeekNo(values) => put_counted(buf, values),
            Rule::ByYearDay(values) | Rule::BySetPos(values) => put_counted(buf, values),
            Rule::ExplicitRdate(dates) | Rule::ExclusionsRdate(dates) => put_counted(buf, dates),
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(match RuleId::decode(buf)? {
            RuleId::Freq => Rule::Freq(Frequency::decode(buf)?),
            RuleId::Until => Rule::Until(RuleDateTime::decode(buf)?),
            RuleId::Count => Rule::Count(get_u16(buf)?),
            RuleId::Interval => Rule::Interval(get_u16(buf)?),
            RuleId::BySecond => Rule::BySecond(get_counted(buf)?),
            RuleId::ByMinute => Rule::ByMinute(get_counted(buf)?),
            RuleId::ByHour => Rule::ByHour(get_counted(buf)?),
            RuleId::ByDay => Rule::ByDay(get_counted(buf)?),
            RuleId::ByMonthDay => Rule::ByMonthDay(get_counted(buf)?),
            RuleId::ByYearDay => Rule::ByYearDay(get_counted(buf)?),
            RuleId::ByWeekNo => Rule::ByWeekNo(get_counted(buf)?),
            RuleId::ByMonth => Rule::ByMonth(get_u16(buf)?),
            RuleId::BySetPos => Rule::BySetPos(get_counted(buf)?),
            RuleId::DtStart => Rule::DtStart(RuleDateTime::decode(buf)?),
            RuleId::ExplicitRdate => Rule::ExplicitRdate(get_counted(buf)?),
            RuleId::ExclusionsRdate => Rule::ExclusionsRdate(get_counted(buf)?),
        })
    }
}

/// Action slot triggered by an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot identifier
    pub slot_id: u16,
    /// Element index the slot acts on
    pub element: u8,
    /// Opaque slot parameters
    pub slot_parameter: Bytes,
}

impl Codec for Slot {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.slot_id);
        buf.put_u8(self.element);
        put_prefixed(buf, &self.slot_parameter)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            slot_id: get_u16(buf)?,
            element: get_u8(buf)?,
            slot_parameter: get_prefixed(buf)?,
        })
    }
}

/// Schedule register entry: slots plus the rule set that triggers them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntry {
    /// Slots, count prefixed
    pub slots: Vec<Slot>,
    /// Rules, spanning the rest of the message
    pub rules: Vec<Rule>,
}

impl Codec for RegisterEntry {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_counted(buf, &self.slots)?;
        self.rules.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            slots: get_counted(buf)?,
            rules: Vec::decode(buf)?,
        })
    }
}

/// Store an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySet {
    /// Entry identifier
    pub entry_id: u8,
    /// Entry content
    #[serde(flatten)]
    pub entry: RegisterEntry,
}

impl Codec for EntrySet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.entry_id);
        self.entry.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            entry_id: get_u8(buf)?,
            entry: RegisterEntry::decode(buf)?,
        })
    }
}

/// Entry operation result, with the entry when it exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    /// Entry identifier
    pub entry_id: u8,
    /// Result
    pub status: RRuleStatusCode,
    /// Entry content
    pub entry: Option<RegisterEntry>,
}

impl Codec for EntryStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.entry_id);
        self.status.encode(buf)?;
        self.entry.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            entry_id: get_u8(buf)?,
            status: RRuleStatusCode::decode(buf)?,
            entry: Option::decode(buf)?,
        })
    }
}

access_messages! {
    /// RRule scheduler sub-opcodes
    subopcode RRuleSchedulerSubOpcode;
    /// RRule scheduler payloads
    payload RRuleSchedulerPayload {
        /// Read supported rules
        RulesListGet = 0x00,
        /// Supported rules
        RulesListStatus(BTreeSet<RuleId>) = 0x01,
        /// Read the register capacity
        RegisterMaxSizeGet = 0x02,
        /// Register capacity in bytes
        RegisterMaxSizeStatus(u32) = 0x03,
        /// Read the scheduler mode
        SchedulerModeGet = 0x04,
        /// Change the scheduler mode
        SchedulerModeSet(SchedulerMode) = 0x05,
        /// Scheduler mode
        SchedulerModeStatus(SchedulerMode) = 0x06,
        /// Read an entry
        EntryGet(u8) = 0x07,
        /// Store an entry
        EntrySet(EntrySet) = 0x08,
        /// Delete an entry
        EntryDelete(u8) = 0x09,
        /// Delete every entry
        EntryDeleteAll = 0x0a,
        /// Entry operation result
        EntryStatus(EntryStatus) = 0x0b,
        /// Read stored entry identifiers
        ListGet = 0x0c,
        /// Stored entry identifiers
        ListStatus(BTreeSet<u8>) = 0x0d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(hex_str: &str) -> RRuleSchedulerPayload {
        let raw = hex::decode(hex_str).unwrap();
        let payload = RRuleSchedulerPayload::decode(&mut Bytes::from(raw.clone())).unwrap();
        let mut buf = BytesMut::new();
        payload.encode(&mut buf).unwrap();
        assert_eq!(buf.to_vec(), raw);
        payload
    }

    fn date(year: u16) -> RuleDateTime {
        RuleDateTime {
            year,
            month: 11,
            day: 25,
            hour: 22,
            minute: 17,
            second: 56,
        }
    }

    fn slots() -> Vec<Slot> {
        vec![
            Slot {
                slot_id: 0xabcd,
                element: 0x00,
                slot_parameter: Bytes::from_static(&[0xbb, 0xcc]),
            },
            Slot {
                slot_id: 0xabcc,
                element: 0x02,
                slot_parameter: Bytes::from(hex::decode("abff157288").unwrap()),
            },
            Slot {
                slot_id: 0xabcb,
                element: 0x05,
                slot_parameter: Bytes::from(
                    hex::decode("0002bbccccab0005abff157288cbab00").unwrap(),
                ),
            },
        ]
    }

    #[test]
    fn test_entry_set_minimal() {
        assert_eq!(
            roundtrip("080501cdab00000001030200020500"),
            RRuleSchedulerPayload::EntrySet(EntrySet {
                entry_id: 5,
                entry: RegisterEntry {
                    slots: vec![Slot {
                        slot_id: 0xabcd,
                        element: 0,
                        slot_parameter: Bytes::new(),
                    }],
                    rules: vec![
                        Rule::Freq(Frequency::Minutely),
                        Rule::Interval(2),
                        Rule::Count(5),
                    ],
                },
            })
        );
    }

    #[test]
    fn test_entry_set_every_rule() {
        let raw = concat!(
            "080503cdab0002bbccccab0205abff157288cbab05100002bb",
            "ccccab0005abff157288cbab00000103201002055004010005",
            "02010b0603020c100704010507fa0805041011121309080400",
            "10000200300040005000000120010a040616262a0b01020c06",
            "0a001000a000d000500050010df8c7661be101f8c7661be10e",
            "03e4c7661be1eec7661be1f8c7661be10f03e4c7661be1eec7",
            "661be1f8c7661be1",
        );
        let RRuleSchedulerPayload::EntrySet(set) = roundtrip(raw) else {
            panic!("expected entry set");
        };
        assert_eq!(set.entry_id, 5);
        assert_eq!(set.entry.slots, slots());
        assert_eq!(
            set.entry.rules,
            vec![
                Rule::Freq(Frequency::Minutely),
                Rule::Interval(0x1020),
                Rule::Count(0x5005),
                Rule::BySecond(vec![0x00]),
                Rule::ByMinute(vec![0x01, 0x0b]),
                Rule::ByHour(vec![0x02, 0x0c, 0x10]),
                Rule::ByDay(vec![
                    RelativeDay::NextMonday,
                    RelativeDay::NextFriday,
                    RelativeDay::NextSunday,
                    RelativeDay::PreviousSaturday,
                ]),
                Rule::ByMonthDay(vec![0x04, 0x10, 0x11, 0x12, 0x13]),
                Rule::ByYearDay(vec![
                    0x0004, 0x0010, 0x0002, 0x0030, 0x0040, 0x0050, 0x0100, 0x0120,
                ]),
                Rule::ByWeekNo(vec![0x06, 0x16, 0x26, 0x2a]),
                Rule::ByMonth(0x0201),
                Rule::BySetPos(vec![0x000a, 0x0010, 0x00a0, 0x00d0, 0x0050, 0x0150]),
                Rule::DtStart(date(2040)),
                Rule::Until(date(2040)),
                Rule::ExplicitRdate(vec![date(2020), date(2030), date(2040)]),
                Rule::ExclusionsRdate(vec![date(2020), date(2030), date(2040)]),
            ]
        );
    }

    #[test]
    fn test_lists_and_sizes() {
        assert_eq!(
            roundtrip("010102030405"),
            RRuleSchedulerPayload::RulesListStatus(BTreeSet::from([
                RuleId::Until,
                RuleId::Count,
                RuleId::Interval,
                RuleId::BySecond,
                RuleId::ByMinute,
            ]))
        );
        assert_eq!(
            roundtrip("03efcdab89"),
            RRuleSchedulerPayload::RegisterMaxSizeStatus(0x89abcdef)
        );
        assert_eq!(
            roundtrip("0501"),
            RRuleSchedulerPayload::SchedulerModeSet(SchedulerMode::Enabled)
        );
        assert_eq!(
            roundtrip("0d01050a"),
            RRuleSchedulerPayload::ListStatus(BTreeSet::from([1, 5, 10]))
        );
    }

    #[test]
    fn test_entry_status() {
        assert_eq!(
            roundtrip("0bfe03"),
            RRuleSchedulerPayload::EntryStatus(EntryStatus {
                entry_id: 0xfe,
                status: RRuleStatusCode::InvalidRule,
                entry: None,
            })
        );

        let RRuleSchedulerPayload::EntryStatus(status) =
            roundtrip("0bfe0001cdab00020a0b000203020002050006020f17")
        else {
            panic!("expected entry status");
        };
        assert_eq!(status.status, RRuleStatusCode::Success);
        let entry = status.entry.unwrap();
        assert_eq!(entry.slots[0].slot_parameter.as_ref(), &[0x0a, 0x0b]);
        assert_eq!(
            entry.rules,
            vec![
                Rule::Freq(Frequency::Hourly),
                Rule::Interval(2),
                Rule::Count(5),
                Rule::ByHour(vec![15, 23]),
            ]
        );
    }

    #[test]
    fn test_date_conversion() {
        let naive = date(2040).to_naive().unwrap();
        assert_eq!(naive.to_string(), "2040-11-25 22:17:56");
        assert_eq!(RuleDateTime::from_naive(naive).unwrap(), date(2040));

        let impossible = RuleDateTime { day: 31, ..date(2040) };
        assert!(impossible.to_naive().is_none());

        let overflow = RuleDateTime { second: 64, ..date(2040) };
        assert!(overflow.encode(&mut BytesMut::new()).is_err());
    }

    #[test]
    fn test_invalid_relative_day() {
        assert!(RRuleSchedulerPayload::decode(&mut Bytes::from_static(&[
            0x08, 0x01, 0x00, 0x07, 0x01, 0x00
        ]))
        .is_err());
    }
}
