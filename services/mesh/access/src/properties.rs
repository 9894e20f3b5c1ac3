//! Mesh device properties and the characteristics carrying their values.
//!
//! Each known property maps to a fixed [`Characteristic`] layout of named
//! fields. Scaled counts decode to `f64` in their natural unit. The all-ones
//! raw value of an unsigned count reads as [`FieldValue::Unknown`] unless
//! the characteristic gives it a meaning. Properties without a layout,
//! vendor properties included, travel as raw bytes.

use std::collections::BTreeMap;
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::codec::{
    get_padded_str, get_u16, get_u24, get_u8, invalid, need, put_padded_str, put_u24, Codec,
};
use crate::error::{AccessError, AccessResult};

/// Mesh device property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u16);

impl PropertyId {
    /// Average ambient temperature in a period of day
    pub const AVERAGE_AMBIENT_TEMPERATURE_IN_A_PERIOD_OF_DAY: Self = Self(0x0001);
    /// Average input current
    pub const AVERAGE_INPUT_CURRENT: Self = Self(0x0002);
    /// Average input voltage
    pub const AVERAGE_INPUT_VOLTAGE: Self = Self(0x0003);
    /// Average output current
    pub const AVERAGE_OUTPUT_CURRENT: Self = Self(0x0004);
    /// Average output voltage
    pub const AVERAGE_OUTPUT_VOLTAGE: Self = Self(0x0005);
    /// Center beam intensity at full power
    pub const CENTER_BEAM_INTENSITY_AT_FULL_POWER: Self = Self(0x0006);
    /// Chromaticity tolerance
    pub const CHROMATICITY_TOLERANCE: Self = Self(0x0007);
    /// Color rendering index R9
    pub const COLOR_RENDERING_INDEX_R9: Self = Self(0x0008);
    /// Color rendering index Ra
    pub const COLOR_RENDERING_INDEX_RA: Self = Self(0x0009);
    /// Device appearance
    pub const DEVICE_APPEARANCE: Self = Self(0x000A);
    /// Device country of origin
    pub const DEVICE_COUNTRY_OF_ORIGIN: Self = Self(0x000B);
    /// Device date of manufacture
    pub const DEVICE_DATE_OF_MANUFACTURE: Self = Self(0x000C);
    /// Device energy use since turn on
    pub const DEVICE_ENERGY_USE_SINCE_TURN_ON: Self = Self(0x000D);
    /// Device firmware revision
    pub const DEVICE_FIRMWARE_REVISION: Self = Self(0x000E);
    /// Device global trade item number
    pub const DEVICE_GLOBAL_TRADE_ITEM_NUMBER: Self = Self(0x000F);
    /// Device hardware revision
    pub const DEVICE_HARDWARE_REVISION: Self = Self(0x0010);
    /// Device manufacturer name
    pub const DEVICE_MANUFACTURER_NAME: Self = Self(0x0011);
    /// Device model number
    pub const DEVICE_MODEL_NUMBER: Self = Self(0x0012);
    /// Device operating temperature range specification
    pub const DEVICE_OPERATING_TEMPERATURE_RANGE_SPECIFICATION: Self = Self(0x0013);
    /// Device operating temperature statistical values
    pub const DEVICE_OPERATING_TEMPERATURE_STATISTICAL_VALUES: Self = Self(0x0014);
    /// Device over temperature event statistics
    pub const DEVICE_OVER_TEMPERATURE_EVENT_STATISTICS: Self = Self(0x0015);
    /// Device power range specification
    pub const DEVICE_POWER_RANGE_SPECIFICATION: Self = Self(0x0016);
    /// Device runtime since turn on
    pub const DEVICE_RUNTIME_SINCE_TURN_ON: Self = Self(0x0017);
    /// Device runtime warranty
    pub const DEVICE_RUNTIME_WARRANTY: Self = Self(0x0018);
    /// Device serial number
    pub const DEVICE_SERIAL_NUMBER: Self = Self(0x0019);
    /// Device software revision
    pub const DEVICE_SOFTWARE_REVISION: Self = Self(0x001A);
    /// Device under temperature event statistics
    pub const DEVICE_UNDER_TEMPERATURE_EVENT_STATISTICS: Self = Self(0x001B);
    /// Indoor ambient temperature statistical values
    pub const INDOOR_AMBIENT_TEMPERATURE_STATISTICAL_VALUES: Self = Self(0x001C);
    /// Initial CIE 1931 chromaticity coordinates
    pub const INITIAL_CIE1931_CHROMATICITY_COORDINATES: Self = Self(0x001D);
    /// Initial correlated color temperature
    pub const INITIAL_CORRELATED_COLOR_TEMPERATURE: Self = Self(0x001E);
    /// Initial luminous flux
    pub const INITIAL_LUMINOUS_FLUX: Self = Self(0x001F);
    /// Initial planckian distance
    pub const INITIAL_PLANCKIAN_DISTANCE: Self = Self(0x0020);
    /// Input current range specification
    pub const INPUT_CURRENT_RANGE_SPECIFICATION: Self = Self(0x0021);
    /// Input current statistics
    pub const INPUT_CURRENT_STATISTICS: Self = Self(0x0022);
    /// Input over current event statistics
    pub const INPUT_OVER_CURRENT_EVENT_STATISTICS: Self = Self(0x0023);
    /// Input over ripple voltage event statistics
    pub const INPUT_OVER_RIPPLE_VOLTAGE_EVENT_STATISTICS: Self = Self(0x0024);
    /// Input over voltage event statistics
    pub const INPUT_OVER_VOLTAGE_EVENT_STATISTICS: Self = Self(0x0025);
    /// Input under current event statistics
    pub const INPUT_UNDER_CURRENT_EVENT_STATISTICS: Self = Self(0x0026);
    /// Input under voltage event statistics
    pub const INPUT_UNDER_VOLTAGE_EVENT_STATISTICS: Self = Self(0x0027);
    /// Input voltage range specification
    pub const INPUT_VOLTAGE_RANGE_SPECIFICATION: Self = Self(0x0028);
    /// Input voltage ripple specification
    pub const INPUT_VOLTAGE_RIPPLE_SPECIFICATION: Self = Self(0x0029);
    /// Input voltage statistics
    pub const INPUT_VOLTAGE_STATISTICS: Self = Self(0x002A);
    /// Light control ambient lux level on
    pub const LIGHT_CONTROL_AMBIENT_LUXLEVEL_ON: Self = Self(0x002B);
    /// Light control ambient lux level prolong
    pub const LIGHT_CONTROL_AMBIENT_LUXLEVEL_PROLONG: Self = Self(0x002C);
    /// Light control ambient lux level standby
    pub const LIGHT_CONTROL_AMBIENT_LUXLEVEL_STANDBY: Self = Self(0x002D);
    /// Light control lightness on
    pub const LIGHT_CONTROL_LIGHTNESS_ON: Self = Self(0x002E);
    /// Light control lightness prolong
    pub const LIGHT_CONTROL_LIGHTNESS_PROLONG: Self = Self(0x002F);
    /// Light control lightness standby
    pub const LIGHT_CONTROL_LIGHTNESS_STANDBY: Self = Self(0x0030);
    /// Light control regulator accuracy
    pub const LIGHT_CONTROL_REGULATOR_ACCURACY: Self = Self(0x0031);
    /// Light control regulator KiD
    pub const LIGHT_CONTROL_REGULATOR_KID: Self = Self(0x0032);
    /// Light control regulator KiU
    pub const LIGHT_CONTROL_REGULATOR_KIU: Self = Self(0x0033);
    /// Light control regulator KpD
    pub const LIGHT_CONTROL_REGULATOR_KPD: Self = Self(0x0034);
    /// Light control regulator KpU
    pub const LIGHT_CONTROL_REGULATOR_KPU: Self = Self(0x0035);
    /// Light control time fade
    pub const LIGHT_CONTROL_TIME_FADE: Self = Self(0x0036);
    /// Light control time fade on
    pub const LIGHT_CONTROL_TIME_FADE_ON: Self = Self(0x0037);
    /// Light control time fade standby auto
    pub const LIGHT_CONTROL_TIME_FADE_STANDBY_AUTO: Self = Self(0x0038);
    /// Light control time fade standby manual
    pub const LIGHT_CONTROL_TIME_FADE_STANDBY_MANUAL: Self = Self(0x0039);
    /// Light control time occupancy delay
    pub const LIGHT_CONTROL_TIME_OCCUPANCY_DELAY: Self = Self(0x003A);
    /// Light control time prolong
    pub const LIGHT_CONTROL_TIME_PROLONG: Self = Self(0x003B);
    /// Light control time run on
    pub const LIGHT_CONTROL_TIME_RUN_ON: Self = Self(0x003C);
    /// Lumen maintenance factor
    pub const LUMEN_MAINTENANCE_FACTOR: Self = Self(0x003D);
    /// Luminous efficacy
    pub const LUMINOUS_EFFICACY: Self = Self(0x003E);
    /// Luminous energy since turn on
    pub const LUMINOUS_ENERGY_SINCE_TURN_ON: Self = Self(0x003F);
    /// Luminous exposure
    pub const LUMINOUS_EXPOSURE: Self = Self(0x0040);
    /// Luminous flux range
    pub const LUMINOUS_FLUX_RANGE: Self = Self(0x0041);
    /// Motion sensed
    pub const MOTION_SENSED: Self = Self(0x0042);
    /// Motion threshold
    pub const MOTION_THRESHOLD: Self = Self(0x0043);
    /// Open circuit event statistics
    pub const OPEN_CIRCUIT_EVENT_STATISTICS: Self = Self(0x0044);
    /// Outdoor statistical values
    pub const OUTDOOR_STATISTICAL_VALUES: Self = Self(0x0045);
    /// Output current range
    pub const OUTPUT_CURRENT_RANGE: Self = Self(0x0046);
    /// Output current statistics
    pub const OUTPUT_CURRENT_STATISTICS: Self = Self(0x0047);
    /// Output ripple voltage specification
    pub const OUTPUT_RIPPLE_VOLTAGE_SPECIFICATION: Self = Self(0x0048);
    /// Output voltage range
    pub const OUTPUT_VOLTAGE_RANGE: Self = Self(0x0049);
    /// Output voltage statistics
    pub const OUTPUT_VOLTAGE_STATISTICS: Self = Self(0x004A);
    /// Over output ripple voltage event statistics
    pub const OVER_OUTPUT_RIPPLE_VOLTAGE_EVENT_STATISTICS: Self = Self(0x004B);
    /// People count
    pub const PEOPLE_COUNT: Self = Self(0x004C);
    /// Presence detected
    pub const PRESENCE_DETECTED: Self = Self(0x004D);
    /// Present ambient light level
    pub const PRESENT_AMBIENT_LIGHT_LEVEL: Self = Self(0x004E);
    /// Present ambient temperature
    pub const PRESENT_AMBIENT_TEMPERATURE: Self = Self(0x004F);
    /// Present CIE 1931 chromaticity coordinates
    pub const PRESENT_CIE1931_CHROMATICITY_COORDINATES: Self = Self(0x0050);
    /// Present correlated color temperature
    pub const PRESENT_CORRELATED_COLOR_TEMPERATURE: Self = Self(0x0051);
    /// Present device input power
    pub const PRESENT_DEVICE_INPUT_POWER: Self = Self(0x0052);
    /// Present device operating efficiency
    pub const PRESENT_DEVICE_OPERATING_EFFICIENCY: Self = Self(0x0053);
    /// Present device operating temperature
    pub const PRESENT_DEVICE_OPERATING_TEMPERATURE: Self = Self(0x0054);
    /// Present illuminance
    pub const PRESENT_ILLUMINANCE: Self = Self(0x0055);
    /// Present indoor ambient temperature
    pub const PRESENT_INDOOR_AMBIENT_TEMPERATURE: Self = Self(0x0056);
    /// Present input current
    pub const PRESENT_INPUT_CURRENT: Self = Self(0x0057);
    /// Present input ripple voltage
    pub const PRESENT_INPUT_RIPPLE_VOLTAGE: Self = Self(0x0058);
    /// Present input voltage
    pub const PRESENT_INPUT_VOLTAGE: Self = Self(0x0059);
    /// Present luminous flux
    pub const PRESENT_LUMINOUS_FLUX: Self = Self(0x005A);
    /// Present outdoor ambient temperature
    pub const PRESENT_OUTDOOR_AMBIENT_TEMPERATURE: Self = Self(0x005B);
    /// Present output current
    pub const PRESENT_OUTPUT_CURRENT: Self = Self(0x005C);
    /// Present output voltage
    pub const PRESENT_OUTPUT_VOLTAGE: Self = Self(0x005D);
    /// Present planckian distance
    pub const PRESENT_PLANCKIAN_DISTANCE: Self = Self(0x005E);
    /// Present relative output ripple voltage
    pub const PRESENT_RELATIVE_OUTPUT_RIPPLE_VOLTAGE: Self = Self(0x005F);
    /// Relative device energy use in a period of day
    pub const RELATIVE_DEVICE_ENERGY_USE_IN_A_PERIOD_OF_DAY: Self = Self(0x0060);
    /// Relative device runtime in a generic level range
    pub const RELATIVE_DEVICE_RUNTIME_IN_A_GENERIC_LEVEL_RANGE: Self = Self(0x0061);
    /// Relative exposure time in an illuminance range
    pub const RELATIVE_EXPOSURE_TIME_IN_AN_ILLUMINANCE_RANGE: Self = Self(0x0062);
    /// Relative runtime in a correlated color temperature range
    pub const RELATIVE_RUNTIME_IN_A_CORRELATED_COLOR_TEMPERATURE_RANGE: Self = Self(0x0063);
    /// Relative runtime in a device operating temperature range
    pub const RELATIVE_RUNTIME_IN_A_DEVICE_OPERATING_TEMPERATURE_RANGE: Self = Self(0x0064);
    /// Relative runtime in an input current range
    pub const RELATIVE_RUNTIME_IN_AN_INPUT_CURRENT_RANGE: Self = Self(0x0065);
    /// Relative runtime in an input voltage range
    pub const RELATIVE_RUNTIME_IN_AN_INPUT_VOLTAGE_RANGE: Self = Self(0x0066);
    /// Short circuit event statistics
    pub const SHORT_CIRCUIT_EVENT_STATISTICS: Self = Self(0x0067);
    /// Time since motion sensed
    pub const TIME_SINCE_MOTION_SENSED: Self = Self(0x0068);
    /// Time since presence detected
    pub const TIME_SINCE_PRESENCE_DETECTED: Self = Self(0x0069);
    /// Total device energy use
    pub const TOTAL_DEVICE_ENERGY_USE: Self = Self(0x006A);
    /// Total device off on cycles
    pub const TOTAL_DEVICE_OFF_ON_CYCLES: Self = Self(0x006B);
    /// Total device power on cycles
    pub const TOTAL_DEVICE_POWER_ON_CYCLES: Self = Self(0x006C);
    /// Total device power on time
    pub const TOTAL_DEVICE_POWER_ON_TIME: Self = Self(0x006D);
    /// Total device runtime
    pub const TOTAL_DEVICE_RUNTIME: Self = Self(0x006E);
    /// Total light exposure time
    pub const TOTAL_LIGHT_EXPOSURE_TIME: Self = Self(0x006F);
    /// Total luminous energy
    pub const TOTAL_LUMINOUS_ENERGY: Self = Self(0x0070);
    /// Emergency lighting test: precise total device energy use
    pub const ELT_PRECISE_TOTAL_DEVICE_ENERGY_USE: Self = Self(0x0072);
    /// Emergency lighting test: duration test execution timeout
    pub const ELT_DURATION_TEST_EXECUTION_TIMEOUT: Self = Self(0xFF84);
    /// Emergency lighting test: functional test execution timeout
    pub const ELT_FUNCTIONAL_TEST_EXECUTION_TIMEOUT: Self = Self(0xFF85);
    /// Emergency lighting test: duration test retry period
    pub const ELT_DURATION_TEST_RETRY_PERIOD: Self = Self(0xFF86);
    /// Emergency lighting test: functional test retry period
    pub const ELT_FUNCTIONAL_TEST_RETRY_PERIOD: Self = Self(0xFF87);
    /// Emergency lighting test: duration test backup automatic delay
    pub const ELT_DURATION_TEST_BACKUP_AUTOMATIC_DELAY: Self = Self(0xFF88);
    /// Emergency lighting test: functional test backup automatic delay
    pub const ELT_FUNCTIONAL_TEST_BACKUP_AUTOMATIC_DELAY: Self = Self(0xFF89);
    /// Emergency lighting test: duration test backup automatic interval
    pub const ELT_DURATION_TEST_BACKUP_AUTOMATIC_INTERVAL: Self = Self(0xFF8A);
    /// Emergency lighting test: functional test backup automatic interval
    pub const ELT_FUNCTIONAL_TEST_BACKUP_AUTOMATIC_INTERVAL: Self = Self(0xFF8B);

    /// Characteristic carrying this property, if the layout is known
    pub fn characteristic(self) -> Option<Characteristic> {
        let fields: &'static [Field] = match self {
            Self::AVERAGE_AMBIENT_TEMPERATURE_IN_A_PERIOD_OF_DAY => {
                TEMPERATURE_8_IN_A_PERIOD_OF_DAY
            }
            Self::AVERAGE_INPUT_CURRENT
            | Self::AVERAGE_OUTPUT_CURRENT => AVERAGE_CURRENT,
            Self::AVERAGE_INPUT_VOLTAGE
            | Self::AVERAGE_OUTPUT_VOLTAGE => AVERAGE_VOLTAGE,
            Self::CENTER_BEAM_INTENSITY_AT_FULL_POWER => LUMINOUS_INTENSITY,
            Self::CHROMATICITY_TOLERANCE => CHROMATICITY_TOLERANCE,
            Self::COLOR_RENDERING_INDEX_R9
            | Self::COLOR_RENDERING_INDEX_RA => COLOR_RENDERING_INDEX,
            Self::DEVICE_APPEARANCE => APPEARANCE,
            Self::DEVICE_COUNTRY_OF_ORIGIN => COUNTRY_CODE,
            Self::DEVICE_DATE_OF_MANUFACTURE => DATE_UTC,
            Self::DEVICE_ENERGY_USE_SINCE_TURN_ON
            | Self::TOTAL_DEVICE_ENERGY_USE => ENERGY,
            Self::DEVICE_FIRMWARE_REVISION
            | Self::DEVICE_SOFTWARE_REVISION => STRING_8,
            Self::DEVICE_GLOBAL_TRADE_ITEM_NUMBER => GLOBAL_TRADE_ITEM_NUMBER,
            Self::DEVICE_HARDWARE_REVISION
            | Self::DEVICE_SERIAL_NUMBER => STRING_16,
            Self::DEVICE_MANUFACTURER_NAME => STRING_36,
            Self::DEVICE_MODEL_NUMBER => STRING_24,
            Self::DEVICE_OPERATING_TEMPERATURE_RANGE_SPECIFICATION => TEMPERATURE_RANGE,
            Self::DEVICE_OPERATING_TEMPERATURE_STATISTICAL_VALUES => TEMPERATURE_STATISTICS,
            Self::DEVICE_OVER_TEMPERATURE_EVENT_STATISTICS
            | Self::DEVICE_UNDER_TEMPERATURE_EVENT_STATISTICS
            | Self::INPUT_OVER_CURRENT_EVENT_STATISTICS
            | Self::INPUT_OVER_RIPPLE_VOLTAGE_EVENT_STATISTICS
            | Self::INPUT_OVER_VOLTAGE_EVENT_STATISTICS
            | Self::INPUT_UNDER_CURRENT_EVENT_STATISTICS
            | Self::INPUT_UNDER_VOLTAGE_EVENT_STATISTICS
            | Self::OPEN_CIRCUIT_EVENT_STATISTICS
            | Self::OVER_OUTPUT_RIPPLE_VOLTAGE_EVENT_STATISTICS
            | Self::SHORT_CIRCUIT_EVENT_STATISTICS => EVENT_STATISTICS,
            Self::DEVICE_POWER_RANGE_SPECIFICATION => POWER_SPECIFICATION,
            Self::DEVICE_RUNTIME_SINCE_TURN_ON
            | Self::DEVICE_RUNTIME_WARRANTY
            | Self::TOTAL_DEVICE_POWER_ON_TIME
            | Self::TOTAL_DEVICE_RUNTIME
            | Self::TOTAL_LIGHT_EXPOSURE_TIME => TIME_HOUR_24,
            Self::INDOOR_AMBIENT_TEMPERATURE_STATISTICAL_VALUES
            | Self::OUTDOOR_STATISTICAL_VALUES => TEMPERATURE_8_STATISTICS,
            Self::INITIAL_CIE1931_CHROMATICITY_COORDINATES
            | Self::PRESENT_CIE1931_CHROMATICITY_COORDINATES => CHROMATICITY_COORDINATES,
            Self::INITIAL_CORRELATED_COLOR_TEMPERATURE
            | Self::PRESENT_CORRELATED_COLOR_TEMPERATURE => CORRELATED_COLOR_TEMPERATURE,
            Self::INITIAL_LUMINOUS_FLUX
            | Self::PRESENT_LUMINOUS_FLUX => LUMINOUS_FLUX,
            Self::INITIAL_PLANCKIAN_DISTANCE
            | Self::PRESENT_PLANCKIAN_DISTANCE => CHROMATIC_DISTANCE_FROM_PLANCKIAN,
            Self::INPUT_CURRENT_RANGE_SPECIFICATION => ELECTRIC_CURRENT_SPECIFICATION,
            Self::INPUT_CURRENT_STATISTICS
            | Self::OUTPUT_CURRENT_STATISTICS => ELECTRIC_CURRENT_STATISTICS,
            Self::INPUT_VOLTAGE_RANGE_SPECIFICATION
            | Self::OUTPUT_VOLTAGE_RANGE => VOLTAGE_RANGE,
            Self::INPUT_VOLTAGE_RIPPLE_SPECIFICATION
            | Self::LIGHT_CONTROL_REGULATOR_ACCURACY
            | Self::LUMEN_MAINTENANCE_FACTOR
            | Self::MOTION_SENSED
            | Self::MOTION_THRESHOLD
            | Self::OUTPUT_RIPPLE_VOLTAGE_SPECIFICATION
            | Self::PRESENT_DEVICE_OPERATING_EFFICIENCY
            | Self::PRESENT_INPUT_RIPPLE_VOLTAGE
            | Self::PRESENT_RELATIVE_OUTPUT_RIPPLE_VOLTAGE => PERCENTAGE_8,
            Self::INPUT_VOLTAGE_STATISTICS
            | Self::OUTPUT_VOLTAGE_STATISTICS => VOLTAGE_STATISTICS,
            Self::LIGHT_CONTROL_AMBIENT_LUXLEVEL_ON
            | Self::LIGHT_CONTROL_AMBIENT_LUXLEVEL_PROLONG
            | Self::LIGHT_CONTROL_AMBIENT_LUXLEVEL_STANDBY
            | Self::PRESENT_AMBIENT_LIGHT_LEVEL
            | Self::PRESENT_ILLUMINANCE => ILLUMINANCE,
            Self::LIGHT_CONTROL_LIGHTNESS_ON
            | Self::LIGHT_CONTROL_LIGHTNESS_PROLONG
            | Self::LIGHT_CONTROL_LIGHTNESS_STANDBY => PERCEIVED_LIGHTNESS,
            Self::LIGHT_CONTROL_REGULATOR_KID
            | Self::LIGHT_CONTROL_REGULATOR_KIU
            | Self::LIGHT_CONTROL_REGULATOR_KPD
            | Self::LIGHT_CONTROL_REGULATOR_KPU => COEFFICIENT,
            Self::LIGHT_CONTROL_TIME_FADE
            | Self::LIGHT_CONTROL_TIME_FADE_ON
            | Self::LIGHT_CONTROL_TIME_FADE_STANDBY_AUTO
            | Self::LIGHT_CONTROL_TIME_FADE_STANDBY_MANUAL
            | Self::LIGHT_CONTROL_TIME_OCCUPANCY_DELAY
            | Self::LIGHT_CONTROL_TIME_PROLONG
            | Self::LIGHT_CONTROL_TIME_RUN_ON => TIME_MILLISECONDS_24,
            Self::LUMINOUS_EFFICACY => LUMINOUS_EFFICACY,
            Self::LUMINOUS_ENERGY_SINCE_TURN_ON
            | Self::RELATIVE_RUNTIME_IN_A_CORRELATED_COLOR_TEMPERATURE_RANGE
            | Self::TOTAL_LUMINOUS_ENERGY => LUMINOUS_ENERGY,
            Self::LUMINOUS_EXPOSURE => LUMINOUS_EXPOSURE,
            Self::LUMINOUS_FLUX_RANGE => LUMINOUS_FLUX_RANGE,
            Self::OUTPUT_CURRENT_RANGE => ELECTRIC_CURRENT_RANGE,
            Self::PEOPLE_COUNT => COUNT_16,
            Self::PRESENCE_DETECTED => PRESENCE,
            Self::PRESENT_AMBIENT_TEMPERATURE
            | Self::PRESENT_INDOOR_AMBIENT_TEMPERATURE
            | Self::PRESENT_OUTDOOR_AMBIENT_TEMPERATURE => TEMPERATURE_8,
            Self::PRESENT_DEVICE_INPUT_POWER => POWER,
            Self::PRESENT_DEVICE_OPERATING_TEMPERATURE => TEMPERATURE,
            Self::PRESENT_INPUT_CURRENT
            | Self::PRESENT_OUTPUT_CURRENT => ELECTRIC_CURRENT,
            Self::PRESENT_INPUT_VOLTAGE
            | Self::PRESENT_OUTPUT_VOLTAGE => VOLTAGE,
            Self::RELATIVE_DEVICE_ENERGY_USE_IN_A_PERIOD_OF_DAY => ENERGY_IN_A_PERIOD_OF_DAY,
            Self::RELATIVE_DEVICE_RUNTIME_IN_A_GENERIC_LEVEL_RANGE => {
                RELATIVE_RUNTIME_IN_A_GENERIC_LEVEL_RANGE
            }
            Self::RELATIVE_EXPOSURE_TIME_IN_AN_ILLUMINANCE_RANGE => {
                RELATIVE_VALUE_IN_AN_ILLUMINANCE_RANGE
            }
            Self::RELATIVE_RUNTIME_IN_A_DEVICE_OPERATING_TEMPERATURE_RANGE => {
                RELATIVE_VALUE_IN_A_TEMPERATURE_RANGE
            }
            Self::RELATIVE_RUNTIME_IN_AN_INPUT_CURRENT_RANGE => RELATIVE_VALUE_IN_A_CURRENT_RANGE,
            Self::RELATIVE_RUNTIME_IN_AN_INPUT_VOLTAGE_RANGE => RELATIVE_VALUE_IN_A_VOLTAGE_RANGE,
            Self::TIME_SINCE_MOTION_SENSED
            | Self::TIME_SINCE_PRESENCE_DETECTED => TIME_SECOND_16,
            Self::TOTAL_DEVICE_OFF_ON_CYCLES
            | Self::TOTAL_DEVICE_POWER_ON_CYCLES => COUNT_24,
            Self::ELT_PRECISE_TOTAL_DEVICE_ENERGY_USE => PRECISE_ENERGY,
            Self::ELT_DURATION_TEST_EXECUTION_TIMEOUT
            | Self::ELT_FUNCTIONAL_TEST_EXECUTION_TIMEOUT
            | Self::ELT_DURATION_TEST_RETRY_PERIOD
            | Self::ELT_FUNCTIONAL_TEST_RETRY_PERIOD
            | Self::ELT_DURATION_TEST_BACKUP_AUTOMATIC_DELAY
            | Self::ELT_FUNCTIONAL_TEST_BACKUP_AUTOMATIC_DELAY
            | Self::ELT_DURATION_TEST_BACKUP_AUTOMATIC_INTERVAL
            | Self::ELT_FUNCTIONAL_TEST_BACKUP_AUTOMATIC_INTERVAL => TIME_SECOND_32,
            _ => return None,
        };
        Some(Characteristic { fields })
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl From<u16> for PropertyId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl Codec for PropertyId {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_u16(buf).map(Self)
    }
}

/// Integer count scaled by `multiplier / divisor` into its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    /// Width in bytes, 1 to 4
    pub width: usize,
    /// Two's complement encoding
    pub signed: bool,
    /// Unit multiplier
    pub multiplier: u32,
    /// Unit divisor
    pub divisor: u32,
    /// The all-ones raw value means "not known"
    pub unknown: bool,
}

impl Count {
    const fn unsigned(width: usize) -> Self {
        Self {
            width,
            signed: false,
            multiplier: 1,
            divisor: 1,
            unknown: true,
        }
    }

    const fn signed(width: usize) -> Self {
        Self {
            width,
            signed: true,
            multiplier: 1,
            divisor: 1,
            unknown: false,
        }
    }

    const fn per(mut self, divisor: u32) -> Self {
        self.divisor = divisor;
        self
    }

    const fn times(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    const fn known(mut self) -> Self {
        self.unknown = false;
        self
    }

    fn raw_range(&self) -> (i64, i64) {
        let bits = 8 * self.width as u32;
        if self.signed {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        } else {
            (0, (1i64 << bits) - 1)
        }
    }

    fn decode(&self, buf: &mut Bytes) -> AccessResult<FieldValue> {
        need(buf, self.width)?;
        let raw = if self.signed {
            buf.get_int_le(self.width)
        } else {
            buf.get_uint_le(self.width) as i64
        };
        if self.unknown && raw == self.raw_range().1 {
            return Ok(FieldValue::Unknown);
        }
        Ok(FieldValue::Number(
            raw as f64 * f64::from(self.multiplier) / f64::from(self.divisor),
        ))
    }

    fn encode(&self, name: &str, value: &FieldValue, buf: &mut BytesMut) -> AccessResult<()> {
        let (min, max) = self.raw_range();
        let raw = match value {
            FieldValue::Unknown if self.unknown => max,
            FieldValue::Number(number) => {
                let scaled =
                    (number * f64::from(self.divisor) / f64::from(self.multiplier)).round();
                let limit = if self.unknown { max - 1 } else { max };
                if !scaled.is_finite() || scaled < min as f64 || scaled > limit as f64 {
                    return Err(invalid(name, number));
                }
                scaled as i64
            }
            other => return Err(mismatch(name, other)),
        };
        if self.signed {
            buf.put_int_le(raw, self.width);
        } else {
            buf.put_uint_le(raw as u64, self.width);
        }
        Ok(())
    }
}

/// Wire format of a single characteristic field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Scaled count
    Count(Count),
    /// Unscaled unsigned integer of the given width in bytes
    Integer(usize),
    /// Time of 1.1^(n - 64) seconds, zero meaning zero
    Exponential8,
    /// Days since 1970-01-01 in 24 bits, zero meaning not known
    Date,
    /// NUL padded UTF-8 string of the given width
    String(usize),
    /// Single byte boolean
    Flag,
    /// 10-bit category over a 6-bit sub-category
    Appearance,
}

impl FieldFormat {
    /// Encoded width in bytes
    pub fn width(&self) -> usize {
        match self {
            Self::Count(count) => count.width,
            Self::Integer(width) | Self::String(width) => *width,
            Self::Exponential8 | Self::Flag => 1,
            Self::Appearance => 2,
            Self::Date => 3,
        }
    }
}

/// Named field of a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name used as the key in [`PropertyValue::Fields`]
    pub name: &'static str,
    /// Wire format
    pub format: FieldFormat,
}

const fn field(name: &'static str, format: FieldFormat) -> Field {
    Field { name, format }
}

const fn count(name: &'static str, count: Count) -> Field {
    field(name, FieldFormat::Count(count))
}

/// Decoded characteristic field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Value in the unit of the field
    Number(f64),
    /// Value is not known
    Unknown,
    /// Unscaled integer
    Integer(u64),
    /// Boolean flag
    Bool(bool),
    /// Text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Device appearance
    Appearance {
        /// Appearance category
        category: u16,
        /// Appearance sub-category
        sub_category: u8,
    },
}

fn mismatch(name: &str, value: &FieldValue) -> AccessError {
    AccessError::Validation(format!("unexpected {value:?} for field {name}"))
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

impl Field {
    fn decode(&self, buf: &mut Bytes) -> AccessResult<FieldValue> {
        Ok(match self.format {
            FieldFormat::Count(count) => count.decode(buf)?,
            FieldFormat::Integer(width) => {
                need(buf, width)?;
                FieldValue::Integer(buf.get_uint_le(width))
            }
            FieldFormat::Exponential8 => match get_u8(buf)? {
                0 => FieldValue::Number(0.0),
                raw => FieldValue::Number(round4(1.1f64.powi(i32::from(raw) - 64))),
            },
            FieldFormat::Date => match get_u24(buf)? {
                0 => FieldValue::Unknown,
                days => NaiveDate::default()
                    .checked_add_days(Days::new(u64::from(days)))
                    .map(FieldValue::Date)
                    .ok_or_else(|| invalid("date", days))?,
            },
            FieldFormat::String(width) => FieldValue::Text(get_padded_str(buf, width)?),
            FieldFormat::Flag => FieldValue::Bool(get_u8(buf)? != 0),
            FieldFormat::Appearance => {
                let raw = get_u16(buf)?;
                FieldValue::Appearance {
                    category: raw >> 6,
                    sub_category: (raw & 0x3f) as u8,
                }
            }
        })
    }

    fn encode(&self, value: &FieldValue, buf: &mut BytesMut) -> AccessResult<()> {
        let name = self.name;
        match (self.format, value) {
            (FieldFormat::Count(count), _) => count.encode(name, value, buf)?,
            (FieldFormat::Integer(width), FieldValue::Integer(raw)) => {
                if width < 8 && *raw >= 1u64 << (8 * width) {
                    return Err(invalid(name, raw));
                }
                buf.put_uint_le(*raw, width);
            }
            (FieldFormat::Exponential8, FieldValue::Number(seconds)) => {
                let raw = if *seconds == 0.0 {
                    0.0
                } else {
                    (seconds.ln() / 1.1f64.ln()).round() + 64.0
                };
                if !(0.0..=255.0).contains(&raw) || (raw == 0.0 && *seconds != 0.0) {
                    return Err(invalid(name, seconds));
                }
                buf.put_u8(raw as u8);
            }
            (FieldFormat::Date, FieldValue::Unknown) => put_u24(buf, 0)?,
            (FieldFormat::Date, FieldValue::Date(date)) => {
                let days = date.signed_duration_since(NaiveDate::default()).num_days();
                if !(1..=0xff_ffff).contains(&days) {
                    return Err(invalid(name, date));
                }
                put_u24(buf, days as u32)?;
            }
            (FieldFormat::String(width), FieldValue::Text(text)) => {
                put_padded_str(buf, text, width)?;
            }
            (FieldFormat::Flag, FieldValue::Bool(flag)) => buf.put_u8(u8::from(*flag)),
            (
                FieldFormat::Appearance,
                FieldValue::Appearance {
                    category,
                    sub_category,
                },
            ) => {
                if *category > 0x3ff || *sub_category > 0x3f {
                    return Err(invalid(name, format_args!("{category}/{sub_category}")));
                }
                buf.put_u16_le(*category << 6 | u16::from(*sub_category));
            }
            _ => return Err(mismatch(name, value)),
        }
        Ok(())
    }
}

/// Fixed layout of named fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Characteristic {
    fields: &'static [Field],
}

impl Characteristic {
    /// Fields in wire order
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Encoded width in bytes
    pub fn width(&self) -> usize {
        self.fields.iter().map(|field| field.format.width()).sum()
    }

    /// Decode every field from the front of `buf`
    pub fn decode(&self, buf: &mut Bytes) -> AccessResult<BTreeMap<String, FieldValue>> {
        self.fields
            .iter()
            .map(|field| Ok((field.name.to_string(), field.decode(buf)?)))
            .collect()
    }

    /// Encode every field; each one must be present in `values`
    pub fn encode(
        &self,
        values: &BTreeMap<String, FieldValue>,
        buf: &mut BytesMut,
    ) -> AccessResult<()> {
        for field in self.fields {
            let value = values.get(field.name).ok_or_else(|| {
                AccessError::Validation(format!("missing field {}", field.name))
            })?;
            field.encode(value, buf)?;
        }
        Ok(())
    }
}

/// Property value, typed when the characteristic is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// Decoded characteristic fields keyed by name
    Fields(BTreeMap<String, FieldValue>),
    /// Undecoded value bytes
    Raw(Bytes),
}

impl PropertyValue {
    /// Decode the value of `property_id`; unknown properties take the rest
    /// of `buf` as raw bytes
    pub fn decode(property_id: PropertyId, buf: &mut Bytes) -> AccessResult<Self> {
        match property_id.characteristic() {
            Some(characteristic) => characteristic.decode(buf).map(Self::Fields),
            None => Ok(Self::Raw(buf.split_to(buf.remaining()))),
        }
    }

    /// Encode the value of `property_id`
    pub fn encode(&self, property_id: PropertyId, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            Self::Fields(values) => property_id
                .characteristic()
                .ok_or_else(|| {
                    AccessError::Validation(format!("no characteristic for property {property_id}"))
                })?
                .encode(values, buf),
            Self::Raw(raw) => {
                buf.put_slice(raw);
                Ok(())
            }
        }
    }

    /// Decoded field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self {
            Self::Fields(values) => values.get(name),
            Self::Raw(_) => None,
        }
    }
}

const U16: Count = Count::unsigned(2);
const U24: Count = Count::unsigned(3);
const U32: Count = Count::unsigned(4);
const MILLISECONDS_24: Count = Count::unsigned(3).per(1000);
const DECIHOUR: Count = Count::unsigned(1).per(10);
const AMPERE: Count = Count::unsigned(2).per(100);
const VOLT: Count = Count::unsigned(2).per(64);
const WATT: Count = Count::unsigned(3).per(10);
const CELSIUS: Count = Count::signed(2).per(100);
const CELSIUS_8: Count = Count::signed(1).per(2);
const PERCENT_8: Count = Count::unsigned(1).per(2);
const RELATIVE: Count = PERCENT_8.known();
const KILO_24: Count = Count::unsigned(3).times(1000);
const LUX: Count = Count::unsigned(3).per(100).known();

const SENSING_DURATION: Field = field("sensing_duration", FieldFormat::Exponential8);

const TIME_MILLISECONDS_24: &[Field] = &[count("seconds", MILLISECONDS_24)];
const TIME_HOUR_24: &[Field] = &[count("hours", U24)];
const TIME_SECOND_16: &[Field] = &[count("seconds", U16)];
const TIME_SECOND_32: &[Field] = &[count("seconds", U32)];
const DATE_UTC: &[Field] = &[field("date", FieldFormat::Date)];

const ELECTRIC_CURRENT: &[Field] = &[count("current", AMPERE)];
const AVERAGE_CURRENT: &[Field] = &[count("electric_current_value", AMPERE), SENSING_DURATION];
const ELECTRIC_CURRENT_RANGE: &[Field] = &[
    count("minimum_electric_current_value", AMPERE),
    count("maximum_electric_current_value", AMPERE),
];
const ELECTRIC_CURRENT_SPECIFICATION: &[Field] = &[
    count("minimum_electric_current_value", AMPERE),
    count("typical_electric_current_value", AMPERE),
    count("maximum_electric_current_value", AMPERE),
];
const ELECTRIC_CURRENT_STATISTICS: &[Field] = &[
    count("average_electric_current_value", AMPERE),
    count("standard_deviation_electric_current_value", AMPERE),
    count("minimum_electric_current_value", AMPERE),
    count("maximum_electric_current_value", AMPERE),
    SENSING_DURATION,
];
const RELATIVE_VALUE_IN_A_CURRENT_RANGE: &[Field] = &[
    count("relative_value", PERCENT_8),
    count("minimum_current", AMPERE),
    count("maximum_current", AMPERE),
];

const VOLTAGE: &[Field] = &[count("voltage", VOLT)];
const AVERAGE_VOLTAGE: &[Field] = &[count("voltage_value", VOLT), SENSING_DURATION];
const VOLTAGE_RANGE: &[Field] = &[
    count("minimum_voltage_value", VOLT),
    count("typical_voltage_value", VOLT),
    count("maximum_voltage_value", VOLT),
];
const VOLTAGE_STATISTICS: &[Field] = &[
    count("average_voltage_value", VOLT),
    count("standard_deviation_voltage_value", VOLT),
    count("minimum_voltage_value", VOLT),
    count("maximum_voltage_value", VOLT),
    SENSING_DURATION,
];
const RELATIVE_VALUE_IN_A_VOLTAGE_RANGE: &[Field] = &[
    count("relative_value", RELATIVE),
    count("minimum_voltage", VOLT),
    count("maximum_voltage", VOLT),
];

const ENERGY: &[Field] = &[count("energy", U24)];
const PRECISE_ENERGY: &[Field] = &[count("energy", U32)];
const ENERGY_IN_A_PERIOD_OF_DAY: &[Field] = &[
    count("energy_value", U24),
    count("start_time", DECIHOUR),
    count("end_time", DECIHOUR),
];

const POWER: &[Field] = &[count("power", WATT)];
const POWER_SPECIFICATION: &[Field] = &[
    count("minimum_power_value", WATT),
    count("typical_power_value", WATT),
    count("maximum_power_value", WATT),
];

const TEMPERATURE: &[Field] = &[count("temperature", CELSIUS)];
const TEMPERATURE_8: &[Field] = &[count("temperature", CELSIUS_8)];
const TEMPERATURE_RANGE: &[Field] = &[
    count("minimum_temperature", CELSIUS_8),
    count("maximum_temperature", CELSIUS_8),
];
const TEMPERATURE_8_STATISTICS: &[Field] = &[
    count("average_temperature", CELSIUS_8),
    count("standard_deviation_temperature", CELSIUS_8),
    count("minimum_temperature", CELSIUS_8),
    count("maximum_temperature", CELSIUS_8),
    SENSING_DURATION,
];
const TEMPERATURE_8_IN_A_PERIOD_OF_DAY: &[Field] = &[
    count("temperature", CELSIUS_8),
    count("start_time", DECIHOUR),
    count("end_time", DECIHOUR),
];
const TEMPERATURE_STATISTICS: &[Field] = &[
    count("average_temperature", CELSIUS),
    count("standard_deviation_temperature", CELSIUS),
    count("minimum_temperature", CELSIUS),
    count("maximum_temperature", CELSIUS),
    SENSING_DURATION,
];
const RELATIVE_VALUE_IN_A_TEMPERATURE_RANGE: &[Field] = &[
    count("relative_value", RELATIVE),
    count("minimum_temperature", CELSIUS),
    count("maximum_temperature", CELSIUS),
];

const LUMINOUS_FLUX: &[Field] = &[count("luminous_flux", U16)];
const LUMINOUS_FLUX_RANGE: &[Field] = &[
    count("minimum_luminous_flux", U16),
    count("maximum_luminous_flux", U16),
];
const LUMINOUS_ENERGY: &[Field] = &[count("luminous_energy", KILO_24)];
const LUMINOUS_EXPOSURE: &[Field] = &[count("luminous_exposure", KILO_24)];
const LUMINOUS_INTENSITY: &[Field] = &[count("luminous_intensity", U16)];
const LUMINOUS_EFFICACY: &[Field] = &[count("luminous_efficacy", Count::unsigned(2).per(10))];
const ILLUMINANCE: &[Field] = &[count("illuminance", LUX)];
const RELATIVE_VALUE_IN_AN_ILLUMINANCE_RANGE: &[Field] = &[
    count("relative_value", RELATIVE),
    count("minimum_illuminance", LUX),
    count("maximum_illuminance", LUX),
];
const PERCEIVED_LIGHTNESS: &[Field] = &[field("perceived_lightness", FieldFormat::Integer(2))];

const PERCENTAGE_8: &[Field] = &[count("percentage", PERCENT_8)];
const COUNT_16: &[Field] = &[count("count", U16)];
const COUNT_24: &[Field] = &[count("count", U24)];
const COEFFICIENT: &[Field] = &[count("coefficient", U32)];

const CHROMATICITY_TOLERANCE: &[Field] = &[count(
    "chromaticity_tolerance",
    Count::signed(1).per(10_000),
)];
const CHROMATIC_DISTANCE_FROM_PLANCKIAN: &[Field] = &[count(
    "distance_from_planckian",
    Count::signed(2).per(100_000),
)];
const CORRELATED_COLOR_TEMPERATURE: &[Field] = &[count("correlated_color_temperature", U16)];
const CHROMATICITY_COORDINATES: &[Field] = &[
    count("chromaticity_x_coordinate", Count::unsigned(2).per(0xffff).known()),
    count("chromaticity_y_coordinate", Count::unsigned(2).per(0xffff).known()),
];
const COLOR_RENDERING_INDEX: &[Field] = &[count("color_rendering_index", Count::signed(1))];

const GLOBAL_TRADE_ITEM_NUMBER: &[Field] = &[field(
    "global_trade_item_number",
    FieldFormat::Integer(6),
)];
const APPEARANCE: &[Field] = &[field("appearance", FieldFormat::Appearance)];
const COUNTRY_CODE: &[Field] = &[count("country_code", U16)];
const PRESENCE: &[Field] = &[field("presence_detected", FieldFormat::Flag)];
const EVENT_STATISTICS: &[Field] = &[
    count("number_of_events", U16),
    count("average_event_duration", U16),
    field("time_elapsed_since_last_event", FieldFormat::Exponential8),
    SENSING_DURATION,
];
const RELATIVE_RUNTIME_IN_A_GENERIC_LEVEL_RANGE: &[Field] = &[
    count("relative_value", RELATIVE),
    count("minimum_generic_level", U16.known()),
    count("maximum_generic_level", U16.known()),
];

const STRING_8: &[Field] = &[field("value", FieldFormat::String(8))];
const STRING_16: &[Field] = &[field("value", FieldFormat::String(16))];
const STRING_24: &[Field] = &[field("value", FieldFormat::String(24))];
const STRING_36: &[Field] = &[field("value", FieldFormat::String(36))];

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(property_id: PropertyId, hex_str: &str) -> PropertyValue {
        let raw = hex::decode(hex_str).unwrap();
        let mut buf = Bytes::from(raw.clone());
        let value = PropertyValue::decode(property_id, &mut buf).unwrap();
        assert!(buf.is_empty());

        let mut out = BytesMut::new();
        value.encode(property_id, &mut out).unwrap();
        assert_eq!(out.to_vec(), raw);
        value
    }

    fn number(value: &PropertyValue, name: &str) -> f64 {
        match value.get(name) {
            Some(FieldValue::Number(number)) => *number,
            other => panic!("expected number for {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_scaled_counts() {
        let value = roundtrip(PropertyId::PRESENT_INPUT_CURRENT, "c800");
        assert_eq!(number(&value, "current"), 2.0);

        let value = roundtrip(PropertyId::PRESENT_INPUT_VOLTAGE, "2003");
        assert_eq!(number(&value, "voltage"), 12.5);

        let value = roundtrip(PropertyId::PRESENT_ILLUMINANCE, "1a2700");
        assert_eq!(number(&value, "illuminance"), 100.1);

        let value = roundtrip(PropertyId::TOTAL_LUMINOUS_ENERGY, "020000");
        assert_eq!(number(&value, "luminous_energy"), 2000.0);

        let value = roundtrip(PropertyId::LIGHT_CONTROL_TIME_FADE, "b80b00");
        assert_eq!(number(&value, "seconds"), 3.0);

        let value = roundtrip(PropertyId::DEVICE_POWER_RANGE_SPECIFICATION, "e80300d007000f2700");
        assert_eq!(number(&value, "typical_power_value"), 200.0);
        assert_eq!(number(&value, "maximum_power_value"), 999.9);
    }

    #[test]
    fn test_signed_counts() {
        let value = roundtrip(PropertyId::PRESENT_AMBIENT_TEMPERATURE, "e1");
        assert_eq!(number(&value, "temperature"), -15.5);

        let value = roundtrip(PropertyId::PRESENT_DEVICE_OPERATING_TEMPERATURE, "e620");
        assert_eq!(number(&value, "temperature"), 84.22);

        let value = roundtrip(PropertyId::COLOR_RENDERING_INDEX_R9, "9c");
        assert_eq!(number(&value, "color_rendering_index"), -100.0);

        let value = roundtrip(PropertyId::OUTDOOR_STATISTICAL_VALUES, "3102dc6e71");
        assert_eq!(number(&value, "average_temperature"), 24.5);
        assert_eq!(number(&value, "minimum_temperature"), -18.0);
        assert_eq!(number(&value, "maximum_temperature"), 55.0);
        assert_eq!(number(&value, "sensing_duration"), 106.719);
    }

    #[test]
    fn test_unknown_value() {
        let value = roundtrip(PropertyId::TOTAL_DEVICE_POWER_ON_TIME, "ffffff");
        assert_eq!(value.get("hours"), Some(&FieldValue::Unknown));

        let value = roundtrip(PropertyId::TOTAL_DEVICE_POWER_ON_TIME, "0a0000");
        assert_eq!(number(&value, "hours"), 10.0);

        // illuminance has no "not known" value
        let value = roundtrip(PropertyId::PRESENT_ILLUMINANCE, "ffffff");
        assert_eq!(number(&value, "illuminance"), 167772.15);
    }

    #[test]
    fn test_exponential_time() {
        let value = roundtrip(PropertyId::AVERAGE_INPUT_CURRENT, "c80039");
        assert_eq!(number(&value, "electric_current_value"), 2.0);
        assert_eq!(number(&value, "sensing_duration"), 0.5132);

        let value = roundtrip(PropertyId::AVERAGE_INPUT_CURRENT, "c80000");
        assert_eq!(number(&value, "sensing_duration"), 0.0);

        let value = roundtrip(PropertyId::SHORT_CIRCUIT_EVENT_STATISTICS, "050001007040");
        assert_eq!(number(&value, "number_of_events"), 5.0);
        assert_eq!(number(&value, "time_elapsed_since_last_event"), 97.0172);
        assert_eq!(number(&value, "sensing_duration"), 1.0);
    }

    #[test]
    fn test_text_and_date() {
        let value = roundtrip(PropertyId::DEVICE_FIRMWARE_REVISION, "6162636465660000");
        assert_eq!(value.get("value"), Some(&FieldValue::Text("abcdef".into())));

        let value = roundtrip(PropertyId::DEVICE_DATE_OF_MANUFACTURE, "de4600");
        assert_eq!(
            value.get("date"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2019, 9, 3).unwrap()))
        );

        let value = roundtrip(PropertyId::DEVICE_DATE_OF_MANUFACTURE, "000000");
        assert_eq!(value.get("date"), Some(&FieldValue::Unknown));
    }

    #[test]
    fn test_integer_flag_and_appearance() {
        let value = roundtrip(PropertyId::DEVICE_GLOBAL_TRADE_ITEM_NUMBER, "ffeeddccbbaa");
        assert_eq!(
            value.get("global_trade_item_number"),
            Some(&FieldValue::Integer(0xaabbccddeeff))
        );

        let value = roundtrip(PropertyId::PRESENCE_DETECTED, "01");
        assert_eq!(value.get("presence_detected"), Some(&FieldValue::Bool(true)));

        let value = roundtrip(PropertyId::DEVICE_APPEARANCE, "04f0");
        assert_eq!(
            value.get("appearance"),
            Some(&FieldValue::Appearance {
                category: 960,
                sub_category: 4,
            })
        );
    }

    #[test]
    fn test_vendor_property_is_raw() {
        let id = PropertyId(0x4090);
        assert!(id.characteristic().is_none());
        assert_eq!(
            roundtrip(id, "a244ff0000"),
            PropertyValue::Raw(Bytes::from_static(&[0xa2, 0x44, 0xff, 0x00, 0x00]))
        );
    }

    #[test]
    fn test_encode_validation() {
        let mut buf = BytesMut::new();
        let value = PropertyValue::Fields(BTreeMap::from([(
            "percentage".to_string(),
            FieldValue::Number(200.0),
        )]));
        assert!(value.encode(PropertyId::MOTION_SENSED, &mut buf).is_err());

        let missing = PropertyValue::Fields(BTreeMap::new());
        assert!(missing.encode(PropertyId::MOTION_SENSED, &mut buf).is_err());

        let wrong = PropertyValue::Fields(BTreeMap::from([(
            "percentage".to_string(),
            FieldValue::Text("40".into()),
        )]));
        assert!(wrong.encode(PropertyId::MOTION_SENSED, &mut buf).is_err());
        assert!(value.encode(PropertyId(0x4090), &mut buf).is_err());
    }

    #[test]
    fn test_characteristic_width() {
        let width = |id: PropertyId| id.characteristic().map(|c| c.width());
        assert_eq!(width(PropertyId::PRESENT_INPUT_CURRENT), Some(2));
        assert_eq!(width(PropertyId::DEVICE_MANUFACTURER_NAME), Some(36));
        assert_eq!(width(PropertyId::INPUT_VOLTAGE_STATISTICS), Some(9));
        assert_eq!(width(PropertyId::ELT_FUNCTIONAL_TEST_RETRY_PERIOD), Some(4));
    }

    #[test]
    fn test_json_shape() {
        let value = roundtrip(PropertyId::MOTION_SENSED, "50");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({"fields": {"percentage": {"number": 40.0}}})
        );
    }
}
