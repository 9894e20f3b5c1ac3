//! Health Server and Client messages.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_u16, get_u8, invalid, Codec};
use crate::error::AccessResult;

/// Largest fast period divisor
pub const MAX_FAST_PERIOD_DIVISOR: u8 = 15;

/// Self-test request for a company's fault set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultTest {
    /// Identifier of the test to run
    pub test_id: u8,
    /// Company identifier
    pub company_id: u16,
}

impl Codec for FaultTest {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.test_id);
        buf.put_u16_le(self.company_id);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            test_id: get_u8(buf)?,
            company_id: get_u16(buf)?,
        })
    }
}

/// Registered or current faults of a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultStatus {
    /// Identifier of the most recent test
    pub test_id: u8,
    /// Company identifier
    pub company_id: u16,
    /// Fault codes, possibly empty
    pub fault_array: Vec<u8>,
}

impl Codec for FaultStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.test_id);
        buf.put_u16_le(self.company_id);
        buf.put_slice(&self.fault_array);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            test_id: get_u8(buf)?,
            company_id: get_u16(buf)?,
            fault_array: Vec::decode(buf)?,
        })
    }
}

/// Divisor of the health publish period while faults are present, as a
/// power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FastPeriodDivisor(pub u8);

impl Codec for FastPeriodDivisor {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        if self.0 > MAX_FAST_PERIOD_DIVISOR {
            return Err(invalid("fast period divisor", self.0));
        }
        buf.put_u8(self.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        match get_u8(buf)? {
            divisor if divisor > MAX_FAST_PERIOD_DIVISOR => {
                Err(invalid("fast period divisor", divisor))
            }
            divisor => Ok(Self(divisor)),
        }
    }
}

access_messages! {
    /// Health model opcodes
    opcode HealthOpcode;
    /// Health model messages
    message HealthMessage {
        /// Faults currently present
        CurrentStatus(FaultStatus) = 0x04,
        /// Registered faults
        FaultStatus(FaultStatus) = 0x05,
        /// Read attention timer
        AttentionGet = 0x8004,
        /// Set attention timer in seconds
        AttentionSet(u8) = 0x8005,
        /// Set attention timer without acknowledgement
        AttentionSetUnacknowledged(u8) = 0x8006,
        /// Attention timer
        AttentionStatus(u8) = 0x8007,
        /// Clear registered faults
        FaultClear(u16) = 0x802f,
        /// Clear registered faults without acknowledgement
        FaultClearUnacknowledged(u16) = 0x8030,
        /// Read registered faults
        FaultGet(u16) = 0x8031,
        /// Run a self-test
        FaultTest(FaultTest) = 0x8032,
        /// Run a self-test without acknowledgement
        FaultTestUnacknowledged(FaultTest) = 0x8033,
        /// Read fast period divisor
        PeriodGet = 0x8034,
        /// Set fast period divisor
        PeriodSet(FastPeriodDivisor) = 0x8035,
        /// Set fast period divisor without acknowledgement
        PeriodSetUnacknowledged(FastPeriodDivisor) = 0x8036,
        /// Fast period divisor
        PeriodStatus(FastPeriodDivisor) = 0x8037,
    }
}
