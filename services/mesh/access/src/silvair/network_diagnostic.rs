//! Silvair Network Diagnostic models.
//!
//! The server (0xFC3601) collects heartbeat-like registry records from a
//! subscription; the setup server (0xFD3601) configures the periodic
//! diagnostic publication.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::adapters::{address, get_key_index, put_key_index, TransitionTime, Ttl};
use crate::codec::{get_u16, get_u8, Codec};
use crate::config::{hops, Features};
use crate::error::AccessResult;

/// Diagnostic subscription request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSet {
    /// Address the diagnostic publications are sent to
    pub destination: u16,
    /// Subscription period in seconds
    pub period: u16,
}

impl Codec for SubscriptionSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast_unassigned_or_group(self.destination)?);
        buf.put_u16_le(self.period);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            destination: address::unicast_unassigned_or_group(get_u16(buf)?)?,
            period: get_u16(buf)?,
        })
    }
}

/// Statistics collected for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Publishing node
    pub source: u16,
    /// Publications received
    pub count: u16,
    /// Fewest hops observed
    pub min_hops: u8,
    /// Most hops observed
    pub max_hops: u8,
}

impl Codec for RegistryRecord {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast_or_unassigned(self.source)?);
        buf.put_u16_le(self.count);
        buf.put_u8(hops(self.min_hops)?);
        buf.put_u8(hops(self.max_hops)?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            source: address::unicast_or_unassigned(get_u16(buf)?)?,
            count: get_u16(buf)?,
            min_hops: hops(get_u8(buf)?)?,
            max_hops: hops(get_u8(buf)?)?,
        })
    }
}

/// Subscription state with the records gathered so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// Subscription parameters
    #[serde(flatten)]
    pub subscription: SubscriptionSet,
    /// Registry capacity
    pub max_record_count: u8,
    /// Collected records
    pub records: Vec<RegistryRecord>,
}

impl Codec for SubscriptionStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.subscription.encode(buf)?;
        buf.put_u8(self.max_record_count);
        self.records.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            subscription: SubscriptionSet::decode(buf)?,
            max_record_count: get_u8(buf)?,
            records: Vec::decode(buf)?,
        })
    }
}

/// Diagnostic publication parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Destination address
    pub destination: u16,
    /// Number of publications
    pub count: u16,
    /// Publication period
    pub period: TransitionTime,
    /// TTL of diagnostic messages
    pub ttl: u8,
    /// Network key index
    pub net_key_index: u16,
    /// Features reported, absent in the short form
    pub features: Option<Features>,
}

impl Codec for Publication {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast_unassigned_or_group(self.destination)?);
        buf.put_u16_le(self.count);
        self.period.encode(buf)?;
        Ttl(self.ttl).encode(buf)?;
        put_key_index(buf, self.net_key_index)?;
        self.features.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            destination: address::unicast_unassigned_or_group(get_u16(buf)?)?,
            count: get_u16(buf)?,
            period: TransitionTime::decode(buf)?,
            ttl: Ttl::decode(buf)?.0,
            net_key_index: get_key_index(buf)?,
            features: Option::decode(buf)?,
        })
    }
}

access_messages! {
    /// Network diagnostic server sub-opcodes
    subopcode NetworkDiagnosticSubOpcode;
    /// Network diagnostic server payloads
    payload NetworkDiagnosticPayload {
        /// Read the subscription
        SubscriptionGet = 0x00,
        /// Start a subscription
        SubscriptionSet(SubscriptionSet) = 0x01,
        /// Start a subscription without acknowledgement
        SubscriptionSetUnacknowledged(SubscriptionSet) = 0x02,
        /// Subscription state
        SubscriptionStatus(SubscriptionStatus) = 0x03,
        /// Read radio statistics
        RadioStatGet = 0x04,
        /// Reset radio statistics
        RadioStatSet = 0x05,
        /// Radio statistics
        RadioStatStatus = 0x06,
    }
}

access_messages! {
    /// Network diagnostic setup server sub-opcodes
    subopcode NetworkDiagnosticSetupSubOpcode;
    /// Network diagnostic setup server payloads
    payload NetworkDiagnosticSetupPayload {
        /// Read the publication
        PublicationGet = 0x00,
        /// Configure the publication
        PublicationSet(Publication) = 0x01,
        /// Publication state
        PublicationStatus(Publication) = 0x02,
    }
}
