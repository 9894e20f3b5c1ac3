//! Configuration Server and Client messages.
//!
//! Addresses and key indexes are little-endian; key indexes are 12-bit values
//! packed singly into two bytes or in pairs into three bytes.

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::adapters::{
    address, get_key_index, get_u12_pair, put_key_index, put_u12_pair, KeyIndex, KeyIndexPair,
    KeyIndices, LogScale, LogValue, NetworkRetransmit, PublishRetransmit, StepResolution, Ttl,
    MAX_KEY_INDEX,
};
use crate::codec::{get_array, get_u16, get_u24, get_u8, invalid, need, put_u24, Codec};
use crate::error::{AccessError, AccessResult};

/// Size of network and application keys
pub const KEY_SIZE: usize = 16;

/// Size of a virtual address label UUID
pub const LABEL_SIZE: usize = 16;

const HEARTBEAT_PUBLICATION_COUNT: LogScale = LogScale::new(0x10, true);
const HEARTBEAT_PUBLICATION_PERIOD: LogScale = LogScale::new(0x10, false);
const HEARTBEAT_SUBSCRIPTION_PERIOD: LogScale = LogScale::new(0x11, false);
const HEARTBEAT_SUBSCRIPTION_COUNT: LogScale = LogScale::new(0x11, true);
const MAX_HOPS: u8 = 0x7f;

mesh_enum! {
    /// Status code of configuration responses
    pub enum StatusCode: u8 {
        /// Success
        Success = 0x00,
        /// Invalid address
        InvalidAddress = 0x01,
        /// Invalid model
        InvalidModel = 0x02,
        /// Invalid application key index
        InvalidAppKeyIndex = 0x03,
        /// Invalid network key index
        InvalidNetKeyIndex = 0x04,
        /// Insufficient resources
        InsufficientResources = 0x05,
        /// Key index already stored
        KeyIndexAlreadyStored = 0x06,
        /// Invalid publish parameters
        InvalidPublishParameters = 0x07,
        /// Not a subscribe model
        NotASubscribeModel = 0x08,
        /// Storage failure
        StorageFailure = 0x09,
        /// Feature not supported
        FeatureNotSupported = 0x0a,
        /// Cannot update
        CannotUpdate = 0x0b,
        /// Cannot remove
        CannotRemove = 0x0c,
        /// Cannot bind
        CannotBind = 0x0d,
        /// Temporarily unable to change state
        TemporarilyUnableToChangeState = 0x0e,
        /// Cannot set
        CannotSet = 0x0f,
        /// Unspecified error
        UnspecifiedError = 0x10,
        /// Invalid binding
        InvalidBinding = 0x11,
    }
}

mesh_enum! {
    /// Secure network beacon broadcast state
    pub enum BeaconState: u8 {
        /// Not broadcasting
        Off = 0x00,
        /// Broadcasting
        On = 0x01,
    }
}

mesh_enum! {
    /// State of an optional node feature
    pub enum FeatureState: u8 {
        /// Supported and disabled
        Disabled = 0x00,
        /// Supported and enabled
        Enabled = 0x01,
        /// Not supported
        NotSupported = 0x02,
    }
}

mesh_enum! {
    /// Node identity advertising state
    pub enum NodeIdentity: u8 {
        /// Advertising stopped
        Stopped = 0x00,
        /// Advertising running
        Running = 0x01,
        /// Not supported
        NotSupported = 0x02,
    }
}

mesh_enum! {
    /// Key refresh procedure phase
    pub enum KeyRefreshPhase: u8 {
        /// Normal operation
        Normal = 0x00,
        /// First phase, new keys distributed
        First = 0x01,
        /// Second phase, new keys used for transmission
        Second = 0x02,
    }
}

mesh_enum! {
    /// Key refresh phase transition requested by a client
    pub enum KeyRefreshTransition: u8 {
        /// Move to the second phase
        Second = 0x02,
        /// Move to the third phase, revoking old keys
        Third = 0x03,
    }
}

bitflags! {
    /// Node features advertised in composition data and heartbeats
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Features: u16 {
        /// Relay feature
        const RELAY = 1 << 0;
        /// Proxy feature
        const PROXY = 1 << 1;
        /// Friend feature
        const FRIEND = 1 << 2;
        /// Low power feature
        const LOW_POWER = 1 << 3;
    }
}

/// Reserved feature bits are carried through unchanged
impl Codec for Features {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.bits());
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Features::from_bits_retain(get_u16(buf)?))
    }
}

/// GATT namespace location descriptor of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(pub u16);

impl Location {
    /// Unknown location
    pub const UNKNOWN: Location = Location(0x0000);

    /// Largest defined descriptor
    pub const MAX: u16 = 0x0110;

    fn validate(self) -> AccessResult<Self> {
        if self.0 > Self::MAX {
            return Err(invalid("location", format!("{:#06x}", self.0)));
        }
        Ok(self)
    }
}

impl Codec for Location {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.validate()?.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Location(get_u16(buf)?).validate()
    }
}

/// Vendor model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorModelId {
    /// Company identifier
    pub company_id: u16,
    /// Model identifier within the company
    pub model_id: u16,
}

impl Codec for VendorModelId {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.company_id);
        buf.put_u16_le(self.model_id);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            company_id: get_u16(buf)?,
            model_id: get_u16(buf)?,
        })
    }
}

/// SIG or vendor model identifier, told apart by the bytes left in the
/// message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    /// Bluetooth SIG model
    Sig(u16),
    /// Vendor model
    Vendor(VendorModelId),
}

impl Codec for ModelId {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            ModelId::Sig(model_id) => model_id.encode(buf),
            ModelId::Vendor(vendor) => vendor.encode(buf),
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        match buf.len() {
            2 => Ok(ModelId::Sig(get_u16(buf)?)),
            4 => VendorModelId::decode(buf).map(ModelId::Vendor),
            0 | 1 | 3 => Err(AccessError::Incomplete),
            len => Err(invalid("model id length", len)),
        }
    }
}

/// Element description in composition data page 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Location descriptor
    pub location: Location,
    /// SIG model identifiers
    pub sig_models: Vec<u16>,
    /// Vendor model identifiers
    pub vendor_models: Vec<VendorModelId>,
}

impl Codec for Element {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        let sig = u8::try_from(self.sig_models.len())
            .map_err(|_| invalid("sig model count", self.sig_models.len()))?;
        let vendor = u8::try_from(self.vendor_models.len())
            .map_err(|_| invalid("vendor model count", self.vendor_models.len()))?;

        self.location.encode(buf)?;
        buf.put_u8(sig);
        buf.put_u8(vendor);
        for model in &self.sig_models {
            buf.put_u16_le(*model);
        }
        for model in &self.vendor_models {
            model.encode(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let location = Location::decode(buf)?;
        let sig = get_u8(buf)?;
        let vendor = get_u8(buf)?;
        need(buf, 2 * usize::from(sig) + 4 * usize::from(vendor))?;

        let sig_models = (0..sig).map(|_| get_u16(buf)).collect::<AccessResult<_>>()?;
        let vendor_models = (0..vendor)
            .map(|_| VendorModelId::decode(buf))
            .collect::<AccessResult<_>>()?;
        Ok(Self {
            location,
            sig_models,
            vendor_models,
        })
    }
}

/// Composition data page 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionDataPage0 {
    /// Company identifier
    pub cid: u16,
    /// Product identifier
    pub pid: u16,
    /// Product version identifier
    pub vid: u16,
    /// Minimum number of replay protection list entries
    pub crpl: u16,
    /// Supported features
    pub features: Features,
    /// Elements, primary element first
    pub elements: Vec<Element>,
}

impl Codec for CompositionDataPage0 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        for value in [self.cid, self.pid, self.vid, self.crpl] {
            buf.put_u16_le(value);
        }
        self.features.encode(buf)?;
        self.elements.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            cid: get_u16(buf)?,
            pid: get_u16(buf)?,
            vid: get_u16(buf)?,
            crpl: get_u16(buf)?,
            features: Features::decode(buf)?,
            elements: Vec::decode(buf)?,
        })
    }
}

mesh_enum! {
    /// Composition data page number
    pub enum CompositionDataPage: u8 {
        /// Page 0, parsed into [`CompositionDataPage0`]
        Zero = 0x00,
        /// Page 1
        One = 0x01,
        /// Page 255
        Last = 0xff,
    }
}

/// Composition data status: page 0 parsed, pages 1 and 255 carried raw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionData {
    /// Page 0
    Page0(CompositionDataPage0),
    /// Page 1 or 255
    Raw {
        /// Page number
        page: u8,
        /// Page contents
        data: Bytes,
    },
}

impl CompositionData {
    /// Page number
    pub fn page(&self) -> u8 {
        match self {
            CompositionData::Page0(_) => 0,
            CompositionData::Raw { page, .. } => *page,
        }
    }
}

impl Codec for CompositionData {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            CompositionData::Page0(page0) => {
                buf.put_u8(0);
                page0.encode(buf)
            }
            CompositionData::Raw { page: 0, .. } => {
                Err(AccessError::Validation("page 0 must be structured".into()))
            }
            CompositionData::Raw { page, data } => {
                buf.put_u8(u8::from(CompositionDataPage::try_from(*page)?));
                buf.put_slice(data);
                Ok(())
            }
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        match CompositionDataPage::decode(buf)? {
            CompositionDataPage::Zero => {
                CompositionDataPage0::decode(buf).map(CompositionData::Page0)
            }
            page => Ok(CompositionData::Raw {
                page: page.into(),
                data: Bytes::decode(buf)?,
            }),
        }
    }
}

/// Model publication period: a step count at a step resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishPeriod {
    /// Step resolution
    pub resolution: StepResolution,
    /// Number of steps, zero disables periodic publishing
    pub steps: u8,
}

impl PublishPeriod {
    /// Publishing period as a duration
    pub fn duration(&self) -> std::time::Duration {
        self.resolution.step() * u32::from(self.steps)
    }
}

impl Codec for PublishPeriod {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        if self.steps > 0x3f {
            return Err(invalid("publish period steps", self.steps));
        }
        buf.put_u8((u8::from(self.resolution) << 6) | self.steps);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let value = get_u8(buf)?;
        Ok(Self {
            resolution: StepResolution::try_from(value >> 6)?,
            steps: value & 0x3f,
        })
    }
}

/// Application key index with the friendship credential flag
fn put_publish_key(
    buf: &mut BytesMut,
    app_key_index: u16,
    credential_flag: bool,
) -> AccessResult<()> {
    if app_key_index > MAX_KEY_INDEX {
        return Err(invalid("app key index", app_key_index));
    }
    buf.put_u16_le(app_key_index | (u16::from(credential_flag) << 12));
    Ok(())
}

fn get_publish_key(buf: &mut Bytes) -> AccessResult<(u16, bool)> {
    let value = get_u16(buf)?;
    Ok((value & MAX_KEY_INDEX, value & 0x1000 != 0))
}

/// Element address paired with a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPublicationGet {
    /// Element address
    pub element_address: u16,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelPublicationGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Publication parameters shared by the plain and virtual address variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishParameters {
    /// Application key used for publishing
    pub app_key_index: u16,
    /// Publish with friendship credentials
    pub credential_flag: bool,
    /// TTL of published messages
    pub ttl: u8,
    /// Publishing period
    pub publish_period: PublishPeriod,
    /// Retransmission of published messages
    pub retransmit: PublishRetransmit,
}

impl Codec for PublishParameters {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_publish_key(buf, self.app_key_index, self.credential_flag)?;
        Ttl(self.ttl).encode(buf)?;
        self.publish_period.encode(buf)?;
        self.retransmit.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let (app_key_index, credential_flag) = get_publish_key(buf)?;
        Ok(Self {
            app_key_index,
            credential_flag,
            ttl: Ttl::decode(buf)?.0,
            publish_period: PublishPeriod::decode(buf)?,
            retransmit: PublishRetransmit::decode(buf)?,
        })
    }
}

/// Model publication set to a non-virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPublication {
    /// Element address
    pub element_address: u16,
    /// Publish address, never virtual
    pub publish_address: u16,
    /// Publication parameters
    #[serde(flatten)]
    pub parameters: PublishParameters,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelPublication {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_u16_le(address::not_virtual(self.publish_address)?);
        self.parameters.encode(buf)?;
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            publish_address: address::not_virtual(get_u16(buf)?)?,
            parameters: PublishParameters::decode(buf)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Model publication set to a virtual address label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPublicationVirtual {
    /// Element address
    pub element_address: u16,
    /// Label UUID of the virtual address
    pub label: [u8; LABEL_SIZE],
    /// Publication parameters
    #[serde(flatten)]
    pub parameters: PublishParameters,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelPublicationVirtual {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_slice(&self.label);
        self.parameters.encode(buf)?;
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            label: get_array(buf)?,
            parameters: PublishParameters::decode(buf)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Model publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPublicationStatus {
    /// Status code
    pub status: StatusCode,
    /// Current publication
    #[serde(flatten)]
    pub publication: ModelPublication,
}

impl Codec for ModelPublicationStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.publication.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            publication: ModelPublication::decode(buf)?,
        })
    }
}

/// Subscription list change for a group or fixed address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSubscription {
    /// Element address
    pub element_address: u16,
    /// Subscription address
    pub address: u16,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelSubscription {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_u16_le(address::subscription(self.address)?);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            address: address::subscription(get_u16(buf)?)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Subscription list change for a virtual address label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSubscriptionVirtual {
    /// Element address
    pub element_address: u16,
    /// Label UUID of the virtual address
    pub label: [u8; LABEL_SIZE],
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelSubscriptionVirtual {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_slice(&self.label);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            label: get_array(buf)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Subscription list operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSubscriptionStatus {
    /// Status code
    pub status: StatusCode,
    /// Element address
    pub element_address: u16,
    /// Subscription address, unassigned for virtual label operations
    pub address: u16,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelSubscriptionStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_u16_le(address::status_subscription(self.address)?);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            element_address: address::unicast(get_u16(buf)?)?,
            address: address::status_subscription(get_u16(buf)?)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// SIG model on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigModelGet {
    /// Element address
    pub element_address: u16,
    /// SIG model identifier
    pub model_id: u16,
}

impl Codec for SigModelGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        buf.put_u16_le(self.model_id);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            model_id: get_u16(buf)?,
        })
    }
}

/// Vendor model on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorModelGet {
    /// Element address
    pub element_address: u16,
    /// Vendor model identifier
    pub model: VendorModelId,
}

impl Codec for VendorModelGet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            model: VendorModelId::decode(buf)?,
        })
    }
}

/// Subscription list of a SIG model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigModelSubscriptionList {
    /// Status code
    pub status: StatusCode,
    /// Element and model
    #[serde(flatten)]
    pub model: SigModelGet,
    /// Subscribed addresses
    pub addresses: Vec<u16>,
}

impl Codec for SigModelSubscriptionList {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.model.encode(buf)?;
        self.addresses.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            model: SigModelGet::decode(buf)?,
            addresses: Vec::decode(buf)?,
        })
    }
}

/// Subscription list of a vendor model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorModelSubscriptionList {
    /// Status code
    pub status: StatusCode,
    /// Element and model
    #[serde(flatten)]
    pub model: VendorModelGet,
    /// Subscribed addresses
    pub addresses: Vec<u16>,
}

impl Codec for VendorModelSubscriptionList {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.model.encode(buf)?;
        self.addresses.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            model: VendorModelGet::decode(buf)?,
            addresses: Vec::decode(buf)?,
        })
    }
}

/// Application keys bound to a SIG model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigModelAppList {
    /// Status code
    pub status: StatusCode,
    /// Element and model
    #[serde(flatten)]
    pub model: SigModelGet,
    /// Bound application key indexes
    pub app_key_indices: KeyIndices,
}

impl Codec for SigModelAppList {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.model.encode(buf)?;
        self.app_key_indices.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            model: SigModelGet::decode(buf)?,
            app_key_indices: KeyIndices::decode(buf)?,
        })
    }
}

/// Application keys bound to a vendor model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorModelAppList {
    /// Status code
    pub status: StatusCode,
    /// Element and model
    #[serde(flatten)]
    pub model: VendorModelGet,
    /// Bound application key indexes
    pub app_key_indices: KeyIndices,
}

impl Codec for VendorModelAppList {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.model.encode(buf)?;
        self.app_key_indices.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            model: VendorModelGet::decode(buf)?,
            app_key_indices: KeyIndices::decode(buf)?,
        })
    }
}

/// Element address and model with the subscription list to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSubscriptionDeleteAll {
    /// Element address
    pub element_address: u16,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelSubscriptionDeleteAll {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Network key addition or update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetKeyAdd {
    /// Network key index
    pub net_key_index: u16,
    /// Network key
    pub net_key: [u8; KEY_SIZE],
}

impl Codec for NetKeyAdd {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_key_index(buf, self.net_key_index)?;
        buf.put_slice(&self.net_key);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            net_key_index: get_key_index(buf)?,
            net_key: get_array(buf)?,
        })
    }
}

/// Network key operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetKeyStatus {
    /// Status code
    pub status: StatusCode,
    /// Network key index
    pub net_key_index: u16,
}

impl Codec for NetKeyStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        put_key_index(buf, self.net_key_index)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            net_key_index: get_key_index(buf)?,
        })
    }
}

/// Application key addition or update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppKeyAdd {
    /// Network key index the application key is bound to
    pub net_key_index: u16,
    /// Application key index
    pub app_key_index: u16,
    /// Application key
    pub app_key: [u8; KEY_SIZE],
}

impl Codec for AppKeyAdd {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_u12_pair(buf, self.net_key_index, self.app_key_index)?;
        buf.put_slice(&self.app_key);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let (net_key_index, app_key_index) = get_u12_pair(buf)?;
        Ok(Self {
            net_key_index,
            app_key_index,
            app_key: get_array(buf)?,
        })
    }
}

/// Application key operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppKeyStatus {
    /// Status code
    pub status: StatusCode,
    /// Key indexes
    #[serde(flatten)]
    pub indexes: KeyIndexPair,
}

impl Codec for AppKeyStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.indexes.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            indexes: KeyIndexPair::decode(buf)?,
        })
    }
}

/// Application keys bound to a network key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppKeyList {
    /// Status code
    pub status: StatusCode,
    /// Network key index
    pub net_key_index: u16,
    /// Application key indexes
    pub app_key_indices: KeyIndices,
}

impl Codec for AppKeyList {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        put_key_index(buf, self.net_key_index)?;
        self.app_key_indices.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            net_key_index: get_key_index(buf)?,
            app_key_indices: KeyIndices::decode(buf)?,
        })
    }
}

/// Node identity state of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentitySet {
    /// Network key index
    pub net_key_index: u16,
    /// Identity advertising state
    pub identity: NodeIdentity,
}

impl Codec for NodeIdentitySet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_key_index(buf, self.net_key_index)?;
        self.identity.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            net_key_index: get_key_index(buf)?,
            identity: NodeIdentity::decode(buf)?,
        })
    }
}

/// Node identity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentityStatus {
    /// Status code
    pub status: StatusCode,
    /// Identity state
    #[serde(flatten)]
    pub identity: NodeIdentitySet,
}

impl Codec for NodeIdentityStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.identity.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            identity: NodeIdentitySet::decode(buf)?,
        })
    }
}

/// Binding between a model and an application key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAppBind {
    /// Element address
    pub element_address: u16,
    /// Application key index
    pub app_key_index: u16,
    /// Model identifier
    pub model: ModelId,
}

impl Codec for ModelAppBind {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast(self.element_address)?);
        put_key_index(buf, self.app_key_index)?;
        self.model.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            element_address: address::unicast(get_u16(buf)?)?,
            app_key_index: get_key_index(buf)?,
            model: ModelId::decode(buf)?,
        })
    }
}

/// Model binding result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAppStatus {
    /// Status code
    pub status: StatusCode,
    /// Binding
    #[serde(flatten)]
    pub binding: ModelAppBind,
}

impl Codec for ModelAppStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.binding.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            binding: ModelAppBind::decode(buf)?,
        })
    }
}

/// Relay state and retransmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Relay feature state
    pub relay: FeatureState,
    /// Relay retransmission
    pub retransmit: NetworkRetransmit,
}

impl Codec for RelaySettings {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.relay.encode(buf)?;
        self.retransmit.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            relay: FeatureState::decode(buf)?,
            retransmit: NetworkRetransmit::decode(buf)?,
        })
    }
}

/// Key refresh phase transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRefreshPhaseSet {
    /// Network key index
    pub net_key_index: u16,
    /// Requested transition
    pub transition: KeyRefreshTransition,
}

impl Codec for KeyRefreshPhaseSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        put_key_index(buf, self.net_key_index)?;
        self.transition.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            net_key_index: get_key_index(buf)?,
            transition: KeyRefreshTransition::decode(buf)?,
        })
    }
}

/// Key refresh phase of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRefreshPhaseStatus {
    /// Status code
    pub status: StatusCode,
    /// Network key index
    pub net_key_index: u16,
    /// Current phase
    pub phase: KeyRefreshPhase,
}

impl Codec for KeyRefreshPhaseStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        put_key_index(buf, self.net_key_index)?;
        self.phase.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            net_key_index: get_key_index(buf)?,
            phase: KeyRefreshPhase::decode(buf)?,
        })
    }
}

/// Heartbeat publication parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatPublication {
    /// Destination address
    pub destination: u16,
    /// Number of heartbeats left to send
    pub count: LogValue,
    /// Period between heartbeats in seconds
    pub period: u32,
    /// TTL of heartbeat messages
    pub ttl: u8,
    /// Features whose change triggers a heartbeat
    pub features: Features,
    /// Network key index
    pub net_key_index: u16,
}

impl Codec for HeartbeatPublication {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast_unassigned_or_group(self.destination)?);
        buf.put_u8(HEARTBEAT_PUBLICATION_COUNT.encode(self.count)?);
        buf.put_u8(HEARTBEAT_PUBLICATION_PERIOD.encode(LogValue::Finite(self.period))?);
        Ttl(self.ttl).encode(buf)?;
        self.features.encode(buf)?;
        put_key_index(buf, self.net_key_index)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            destination: address::unicast_unassigned_or_group(get_u16(buf)?)?,
            count: HEARTBEAT_PUBLICATION_COUNT.decode(get_u8(buf)?)?,
            period: HEARTBEAT_PUBLICATION_PERIOD.decode_finite(get_u8(buf)?)?,
            ttl: Ttl::decode(buf)?.0,
            features: Features::decode(buf)?,
            net_key_index: get_key_index(buf)?,
        })
    }
}

/// Heartbeat publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatPublicationStatus {
    /// Status code
    pub status: StatusCode,
    /// Current publication
    #[serde(flatten)]
    pub publication: HeartbeatPublication,
}

impl Codec for HeartbeatPublicationStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.publication.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            publication: HeartbeatPublication::decode(buf)?,
        })
    }
}

/// Heartbeat subscription parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatSubscription {
    /// Source address
    pub source: u16,
    /// Destination address
    pub destination: u16,
    /// Remaining subscription period in seconds
    pub period: u32,
}

impl Codec for HeartbeatSubscription {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(address::unicast_or_unassigned(self.source)?);
        buf.put_u16_le(address::unicast_unassigned_or_group(self.destination)?);
        buf.put_u8(HEARTBEAT_SUBSCRIPTION_PERIOD.encode(LogValue::Finite(self.period))?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            source: address::unicast_or_unassigned(get_u16(buf)?)?,
            destination: address::unicast_unassigned_or_group(get_u16(buf)?)?,
            period: HEARTBEAT_SUBSCRIPTION_PERIOD.decode_finite(get_u8(buf)?)?,
        })
    }
}

pub(crate) fn hops(value: u8) -> AccessResult<u8> {
    if value > MAX_HOPS {
        return Err(invalid("hops", value));
    }
    Ok(value)
}

/// Heartbeat subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatSubscriptionStatus {
    /// Status code
    pub status: StatusCode,
    /// Current subscription
    #[serde(flatten)]
    pub subscription: HeartbeatSubscription,
    /// Heartbeats received
    pub count: LogValue,
    /// Minimum hops of received heartbeats
    pub min_hops: u8,
    /// Maximum hops of received heartbeats
    pub max_hops: u8,
}

impl Codec for HeartbeatSubscriptionStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.status.encode(buf)?;
        self.subscription.encode(buf)?;
        buf.put_u8(HEARTBEAT_SUBSCRIPTION_COUNT.encode(self.count)?);
        buf.put_u8(hops(self.min_hops)?);
        buf.put_u8(hops(self.max_hops)?);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            status: StatusCode::decode(buf)?,
            subscription: HeartbeatSubscription::decode(buf)?,
            count: HEARTBEAT_SUBSCRIPTION_COUNT.decode(get_u8(buf)?)?,
            min_hops: hops(get_u8(buf)?)?,
            max_hops: hops(get_u8(buf)?)?,
        })
    }
}

/// Poll timeout of a low power node served by a friend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowPowerNodePollTimeout {
    /// Low power node address
    pub lpn_address: u16,
    /// Poll timeout in 100 ms units
    pub poll_timeout: u32,
}

impl Codec for LowPowerNodePollTimeout {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.lpn_address);
        put_u24(buf, self.poll_timeout)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            lpn_address: get_u16(buf)?,
            poll_timeout: get_u24(buf)?,
        })
    }
}

access_messages! {
    /// Configuration model opcodes
    opcode ConfigOpcode;
    /// Configuration model messages
    message ConfigMessage {
        /// Add an application key
        AppKeyAdd(AppKeyAdd) = 0x00,
        /// Update an application key
        AppKeyUpdate(AppKeyAdd) = 0x01,
        /// Composition data
        CompositionDataStatus(CompositionData) = 0x02,
        /// Set model publication
        ModelPublicationSet(ModelPublication) = 0x03,
        /// Heartbeat publication
        HeartbeatPublicationStatus(HeartbeatPublicationStatus) = 0x06,
        /// Delete an application key
        AppKeyDelete(KeyIndexPair) = 0x8000,
        /// List application keys of a network key
        AppKeyGet(KeyIndex) = 0x8001,
        /// Application key list
        AppKeyList(AppKeyList) = 0x8002,
        /// Application key result
        AppKeyStatus(AppKeyStatus) = 0x8003,
        /// Read composition data page
        CompositionDataGet(CompositionDataPage) = 0x8008,
        /// Read secure network beacon state
        BeaconGet = 0x8009,
        /// Set secure network beacon state
        BeaconSet(BeaconState) = 0x800a,
        /// Secure network beacon state
        BeaconStatus(BeaconState) = 0x800b,
        /// Read default TTL
        DefaultTtlGet = 0x800c,
        /// Set default TTL
        DefaultTtlSet(Ttl) = 0x800d,
        /// Default TTL
        DefaultTtlStatus(Ttl) = 0x800e,
        /// Read friend state
        FriendGet = 0x800f,
        /// Set friend state
        FriendSet(FeatureState) = 0x8010,
        /// Friend state
        FriendStatus(FeatureState) = 0x8011,
        /// Read GATT proxy state
        GattProxyGet = 0x8012,
        /// Set GATT proxy state
        GattProxySet(FeatureState) = 0x8013,
        /// GATT proxy state
        GattProxyStatus(FeatureState) = 0x8014,
        /// Read key refresh phase
        KeyRefreshPhaseGet(KeyIndex) = 0x8015,
        /// Request a key refresh phase transition
        KeyRefreshPhaseSet(KeyRefreshPhaseSet) = 0x8016,
        /// Key refresh phase
        KeyRefreshPhaseStatus(KeyRefreshPhaseStatus) = 0x8017,
        /// Read model publication
        ModelPublicationGet(ModelPublicationGet) = 0x8018,
        /// Model publication
        ModelPublicationStatus(ModelPublicationStatus) = 0x8019,
        /// Set model publication to a virtual address
        ModelPublicationVirtualAddressSet(ModelPublicationVirtual) = 0x801a,
        /// Add a subscription address
        ModelSubscriptionAdd(ModelSubscription) = 0x801b,
        /// Delete a subscription address
        ModelSubscriptionDelete(ModelSubscription) = 0x801c,
        /// Clear the subscription list
        ModelSubscriptionDeleteAll(ModelSubscriptionDeleteAll) = 0x801d,
        /// Replace the subscription list with one address
        ModelSubscriptionOverwrite(ModelSubscription) = 0x801e,
        /// Subscription list operation result
        ModelSubscriptionStatus(ModelSubscriptionStatus) = 0x801f,
        /// Add a virtual subscription address
        ModelSubscriptionVirtualAddressAdd(ModelSubscriptionVirtual) = 0x8020,
        /// Delete a virtual subscription address
        ModelSubscriptionVirtualAddressDelete(ModelSubscriptionVirtual) = 0x8021,
        /// Replace the subscription list with one virtual address
        ModelSubscriptionVirtualAddressOverwrite(ModelSubscriptionVirtual) = 0x8022,
        /// Read network transmit parameters
        NetworkTransmitGet = 0x8023,
        /// Set network transmit parameters
        NetworkTransmitSet(NetworkRetransmit) = 0x8024,
        /// Network transmit parameters
        NetworkTransmitStatus(NetworkRetransmit) = 0x8025,
        /// Read relay state
        RelayGet = 0x8026,
        /// Set relay state
        RelaySet(RelaySettings) = 0x8027,
        /// Relay state
        RelayStatus(RelaySettings) = 0x8028,
        /// Read the subscription list of a SIG model
        SigModelSubscriptionGet(SigModelGet) = 0x8029,
        /// Subscription list of a SIG model
        SigModelSubscriptionList(SigModelSubscriptionList) = 0x802a,
        /// Read the subscription list of a vendor model
        VendorModelSubscriptionGet(VendorModelGet) = 0x802b,
        /// Subscription list of a vendor model
        VendorModelSubscriptionList(VendorModelSubscriptionList) = 0x802c,
        /// Read the poll timeout of a low power node
        LowPowerNodePollTimeoutGet(u16) = 0x802d,
        /// Poll timeout of a low power node
        LowPowerNodePollTimeoutStatus(LowPowerNodePollTimeout) = 0x802e,
        /// Read heartbeat publication
        HeartbeatPublicationGet = 0x8038,
        /// Set heartbeat publication
        HeartbeatPublicationSet(HeartbeatPublication) = 0x8039,
        /// Read heartbeat subscription
        HeartbeatSubscriptionGet = 0x803a,
        /// Set heartbeat subscription
        HeartbeatSubscriptionSet(HeartbeatSubscription) = 0x803b,
        /// Heartbeat subscription
        HeartbeatSubscriptionStatus(HeartbeatSubscriptionStatus) = 0x803c,
        /// Bind an application key to a model
        ModelAppBind(ModelAppBind) = 0x803d,
        /// Binding result
        ModelAppStatus(ModelAppStatus) = 0x803e,
        /// Unbind an application key from a model
        ModelAppUnbind(ModelAppBind) = 0x803f,
        /// Add a network key
        NetKeyAdd(NetKeyAdd) = 0x8040,
        /// Delete a network key
        NetKeyDelete(KeyIndex) = 0x8041,
        /// List network keys
        NetKeyGet = 0x8042,
        /// Network key list
        NetKeyList(KeyIndices) = 0x8043,
        /// Network key result
        NetKeyStatus(NetKeyStatus) = 0x8044,
        /// Update a network key
        NetKeyUpdate(NetKeyAdd) = 0x8045,
        /// Read node identity state
        NodeIdentityGet(KeyIndex) = 0x8046,
        /// Set node identity state
        NodeIdentitySet(NodeIdentitySet) = 0x8047,
        /// Node identity state
        NodeIdentityStatus(NodeIdentityStatus) = 0x8048,
        /// Reset the node
        NodeReset = 0x8049,
        /// Node reset acknowledgement
        NodeResetStatus = 0x804a,
        /// Read application keys bound to a SIG model
        SigModelAppGet(SigModelGet) = 0x804b,
        /// Application keys bound to a SIG model
        SigModelAppList(SigModelAppList) = 0x804c,
        /// Read application keys bound to a vendor model
        VendorModelAppGet(VendorModelGet) = 0x804d,
        /// Application keys bound to a vendor model
        VendorModelAppList(VendorModelAppList) = 0x804e,
    }
}
