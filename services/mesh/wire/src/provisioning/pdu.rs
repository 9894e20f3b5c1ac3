//! Provisioning PDUs.
//!
//! Every PDU starts with `[pad:2][type:6]` followed by type specific
//! parameters. Multi-byte fields are big-endian.

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{WireError, WireResult};

/// Size of the encrypted provisioning data
pub const PROVISIONING_DATA_SIZE: usize = 25;

/// Size of the provisioning data MIC
pub const PROVISIONING_MIC_SIZE: usize = 8;

/// Size of one public key coordinate
pub const PUBLIC_KEY_COORD_SIZE: usize = 32;

fn invalid(name: &str, value: u8) -> WireError {
    WireError::Validation(format!("invalid {name} {value:#04x}"))
}

fn need(buf: &Bytes, len: usize) -> WireResult<()> {
    if buf.len() < len {
        return Err(WireError::Incomplete);
    }
    Ok(())
}

fn exact(buf: &Bytes, len: usize) -> WireResult<()> {
    if buf.len() != len {
        return Err(WireError::Length {
            expected: len,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Provisioning PDU type
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningPduType {
    /// Provisioning Invite
    Invite = 0x00,
    /// Provisioning Capabilities
    Capabilities = 0x01,
    /// Provisioning Start
    Start = 0x02,
    /// Provisioning Public Key
    PublicKey = 0x03,
    /// Provisioning Input Complete
    InputComplete = 0x04,
    /// Provisioning Confirmation
    Confirmation = 0x05,
    /// Provisioning Random
    Random = 0x06,
    /// Provisioning Data
    Data = 0x07,
    /// Provisioning Complete
    Complete = 0x08,
    /// Provisioning Failed
    Failed = 0x09,
}

impl TryFrom<u8> for ProvisioningPduType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ProvisioningPduType::Invite),
            0x01 => Ok(ProvisioningPduType::Capabilities),
            0x02 => Ok(ProvisioningPduType::Start),
            0x03 => Ok(ProvisioningPduType::PublicKey),
            0x04 => Ok(ProvisioningPduType::InputComplete),
            0x05 => Ok(ProvisioningPduType::Confirmation),
            0x06 => Ok(ProvisioningPduType::Random),
            0x07 => Ok(ProvisioningPduType::Data),
            0x08 => Ok(ProvisioningPduType::Complete),
            0x09 => Ok(ProvisioningPduType::Failed),
            _ => Err(WireError::Type(value)),
        }
    }
}

bitflags! {
    /// Supported provisioning algorithms
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Algorithms: u16 {
        /// FIPS P-256 elliptic curve with CMAC/AES-128
        const P256_CMAC_AES128 = 1 << 0;
        /// FIPS P-256 elliptic curve with HMAC/SHA-256
        const P256_HMAC_SHA256 = 1 << 1;
    }
}

bitflags! {
    /// Supported public key types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PublicKeyType: u8 {
        /// Public key available out of band
        const OOB = 1 << 0;
    }
}

bitflags! {
    /// Supported static OOB types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StaticOobType: u8 {
        /// Static OOB information available
        const AVAILABLE = 1 << 0;
    }
}

bitflags! {
    /// Supported output OOB actions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OutputOobActions: u16 {
        /// Blink
        const BLINK = 1 << 0;
        /// Beep
        const BEEP = 1 << 1;
        /// Vibrate
        const VIBRATE = 1 << 2;
        /// Output numeric
        const OUTPUT_NUMERIC = 1 << 3;
        /// Output alphanumeric
        const OUTPUT_ALPHANUMERIC = 1 << 4;
    }
}

bitflags! {
    /// Supported input OOB actions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct InputOobActions: u16 {
        /// Push
        const PUSH = 1 << 0;
        /// Twist
        const TWIST = 1 << 1;
        /// Input numeric
        const INPUT_NUMERIC = 1 << 2;
        /// Input alphanumeric
        const INPUT_ALPHANUMERIC = 1 << 3;
    }
}

macro_rules! strict_bits {
    ($ty:ty, $raw:expr, $name:literal) => {
        <$ty>::from_bits($raw)
            .ok_or_else(|| WireError::Validation(format!("invalid {} {:#x}", $name, $raw)))
    };
}

/// Provisioning algorithm selected in Provisioning Start
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// FIPS P-256 elliptic curve with CMAC/AES-128
    P256CmacAes128 = 0x00,
    /// FIPS P-256 elliptic curve with HMAC/SHA-256
    P256HmacSha256 = 0x01,
}

impl TryFrom<u8> for Algorithm {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Algorithm::P256CmacAes128),
            0x01 => Ok(Algorithm::P256HmacSha256),
            _ => Err(invalid("algorithm", value)),
        }
    }
}

/// Output OOB action selected in Provisioning Start
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputOobAction {
    /// Blink
    Blink = 0x00,
    /// Beep
    Beep = 0x01,
    /// Vibrate
    Vibrate = 0x02,
    /// Output numeric
    OutputNumeric = 0x03,
    /// Output alphanumeric
    OutputAlphanumeric = 0x04,
}

impl TryFrom<u8> for OutputOobAction {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(OutputOobAction::Blink),
            0x01 => Ok(OutputOobAction::Beep),
            0x02 => Ok(OutputOobAction::Vibrate),
            0x03 => Ok(OutputOobAction::OutputNumeric),
            0x04 => Ok(OutputOobAction::OutputAlphanumeric),
            _ => Err(invalid("output oob action", value)),
        }
    }
}

/// Input OOB action selected in Provisioning Start
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputOobAction {
    /// Push
    Push = 0x00,
    /// Twist
    Twist = 0x01,
    /// Input numeric
    InputNumeric = 0x02,
    /// Input alphanumeric
    InputAlphanumeric = 0x03,
}

impl TryFrom<u8> for InputOobAction {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(InputOobAction::Push),
            0x01 => Ok(InputOobAction::Twist),
            0x02 => Ok(InputOobAction::InputNumeric),
            0x03 => Ok(InputOobAction::InputAlphanumeric),
            _ => Err(invalid("input oob action", value)),
        }
    }
}

/// Authentication method with its action and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Authentication {
    /// No OOB authentication
    None,
    /// Static OOB authentication
    Static,
    /// Output OOB authentication
    Output {
        /// Action performed by the device
        action: OutputOobAction,
        /// Size of the output value
        size: u8,
    },
    /// Input OOB authentication
    Input {
        /// Action performed by the user
        action: InputOobAction,
        /// Size of the input value
        size: u8,
    },
}

impl Authentication {
    fn encode(&self, buf: &mut BytesMut) {
        let (method, action, size) = match *self {
            Authentication::None => (0x00, 0x00, 0x00),
            Authentication::Static => (0x01, 0x00, 0x00),
            Authentication::Output { action, size } => (0x02, action as u8, size),
            Authentication::Input { action, size } => (0x03, action as u8, size),
        };
        buf.put_u8(method);
        buf.put_u8(action);
        buf.put_u8(size);
    }

    fn decode(buf: &mut Bytes) -> WireResult<Self> {
        need(buf, 3)?;
        let method = buf.get_u8();
        let action = buf.get_u8();
        let size = buf.get_u8();

        match method {
            0x00 | 0x01 => {
                if action != 0 || size != 0 {
                    return Err(WireError::Validation(format!(
                        "authentication method {method} requires zero action and size"
                    )));
                }
                Ok(if method == 0x00 {
                    Authentication::None
                } else {
                    Authentication::Static
                })
            }
            0x02 => Ok(Authentication::Output {
                action: OutputOobAction::try_from(action)?,
                size,
            }),
            0x03 => Ok(Authentication::Input {
                action: InputOobAction::try_from(action)?,
                size,
            }),
            _ => Err(invalid("authentication method", method)),
        }
    }
}

/// Provisioning failure reason
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningError {
    /// Prohibited
    Prohibited = 0x00,
    /// The provisioning protocol PDU is not recognized by the device
    InvalidPdu = 0x01,
    /// The arguments of the protocol PDUs are outside expected values
    InvalidFormat = 0x02,
    /// The PDU received was not expected at this moment
    UnexpectedPdu = 0x03,
    /// The computed confirmation value was not successfully verified
    ConfirmationFailed = 0x04,
    /// The provisioning protocol cannot continue due to insufficient resources
    OutOfResources = 0x05,
    /// The Data block was not successfully decrypted
    DecryptionFailed = 0x06,
    /// An unexpected error occurred that may not be recoverable
    UnexpectedError = 0x07,
    /// The device cannot assign consecutive unicast addresses to all elements
    CannotAssignAddresses = 0x08,
}

impl TryFrom<u8> for ProvisioningError {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ProvisioningError::Prohibited),
            0x01 => Ok(ProvisioningError::InvalidPdu),
            0x02 => Ok(ProvisioningError::InvalidFormat),
            0x03 => Ok(ProvisioningError::UnexpectedPdu),
            0x04 => Ok(ProvisioningError::ConfirmationFailed),
            0x05 => Ok(ProvisioningError::OutOfResources),
            0x06 => Ok(ProvisioningError::DecryptionFailed),
            0x07 => Ok(ProvisioningError::UnexpectedError),
            0x08 => Ok(ProvisioningError::CannotAssignAddresses),
            _ => Err(invalid("provisioning error", value)),
        }
    }
}

/// Provisioning Capabilities parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Number of elements supported by the device
    pub num_elements: u8,
    /// Supported algorithms
    pub algorithms: Algorithms,
    /// Supported public key types
    pub public_key_type: PublicKeyType,
    /// Supported static OOB types
    pub static_oob_type: StaticOobType,
    /// Maximum size of output OOB
    pub output_oob_size: u8,
    /// Supported output OOB actions
    pub output_oob_action: OutputOobActions,
    /// Maximum size of input OOB
    pub input_oob_size: u8,
    /// Supported input OOB actions
    pub input_oob_action: InputOobActions,
}

impl Capabilities {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.num_elements);
        buf.put_u16(self.algorithms.bits());
        buf.put_u8(self.public_key_type.bits());
        buf.put_u8(self.static_oob_type.bits());
        buf.put_u8(self.output_oob_size);
        buf.put_u16(self.output_oob_action.bits());
        buf.put_u8(self.input_oob_size);
        buf.put_u16(self.input_oob_action.bits());
    }

    fn decode(buf: &mut Bytes) -> WireResult<Self> {
        exact(buf, 11)?;
        let num_elements = buf.get_u8();
        let algorithms = buf.get_u16();
        let public_key_type = buf.get_u8();
        let static_oob_type = buf.get_u8();
        let output_oob_size = buf.get_u8();
        let output_oob_action = buf.get_u16();
        let input_oob_size = buf.get_u8();
        let input_oob_action = buf.get_u16();

        Ok(Self {
            num_elements,
            algorithms: strict_bits!(Algorithms, algorithms, "algorithms")?,
            public_key_type: strict_bits!(PublicKeyType, public_key_type, "public key type")?,
            static_oob_type: strict_bits!(StaticOobType, static_oob_type, "static oob type")?,
            output_oob_size,
            output_oob_action: strict_bits!(
                OutputOobActions,
                output_oob_action,
                "output oob action"
            )?,
            input_oob_size,
            input_oob_action: strict_bits!(InputOobActions, input_oob_action, "input oob action")?,
        })
    }
}

/// Provisioning Start parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Start {
    /// Selected algorithm
    pub algorithm: Algorithm,
    /// OOB public key is used
    pub public_key: bool,
    /// Authentication method, action and size
    pub authentication: Authentication,
}

/// Device or provisioner public key (P-256 point)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// X coordinate
    pub x: [u8; PUBLIC_KEY_COORD_SIZE],
    /// Y coordinate
    pub y: [u8; PUBLIC_KEY_COORD_SIZE],
}

impl PublicKey {
    /// Build from the 64-byte uncompressed `X || Y` form
    pub fn from_slice(bytes: &[u8]) -> WireResult<Self> {
        if bytes.len() != 2 * PUBLIC_KEY_COORD_SIZE {
            return Err(WireError::Length {
                expected: 2 * PUBLIC_KEY_COORD_SIZE,
                actual: bytes.len(),
            });
        }
        let mut x = [0u8; PUBLIC_KEY_COORD_SIZE];
        let mut y = [0u8; PUBLIC_KEY_COORD_SIZE];
        x.copy_from_slice(&bytes[..PUBLIC_KEY_COORD_SIZE]);
        y.copy_from_slice(&bytes[PUBLIC_KEY_COORD_SIZE..]);
        Ok(Self { x, y })
    }

    /// The 64-byte `X || Y` form
    pub fn to_bytes(&self) -> [u8; 2 * PUBLIC_KEY_COORD_SIZE] {
        let mut out = [0u8; 2 * PUBLIC_KEY_COORD_SIZE];
        out[..PUBLIC_KEY_COORD_SIZE].copy_from_slice(&self.x);
        out[PUBLIC_KEY_COORD_SIZE..].copy_from_slice(&self.y);
        out
    }
}

/// Encrypted Provisioning Data parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Encrypted provisioning data
    pub encrypted_provisioning_data: [u8; PROVISIONING_DATA_SIZE],
    /// Provisioning data MIC
    pub provisioning_data_mic: [u8; PROVISIONING_MIC_SIZE],
}

bitflags! {
    /// Flags carried in the provisioning data
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProvisioningFlags: u8 {
        /// Key refresh phase 2 in progress
        const KEY_REFRESH = 1 << 0;
        /// IV update active
        const IV_UPDATE = 1 << 1;
    }
}

/// Plaintext provisioning data delivered to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningData {
    /// Network key
    pub network_key: [u8; 16],
    /// Network key index
    pub key_index: u16,
    /// Key refresh and IV update flags
    pub flags: ProvisioningFlags,
    /// Current IV index
    pub iv_index: u32,
    /// Unicast address of the primary element
    pub unicast_address: u16,
}

impl ProvisioningData {
    /// Encode into the 25-byte plaintext block
    pub fn to_bytes(&self) -> [u8; PROVISIONING_DATA_SIZE] {
        let mut buf = BytesMut::with_capacity(PROVISIONING_DATA_SIZE);
        buf.put_slice(&self.network_key);
        buf.put_u16(self.key_index);
        buf.put_u8(self.flags.bits());
        buf.put_u32(self.iv_index);
        buf.put_u16(self.unicast_address);

        let mut out = [0u8; PROVISIONING_DATA_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Decode the 25-byte plaintext block
    pub fn from_slice(data: &[u8]) -> WireResult<Self> {
        if data.len() != PROVISIONING_DATA_SIZE {
            return Err(WireError::Length {
                expected: PROVISIONING_DATA_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let mut network_key = [0u8; 16];
        buf.copy_to_slice(&mut network_key);
        let key_index = buf.get_u16();
        let flags = buf.get_u8();
        let iv_index = buf.get_u32();
        let unicast_address = buf.get_u16();

        Ok(Self {
            network_key,
            key_index,
            flags: strict_bits!(ProvisioningFlags, flags, "provisioning flags")?,
            iv_index,
            unicast_address,
        })
    }
}

/// Provisioning PDU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum ProvisioningPdu {
    /// Provisioning Invite
    Invite {
        /// Attention timer in seconds
        attention: u8,
    },
    /// Provisioning Capabilities
    Capabilities(Capabilities),
    /// Provisioning Start
    Start(Start),
    /// Provisioning Public Key
    PublicKey(PublicKey),
    /// Provisioning Input Complete
    InputComplete,
    /// Provisioning Confirmation
    Confirmation {
        /// Confirmation value
        confirmation: Bytes,
    },
    /// Provisioning Random
    Random {
        /// Random value
        random: Bytes,
    },
    /// Provisioning Data
    Data(EncryptedData),
    /// Provisioning Complete
    Complete,
    /// Provisioning Failed
    Failed {
        /// Failure reason
        error_code: ProvisioningError,
    },
}

impl ProvisioningPdu {
    /// PDU type
    pub fn pdu_type(&self) -> ProvisioningPduType {
        match self {
            ProvisioningPdu::Invite { .. } => ProvisioningPduType::Invite,
            ProvisioningPdu::Capabilities(_) => ProvisioningPduType::Capabilities,
            ProvisioningPdu::Start(_) => ProvisioningPduType::Start,
            ProvisioningPdu::PublicKey(_) => ProvisioningPduType::PublicKey,
            ProvisioningPdu::InputComplete => ProvisioningPduType::InputComplete,
            ProvisioningPdu::Confirmation { .. } => ProvisioningPduType::Confirmation,
            ProvisioningPdu::Random { .. } => ProvisioningPduType::Random,
            ProvisioningPdu::Data(_) => ProvisioningPduType::Data,
            ProvisioningPdu::Complete => ProvisioningPduType::Complete,
            ProvisioningPdu::Failed { .. } => ProvisioningPduType::Failed,
        }
    }

    /// Encode the PDU including its type byte
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.pdu_type() as u8);
        match self {
            ProvisioningPdu::Invite { attention } => buf.put_u8(*attention),
            ProvisioningPdu::Capabilities(capabilities) => capabilities.encode(buf),
            ProvisioningPdu::Start(start) => {
                buf.put_u8(start.algorithm as u8);
                buf.put_u8(u8::from(start.public_key));
                start.authentication.encode(buf);
            }
            ProvisioningPdu::PublicKey(key) => {
                buf.put_slice(&key.x);
                buf.put_slice(&key.y);
            }
            ProvisioningPdu::Confirmation { confirmation } => buf.put_slice(confirmation),
            ProvisioningPdu::Random { random } => buf.put_slice(random),
            ProvisioningPdu::Data(data) => {
                buf.put_slice(&data.encrypted_provisioning_data);
                buf.put_slice(&data.provisioning_data_mic);
            }
            ProvisioningPdu::InputComplete | ProvisioningPdu::Complete => {}
            ProvisioningPdu::Failed { error_code } => buf.put_u8(*error_code as u8),
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a complete PDU
    pub fn decode(buf: &mut Bytes) -> WireResult<Self> {
        need(buf, 1)?;
        let first = buf.get_u8();
        if first & 0xc0 != 0 {
            return Err(WireError::Validation(format!(
                "provisioning pdu padding bits set in {first:#04x}"
            )));
        }

        let pdu = match ProvisioningPduType::try_from(first)? {
            ProvisioningPduType::Invite => {
                exact(buf, 1)?;
                ProvisioningPdu::Invite {
                    attention: buf.get_u8(),
                }
            }
            ProvisioningPduType::Capabilities => {
                ProvisioningPdu::Capabilities(Capabilities::decode(buf)?)
            }
            ProvisioningPduType::Start => {
                exact(buf, 5)?;
                let algorithm = Algorithm::try_from(buf.get_u8())?;
                let public_key = match buf.get_u8() {
                    0x00 => false,
                    0x01 => true,
                    other => return Err(invalid("public key", other)),
                };
                let authentication = Authentication::decode(buf)?;
                ProvisioningPdu::Start(Start {
                    algorithm,
                    public_key,
                    authentication,
                })
            }
            ProvisioningPduType::PublicKey => {
                exact(buf, 2 * PUBLIC_KEY_COORD_SIZE)?;
                let body = buf.split_to(2 * PUBLIC_KEY_COORD_SIZE);
                ProvisioningPdu::PublicKey(PublicKey::from_slice(&body)?)
            }
            ProvisioningPduType::InputComplete => {
                exact(buf, 0)?;
                ProvisioningPdu::InputComplete
            }
            ProvisioningPduType::Confirmation => ProvisioningPdu::Confirmation {
                confirmation: buf.split_to(buf.len()),
            },
            ProvisioningPduType::Random => ProvisioningPdu::Random {
                random: buf.split_to(buf.len()),
            },
            ProvisioningPduType::Data => {
                exact(buf, PROVISIONING_DATA_SIZE + PROVISIONING_MIC_SIZE)?;
                let mut data = EncryptedData {
                    encrypted_provisioning_data: [0u8; PROVISIONING_DATA_SIZE],
                    provisioning_data_mic: [0u8; PROVISIONING_MIC_SIZE],
                };
                buf.copy_to_slice(&mut data.encrypted_provisioning_data);
                buf.copy_to_slice(&mut data.provisioning_data_mic);
                ProvisioningPdu::Data(data)
            }
            ProvisioningPduType::Complete => {
                exact(buf, 0)?;
                ProvisioningPdu::Complete
            }
            ProvisioningPduType::Failed => {
                exact(buf, 1)?;
                ProvisioningPdu::Failed {
                    error_code: ProvisioningError::try_from(buf.get_u8())?,
                }
            }
        };

        Ok(pdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_hex(s: &str) -> ProvisioningPdu {
        ProvisioningPdu::decode(&mut Bytes::from(hex::decode(s).unwrap())).unwrap()
    }

    fn assert_vector(encoded: &str, pdu: ProvisioningPdu) {
        assert_eq!(hex::encode(pdu.to_bytes()), encoded);
        assert_eq!(decode_hex(encoded), pdu);
    }

    #[test]
    fn test_invite() {
        assert_vector("0010", ProvisioningPdu::Invite { attention: 16 });
    }

    #[test]
    fn test_capabilities() {
        assert_vector(
            "010100030101080009050002",
            ProvisioningPdu::Capabilities(Capabilities {
                num_elements: 1,
                algorithms: Algorithms::P256_CMAC_AES128 | Algorithms::P256_HMAC_SHA256,
                public_key_type: PublicKeyType::OOB,
                static_oob_type: StaticOobType::AVAILABLE,
                output_oob_size: 8,
                output_oob_action: OutputOobActions::BLINK | OutputOobActions::OUTPUT_NUMERIC,
                input_oob_size: 5,
                input_oob_action: InputOobActions::TWIST,
            }),
        );
    }

    #[test]
    fn test_start_without_authentication() {
        assert_vector(
            "020100000000",
            ProvisioningPdu::Start(Start {
                algorithm: Algorithm::P256HmacSha256,
                public_key: false,
                authentication: Authentication::None,
            }),
        );
    }

    #[test]
    fn test_start_output_numeric() {
        assert_vector(
            "020101020304",
            ProvisioningPdu::Start(Start {
                algorithm: Algorithm::P256HmacSha256,
                public_key: true,
                authentication: Authentication::Output {
                    action: OutputOobAction::OutputNumeric,
                    size: 4,
                },
            }),
        );
    }

    #[test]
    fn test_start_static_requires_zero_action() {
        let mut data = Bytes::from(hex::decode("020001010100").unwrap());
        assert!(matches!(
            ProvisioningPdu::decode(&mut data),
            Err(WireError::Validation(_))
        ));
    }

    #[test]
    fn test_public_key() {
        let key = "2c31a47b5779809ef44cb5eaaf5c3e43d5f8faad4a8794cb987e9b03745c78dd\
                   919512183898dfbecd52e2408e43871fd021109117bd3ed4eaf8437743715d4f";
        let pdu = decode_hex(&format!("03{key}"));
        match pdu {
            ProvisioningPdu::PublicKey(public_key) => {
                assert_eq!(hex::encode(public_key.to_bytes()), key);
            }
            other => panic!("unexpected pdu {other:?}"),
        }
    }

    #[test]
    fn test_confirmation_and_random() {
        assert_vector(
            "05b38a114dfdca1fe153bd2c1e0dc46ac2",
            ProvisioningPdu::Confirmation {
                confirmation: Bytes::from(hex::decode("b38a114dfdca1fe153bd2c1e0dc46ac2").unwrap()),
            },
        );
        assert_vector(
            "068b19ac31d58b124c946209b5db1021b9",
            ProvisioningPdu::Random {
                random: Bytes::from(hex::decode("8b19ac31d58b124c946209b5db1021b9").unwrap()),
            },
        );
    }

    #[test]
    fn test_data() {
        let mut data = EncryptedData {
            encrypted_provisioning_data: [0u8; PROVISIONING_DATA_SIZE],
            provisioning_data_mic: [0u8; PROVISIONING_MIC_SIZE],
        };
        let encrypted = hex::decode("d0bd7f4a89a2ff6222af59a90a60ad58acfe3123356f5cec29").unwrap();
        data.encrypted_provisioning_data.copy_from_slice(&encrypted);
        data.provisioning_data_mic
            .copy_from_slice(&hex::decode("73e0ec50783b10c7").unwrap());

        assert_vector(
            "07d0bd7f4a89a2ff6222af59a90a60ad58acfe3123356f5cec2973e0ec50783b10c7",
            ProvisioningPdu::Data(data),
        );
    }

    #[test]
    fn test_failed_and_complete() {
        assert_vector(
            "0904",
            ProvisioningPdu::Failed {
                error_code: ProvisioningError::ConfirmationFailed,
            },
        );
        assert_vector("08", ProvisioningPdu::Complete);

        let mut data = Bytes::from_static(&[0x09, 0x09]);
        assert!(ProvisioningPdu::decode(&mut data).is_err());
    }

    #[test]
    fn test_unknown_type() {
        let mut data = Bytes::from_static(&[0x0a]);
        assert_eq!(ProvisioningPdu::decode(&mut data), Err(WireError::Type(0x0a)));
    }

    #[test]
    fn test_provisioning_data_layout() {
        let data = ProvisioningData {
            network_key: hex::decode("efb2255e6422d330088e09bb015ed707")
                .unwrap()
                .try_into()
                .unwrap(),
            key_index: 0x0567,
            flags: ProvisioningFlags::empty(),
            iv_index: 0x01020304,
            unicast_address: 0x0b0c,
        };
        assert_eq!(
            hex::encode(data.to_bytes()),
            "efb2255e6422d330088e09bb015ed707056700010203040b0c"
        );
        assert_eq!(ProvisioningData::from_slice(&data.to_bytes()).unwrap(), data);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(ProvisioningPdu::Invite { attention: 5 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "invite", "parameters": {"attention": 5}})
        );
    }
}
