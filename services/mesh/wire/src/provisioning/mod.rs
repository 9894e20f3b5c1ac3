//! Provisioning protocol: PDU codec, generic provisioning segmentation and
//! the confirmation/session cryptography.

pub mod crypto;
pub mod generic;
pub mod pdu;

pub use crypto::{
    auth_value, confirmation, confirmation_inputs, confirmation_key, confirmation_salt,
    confirmation_validate, provisioning_salt, SessionKeys, AUTH_VALUE_SIZE, RANDOM_SIZE,
};
pub use generic::{
    fcs, BearerControl, BearerOpcode, GenericProvisioningPdu, GenericProvisioningPduType,
    LinkCloseReason, PbAdvPdu, ProvisioningTransaction, CONTINUATION_SEGMENT_SIZE, MESH_FCS,
    START_SEGMENT_SIZE,
};
pub use pdu::{
    Algorithm, Algorithms, Authentication, Capabilities, EncryptedData, InputOobAction,
    InputOobActions, OutputOobAction, OutputOobActions, ProvisioningData, ProvisioningError,
    ProvisioningFlags, ProvisioningPdu, ProvisioningPduType, PublicKey, PublicKeyType, Start,
    StaticOobType,
};
