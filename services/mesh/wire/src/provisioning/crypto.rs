//! Provisioning confirmation and session cryptography.
//!
//! The ECDH shared secret is computed outside this crate; everything from
//! the secret onwards is derived here:
//!
//! ```text
//! confirmation_salt = s1(invite || capabilities || start || provisioner_key || device_key)
//! confirmation_key  = k1(secret, confirmation_salt, "prck")
//! confirmation      = AES-CMAC(confirmation_key, random || auth_value)
//! provisioning_salt = s1(confirmation_salt || provisioner_random || device_random)
//! session_key       = k1(secret, provisioning_salt, "prsk")
//! session_nonce     = k1(secret, provisioning_salt, "prsn")[3..]
//! device_key        = k1(secret, provisioning_salt, "prdk")
//! ```

use bytes::{BufMut, BytesMut};
use mesh_crypto::{
    aes_ccm_decrypt, aes_ccm_encrypt, aes_cmac_parts, k1, s1, Block, DeviceKey, NonceBytes,
    BLOCK_SIZE, NONCE_SIZE,
};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::pdu::{
    Capabilities, EncryptedData, ProvisioningData, ProvisioningPdu, PublicKey, Start,
    PROVISIONING_DATA_SIZE, PROVISIONING_MIC_SIZE,
};
use crate::error::{WireError, WireResult};

/// Size of the provisioning random values
pub const RANDOM_SIZE: usize = 16;

/// Size of the OOB authentication value
pub const AUTH_VALUE_SIZE: usize = 16;

/// Concatenate the confirmation inputs.
///
/// Each PDU contributes its parameters without the type byte.
pub fn confirmation_inputs(
    attention: u8,
    capabilities: &Capabilities,
    start: &Start,
    provisioner_key: &PublicKey,
    device_key: &PublicKey,
) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(1 + 11 + 5 + 64 + 64);
    for pdu in [
        ProvisioningPdu::Invite { attention },
        ProvisioningPdu::Capabilities(*capabilities),
        ProvisioningPdu::Start(*start),
        ProvisioningPdu::PublicKey(*provisioner_key),
        ProvisioningPdu::PublicKey(*device_key),
    ] {
        buf.put_slice(&pdu.to_bytes()[1..]);
    }
    buf.to_vec()
}

/// `s1` over the confirmation inputs
pub fn confirmation_salt(inputs: &[u8]) -> Block {
    s1(inputs)
}

/// Key used to compute confirmation values
pub fn confirmation_key(secret: &[u8], confirmation_salt: &Block) -> Block {
    k1(secret, confirmation_salt, b"prck")
}

/// Zero-pad or truncate an OOB authentication value to 16 bytes
pub fn auth_value(auth: &[u8]) -> [u8; AUTH_VALUE_SIZE] {
    let mut value = [0u8; AUTH_VALUE_SIZE];
    let len = auth.len().min(AUTH_VALUE_SIZE);
    value[..len].copy_from_slice(&auth[..len]);
    value
}

/// Confirmation value for `random` and the authentication value
pub fn confirmation(confirmation_key: &Block, random: &[u8; RANDOM_SIZE], auth: &[u8]) -> Block {
    aes_cmac_parts(confirmation_key, &[&random[..], &auth_value(auth)[..]])
}

/// Check a peer's confirmation against its revealed random
pub fn confirmation_validate(
    confirmation_key: &Block,
    received: &[u8],
    random: &[u8; RANDOM_SIZE],
    auth: &[u8],
) -> bool {
    let expected = confirmation(confirmation_key, random, auth);
    expected[..].ct_eq(received).into()
}

/// `s1` over the confirmation salt and both random values
pub fn provisioning_salt(
    confirmation_salt: &Block,
    provisioner_random: &[u8; RANDOM_SIZE],
    device_random: &[u8; RANDOM_SIZE],
) -> Block {
    let mut inputs = [0u8; BLOCK_SIZE + 2 * RANDOM_SIZE];
    inputs[..BLOCK_SIZE].copy_from_slice(confirmation_salt);
    inputs[BLOCK_SIZE..BLOCK_SIZE + RANDOM_SIZE].copy_from_slice(provisioner_random);
    inputs[BLOCK_SIZE + RANDOM_SIZE..].copy_from_slice(device_random);
    s1(&inputs)
}

/// Session material derived once both random values are known
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    session_key: Block,
    session_nonce: NonceBytes,
    device_key: Block,
}

impl SessionKeys {
    /// Derive session key, nonce and device key
    pub fn derive(secret: &[u8], provisioning_salt: &Block) -> Self {
        let nonce_block = k1(secret, provisioning_salt, b"prsn");
        let mut session_nonce = [0u8; NONCE_SIZE];
        session_nonce.copy_from_slice(&nonce_block[BLOCK_SIZE - NONCE_SIZE..]);

        Self {
            session_key: k1(secret, provisioning_salt, b"prsk"),
            session_nonce,
            device_key: k1(secret, provisioning_salt, b"prdk"),
        }
    }

    /// Session key
    pub fn session_key(&self) -> &Block {
        &self.session_key
    }

    /// Session nonce
    pub fn session_nonce(&self) -> &NonceBytes {
        &self.session_nonce
    }

    /// Device key of the newly provisioned node
    pub fn device_key(&self) -> DeviceKey {
        DeviceKey::new(self.device_key)
    }

    /// Encrypt provisioning data into a Data PDU body
    pub fn encrypt_data(&self, data: &ProvisioningData) -> WireResult<EncryptedData> {
        let sealed = aes_ccm_encrypt(
            &self.session_key,
            &self.session_nonce,
            &data.to_bytes(),
            &[],
            PROVISIONING_MIC_SIZE,
        )?;

        let mut encrypted = EncryptedData {
            encrypted_provisioning_data: [0u8; PROVISIONING_DATA_SIZE],
            provisioning_data_mic: [0u8; PROVISIONING_MIC_SIZE],
        };
        encrypted
            .encrypted_provisioning_data
            .copy_from_slice(&sealed[..PROVISIONING_DATA_SIZE]);
        encrypted
            .provisioning_data_mic
            .copy_from_slice(&sealed[PROVISIONING_DATA_SIZE..]);
        Ok(encrypted)
    }

    /// Decrypt and authenticate a Data PDU body
    pub fn decrypt_data(&self, data: &EncryptedData) -> WireResult<ProvisioningData> {
        let mut sealed = [0u8; PROVISIONING_DATA_SIZE + PROVISIONING_MIC_SIZE];
        sealed[..PROVISIONING_DATA_SIZE].copy_from_slice(&data.encrypted_provisioning_data);
        sealed[PROVISIONING_DATA_SIZE..].copy_from_slice(&data.provisioning_data_mic);

        let mut opened = aes_ccm_decrypt(
            &self.session_key,
            &self.session_nonce,
            &sealed,
            &[],
            PROVISIONING_MIC_SIZE,
        )
        .map_err(WireError::from_ccm)?;

        let result = ProvisioningData::from_slice(&opened);
        opened.zeroize();
        result
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_crypto::AccessKey;
    use crate::provisioning::pdu::{
        Algorithm, Algorithms, Authentication, InputOobActions, OutputOobActions,
        ProvisioningFlags, PublicKeyType, StaticOobType,
    };

    fn block(s: &str) -> Block {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    fn public_key(s: &str) -> PublicKey {
        PublicKey::from_slice(&hex::decode(s).unwrap()).unwrap()
    }

    const SECRET: &str = "ab85843a2f6d883f62e5684b38e307335fe6e1945ecd19604105c6f23221eb69";
    const PROVISIONER_RANDOM: &str = "8b19ac31d58b124c946209b5db1021b9";
    const DEVICE_RANDOM: &str = "55a2a2bca04cd32ff6f346bd0a0c1a3a";

    fn inputs() -> Vec<u8> {
        let capabilities = Capabilities {
            num_elements: 1,
            algorithms: Algorithms::P256_CMAC_AES128,
            public_key_type: PublicKeyType::empty(),
            static_oob_type: StaticOobType::empty(),
            output_oob_size: 0,
            output_oob_action: OutputOobActions::empty(),
            input_oob_size: 0,
            input_oob_action: InputOobActions::empty(),
        };
        let start = Start {
            algorithm: Algorithm::P256CmacAes128,
            public_key: false,
            authentication: Authentication::None,
        };

        confirmation_inputs(
            0,
            &capabilities,
            &start,
            &public_key(
                "2c31a47b5779809ef44cb5eaaf5c3e43d5f8faad4a8794cb987e9b03745c78dd\
                 919512183898dfbecd52e2408e43871fd021109117bd3ed4eaf8437743715d4f",
            ),
            &public_key(
                "f465e43ff23d3f1b9dc7dfc04da8758184dbc966204796eccf0d6cf5e16500cc\
                 0201d048bcbbd899eeefc424164e33c201c2b010ca6b4d43a8a155cad8ecb279",
            ),
        )
    }

    fn session() -> SessionKeys {
        let secret = hex::decode(SECRET).unwrap();
        let salt = provisioning_salt(
            &confirmation_salt(&inputs()),
            &block(PROVISIONER_RANDOM),
            &block(DEVICE_RANDOM),
        );
        SessionKeys::derive(&secret, &salt)
    }

    #[test]
    fn test_confirmation_inputs_layout() {
        let inputs = inputs();
        assert_eq!(inputs.len(), 145);
        assert_eq!(hex::encode(&inputs[..17]), "0001000100000000000000000000000000");
    }

    #[test]
    fn test_confirmation() {
        let secret = hex::decode(SECRET).unwrap();
        let salt = confirmation_salt(&inputs());
        assert_eq!(hex::encode(salt), "5faabe187337c71cc6c973369dcaa79a");

        let key = confirmation_key(&secret, &salt);
        assert_eq!(hex::encode(key), "e31fe046c68ec339c425fc6629f0336f");

        let value = confirmation(&key, &block(PROVISIONER_RANDOM), &[]);
        assert_eq!(hex::encode(value), "b38a114dfdca1fe153bd2c1e0dc46ac2");

        assert!(confirmation_validate(&key, &value, &block(PROVISIONER_RANDOM), &[]));
        assert!(!confirmation_validate(&key, &value, &block(DEVICE_RANDOM), &[]));
        assert!(!confirmation_validate(&key, &value[..8], &block(PROVISIONER_RANDOM), &[]));
    }

    #[test]
    fn test_auth_value_padding() {
        assert_eq!(auth_value(&[]), [0u8; 16]);
        assert_eq!(auth_value(&[1, 2])[..3], [1, 2, 0]);
        assert_eq!(auth_value(&[7u8; 20]), [7u8; 16]);
    }

    #[test]
    fn test_session_keys() {
        let salt = provisioning_salt(
            &confirmation_salt(&inputs()),
            &block(PROVISIONER_RANDOM),
            &block(DEVICE_RANDOM),
        );
        assert_eq!(hex::encode(salt), "a21c7d45f201cf9489a2fb57145015b4");

        let keys = session();
        assert_eq!(
            hex::encode(keys.session_key()),
            "c80253af86b33dfa450bbdb2a191fea3"
        );
        assert_eq!(
            hex::encode(keys.session_nonce()),
            "da7ddbe78b5f62b81d6847487e"
        );
        assert_eq!(
            hex::encode(keys.device_key().secret()),
            "0520adad5e0142aa3e325087b4ec16d8"
        );
    }

    #[test]
    fn test_data_encryption() {
        let keys = session();
        let data = ProvisioningData {
            network_key: block("efb2255e6422d330088e09bb015ed707"),
            key_index: 0x0567,
            flags: ProvisioningFlags::empty(),
            iv_index: 0x01020304,
            unicast_address: 0x0b0c,
        };

        let encrypted = keys.encrypt_data(&data).unwrap();
        assert_eq!(
            hex::encode(encrypted.encrypted_provisioning_data),
            "d0bd7f4a89a2ff6222af59a90a60ad58acfe3123356f5cec29"
        );
        assert_eq!(
            hex::encode(encrypted.provisioning_data_mic),
            "73e0ec50783b10c7"
        );

        assert_eq!(keys.decrypt_data(&encrypted).unwrap(), data);
    }

    #[test]
    fn test_data_tamper() {
        let keys = session();
        let data = ProvisioningData {
            network_key: [0x11; 16],
            key_index: 0,
            flags: ProvisioningFlags::IV_UPDATE,
            iv_index: 1,
            unicast_address: 0x0002,
        };

        let mut encrypted = keys.encrypt_data(&data).unwrap();
        encrypted.provisioning_data_mic[0] ^= 0x01;
        assert_eq!(keys.decrypt_data(&encrypted), Err(WireError::Authentication));
    }

    #[test]
    fn test_debug_hides_secrets() {
        assert_eq!(format!("{:?}", session()), "SessionKeys { .. }");
    }
}
