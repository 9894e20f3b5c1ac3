//! AES-128 building blocks: CMAC, CCM and single-block ECB.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use ccm::aead::{Aead, Payload};
use ccm::consts::{U13, U4, U8};
use ccm::Ccm;
use cmac::{Cmac, Mac};

use crate::error::{CryptoError, CryptoResult};

/// Size of an AES-128 key in bytes
pub const KEY_SIZE: usize = 16;

/// Size of an AES block in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of a mesh CCM nonce in bytes
pub const NONCE_SIZE: usize = 13;

/// 128-bit key or block
pub type Block = [u8; BLOCK_SIZE];

type Ccm32 = Ccm<Aes128, U4, U13>;
type Ccm64 = Ccm<Aes128, U8, U13>;

/// AES-CMAC over `data`
pub fn aes_cmac(key: &[u8; KEY_SIZE], data: &[u8]) -> Block {
    let mut mac = <Cmac<Aes128> as KeyInit>::new(GenericArray::from_slice(key));
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// AES-CMAC over the concatenation of `parts`
pub fn aes_cmac_parts(key: &[u8; KEY_SIZE], parts: &[&[u8]]) -> Block {
    let mut mac = <Cmac<Aes128> as KeyInit>::new(GenericArray::from_slice(key));
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// Encrypt a single block with AES-128
pub fn aes_ecb(key: &[u8; KEY_SIZE], block: &Block) -> Block {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut out);
    out.into()
}

/// AES-CCM encryption returning `ciphertext || tag`.
///
/// `tag_len` must be 4 or 8.
pub fn aes_ccm_encrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
    tag_len: usize,
) -> CryptoResult<Vec<u8>> {
    let nonce = GenericArray::from_slice(nonce);
    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let sealed = match tag_len {
        4 => Ccm32::new(GenericArray::from_slice(key)).encrypt(nonce, payload),
        8 => Ccm64::new(GenericArray::from_slice(key)).encrypt(nonce, payload),
        other => return Err(CryptoError::InvalidTagLength(other)),
    };
    sealed.map_err(|_| CryptoError::Encryption)
}

/// AES-CCM decryption of `ciphertext || tag`.
///
/// Fails with [`CryptoError::Authentication`] when the MIC does not verify.
pub fn aes_ccm_decrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    aad: &[u8],
    tag_len: usize,
) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < tag_len {
        return Err(CryptoError::Authentication);
    }

    let nonce = GenericArray::from_slice(nonce);
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    let opened = match tag_len {
        4 => Ccm32::new(GenericArray::from_slice(key)).decrypt(nonce, payload),
        8 => Ccm64::new(GenericArray::from_slice(key)).decrypt(nonce, payload),
        other => return Err(CryptoError::InvalidTagLength(other)),
    };
    opened.map_err(|_| CryptoError::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> Block {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_cmac_rfc4493() {
        let key = block("2b7e151628aed2a6abf7158809cf4f3c");
        assert_eq!(aes_cmac(&key, &[]), block("bb1d6929e95937287fa37d129b756746"));

        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        assert_eq!(aes_cmac(&key, &msg), block("070a16b46b4d4144f79bdd9dd04a287c"));
    }

    #[test]
    fn test_cmac_parts_matches_single_buffer() {
        let key = block("2b7e151628aed2a6abf7158809cf4f3c");
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let (a, b) = msg.split_at(5);
        assert_eq!(aes_cmac_parts(&key, &[a, b]), aes_cmac(&key, &msg));
    }

    #[test]
    fn test_ecb_fips197() {
        let key = block("000102030405060708090a0b0c0d0e0f");
        let plain = block("00112233445566778899aabbccddeeff");
        assert_eq!(aes_ecb(&key, &plain), block("69c4e0d86a7b0430d8cdb78070b4c55a"));
    }

    #[test]
    fn test_ccm_roundtrip_and_tamper() {
        let key = block("0953fa93e7caac9638f58820220a398e");
        let nonce: [u8; 13] = hex::decode("000b0000061201000012345678")
            .unwrap()
            .try_into()
            .unwrap();

        for tag_len in [4, 8] {
            let sealed = aes_ccm_encrypt(&key, &nonce, b"hello mesh", b"", tag_len).unwrap();
            assert_eq!(sealed.len(), 10 + tag_len);
            assert_eq!(
                aes_ccm_decrypt(&key, &nonce, &sealed, b"", tag_len).unwrap(),
                b"hello mesh"
            );

            let mut tampered = sealed.clone();
            tampered[0] ^= 1;
            assert_eq!(
                aes_ccm_decrypt(&key, &nonce, &tampered, b"", tag_len),
                Err(CryptoError::Authentication)
            );
        }
    }

    #[test]
    fn test_ccm_rejects_bad_tag_length() {
        let key = [0u8; 16];
        let nonce = [0u8; 13];
        assert_eq!(
            aes_ccm_encrypt(&key, &nonce, b"x", b"", 6),
            Err(CryptoError::InvalidTagLength(6))
        );
        assert_eq!(
            aes_ccm_decrypt(&key, &nonce, b"short", b"", 8),
            Err(CryptoError::Authentication)
        );
    }
}
