//! Mesh key derivation functions built on AES-CMAC.

use zeroize::Zeroize;

use crate::primitives::{aes_cmac, aes_cmac_parts, Block, KEY_SIZE};

/// Output of the `k2` derivation
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct EncryptionKeys {
    /// 7-bit network identifier
    pub nid: u8,
    /// Network-layer encryption key
    pub encryption_key: Block,
    /// Header obfuscation key
    pub privacy_key: Block,
}

impl std::fmt::Debug for EncryptionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKeys")
            .field("nid", &format_args!("{:#04x}", self.nid))
            .finish_non_exhaustive()
    }
}

/// Salt generation: CMAC with a zero key
pub fn s1(m: &[u8]) -> Block {
    aes_cmac(&[0u8; KEY_SIZE], m)
}

/// Generic 128-bit derivation
pub fn k1(n: &[u8], salt: &Block, p: &[u8]) -> Block {
    let t = aes_cmac(salt, n);
    aes_cmac(&t, p)
}

/// Network key material: NID, encryption key and privacy key
pub fn k2(n: &[u8; KEY_SIZE], p: &[u8]) -> EncryptionKeys {
    let t = aes_cmac(&s1(b"smk2"), n);

    let t1 = aes_cmac_parts(&t, &[p, &[0x01]]);
    let t2 = aes_cmac_parts(&t, &[&t1, p, &[0x02]]);
    let t3 = aes_cmac_parts(&t, &[&t2, p, &[0x03]]);

    // (T1 || T2 || T3) mod 2^263: the last byte of T1 supplies the NID
    EncryptionKeys {
        nid: t1[15] & 0x7f,
        encryption_key: t2,
        privacy_key: t3,
    }
}

/// 64-bit network identifier
pub fn k3(n: &[u8; KEY_SIZE]) -> [u8; 8] {
    let t = aes_cmac(&s1(b"smk3"), n);
    let out = aes_cmac(&t, b"id64\x01");

    let mut id = [0u8; 8];
    id.copy_from_slice(&out[8..]);
    id
}

/// 6-bit application key identifier
pub fn k4(n: &[u8; KEY_SIZE]) -> u8 {
    let t = aes_cmac(&s1(b"smk4"), n);
    aes_cmac(&t, b"id6\x01")[15] & 0x3f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> [u8; 16] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_s1() {
        assert_eq!(s1(b"test"), key("b73cefbd641ef2ea598c2b6efb62f79c"));
    }

    #[test]
    fn test_k1() {
        let n = hex::decode("3216d1509884b533248541792b877f98").unwrap();
        let salt = key("2ba14ffa0df84a2831938d57d276cab4");
        let p = hex::decode("5a09d60797eeb4478aada59db3352a0d").unwrap();
        assert_eq!(k1(&n, &salt, &p), key("f6ed15a8934afbe7d83e8dcb57fcf5d7"));
    }

    #[test]
    fn test_k2_master() {
        let keys = k2(&key("f7a2a44f8e8a8029064f173ddc1e2b00"), &[0x00]);
        assert_eq!(keys.nid, 0x7f);
        assert_eq!(keys.encryption_key, key("9f589181a0f50de73c8070c7a6d27f46"));
        assert_eq!(keys.privacy_key, key("4c715bd4a64b938f99b453351653124f"));
    }

    #[test]
    fn test_k3() {
        let id = k3(&key("f7a2a44f8e8a8029064f173ddc1e2b00"));
        assert_eq!(hex::encode(id), "ff046958233db014");
    }

    #[test]
    fn test_k4() {
        assert_eq!(k4(&key("3216d1509884b533248541792b877f98")), 0x38);
        assert_eq!(k4(&key("63964771734fbd76e3b40519d1d94a48")), 0x26);
    }

    #[test]
    fn test_encryption_keys_debug_hides_material() {
        let keys = k2(&key("7dd7364cd842ad18c17c2b820c84c3d6"), &[0x00]);
        let shown = format!("{keys:?}");
        assert!(shown.contains("0x68"));
        assert!(!shown.contains("0953fa93"));
    }
}
