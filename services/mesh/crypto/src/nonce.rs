//! CCM nonce construction for every mesh message type.

use crate::error::{CryptoError, CryptoResult};
use crate::primitives::NONCE_SIZE;

/// 13-byte CCM nonce
pub type NonceBytes = [u8; NONCE_SIZE];

/// Nonce type tag stored in the first byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceType {
    /// Network layer
    Network = 0x00,
    /// Upper transport, application key
    Application = 0x01,
    /// Upper transport, device key
    Device = 0x02,
    /// Proxy configuration
    Proxy = 0x03,
    /// Solicitation PDU
    Solicitation = 0x04,
}

/// Per-message nonce context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce {
    /// Source address
    pub src: u16,
    /// Destination address
    pub dst: u16,
    /// Time to live, 7 bits
    pub ttl: u8,
    /// Control message flag
    pub ctl: bool,
}

impl Nonce {
    /// Create a nonce context
    pub fn new(src: u16, dst: u16, ttl: u8, ctl: bool) -> Self {
        Self { src, dst, ttl, ctl }
    }

    fn build(
        kind: NonceType,
        second: u8,
        seq: u32,
        src: u16,
        dst: u16,
        iv_index: u32,
    ) -> NonceBytes {
        let mut nonce = [0u8; NONCE_SIZE];
        nonce[0] = kind as u8;
        nonce[1] = second;
        nonce[2..5].copy_from_slice(&seq.to_be_bytes()[1..]);
        nonce[5..7].copy_from_slice(&src.to_be_bytes());
        nonce[7..9].copy_from_slice(&dst.to_be_bytes());
        nonce[9..13].copy_from_slice(&iv_index.to_be_bytes());
        nonce
    }

    /// Network nonce: `[00][ctl|ttl][seq][src][0000][iv]`
    pub fn network(&self, seq: u32, iv_index: u32) -> NonceBytes {
        let ctl_ttl = (u8::from(self.ctl) << 7) | (self.ttl & 0x7f);
        Self::build(NonceType::Network, ctl_ttl, seq, self.src, 0, iv_index)
    }

    /// Application nonce: `[01][szmic][seq][src][dst][iv]`
    pub fn application(&self, seq: u32, iv_index: u32, szmic: bool) -> NonceBytes {
        let aszmic = u8::from(szmic) << 7;
        Self::build(NonceType::Application, aszmic, seq, self.src, self.dst, iv_index)
    }

    /// Device nonce: `[02][szmic][seq][src][dst][iv]`
    pub fn device(&self, seq: u32, iv_index: u32, szmic: bool) -> NonceBytes {
        let aszmic = u8::from(szmic) << 7;
        Self::build(NonceType::Device, aszmic, seq, self.src, self.dst, iv_index)
    }

    /// Proxy nonce: `[03][00][seq][src][dst][iv]`
    pub fn proxy(&self, seq: u32, iv_index: u32) -> NonceBytes {
        Self::build(NonceType::Proxy, 0, seq, self.src, self.dst, iv_index)
    }

    /// Solicitation nonce: `[04][00][seq][src][0000][iv]`.
    ///
    /// Solicitation PDUs always use IV index 0.
    pub fn solicitation(&self, seq: u32, iv_index: u32) -> CryptoResult<NonceBytes> {
        if iv_index != 0 {
            return Err(CryptoError::Contract("solicitation requires iv index 0"));
        }
        Ok(Self::build(NonceType::Solicitation, 0, seq, self.src, 0, iv_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_nonce() {
        let nonce = Nonce::new(0x1201, 0xfffd, 0x0b, false);
        assert_eq!(
            hex::encode(nonce.network(0x000006, 0x12345678)),
            "000b0000061201000012345678"
        );
    }

    #[test]
    fn test_network_nonce_control() {
        let nonce = Nonce::new(0x1201, 0xfffd, 0x00, true);
        assert_eq!(
            hex::encode(nonce.network(0x000001, 0x12345678)),
            "00800000011201000012345678"
        );
    }

    #[test]
    fn test_application_nonce() {
        let nonce = Nonce::new(0x1201, 0xffff, 0, false);
        assert_eq!(
            hex::encode(nonce.application(7, 0x12345678, false)),
            "01000000071201ffff12345678"
        );
        assert_eq!(
            hex::encode(nonce.application(7, 0x12345678, true)),
            "01800000071201ffff12345678"
        );
    }

    #[test]
    fn test_device_nonce() {
        let nonce = Nonce::new(0x0003, 0x1201, 0, false);
        assert_eq!(
            hex::encode(nonce.device(0x000006, 0x12345678, false)),
            "02000000060003120112345678"
        );
    }

    #[test]
    fn test_proxy_nonce() {
        let nonce = Nonce::new(0x1201, 0x0000, 0, true);
        assert_eq!(
            hex::encode(nonce.proxy(0x000001, 0x00000000)),
            "03000000011201000000000000"
        );
    }

    #[test]
    fn test_solicitation_nonce() {
        let nonce = Nonce::new(0x1201, 0xfffb, 0, true);
        assert_eq!(
            hex::encode(nonce.solicitation(0x000042, 0).unwrap()),
            "04000000421201000000000000"
        );
        assert_eq!(
            nonce.solicitation(0x000042, 1),
            Err(CryptoError::Contract("solicitation requires iv index 0"))
        );
    }
}
