//! Access opcode framing.
//!
//! ```text
//! 0xxxxxxx                      1 byte SIG opcode (0x7f reserved)
//! 10xxxxxx xxxxxxxx             2 byte SIG opcode
//! 11xxxxxx xxxxxxxx cccccccc    3 byte vendor opcode (company id LE in last two bytes)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::need;
use crate::error::{AccessError, AccessResult};

/// Reserved single byte opcode
pub const RESERVED_OPCODE: u32 = 0x7f;

/// Length of the encoded form of `opcode`
pub fn opcode_len(opcode: u32) -> AccessResult<usize> {
    match opcode {
        RESERVED_OPCODE => Err(AccessError::Opcode(opcode)),
        0x00..=0x7e => Ok(1),
        0x8000..=0xbfff => Ok(2),
        0xc0_0000..=0xff_ffff => Ok(3),
        _ => Err(AccessError::Opcode(opcode)),
    }
}

/// Write `opcode` in its 1, 2 or 3 byte big-endian form
pub fn put_opcode(opcode: u32, buf: &mut BytesMut) -> AccessResult<()> {
    let len = opcode_len(opcode)?;
    buf.put_uint(u64::from(opcode), len);
    Ok(())
}

/// Read an opcode, its length given by the two top bits of the first byte
pub fn get_opcode(buf: &mut Bytes) -> AccessResult<u32> {
    need(buf, 1)?;
    let first = buf.get_u8();

    if u32::from(first) == RESERVED_OPCODE {
        return Err(AccessError::Opcode(RESERVED_OPCODE));
    }

    match first >> 6 {
        0b00 | 0b01 => Ok(u32::from(first)),
        0b10 => {
            need(buf, 1)?;
            Ok((u32::from(first) << 8) | u32::from(buf.get_u8()))
        }
        _ => {
            need(buf, 2)?;
            Ok((u32::from(first) << 16) | u32::from(buf.get_u16()))
        }
    }
}

/// Company identifier of a vendor opcode
pub fn vendor_company(opcode: u32) -> Option<u16> {
    (opcode >= 0xc0_0000).then(|| u16::from_le_bytes([(opcode >> 8) as u8, opcode as u8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_lengths() {
        for (opcode, bytes) in [
            (0x04u32, vec![0x04]),
            (0x8032, vec![0x80, 0x32]),
            (0xc01122, vec![0xc0, 0x11, 0x22]),
            (0xf53601, vec![0xf5, 0x36, 0x01]),
        ] {
            let mut buf = BytesMut::new();
            put_opcode(opcode, &mut buf).unwrap();
            assert_eq!(&buf[..], &bytes[..]);
            assert_eq!(get_opcode(&mut buf.freeze()).unwrap(), opcode);
        }
    }

    #[test]
    fn test_reserved_opcode_rejected() {
        let mut buf = Bytes::from_static(&[0x7f]);
        assert_eq!(get_opcode(&mut buf), Err(AccessError::Opcode(0x7f)));

        let mut out = BytesMut::new();
        assert!(put_opcode(0x7f, &mut out).is_err());
    }

    #[test]
    fn test_unencodable_opcodes() {
        let mut out = BytesMut::new();
        assert!(put_opcode(0x80, &mut out).is_err());
        assert!(put_opcode(0xc000, &mut out).is_err());
        assert!(put_opcode(0x0100_0000, &mut out).is_err());
    }

    #[test]
    fn test_truncated_opcode() {
        let mut buf = Bytes::from_static(&[0x82]);
        assert_eq!(get_opcode(&mut buf), Err(AccessError::Incomplete));

        let mut buf = Bytes::from_static(&[0xc0, 0x11]);
        assert_eq!(get_opcode(&mut buf), Err(AccessError::Incomplete));
    }

    #[test]
    fn test_vendor_company() {
        assert_eq!(vendor_company(0xf53601), Some(0x0136));
        assert_eq!(vendor_company(0x8201), None);
    }
}
