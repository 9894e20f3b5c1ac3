//! Parameter codec trait and little-endian field helpers.

use std::collections::BTreeSet;
use std::fmt::Display;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{AccessError, AccessResult};

/// Encoding and decoding of message parameters.
///
/// `decode` reads exactly the bytes belonging to the value; greedy values
/// (lists, raw tails, optional trailers) consume whatever is left.
pub trait Codec: Sized {
    /// Append the encoded value to `buf`, validating field ranges
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()>;

    /// Read a value from the front of `buf`
    fn decode(buf: &mut Bytes) -> AccessResult<Self>;
}

pub(crate) fn need(buf: &Bytes, len: usize) -> AccessResult<()> {
    if buf.remaining() < len {
        return Err(AccessError::Incomplete);
    }
    Ok(())
}

pub(crate) fn finish(buf: &Bytes) -> AccessResult<()> {
    if buf.has_remaining() {
        return Err(AccessError::Trailing(buf.remaining()));
    }
    Ok(())
}

pub(crate) fn invalid(what: &str, value: impl Display) -> AccessError {
    AccessError::Validation(format!("invalid {what} {value}"))
}

pub(crate) fn get_u8(buf: &mut Bytes) -> AccessResult<u8> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn get_i8(buf: &mut Bytes) -> AccessResult<i8> {
    need(buf, 1)?;
    Ok(buf.get_i8())
}

pub(crate) fn get_u16(buf: &mut Bytes) -> AccessResult<u16> {
    need(buf, 2)?;
    Ok(buf.get_u16_le())
}

pub(crate) fn get_u16_be(buf: &mut Bytes) -> AccessResult<u16> {
    need(buf, 2)?;
    Ok(buf.get_u16())
}

pub(crate) fn get_i16(buf: &mut Bytes) -> AccessResult<i16> {
    need(buf, 2)?;
    Ok(buf.get_i16_le())
}

pub(crate) fn get_u24(buf: &mut Bytes) -> AccessResult<u32> {
    need(buf, 3)?;
    Ok(buf.get_uint_le(3) as u32)
}

pub(crate) fn get_u32(buf: &mut Bytes) -> AccessResult<u32> {
    need(buf, 4)?;
    Ok(buf.get_u32_le())
}

pub(crate) fn get_i32(buf: &mut Bytes) -> AccessResult<i32> {
    need(buf, 4)?;
    Ok(buf.get_i32_le())
}

pub(crate) fn get_u40(buf: &mut Bytes) -> AccessResult<u64> {
    need(buf, 5)?;
    Ok(buf.get_uint_le(5))
}

pub(crate) fn get_array<const N: usize>(buf: &mut Bytes) -> AccessResult<[u8; N]> {
    need(buf, N)?;
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub(crate) fn get_bytes(buf: &mut Bytes, len: usize) -> AccessResult<Bytes> {
    need(buf, len)?;
    Ok(buf.split_to(len))
}

pub(crate) fn put_u24(buf: &mut BytesMut, value: u32) -> AccessResult<()> {
    if value > 0xff_ffff {
        return Err(invalid("24-bit value", value));
    }
    buf.put_uint_le(u64::from(value), 3);
    Ok(())
}

pub(crate) fn put_u40(buf: &mut BytesMut, value: u64) -> AccessResult<()> {
    if value > 0xff_ffff_ffff {
        return Err(invalid("40-bit value", value));
    }
    buf.put_uint_le(value, 5);
    Ok(())
}

/// Decode a NUL padded UTF-8 string occupying exactly `len` bytes
pub(crate) fn get_padded_str(buf: &mut Bytes, len: usize) -> AccessResult<String> {
    let raw = get_bytes(buf, len)?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8(raw[..end].to_vec()).map_err(|_| invalid("utf-8 string", "bytes"))
}

/// Encode `value` NUL padded to exactly `len` bytes
pub(crate) fn put_padded_str(buf: &mut BytesMut, value: &str, len: usize) -> AccessResult<()> {
    if value.len() > len {
        return Err(AccessError::Validation(format!(
            "string of {} bytes exceeds {len}",
            value.len()
        )));
    }
    buf.put_slice(value.as_bytes());
    buf.put_bytes(0, len - value.len());
    Ok(())
}

/// Decode a UTF-8 string spanning the rest of the message
pub(crate) fn get_greedy_str(buf: &mut Bytes) -> AccessResult<String> {
    let raw = buf.split_to(buf.remaining());
    String::from_utf8(raw.to_vec()).map_err(|_| invalid("utf-8 string", "bytes"))
}

/// Read a list preceded by a one byte item count
pub(crate) fn get_counted<T: Codec>(buf: &mut Bytes) -> AccessResult<Vec<T>> {
    let count = get_u8(buf)?;
    (0..count).map(|_| T::decode(buf)).collect()
}

pub(crate) fn put_counted<T: Codec>(buf: &mut BytesMut, items: &[T]) -> AccessResult<()> {
    let count = u8::try_from(items.len()).map_err(|_| invalid("item count", items.len()))?;
    buf.put_u8(count);
    items.iter().try_for_each(|item| item.encode(buf))
}

/// Read bytes preceded by a one byte length
pub(crate) fn get_prefixed(buf: &mut Bytes) -> AccessResult<Bytes> {
    let len = get_u8(buf)?;
    get_bytes(buf, usize::from(len))
}

pub(crate) fn put_prefixed(buf: &mut BytesMut, value: &[u8]) -> AccessResult<()> {
    let len = u8::try_from(value.len()).map_err(|_| invalid("length", value.len()))?;
    buf.put_u8(len);
    buf.put_slice(value);
    Ok(())
}

/// Fixed-width integer backing an enumerated field
pub(crate) trait Primitive: Copy {
    fn get(buf: &mut Bytes) -> AccessResult<Self>;
    fn put(self, buf: &mut BytesMut);
}

impl Primitive for u8 {
    fn get(buf: &mut Bytes) -> AccessResult<Self> {
        get_u8(buf)
    }

    fn put(self, buf: &mut BytesMut) {
        buf.put_u8(self);
    }
}

impl Primitive for i8 {
    fn get(buf: &mut Bytes) -> AccessResult<Self> {
        get_i8(buf)
    }

    fn put(self, buf: &mut BytesMut) {
        buf.put_i8(self);
    }
}

impl Primitive for u16 {
    fn get(buf: &mut Bytes) -> AccessResult<Self> {
        get_u16(buf)
    }

    fn put(self, buf: &mut BytesMut) {
        buf.put_u16_le(self);
    }
}

impl Codec for u8 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_u8(buf)
    }
}

impl Codec for i8 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_i8(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_i8(buf)
    }
}

impl Codec for u16 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_u16(buf)
    }
}

impl Codec for i16 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_i16_le(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_i16(buf)
    }
}

impl Codec for i32 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_i32_le(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_i32(buf)
    }
}

impl Codec for u32 {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u32_le(*self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_u32(buf)
    }
}

/// Raw tail of the message
impl Codec for Bytes {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_slice(self);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(buf.split_to(buf.remaining()))
    }
}

/// Optional trailer, present when any bytes remain
impl<T: Codec> Codec for Option<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        match self {
            Some(value) => value.encode(buf),
            None => Ok(()),
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        if buf.has_remaining() {
            T::decode(buf).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Greedy list spanning the rest of the message
impl<T: Codec> Codec for Vec<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        for item in self {
            item.encode(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let mut items = Vec::new();
        while buf.has_remaining() {
            items.push(T::decode(buf)?);
        }
        Ok(items)
    }
}

/// Greedy set spanning the rest of the message, encoded in ascending order
impl<T: Codec + Ord> Codec for BTreeSet<T> {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.iter().try_for_each(|item| item.encode(buf))
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Vec::<T>::decode(buf).map(BTreeSet::from_iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u24_roundtrip_and_range() {
        let mut buf = BytesMut::new();
        put_u24(&mut buf, 0x123456).unwrap();
        assert_eq!(&buf[..], &[0x56, 0x34, 0x12]);
        assert_eq!(get_u24(&mut buf.freeze()).unwrap(), 0x123456);

        let mut buf = BytesMut::new();
        assert!(put_u24(&mut buf, 0x0100_0000).is_err());
    }

    #[test]
    fn test_short_read_is_incomplete() {
        let mut buf = Bytes::from_static(&[0x01]);
        assert_eq!(get_u16(&mut buf), Err(AccessError::Incomplete));
    }

    #[test]
    fn test_padded_string() {
        let mut buf = BytesMut::new();
        put_padded_str(&mut buf, "abc", 6).unwrap();
        assert_eq!(&buf[..], b"abc\0\0\0");
        assert_eq!(get_padded_str(&mut buf.freeze(), 6).unwrap(), "abc");

        let mut buf = BytesMut::new();
        assert!(put_padded_str(&mut buf, "toolong", 3).is_err());
    }

    #[test]
    fn test_greedy_list() {
        let mut buf = Bytes::from_static(&[0x01, 0x00, 0x02, 0x00]);
        let items = Vec::<u16>::decode(&mut buf).unwrap();
        assert_eq!(items, vec![1, 2]);

        let mut buf = Bytes::from_static(&[0x01, 0x00, 0x02]);
        assert_eq!(Vec::<u16>::decode(&mut buf), Err(AccessError::Incomplete));
    }

    #[test]
    fn test_optional_trailer() {
        let mut buf = Bytes::new();
        assert_eq!(Option::<u8>::decode(&mut buf).unwrap(), None);

        let mut buf = Bytes::from_static(&[0x07]);
        assert_eq!(Option::<u8>::decode(&mut buf).unwrap(), Some(7));
    }

    #[test]
    fn test_finish_reports_trailing() {
        let buf = Bytes::from_static(&[0x00, 0x01]);
        assert_eq!(finish(&buf), Err(AccessError::Trailing(2)));
    }
}
