//! # Binary Encoding
//!
//! The consensus wire format, byte for byte. Every transaction hash depends
//! on these bytes, so this module is deliberately small, boring, and very
//! strict about what it accepts.
//!
//! ## Layout
//!
//! ```text
//! primitives.rs — range-checked integer/bool encoders, length-prefixed buffers
//! cursor.rs     — bounds-checked big-endian reader
//! bitmap.rs     — u16 presence bitmaps for optional fields
//! error.rs      — EncodingError
//! ```
//!
//! Types that live on the wire implement [`Serial`] and [`Deserial`].
//! Bounded values (memos, names, parameters, signatures) are validated when
//! they are built, but several wire types expose their collections as
//! public fields, so `serial` still checks every length prefix and element
//! count and fails with [`EncodingError::LengthOverflow`] instead of
//! truncating.

pub mod bitmap;
pub mod cursor;
pub mod error;
pub mod primitives;

pub use bitmap::Bitmap;
pub use cursor::Cursor;
pub use error::EncodingError;
pub use primitives::{
    decode_signed, decode_unsigned, encode_bool, encode_signed, encode_unsigned,
    encode_unsigned_f64, pack_buffer, serialize_list_le16, serialize_optional, Endian,
    LengthPrefix, Width,
};

/// Writes a value in its canonical wire form.
pub trait Serial {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError>;

    /// Convenience wrapper returning a fresh buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::new();
        self.serial(&mut out)?;
        Ok(out)
    }
}

/// Reads a value from its canonical wire form.
pub trait Deserial: Sized {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError>;

    /// Decodes a standalone buffer, requiring every byte to be consumed.
    fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut cursor = Cursor::new(bytes);
        let value = Self::deserial(&mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }
}

macro_rules! int_codec {
    ($($t:ty => $read:ident),*) => {$(
        impl Serial for $t {
            fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
                out.extend_from_slice(&self.to_be_bytes());
                Ok(())
            }
        }

        impl Deserial for $t {
            fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
                cursor.$read()
            }
        }
    )*};
}

int_codec!(u8 => read_u8, u16 => read_u16, u32 => read_u32, u64 => read_u64);

impl Serial for bool {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.extend_from_slice(&encode_bool(*self));
        Ok(())
    }
}

impl Deserial for bool {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        cursor.read_bool()
    }
}

/// Writes `data` behind a big-endian length prefix.
pub(crate) fn write_prefixed(
    out: &mut Vec<u8>,
    data: &[u8],
    prefix: LengthPrefix,
) -> Result<(), EncodingError> {
    write_count(out, data.len(), prefix)?;
    out.extend_from_slice(data);
    Ok(())
}

/// Writes an element count or byte length as a big-endian prefix.
///
/// # Errors
///
/// [`EncodingError::LengthOverflow`] if `len` does not fit in `prefix`.
pub(crate) fn write_count(
    out: &mut Vec<u8>,
    len: usize,
    prefix: LengthPrefix,
) -> Result<(), EncodingError> {
    let overflow = |bits| EncodingError::LengthOverflow { len, bits };
    match prefix {
        LengthPrefix::U8 => out.push(u8::try_from(len).map_err(|_| overflow(8))?),
        LengthPrefix::U16 => {
            out.extend_from_slice(&u16::try_from(len).map_err(|_| overflow(16))?.to_be_bytes())
        }
        LengthPrefix::U32 => {
            out.extend_from_slice(&u32::try_from(len).map_err(|_| overflow(32))?.to_be_bytes())
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_round_trip_through_traits() {
        let bytes = 0x0102_0304_0506_0708u64.to_bytes().unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(u64::from_bytes(&bytes).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn from_bytes_requires_exhaustion() {
        assert_eq!(
            u16::from_bytes(&[0, 1, 2]).unwrap_err(),
            EncodingError::BufferNotExhausted { remaining: 1 }
        );
    }

    #[test]
    fn write_prefixed_matches_pack_buffer() {
        let mut out = Vec::new();
        write_prefixed(&mut out, b"memo", LengthPrefix::U16).unwrap();
        assert_eq!(out, pack_buffer(b"memo", LengthPrefix::U16).unwrap());
    }

    #[test]
    fn write_prefixed_refuses_to_truncate() {
        let mut out = Vec::new();
        let data = vec![b'a'; 70_000];
        assert_eq!(
            write_prefixed(&mut out, &data, LengthPrefix::U16),
            Err(EncodingError::LengthOverflow {
                len: 70_000,
                bits: 16
            })
        );
        assert!(write_prefixed(&mut out, &data[..65_535], LengthPrefix::U16).is_ok());
        assert_eq!(&out[..2], &[0xff, 0xff]);
    }

    #[test]
    fn counts_stop_at_the_prefix_width() {
        let mut out = Vec::new();
        assert!(write_count(&mut out, 255, LengthPrefix::U8).is_ok());
        assert_eq!(
            write_count(&mut out, 256, LengthPrefix::U8),
            Err(EncodingError::LengthOverflow { len: 256, bits: 8 })
        );
        assert_eq!(out, vec![255]);
    }
}
