//! Presence bitmaps for optional wire fields.
//!
//! Several encodings (the sponsored header, validator and delegation
//! configuration) lead with a `u16` where bit `i` says whether the `i`-th
//! optional field follows. Decoders must reject bits they do not know about:
//! that is the format's only forward-compatibility guard, and silently
//! skipping a field we cannot parse would misread everything after it.

use super::cursor::Cursor;
use super::error::EncodingError;
use super::Serial;

/// A `u16` presence bitmap. Bit 0 corresponds to the first field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitmap(u16);

impl Bitmap {
    /// Builds a bitmap from presence flags listed in field order.
    ///
    /// Flags beyond the sixteenth are ignored; no encoding in this crate has
    /// that many optional fields.
    pub fn from_fields(present: &[bool]) -> Self {
        let bits = present
            .iter()
            .take(16)
            .enumerate()
            .fold(0u16, |acc, (i, set)| if *set { acc | (1 << i) } else { acc });
        Self(bits)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether the field at `index` is present.
    pub fn is_set(self, index: usize) -> bool {
        index < 16 && self.0 & (1 << index) != 0
    }

    /// Rejects any bit at or above `known_fields`.
    pub fn check_known(self, known_fields: usize) -> Result<Self, EncodingError> {
        let mask: u16 = if known_fields >= 16 {
            u16::MAX
        } else {
            (1u16 << known_fields) - 1
        };
        let unknown = self.0 & !mask;
        if unknown != 0 {
            return Err(EncodingError::UnsupportedBitmapBits { bits: unknown });
        }
        Ok(self)
    }

    /// Reads a bitmap and validates it against the number of known fields.
    pub fn read(cursor: &mut Cursor<'_>, known_fields: usize) -> Result<Self, EncodingError> {
        Self(cursor.read_u16()?).check_known(known_fields)
    }
}

impl Serial for Bitmap {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.0.serial(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_maps_to_low_bits_first() {
        assert_eq!(Bitmap::from_fields(&[false, true]).bits(), 0b10);
        assert_eq!(Bitmap::from_fields(&[true, false, true]).bits(), 0b101);
        assert_eq!(Bitmap::from_fields(&[]).bits(), 0);
    }

    #[test]
    fn is_set_reads_individual_bits() {
        let b = Bitmap::from_bits(0b100);
        assert!(b.is_set(2));
        assert!(!b.is_set(0));
        assert!(!b.is_set(40));
    }

    #[test]
    fn unknown_bits_are_rejected() {
        let err = Bitmap::from_bits(0xfffe).check_known(1).unwrap_err();
        assert_eq!(err, EncodingError::UnsupportedBitmapBits { bits: 0xfffe });
        assert!(err.to_string().contains("Found unsupported bits in bitmap"));
    }

    #[test]
    fn known_bits_pass() {
        assert!(Bitmap::from_bits(0b1_1111_1111).check_known(9).is_ok());
        assert!(Bitmap::from_bits(0b10_0000_0000).check_known(9).is_err());
    }

    #[test]
    fn read_validates_on_the_way_in() {
        let mut c = Cursor::new(&[0x00, 0x01]);
        assert_eq!(Bitmap::read(&mut c, 1).unwrap().bits(), 1);
        let mut c = Cursor::new(&[0x00, 0x02]);
        assert!(Bitmap::read(&mut c, 1).is_err());
    }

    #[test]
    fn serializes_big_endian() {
        let mut out = Vec::new();
        Bitmap::from_bits(0x0102).serial(&mut out).unwrap();
        assert_eq!(out, vec![0x01, 0x02]);
    }
}
