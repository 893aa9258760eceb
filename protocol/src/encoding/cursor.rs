//! A bounds-checked read cursor over a byte slice.

use super::error::EncodingError;
use super::primitives::LengthPrefix;

/// Sequential reader used by every [`super::Deserial`] implementation.
///
/// All reads are big-endian and bounds-checked; running off the end yields
/// [`EncodingError::UnexpectedEnd`] instead of a panic.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, EncodingError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(EncodingError::UnexpectedEnd {
                needed: 1,
                remaining: 0,
            })
    }

    /// Consumes `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        if self.remaining() < n {
            return Err(EncodingError::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consumes exactly `N` bytes into a fixed array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EncodingError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, EncodingError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, EncodingError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, EncodingError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, EncodingError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads a strict boolean: anything but `0x00`/`0x01` is an error.
    pub fn read_bool(&mut self) -> Result<bool, EncodingError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(EncodingError::InvalidBool(other)),
        }
    }

    /// Reads a buffer preceded by a big-endian length of the given width.
    pub fn read_prefixed(&mut self, prefix: LengthPrefix) -> Result<&'a [u8], EncodingError> {
        let len = match prefix {
            LengthPrefix::U8 => usize::from(self.read_u8()?),
            LengthPrefix::U16 => usize::from(self.read_u16()?),
            LengthPrefix::U32 => self.read_u32()? as usize,
        };
        self.read_bytes(len)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(
        &mut self,
        prefix: LengthPrefix,
        what: &'static str,
    ) -> Result<String, EncodingError> {
        let bytes = self.read_prefixed(prefix)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| EncodingError::InvalidUtf8(what))
    }

    /// Asserts that the whole buffer was consumed.
    pub fn finish(self) -> Result<(), EncodingError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(EncodingError::BufferNotExhausted { remaining }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers_in_sequence() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u8().unwrap(), 1);
        assert_eq!(c.read_u16().unwrap(), 2);
        assert_eq!(c.read_u32().unwrap(), 3);
        assert!(c.is_empty());
        c.finish().unwrap();
    }

    #[test]
    fn short_read_reports_what_was_missing() {
        let mut c = Cursor::new(&[0x01, 0x02]);
        assert_eq!(
            c.read_u32().unwrap_err(),
            EncodingError::UnexpectedEnd {
                needed: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn finish_rejects_trailing_bytes() {
        let mut c = Cursor::new(&[0x00, 0x01]);
        c.read_u8().unwrap();
        assert_eq!(
            c.finish().unwrap_err(),
            EncodingError::BufferNotExhausted { remaining: 1 }
        );
    }

    #[test]
    fn bool_must_be_zero_or_one() {
        let mut c = Cursor::new(&[0x01, 0x00, 0x02]);
        assert!(c.read_bool().unwrap());
        assert!(!c.read_bool().unwrap());
        assert_eq!(c.read_bool().unwrap_err(), EncodingError::InvalidBool(2));
    }

    #[test]
    fn prefixed_reads_honour_prefix_width() {
        let mut c = Cursor::new(&[0x00, 0x02, b'h', b'i', 0x01, b'x']);
        assert_eq!(c.read_prefixed(LengthPrefix::U16).unwrap(), b"hi");
        assert_eq!(c.read_string(LengthPrefix::U8, "test").unwrap(), "x");
    }

    #[test]
    fn peek_does_not_consume() {
        let c = Cursor::new(&[0x07]);
        assert_eq!(c.peek_u8().unwrap(), 7);
        assert_eq!(c.remaining(), 1);
    }
}
