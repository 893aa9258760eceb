//! Fixed-width integer, boolean and length-prefixed buffer encoders.
//!
//! The wire format is big-endian everywhere except for a handful of
//! public-facing list lengths, which is why every integer helper takes an
//! explicit [`Endian`]. Encoders accept wide inputs (`u128`/`i128`) so that
//! range checking happens here, in one place, instead of at every call site
//! doing `as u16` and hoping for the best.

use super::error::EncodingError;

// ---------------------------------------------------------------------------
// Widths and byte order
// ---------------------------------------------------------------------------

/// Byte order for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Network order. The default for every consensus field.
    #[default]
    Big,
    /// Used only for list lengths in a few public-facing encodings.
    Little,
}

/// Supported integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// Width in bytes.
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    fn max_unsigned(self) -> u128 {
        (1u128 << self.bits()) - 1
    }

    fn signed_bounds(self) -> (i128, i128) {
        let half = 1i128 << (self.bits() - 1);
        (-half, half - 1)
    }
}

fn order(bytes: &mut [u8], endian: Endian) {
    if endian == Endian::Little {
        bytes.reverse();
    }
}

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

/// Encodes an unsigned integer into exactly `width` bytes.
///
/// # Errors
///
/// [`EncodingError::OutOfRange`] if `value` does not fit.
pub fn encode_unsigned(value: u128, width: Width, endian: Endian) -> Result<Vec<u8>, EncodingError> {
    if value > width.max_unsigned() {
        return Err(EncodingError::OutOfRange {
            value: value.to_string(),
            bits: width.bits(),
            kind: "unsigned",
        });
    }
    let full = value.to_be_bytes();
    let mut out = full[16 - width.bytes()..].to_vec();
    order(&mut out, endian);
    Ok(out)
}

/// Encodes a signed integer in two's complement into exactly `width` bytes.
///
/// # Errors
///
/// [`EncodingError::OutOfRange`] if `value` does not fit.
pub fn encode_signed(value: i128, width: Width, endian: Endian) -> Result<Vec<u8>, EncodingError> {
    let (min, max) = width.signed_bounds();
    if value < min || value > max {
        return Err(EncodingError::OutOfRange {
            value: value.to_string(),
            bits: width.bits(),
            kind: "signed",
        });
    }
    let full = value.to_be_bytes();
    let mut out = full[16 - width.bytes()..].to_vec();
    order(&mut out, endian);
    Ok(out)
}

/// Encodes a floating-point value as an unsigned integer.
///
/// Hosts that receive numbers from loosely typed sources go through here:
/// fractional, negative and non-finite inputs are rejected rather than
/// rounded.
pub fn encode_unsigned_f64(value: f64, width: Width, endian: Endian) -> Result<Vec<u8>, EncodingError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(EncodingError::NotIntegral(value.to_string()));
    }
    if value < 0.0 || value > width.max_unsigned() as f64 {
        return Err(EncodingError::OutOfRange {
            value: value.to_string(),
            bits: width.bits(),
            kind: "unsigned",
        });
    }
    encode_unsigned(value as u128, width, endian)
}

/// Decodes an unsigned integer from exactly `width` bytes.
pub fn decode_unsigned(bytes: &[u8], width: Width, endian: Endian) -> Result<u64, EncodingError> {
    if bytes.len() != width.bytes() {
        return Err(EncodingError::UnexpectedEnd {
            needed: width.bytes(),
            remaining: bytes.len(),
        });
    }
    let mut buf = bytes.to_vec();
    order(&mut buf, endian);
    Ok(buf.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Decodes a two's complement signed integer from exactly `width` bytes.
pub fn decode_signed(bytes: &[u8], width: Width, endian: Endian) -> Result<i64, EncodingError> {
    let raw = decode_unsigned(bytes, width, endian)?;
    let shift = 64 - width.bits();
    // Sign-extend from the field width.
    Ok(((raw << shift) as i64) >> shift)
}

// ---------------------------------------------------------------------------
// Booleans, buffers, lists
// ---------------------------------------------------------------------------

/// Encodes a boolean as a single byte (`0x00` / `0x01`).
pub fn encode_bool(value: bool) -> [u8; 1] {
    [u8::from(value)]
}

/// Length prefix widths for [`pack_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    U8,
    U16,
    U32,
}

impl LengthPrefix {
    fn width(self) -> Width {
        match self {
            LengthPrefix::U8 => Width::W8,
            LengthPrefix::U16 => Width::W16,
            LengthPrefix::U32 => Width::W32,
        }
    }
}

/// Prefixes `data` with its big-endian length.
///
/// # Errors
///
/// [`EncodingError::LengthOverflow`] if the buffer is longer than the prefix
/// can express.
pub fn pack_buffer(data: &[u8], prefix: LengthPrefix) -> Result<Vec<u8>, EncodingError> {
    let width = prefix.width();
    let mut out = encode_unsigned(data.len() as u128, width, Endian::Big).map_err(|_| {
        EncodingError::LengthOverflow {
            len: data.len(),
            bits: width.bits(),
        }
    })?;
    out.extend_from_slice(data);
    Ok(out)
}

/// Serializes a list with a little-endian `u16` length prefix.
pub fn serialize_list_le16<T>(
    items: &[T],
    mut member: impl FnMut(&T) -> Vec<u8>,
) -> Result<Vec<u8>, EncodingError> {
    let mut out = encode_unsigned(items.len() as u128, Width::W16, Endian::Little).map_err(|_| {
        EncodingError::LengthOverflow {
            len: items.len(),
            bits: 16,
        }
    })?;
    for item in items {
        out.extend(member(item));
    }
    Ok(out)
}

/// Serializes an optional value as a presence byte followed by the value.
pub fn serialize_optional<T>(value: Option<&T>, member: impl FnOnce(&T) -> Vec<u8>) -> Vec<u8> {
    match value {
        None => encode_bool(false).to_vec(),
        Some(v) => {
            let mut out = encode_bool(true).to_vec();
            out.extend(member(v));
            out
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
