//! Error types for the binary codec.
//!
//! Every primitive encoder and every [`super::Deserial`] implementation
//! reports failure through [`EncodingError`]. Nothing in the codec clamps,
//! truncates or guesses: a value either encodes exactly or it is rejected.

use thiserror::Error;

/// Errors produced while encoding or decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// An integer does not fit in the requested wire width.
    #[error("value {value} is out of range for a {bits}-bit {kind} integer")]
    OutOfRange {
        /// The offending value, rendered in decimal.
        value: String,
        /// Width of the target field in bits.
        bits: u32,
        /// `"signed"` or `"unsigned"`.
        kind: &'static str,
    },

    /// A non-integral number was given where an integer is required.
    #[error("expected an integer, got {0}")]
    NotIntegral(String),

    /// The input ended before a field could be read.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        /// Bytes the read required.
        needed: usize,
        /// Bytes actually left in the buffer.
        remaining: usize,
    },

    /// A standalone decode left bytes behind.
    #[error("deserialization did not exhaust the buffer: {remaining} bytes left")]
    BufferNotExhausted {
        /// Trailing byte count.
        remaining: usize,
    },

    /// A bitmap carries bits this version of the format does not know.
    #[error("Found unsupported bits in bitmap: {bits:#06x}")]
    UnsupportedBitmapBits {
        /// The unknown bits, with the known ones masked off.
        bits: u16,
    },

    /// The transaction type tag is not one we can decode.
    #[error("unsupported transaction type tag: {0}")]
    UnknownTransactionType(u8),

    /// A boolean byte held something other than 0 or 1.
    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// A buffer is too long for its length prefix.
    #[error("length {len} does not fit in a {bits}-bit length prefix")]
    LengthOverflow {
        /// Actual length in bytes.
        len: usize,
        /// Width of the prefix in bits.
        bits: u32,
    },

    /// A structurally valid field carries a value the format forbids.
    #[error("invalid {what}: {reason}")]
    Invalid {
        /// The field being decoded.
        what: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl EncodingError {
    /// Shorthand for [`EncodingError::Invalid`].
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            reason: reason.into(),
        }
    }
}
