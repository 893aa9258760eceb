//! # Account Addresses
//!
//! An account address is 32 raw bytes on the wire and a base58check string
//! everywhere a human might see it:
//!
//! ```text
//! address (32 bytes)
//!     -> prepend version byte 0x01
//!     -> base58check (double-SHA-256 checksum, 4 bytes)
//!     -> 3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt
//! ```
//!
//! Every account owns 2^24 aliases: addresses sharing the first 29 bytes and
//! differing only in a trailing 3-byte counter. The chain treats all of them
//! as the same account; this type does not, so `==` compares exact bytes and
//! [`AccountAddress::is_alias`] is the looser check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ACCOUNT_ADDRESS_SIZE, ADDRESS_VERSION_BYTE, ALIAS_PREFIX_LEN};
use crate::encoding::{Cursor, Deserial, EncodingError, Serial};

/// Highest alias counter that fits in the trailing three bytes.
const MAX_ALIAS_COUNTER: u32 = (1 << 24) - 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing or deriving an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Not base58, bad checksum, or wrong version byte.
    #[error("base58check decode error: {0}")]
    Base58(String),

    /// The decoded payload has the wrong size.
    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },

    /// Alias counters are 24-bit.
    #[error("alias counter {0} is out of range (must be below 2^24)")]
    AliasCounterOutOfRange(u32),
}

// ---------------------------------------------------------------------------
// AccountAddress
// ---------------------------------------------------------------------------

/// A 32-byte account address.
///
/// # Examples
///
/// ```
/// use ccd_transactions::types::AccountAddress;
///
/// let addr: AccountAddress = "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt".parse().unwrap();
/// assert_eq!(addr.to_string(), "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt");
/// assert!(addr.is_alias(&addr.alias(7).unwrap()));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ACCOUNT_ADDRESS_SIZE]);

impl AccountAddress {
    pub const fn new(bytes: [u8; ACCOUNT_ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ACCOUNT_ADDRESS_SIZE] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: ACCOUNT_ADDRESS_SIZE,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parses the base58check form.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(s)
            .with_check(Some(ADDRESS_VERSION_BYTE))
            .into_vec()
            .map_err(|e| AddressError::Base58(e.to_string()))?;
        // `with_check` keeps the version byte at the front.
        match decoded.split_first() {
            Some((_, rest)) => Self::from_slice(rest),
            None => Err(AddressError::InvalidLength {
                expected: ACCOUNT_ADDRESS_SIZE,
                got: 0,
            }),
        }
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0)
            .with_check_version(ADDRESS_VERSION_BYTE)
            .into_string()
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ADDRESS_SIZE] {
        &self.0
    }

    /// Whether `self` and `other` belong to the same account.
    pub fn is_alias(&self, other: &AccountAddress) -> bool {
        self.0[..ALIAS_PREFIX_LEN] == other.0[..ALIAS_PREFIX_LEN]
    }

    /// The alias of this account with the given 24-bit counter.
    pub fn alias(&self, counter: u32) -> Result<AccountAddress, AddressError> {
        if counter > MAX_ALIAS_COUNTER {
            return Err(AddressError::AliasCounterOutOfRange(counter));
        }
        let mut bytes = self.0;
        bytes[ALIAS_PREFIX_LEN..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Ok(Self(bytes))
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_base58())
    }
}

impl Serial for AccountAddress {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

impl Deserial for AccountAddress {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_array()?))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
