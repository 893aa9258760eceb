//! Scalar value types: amounts, energy, nonces, expiries and data blobs.
//!
//! These are thin newtypes. Their job is to stop a nonce from being passed
//! where an amount was expected, and to pin down the wire and JSON form of
//! each quantity in exactly one place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::json::{hex_bytes, u64_string};
use super::TypeError;
use crate::config::{MAX_MEMO_SIZE, MAX_TOKEN_ID_LEN};
use crate::encoding::{write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial};

/// microCCD per CCD.
const MICRO_CCD_PER_CCD: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// CcdAmount
// ---------------------------------------------------------------------------

/// An amount of CCD, held in microCCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CcdAmount(#[serde(with = "u64_string")] u64);

impl CcdAmount {
    pub const fn from_micro_ccd(micro: u64) -> Self {
        Self(micro)
    }

    /// Whole CCD. Fails if the microCCD figure overflows a `u64`.
    pub fn from_ccd(ccd: u64) -> Result<Self, TypeError> {
        ccd.checked_mul(MICRO_CCD_PER_CCD)
            .map(Self)
            .ok_or_else(|| TypeError::invalid("CCD amount", format!("{ccd} CCD overflows u64 microCCD")))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn micro_ccd(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CcdAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06} CCD",
            self.0 / MICRO_CCD_PER_CCD,
            self.0 % MICRO_CCD_PER_CCD
        )
    }
}

impl Serial for CcdAmount {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.0.serial(out)
    }
}

impl Deserial for CcdAmount {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_u64()?))
    }
}

// ---------------------------------------------------------------------------
// Energy
// ---------------------------------------------------------------------------

/// Metered execution cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Energy(#[serde(with = "u64_string")] u64);

impl Energy {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// `None` when the sum does not fit in a `u64`.
    pub fn checked_add(self, rhs: Energy) -> Option<Energy> {
        self.0.checked_add(rhs.0).map(Energy)
    }
}

impl From<u64> for Energy {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} NRG", self.0)
    }
}

impl Serial for Energy {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.0.serial(out)
    }
}

impl Deserial for Energy {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_u64()?))
    }
}

// ---------------------------------------------------------------------------
// SequenceNumber
// ---------------------------------------------------------------------------

/// Per-account transaction nonce. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NonceRepr", into = "NonceRepr")]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub fn new(value: u64) -> Result<Self, TypeError> {
        if value == 0 {
            return Err(TypeError::invalid("sequence number", "must be at least 1"));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// The nonce of the account's next transaction.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serial for SequenceNumber {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.0.serial(out)
    }
}

impl Deserial for SequenceNumber {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let value = cursor.read_u64()?;
        Self::new(value).map_err(|e| EncodingError::invalid("nonce", e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct NonceRepr(#[serde(with = "u64_string")] u64);

impl TryFrom<NonceRepr> for SequenceNumber {
    type Error = TypeError;

    fn try_from(repr: NonceRepr) -> Result<Self, Self::Error> {
        Self::new(repr.0)
    }
}

impl From<SequenceNumber> for NonceRepr {
    fn from(n: SequenceNumber) -> Self {
        NonceRepr(n.0)
    }
}

// ---------------------------------------------------------------------------
// TransactionExpiry
// ---------------------------------------------------------------------------

/// Seconds since the Unix epoch after which the node drops the transaction.
///
/// JSON form is a plain number: epoch seconds fit comfortably in a double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionExpiry(u64);

impl TransactionExpiry {
    pub const fn from_epoch_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Fails for dates before the epoch.
    pub fn from_datetime(at: DateTime<Utc>) -> Result<Self, TypeError> {
        u64::try_from(at.timestamp())
            .map(Self)
            .map_err(|_| TypeError::invalid("transaction expiry", "cannot be before unix epoch"))
    }

    /// `now + minutes`, truncated to whole seconds.
    pub fn future_minutes(minutes: u32) -> Self {
        let at = Utc::now() + chrono::Duration::minutes(i64::from(minutes));
        Self(u64::try_from(at.timestamp()).unwrap_or_default())
    }

    pub const fn epoch_seconds(self) -> u64 {
        self.0
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl fmt::Display for TransactionExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}

impl Serial for TransactionExpiry {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.0.serial(out)
    }
}

impl Deserial for TransactionExpiry {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_u64()?))
    }
}

// ---------------------------------------------------------------------------
// DataBlob
// ---------------------------------------------------------------------------

/// Up to 256 bytes of opaque data: transfer memos and registered data.
///
/// On the wire: `u16 length || bytes`. In JSON: hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HexBlob", into = "HexBlob")]
pub struct DataBlob(Vec<u8>);

impl DataBlob {
    pub fn new(data: Vec<u8>) -> Result<Self, TypeError> {
        if data.len() > MAX_MEMO_SIZE {
            return Err(TypeError::TooLong {
                what: "data blob",
                len: data.len(),
                max: MAX_MEMO_SIZE,
            });
        }
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serial for DataBlob {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, &self.0, LengthPrefix::U16)
    }
}

impl Deserial for DataBlob {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let bytes = cursor.read_prefixed(LengthPrefix::U16)?;
        Self::new(bytes.to_vec()).map_err(|e| EncodingError::invalid("data blob", e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct HexBlob(#[serde(with = "hex_bytes")] Vec<u8>);

impl TryFrom<HexBlob> for DataBlob {
    type Error = TypeError;

    fn try_from(blob: HexBlob) -> Result<Self, Self::Error> {
        Self::new(blob.0)
    }
}

impl From<DataBlob> for HexBlob {
    fn from(blob: DataBlob) -> Self {
        HexBlob(blob.0)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Symbol of a protocol-level token, e.g. `"EURR"`.
///
/// On the wire: `u8 length || utf8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId(String);

impl TokenId {
    pub fn new(symbol: impl Into<String>) -> Result<Self, TypeError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(TypeError::invalid("token id", "must not be empty"));
        }
        if symbol.len() > MAX_TOKEN_ID_LEN {
            return Err(TypeError::TooLong {
                what: "token id",
                len: symbol.len(),
                max: MAX_TOKEN_ID_LEN,
            });
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TokenId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

impl Serial for TokenId {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, self.0.as_bytes(), LengthPrefix::U8)
    }
}

impl Deserial for TokenId {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let symbol = cursor.read_string(LengthPrefix::U8, "token id")?;
        Self::new(symbol).map_err(|e| EncodingError::invalid("token id", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_json_is_string() {
        let a = CcdAmount::from_micro_ccd(1_000_000);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"1000000\"");
        assert_eq!(serde_json::from_str::<CcdAmount>("\"1000000\"").unwrap(), a);
        assert_eq!(a.to_string(), "1.000000 CCD");
    }

    #[test]
    fn amount_from_ccd_checks_overflow() {
        assert_eq!(CcdAmount::from_ccd(5).unwrap().micro_ccd(), 5_000_000);
        assert!(CcdAmount::from_ccd(u64::MAX).is_err());
    }

    #[test]
    fn energy_addition_is_checked() {
        assert_eq!(
            Energy::new(300).checked_add(Energy::new(201)),
            Some(Energy::new(501))
        );
        assert_eq!(Energy::new(u64::MAX).checked_add(Energy::new(1)), None);
    }

    #[test]
    fn sequence_number_starts_at_one() {
        assert!(SequenceNumber::new(0).is_err());
        assert_eq!(SequenceNumber::new(1).unwrap().next().value(), 2);
        assert!(serde_json::from_str::<SequenceNumber>("\"0\"").is_err());
        assert_eq!(
            serde_json::to_string(&SequenceNumber::new(7).unwrap()).unwrap(),
            "\"7\""
        );
    }

    #[test]
    fn zero_nonce_on_the_wire_is_rejected() {
        assert!(SequenceNumber::from_bytes(&[0u8; 8]).is_err());
    }

    #[test]
    fn expiry_json_is_number() {
        let e = TransactionExpiry::from_epoch_seconds(1_700_000_000);
        assert_eq!(serde_json::to_string(&e).unwrap(), "1700000000");
        assert_eq!(e.to_bytes().unwrap(), 1_700_000_000u64.to_be_bytes().to_vec());
    }

    #[test]
    fn future_expiry_is_in_the_future() {
        let now = Utc::now().timestamp() as u64;
        let e = TransactionExpiry::future_minutes(5);
        assert!(e.epoch_seconds() >= now + 299);
        assert!(e.epoch_seconds() <= now + 301);
    }

    #[test]
    fn expiry_before_epoch_is_rejected() {
        let before = DateTime::from_timestamp(-10, 0).unwrap();
        assert!(TransactionExpiry::from_datetime(before).is_err());
    }

    #[test]
    fn data_blob_caps_at_256_bytes() {
        assert!(DataBlob::new(vec![0; 256]).is_ok());
        assert_eq!(
            DataBlob::new(vec![0; 257]).unwrap_err(),
            TypeError::TooLong {
                what: "data blob",
                len: 257,
                max: 256
            }
        );
    }

    #[test]
    fn data_blob_wire_and_json() {
        let blob = DataBlob::new(b"test".to_vec()).unwrap();
        assert_eq!(hex::encode(blob.to_bytes().unwrap()), "000474657374");
        assert_eq!(serde_json::to_string(&blob).unwrap(), "\"74657374\"");
        assert_eq!(DataBlob::from_bytes(&blob.to_bytes().unwrap()).unwrap(), blob);
    }

    #[test]
    fn oversized_blob_on_the_wire_is_rejected() {
        let mut wire = vec![0x01, 0x01];
        wire.extend_from_slice(&[0u8; 257]);
        assert!(DataBlob::from_bytes(&wire).is_err());
    }

    #[test]
    fn token_id_wire_form() {
        let id = TokenId::new("TEST").unwrap();
        assert_eq!(hex::encode(id.to_bytes().unwrap()), "0454455354");
        assert!(TokenId::new("").is_err());
        assert!(TokenId::new("x".repeat(256)).is_err());
    }
}
