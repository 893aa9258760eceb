//! Transaction headers.
//!
//! There are four shapes:
//!
//! - [`Header`] is the builder-stage header. Everything is optional until
//!   the builder is configured, and it carries the declared signature counts
//!   that drive energy accounting.
//! - [`TransactionHeader`] is the same header once configured, as carried
//!   by a signable transaction.
//! - [`HeaderV0`] is the plain wire header, a fixed 60 bytes:
//!   `sender(32) nonce(u64) energy(u64) payloadSize(u32) expiry(u64)`.
//! - [`HeaderV1`] is the sponsored wire header: a `u16` bitmap, the plain
//!   fields, then `sponsor(32)` when bit 0 is set.
//!
//! Signature counts never reach the wire. The node recovers them from the
//! signature maps.

use serde::{Deserialize, Serialize};

use super::energy::{calculate_energy_v0, calculate_energy_v1};
use super::error::TransactionError;
use crate::config::{
    ACCOUNT_ADDRESS_SIZE, HEADER_BITMAP_SIZE, HEADER_V0_SIZE, HEADER_V1_KNOWN_FIELDS,
    SPONSOR_BITMAP_BIT,
};
use crate::encoding::{Bitmap, Cursor, Deserial, EncodingError, Serial};
use crate::types::{AccountAddress, Energy, SequenceNumber, TransactionExpiry};

// ---------------------------------------------------------------------------
// Builder header
// ---------------------------------------------------------------------------

/// A sponsoring account and how many of its keys will sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDetails {
    pub account: AccountAddress,
    pub num_signatures: u64,
}

/// Header as it evolves through the builder stages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<AccountAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<SequenceNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<TransactionExpiry>,
    /// Base cost of the payload, excluding size and signature costs.
    pub execution_energy_amount: Energy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_signatures: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<SponsorDetails>,
}

impl Header {
    pub fn new(execution_energy_amount: Energy) -> Self {
        Self {
            execution_energy_amount,
            ..Self::default()
        }
    }

    /// Sender, nonce and expiry are all present.
    pub fn is_configured(&self) -> bool {
        self.sender.is_some() && self.nonce.is_some() && self.expiry.is_some()
    }
}

/// A fully configured header: what a signable transaction carries.
///
/// Same JSON shape as [`Header`], with every required field present and the
/// sender signature count resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHeader {
    pub sender: AccountAddress,
    pub nonce: SequenceNumber,
    pub expiry: TransactionExpiry,
    pub execution_energy_amount: Energy,
    pub num_signatures: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<SponsorDetails>,
}

impl TransactionHeader {
    /// Total energy of a plain transaction carrying `payload_size` bytes.
    pub fn energy_v0(&self, payload_size: u64) -> Result<Energy, TransactionError> {
        calculate_energy_v0(self.num_signatures, payload_size, self.execution_energy_amount)
    }

    /// Total energy of a sponsored transaction carrying `payload_size` bytes.
    pub fn energy_v1(&self, payload_size: u64) -> Result<Energy, TransactionError> {
        calculate_energy_v1(
            self.num_signatures,
            self.sponsor.map(|s| s.num_signatures),
            payload_size,
            self.execution_energy_amount,
        )
    }

    /// The plain wire header for a payload of `payload_size` bytes.
    pub fn to_v0(&self, payload_size: u64) -> Result<HeaderV0, TransactionError> {
        Ok(HeaderV0 {
            sender: self.sender,
            nonce: self.nonce,
            energy_amount: self.energy_v0(payload_size)?,
            payload_size: wire_payload_size(payload_size)?,
            expiry: self.expiry,
        })
    }

    /// The sponsored wire header for a payload of `payload_size` bytes.
    pub fn to_v1(&self, payload_size: u64) -> Result<HeaderV1, TransactionError> {
        Ok(HeaderV1 {
            base: HeaderV0 {
                sender: self.sender,
                nonce: self.nonce,
                energy_amount: self.energy_v1(payload_size)?,
                payload_size: wire_payload_size(payload_size)?,
                expiry: self.expiry,
            },
            sponsor: self.sponsor.map(|s| s.account),
        })
    }
}

impl TryFrom<Header> for TransactionHeader {
    type Error = TransactionError;

    /// Fails unless sender, nonce and expiry are set. A missing signature
    /// count means one signature.
    fn try_from(header: Header) -> Result<Self, Self::Error> {
        match (header.sender, header.nonce, header.expiry) {
            (Some(sender), Some(nonce), Some(expiry)) => Ok(Self {
                sender,
                nonce,
                expiry,
                execution_energy_amount: header.execution_energy_amount,
                num_signatures: header.num_signatures.unwrap_or(1),
                sponsor: header.sponsor,
            }),
            _ => Err(TransactionError::NotConfigured),
        }
    }
}

impl From<TransactionHeader> for Header {
    fn from(header: TransactionHeader) -> Self {
        Self {
            sender: Some(header.sender),
            nonce: Some(header.nonce),
            expiry: Some(header.expiry),
            execution_energy_amount: header.execution_energy_amount,
            num_signatures: Some(header.num_signatures),
            sponsor: header.sponsor,
        }
    }
}

fn wire_payload_size(size: u64) -> Result<u32, EncodingError> {
    u32::try_from(size).map_err(|_| EncodingError::LengthOverflow {
        len: usize::try_from(size).unwrap_or(usize::MAX),
        bits: 32,
    })
}

// ---------------------------------------------------------------------------
// HeaderV0
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderV0 {
    pub sender: AccountAddress,
    pub nonce: SequenceNumber,
    /// Total energy: base cost plus size and signature costs.
    pub energy_amount: Energy,
    pub payload_size: u32,
    pub expiry: TransactionExpiry,
}

impl HeaderV0 {
    pub const SIZE: u64 = HEADER_V0_SIZE;
}

impl Serial for HeaderV0 {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.sender.serial(out)?;
        self.nonce.serial(out)?;
        self.energy_amount.serial(out)?;
        self.payload_size.serial(out)?;
        self.expiry.serial(out)
    }
}

impl Deserial for HeaderV0 {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            sender: AccountAddress::deserial(cursor)?,
            nonce: SequenceNumber::deserial(cursor)?,
            energy_amount: Energy::deserial(cursor)?,
            payload_size: cursor.read_u32()?,
            expiry: TransactionExpiry::deserial(cursor)?,
        })
    }
}

// ---------------------------------------------------------------------------
// HeaderV1
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderV1 {
    #[serde(flatten)]
    pub base: HeaderV0,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<AccountAddress>,
}

impl HeaderV1 {
    /// Wire size for a header with or without a sponsor.
    pub fn size_for(has_sponsor: bool) -> u64 {
        let sponsor = if has_sponsor {
            ACCOUNT_ADDRESS_SIZE as u64
        } else {
            0
        };
        HEADER_BITMAP_SIZE + HEADER_V0_SIZE + sponsor
    }

    pub fn size(&self) -> u64 {
        Self::size_for(self.sponsor.is_some())
    }

    fn bitmap(&self) -> Bitmap {
        Bitmap::from_fields(&[self.sponsor.is_some()])
    }
}

impl Serial for HeaderV1 {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.bitmap().serial(out)?;
        self.base.serial(out)?;
        if let Some(sponsor) = &self.sponsor {
            sponsor.serial(out)?;
        }
        Ok(())
    }
}

impl Deserial for HeaderV1 {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let bitmap = Bitmap::read(cursor, HEADER_V1_KNOWN_FIELDS)?;
        let base = HeaderV0::deserial(cursor)?;
        let sponsor = bitmap
            .is_set(SPONSOR_BITMAP_BIT)
            .then(|| AccountAddress::deserial(cursor))
            .transpose()?;
        Ok(Self { base, sponsor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt";
    const SPONSOR: &str = "4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M";

    fn base() -> HeaderV0 {
        HeaderV0 {
            sender: SENDER.parse().unwrap(),
            nonce: SequenceNumber::new(1).unwrap(),
            energy_amount: Energy::new(500),
            payload_size: 41,
            expiry: TransactionExpiry::from_epoch_seconds(1_700_000_000),
        }
    }

    #[test]
    fn v0_is_sixty_bytes() {
        let bytes = base().to_bytes().unwrap();
        assert_eq!(bytes.len() as u64, HeaderV0::SIZE);
        assert_eq!(HeaderV0::from_bytes(&bytes).unwrap(), base());
    }

    #[test]
    fn v1_without_sponsor() {
        let h = HeaderV1 {
            base: base(),
            sponsor: None,
        };
        assert_eq!(
            hex::encode(h.to_bytes().unwrap()),
            "000049176df18432686c93c61ca89dafbe1cb383bfe6eb3a301ef8907f852643d98d000000000000000100000000000001f400000029000000006553f100"
        );
        assert_eq!(h.size(), 62);
    }

    #[test]
    fn v1_with_sponsor() {
        let h = HeaderV1 {
            base: base(),
            sponsor: Some(SPONSOR.parse().unwrap()),
        };
        let encoded = hex::encode(h.to_bytes().unwrap());
        assert!(encoded.starts_with("000149176df1"));
        assert!(encoded.ends_with("d46bbc5fbbbbabb07752d4acb86892d7a2479856d414182f703e21065dad046d"));
        assert_eq!(h.size(), 94);
        assert_eq!(HeaderV1::from_bytes(&h.to_bytes().unwrap()).unwrap(), h);
    }

    #[test]
    fn v1_rejects_unknown_bitmap_bits() {
        let mut bytes = HeaderV1 {
            base: base(),
            sponsor: None,
        }
        .to_bytes()
        .unwrap();
        bytes[0] = 0xff;
        bytes[1] = 0xfe;
        let err = HeaderV1::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("Found unsupported bits in bitmap"));
    }

    #[test]
    fn zero_nonce_is_rejected_on_decode() {
        let mut bytes = base().to_bytes().unwrap();
        bytes[32..40].copy_from_slice(&[0; 8]);
        assert!(HeaderV0::from_bytes(&bytes).is_err());
    }

    #[test]
    fn builder_header_json_shape() {
        let header = Header {
            sender: Some(SENDER.parse().unwrap()),
            nonce: Some(SequenceNumber::new(1).unwrap()),
            expiry: Some(TransactionExpiry::from_epoch_seconds(1_700_000_000)),
            execution_energy_amount: Energy::new(300),
            num_signatures: None,
            sponsor: Some(SponsorDetails {
                account: SPONSOR.parse().unwrap(),
                num_signatures: 1,
            }),
        };
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["sender"], SENDER);
        assert_eq!(json["nonce"], "1");
        assert_eq!(json["expiry"], 1_700_000_000u64);
        assert_eq!(json["executionEnergyAmount"], "300");
        assert!(json.get("numSignatures").is_none());
        assert_eq!(json["sponsor"]["numSignatures"], 1);
        let back: Header = serde_json::from_value(json).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn transaction_header_defaults_to_one_signature() {
        let mut h = Header::new(Energy::new(300));
        assert!(matches!(
            TransactionHeader::try_from(h.clone()),
            Err(TransactionError::NotConfigured)
        ));
        h.sender = Some(SENDER.parse().unwrap());
        h.nonce = Some(SequenceNumber::new(1).unwrap());
        h.expiry = Some(TransactionExpiry::from_epoch_seconds(1_700_000_000));
        let th = TransactionHeader::try_from(h).unwrap();
        assert_eq!(th.num_signatures, 1);
        assert_eq!(th.energy_v0(41).unwrap(), Energy::new(501));
        assert_eq!(th.to_v0(41).unwrap().energy_amount, Energy::new(501));
        assert_eq!(th.to_v1(41).unwrap().size(), 62);
    }

    #[test]
    fn sponsor_signatures_count_towards_v1_energy() {
        let th = TransactionHeader {
            sender: SENDER.parse().unwrap(),
            nonce: SequenceNumber::new(1).unwrap(),
            expiry: TransactionExpiry::from_epoch_seconds(1_700_000_000),
            execution_energy_amount: Energy::new(300),
            num_signatures: 1,
            sponsor: Some(SponsorDetails {
                account: SPONSOR.parse().unwrap(),
                num_signatures: 2,
            }),
        };
        // 300 + (2 + 60 + 32) + 41 + 300
        assert_eq!(th.energy_v1(41).unwrap(), Energy::new(735));
        assert_eq!(
            th.to_v1(41).unwrap().sponsor,
            Some(SPONSOR.parse().unwrap())
        );
    }

    #[test]
    fn overflowing_energy_stops_the_wire_header() {
        let th = TransactionHeader {
            sender: SENDER.parse().unwrap(),
            nonce: SequenceNumber::new(1).unwrap(),
            expiry: TransactionExpiry::from_epoch_seconds(1_700_000_000),
            execution_energy_amount: Energy::new(u64::MAX - 10),
            num_signatures: 1,
            sponsor: None,
        };
        assert!(matches!(th.to_v0(41), Err(TransactionError::EnergyOverflow)));
        assert!(matches!(th.to_v1(41), Err(TransactionError::EnergyOverflow)));
    }

    #[test]
    fn configured_needs_all_three() {
        let mut h = Header::new(Energy::new(300));
        assert!(!h.is_configured());
        h.sender = Some(SENDER.parse().unwrap());
        h.nonce = Some(SequenceNumber::new(3).unwrap());
        assert!(!h.is_configured());
        h.expiry = Some(TransactionExpiry::from_epoch_seconds(1));
        assert!(h.is_configured());
    }
}
