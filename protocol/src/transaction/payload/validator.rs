//! Validator (baker) configuration.
//!
//! Registration, update and removal share one payload with nine optional
//! fields behind a `u16` bitmap:
//!
//! ```text
//! bit 0  stake                       u64
//! bit 1  restakeEarnings             bool
//! bit 2  openForDelegation           u8
//! bit 3  keys                        32 + 64 + 32 + 64 + 96 + 64 bytes
//! bit 4  metadataUrl                 u16 len + utf8
//! bit 5  transactionFeeCommission    u32
//! bit 6  bakingRewardCommission      u32
//! bit 7  finalizationRewardCommission u32
//! bit 8  suspended                   bool
//! ```
//!
//! Commissions are parts per hundred thousand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    CONFIGURE_VALIDATOR_WITH_KEYS_COST, MAX_METADATA_URL_LEN, SIMPLE_TRANSACTION_COST,
};
use crate::encoding::{write_prefixed, Bitmap, Cursor, Deserial, EncodingError, LengthPrefix, Serial};
use crate::types::json::hex_array;
use crate::types::{CcdAmount, Energy, TypeError};

const VALIDATOR_FIELDS: usize = 9;

// ---------------------------------------------------------------------------
// OpenStatus
// ---------------------------------------------------------------------------

/// Whether a validator pool accepts delegators. Numeric in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OpenStatus {
    OpenForAll = 0,
    ClosedForNew = 1,
    ClosedForAll = 2,
}

impl TryFrom<u8> for OpenStatus {
    type Error = EncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OpenForAll),
            1 => Ok(Self::ClosedForNew),
            2 => Ok(Self::ClosedForAll),
            other => Err(EncodingError::invalid(
                "open status",
                format!("unknown value {other}"),
            )),
        }
    }
}

impl From<OpenStatus> for u8 {
    fn from(status: OpenStatus) -> Self {
        status as u8
    }
}

// ---------------------------------------------------------------------------
// MetadataUrl
// ---------------------------------------------------------------------------

/// Where the validator publishes its pool metadata. At most 65535 bytes of
/// UTF-8, the reach of its u16 length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataUrl(String);

impl MetadataUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, TypeError> {
        let url = url.into();
        if url.len() > MAX_METADATA_URL_LEN {
            return Err(TypeError::TooLong {
                what: "metadata url",
                len: url.len(),
                max: MAX_METADATA_URL_LEN,
            });
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MetadataUrl {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MetadataUrl> for String {
    fn from(url: MetadataUrl) -> Self {
        url.0
    }
}

impl Serial for MetadataUrl {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, self.0.as_bytes(), LengthPrefix::U16)
    }
}

impl Deserial for MetadataUrl {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_string(LengthPrefix::U16, "metadata url")?))
    }
}

// ---------------------------------------------------------------------------
// ValidatorKeys
// ---------------------------------------------------------------------------

/// Validator keys with their proofs of possession.
///
/// The keys are opaque here: generating them and the proofs is the job of
/// the node tooling, this crate only carries the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorKeys {
    #[serde(with = "hex_array")]
    pub election_verify_key: [u8; 32],
    #[serde(with = "hex_array")]
    pub proof_election: [u8; 64],
    #[serde(with = "hex_array")]
    pub signature_verify_key: [u8; 32],
    #[serde(with = "hex_array")]
    pub proof_sig: [u8; 64],
    #[serde(with = "hex_array")]
    pub aggregation_verify_key: [u8; 96],
    #[serde(with = "hex_array")]
    pub proof_aggregation: [u8; 64],
}

impl Serial for ValidatorKeys {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.extend_from_slice(&self.election_verify_key);
        out.extend_from_slice(&self.proof_election);
        out.extend_from_slice(&self.signature_verify_key);
        out.extend_from_slice(&self.proof_sig);
        out.extend_from_slice(&self.aggregation_verify_key);
        out.extend_from_slice(&self.proof_aggregation);
        Ok(())
    }
}

impl Deserial for ValidatorKeys {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            election_verify_key: cursor.read_array()?,
            proof_election: cursor.read_array()?,
            signature_verify_key: cursor.read_array()?,
            proof_sig: cursor.read_array()?,
            aggregation_verify_key: cursor.read_array()?,
            proof_aggregation: cursor.read_array()?,
        })
    }
}

// ---------------------------------------------------------------------------
// ConfigureValidatorPayload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureValidatorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<CcdAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restake_earnings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_for_delegation: Option<OpenStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<ValidatorKeys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<MetadataUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_fee_commission: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baking_reward_commission: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalization_reward_commission: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

impl ConfigureValidatorPayload {
    /// Supplying keys means verifying three proofs on chain, which is what
    /// makes it expensive.
    pub fn base_energy_cost(&self) -> Energy {
        match self.keys {
            Some(_) => Energy::new(CONFIGURE_VALIDATOR_WITH_KEYS_COST),
            None => Energy::new(SIMPLE_TRANSACTION_COST),
        }
    }

    fn bitmap(&self) -> Bitmap {
        Bitmap::from_fields(&[
            self.stake.is_some(),
            self.restake_earnings.is_some(),
            self.open_for_delegation.is_some(),
            self.keys.is_some(),
            self.metadata_url.is_some(),
            self.transaction_fee_commission.is_some(),
            self.baking_reward_commission.is_some(),
            self.finalization_reward_commission.is_some(),
            self.suspended.is_some(),
        ])
    }
}

impl Serial for ConfigureValidatorPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.bitmap().serial(out)?;
        if let Some(stake) = &self.stake {
            stake.serial(out)?;
        }
        if let Some(restake) = &self.restake_earnings {
            restake.serial(out)?;
        }
        if let Some(status) = self.open_for_delegation {
            out.push(status.into());
        }
        if let Some(keys) = &self.keys {
            keys.serial(out)?;
        }
        if let Some(url) = &self.metadata_url {
            url.serial(out)?;
        }
        for commission in [
            self.transaction_fee_commission,
            self.baking_reward_commission,
            self.finalization_reward_commission,
        ]
        .into_iter()
        .flatten()
        {
            commission.serial(out)?;
        }
        if let Some(suspended) = &self.suspended {
            suspended.serial(out)?;
        }
        Ok(())
    }
}

impl Deserial for ConfigureValidatorPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let bitmap = Bitmap::read(cursor, VALIDATOR_FIELDS)?;
        let stake = bitmap.is_set(0).then(|| CcdAmount::deserial(cursor)).transpose()?;
        let restake_earnings = bitmap.is_set(1).then(|| cursor.read_bool()).transpose()?;
        let open_for_delegation = bitmap
            .is_set(2)
            .then(|| cursor.read_u8().and_then(OpenStatus::try_from))
            .transpose()?;
        let keys = bitmap
            .is_set(3)
            .then(|| ValidatorKeys::deserial(cursor))
            .transpose()?;
        let metadata_url = bitmap
            .is_set(4)
            .then(|| MetadataUrl::deserial(cursor))
            .transpose()?;
        let transaction_fee_commission = bitmap.is_set(5).then(|| cursor.read_u32()).transpose()?;
        let baking_reward_commission = bitmap.is_set(6).then(|| cursor.read_u32()).transpose()?;
        let finalization_reward_commission =
            bitmap.is_set(7).then(|| cursor.read_u32()).transpose()?;
        let suspended = bitmap.is_set(8).then(|| cursor.read_bool()).transpose()?;
        Ok(Self {
            stake,
            restake_earnings,
            open_for_delegation,
            keys,
            metadata_url,
            transaction_fee_commission,
            baking_reward_commission,
            finalization_reward_commission,
            suspended,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn array<const N: usize>(hex_str: &str) -> [u8; N] {
        hex::decode(hex_str).unwrap().try_into().unwrap()
    }

    pub(crate) fn sample_keys() -> ValidatorKeys {
        ValidatorKeys {
            election_verify_key: array("adbf30d103c08cd4960b6e559ef9bd97427f5160d611eeba4507a116e0aa8cb3"),
            proof_election: array("d9102e9eb0e6d527df37a576fd09e218d3f2c5ff28a656f49fd02d81bec58a0dcfbb79be0ef9bad74cbc73522e769e912cc8541e058be0d8b654e1e7bed9780e"),
            signature_verify_key: array("e278cf4ae4f354833732c27aa2649559c450da1c73b2a29d50d258d9c3459727"),
            proof_sig: array("e033f3293c388b7388bcb7db01d6052c8ba869d6c8aa6ddba0d3b6dca288f30748ce47e87e368cd323e787fc5e2f48f34311d80bb39a9915551c09c81d97e80d"),
            aggregation_verify_key: array("ad8e519b6a7f869780a547b6aade0aeb112a7364160b391fc179d68792388cd99d3b60c2037964abbadaf22bfded67b913eed9ac246f2fc39c3eff7c7060838e320fea1419c9282159e56ae5aef1291d31ba34ad389c9571e4d83cf65509bb57"),
            proof_aggregation: array("c9c98d80869b56e51c57ea668aec00a62280268b595f113f801bcf205d996d22056b2779ce547874829f41dd81c267979ee5576aa8e5c0d090b3ad68752fb74b"),
        }
    }

    /// Registration of a closed pool with keys and commissions.
    pub(crate) fn sample_registration(with_keys: bool) -> ConfigureValidatorPayload {
        ConfigureValidatorPayload {
            stake: Some(CcdAmount::from_micro_ccd(10_000_000_000)),
            restake_earnings: Some(false),
            open_for_delegation: Some(OpenStatus::ClosedForAll),
            keys: with_keys.then(sample_keys),
            metadata_url: Some(MetadataUrl::new("https://validator.example.com").unwrap()),
            transaction_fee_commission: Some(10),
            baking_reward_commission: Some(5),
            finalization_reward_commission: Some(5),
            suspended: None,
        }
    }

    #[test]
    fn bitmap_tracks_present_fields() {
        let bytes = sample_registration(true).to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0x00, 0xff]);
        let bytes = sample_registration(false).to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0x00, 0xf7]);
    }

    #[test]
    fn sizes_with_and_without_keys() {
        // bitmap 2, stake 8, restake 1, open 1, url 2+29, commissions 12
        assert_eq!(sample_registration(false).to_bytes().unwrap().len(), 55);
        assert_eq!(sample_registration(true).to_bytes().unwrap().len(), 55 + 352);
    }

    #[test]
    fn full_decode() {
        for with_keys in [true, false] {
            let p = sample_registration(with_keys);
            assert_eq!(ConfigureValidatorPayload::from_bytes(&p.to_bytes().unwrap()).unwrap(), p);
        }
    }

    #[test]
    fn suspended_is_the_ninth_field() {
        let p = ConfigureValidatorPayload {
            suspended: Some(true),
            ..Default::default()
        };
        assert_eq!(p.to_bytes().unwrap(), vec![0x01, 0x00, 0x01]);
        assert_eq!(ConfigureValidatorPayload::from_bytes(&p.to_bytes().unwrap()).unwrap(), p);
    }

    #[test]
    fn tenth_bit_is_unknown() {
        assert!(matches!(
            ConfigureValidatorPayload::from_bytes(&[0x02, 0x00]),
            Err(EncodingError::UnsupportedBitmapBits { bits: 0x0200 })
        ));
    }

    #[test]
    fn metadata_url_stops_at_the_u16_prefix() {
        assert!(MetadataUrl::new("x".repeat(65_535)).is_ok());
        assert_eq!(
            MetadataUrl::new("x".repeat(70_000)).unwrap_err(),
            TypeError::TooLong {
                what: "metadata url",
                len: 70_000,
                max: 65_535
            }
        );
        let json = format!(r#"{{"metadataUrl":"{}"}}"#, "x".repeat(70_000));
        assert!(serde_json::from_str::<ConfigureValidatorPayload>(&json).is_err());
    }

    #[test]
    fn longest_metadata_url_keeps_the_bytes_after_it() {
        let p = ConfigureValidatorPayload {
            metadata_url: Some(MetadataUrl::new("x".repeat(65_535)).unwrap()),
            suspended: Some(true),
            ..Default::default()
        };
        let bytes = p.to_bytes().unwrap();
        assert_eq!(&bytes[2..4], &[0xff, 0xff]);
        assert_eq!(bytes.len(), 2 + 2 + 65_535 + 1);
        assert_eq!(ConfigureValidatorPayload::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn keys_decide_the_cost() {
        assert_eq!(sample_registration(true).base_energy_cost(), Energy::new(4050));
        assert_eq!(sample_registration(false).base_energy_cost(), Energy::new(300));
    }

    #[test]
    fn open_status_is_numeric_in_json() {
        let json = serde_json::to_value(sample_registration(false)).unwrap();
        assert_eq!(json["openForDelegation"], 2);
        assert_eq!(json["stake"], "10000000000");
        assert!(json.get("suspended").is_none());
        assert!(serde_json::from_str::<OpenStatus>("3").is_err());
    }
}
