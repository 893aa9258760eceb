//! Account credential deployment data, as carried by `UpdateCredentials`.
//!
//! Only the wire form and the JSON shape live here. Building a credential
//! (and its zero-knowledge proofs) is an identity-layer job; this crate
//! receives the finished article and forwards it byte for byte.
//!
//! ```text
//! keys         u8 count { idx u8, scheme u8, key [32] }   ascending idx
//! threshold    u8
//! credId       [48]
//! ipIdentity   u32
//! revocThresh  u8
//! arData       u16 count { arId u32, encIdCredPubShare [96] }  ascending arId
//! validTo      year u16, month u8
//! createdAt    year u16, month u8
//! revealed     u16 count { tag u8, len u8, utf8 }      ascending tag
//! proofs       u32 len, bytes
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::json::{hex_array, hex_bytes};
use super::TypeError;
use crate::config::CREDENTIAL_ID_SIZE;
use crate::crypto::VerifyKey;
use crate::encoding::{
    write_count, write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial,
};

/// Encrypted share of the credential holder id, per anonymity revoker.
const AR_SHARE_SIZE: usize = 96;

/// Attribute values are u8-length-prefixed.
const MAX_ATTRIBUTE_VALUE_LEN: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Signature scheme of a credential key. Ed25519 is the only one deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    Ed25519,
}

impl Serial for SchemeId {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        match self {
            Self::Ed25519 => out.push(0),
        }
        Ok(())
    }
}

impl Deserial for SchemeId {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        match cursor.read_u8()? {
            0 => Ok(Self::Ed25519),
            other => Err(EncodingError::invalid("scheme id", format!("unknown scheme {other}"))),
        }
    }
}

/// A public key together with its scheme tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialVerifyKey {
    pub scheme_id: SchemeId,
    pub verify_key: VerifyKey,
}

impl CredentialVerifyKey {
    pub fn ed25519(key: VerifyKey) -> Self {
        Self {
            scheme_id: SchemeId::Ed25519,
            verify_key: key,
        }
    }
}

impl Serial for CredentialVerifyKey {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.scheme_id.serial(out)?;
        out.extend_from_slice(&self.verify_key.to_bytes());
        Ok(())
    }
}

impl Deserial for CredentialVerifyKey {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let scheme_id = SchemeId::deserial(cursor)?;
        let bytes: [u8; 32] = cursor.read_array()?;
        let verify_key = VerifyKey::from_bytes(&bytes)
            .map_err(|e| EncodingError::invalid("credential verify key", e.to_string()))?;
        Ok(Self {
            scheme_id,
            verify_key,
        })
    }
}

/// The keys of one credential and how many of them must sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPublicKeys {
    pub keys: BTreeMap<u8, CredentialVerifyKey>,
    pub threshold: u8,
}

impl Serial for CredentialPublicKeys {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_count(out, self.keys.len(), LengthPrefix::U8)?;
        for (idx, key) in &self.keys {
            out.push(*idx);
            key.serial(out)?;
        }
        out.push(self.threshold);
        Ok(())
    }
}

impl Deserial for CredentialPublicKeys {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let count = cursor.read_u8()?;
        let mut keys = BTreeMap::new();
        for _ in 0..count {
            let idx = cursor.read_u8()?;
            let key = CredentialVerifyKey::deserial(cursor)?;
            if keys.insert(idx, key).is_some() {
                return Err(EncodingError::invalid("credential keys", format!("duplicate key index {idx}")));
            }
        }
        let threshold = cursor.read_u8()?;
        Ok(Self { keys, threshold })
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Credential registration id: a compressed 48-byte group element. Hex in
/// JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRegistrationId(#[serde(with = "hex_array")] [u8; CREDENTIAL_ID_SIZE]);

impl CredentialRegistrationId {
    pub const fn new(bytes: [u8; CREDENTIAL_ID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::invalid("credential id", e.to_string()))?;
        let got = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| TypeError::InvalidLength {
                what: "credential id",
                expected: CREDENTIAL_ID_SIZE,
                got,
            })
    }

    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_ID_SIZE] {
        &self.0
    }
}

impl fmt::Debug for CredentialRegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialRegistrationId({})", hex::encode(self.0))
    }
}

impl Serial for CredentialRegistrationId {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

impl Deserial for CredentialRegistrationId {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_array()?))
    }
}

/// Anonymity revoker data for one revoker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainArData {
    #[serde(with = "hex_array")]
    pub enc_id_cred_pub_share: [u8; AR_SHARE_SIZE],
}

impl fmt::Debug for ChainArData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainArData({}..)", hex::encode(&self.enc_id_cred_pub_share[..8]))
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// A calendar month, `"YYYYMM"` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: u16,
    pub month: u8,
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Result<Self, TypeError> {
        if !(1..=12).contains(&month) {
            return Err(TypeError::invalid("month", format!("{month} is not in 1..=12")));
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::invalid("year-month", format!("expected YYYYMM, got {s:?}")));
        }
        let year = s[..4]
            .parse()
            .map_err(|_| TypeError::invalid("year-month", format!("bad year in {s:?}")))?;
        let month = s[4..]
            .parse()
            .map_err(|_| TypeError::invalid("year-month", format!("bad month in {s:?}")))?;
        Self::new(year, month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        format!("{:04}{:02}", ym.year, ym.month)
    }
}

impl Serial for YearMonth {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.year.serial(out)?;
        out.push(self.month);
        Ok(())
    }
}

impl Deserial for YearMonth {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let year = cursor.read_u16()?;
        let month = cursor.read_u8()?;
        Self::new(year, month).map_err(|e| EncodingError::invalid("year-month", e.to_string()))
    }
}

/// Identity attributes a credential may reveal. Declaration order is the
/// on-chain tag order, so a `BTreeMap` keyed by this enum iterates in wire
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeTag {
    FirstName,
    LastName,
    Sex,
    Dob,
    CountryOfResidence,
    Nationality,
    IdDocType,
    IdDocNo,
    IdDocIssuer,
    IdDocIssuedAt,
    IdDocExpiresAt,
    NationalIdNo,
    TaxIdNo,
}

impl AttributeTag {
    const ALL: [AttributeTag; 13] = [
        Self::FirstName,
        Self::LastName,
        Self::Sex,
        Self::Dob,
        Self::CountryOfResidence,
        Self::Nationality,
        Self::IdDocType,
        Self::IdDocNo,
        Self::IdDocIssuer,
        Self::IdDocIssuedAt,
        Self::IdDocExpiresAt,
        Self::NationalIdNo,
        Self::TaxIdNo,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }
}

/// A revealed attribute value, at most 255 bytes of UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeValue(String);

impl AttributeValue {
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.len() > MAX_ATTRIBUTE_VALUE_LEN {
            return Err(TypeError::TooLong {
                what: "attribute value",
                len: value.len(),
                max: MAX_ATTRIBUTE_VALUE_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AttributeValue {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AttributeValue> for String {
    fn from(v: AttributeValue) -> Self {
        v.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub valid_to: YearMonth,
    pub created_at: YearMonth,
    pub revealed_attributes: BTreeMap<AttributeTag, AttributeValue>,
}

impl Serial for Policy {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.valid_to.serial(out)?;
        self.created_at.serial(out)?;
        write_count(out, self.revealed_attributes.len(), LengthPrefix::U16)?;
        for (tag, value) in &self.revealed_attributes {
            out.push(tag.tag());
            write_prefixed(out, value.as_str().as_bytes(), LengthPrefix::U8)?;
        }
        Ok(())
    }
}

impl Deserial for Policy {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let valid_to = YearMonth::deserial(cursor)?;
        let created_at = YearMonth::deserial(cursor)?;
        let count = cursor.read_u16()?;
        let mut revealed_attributes = BTreeMap::new();
        for _ in 0..count {
            let raw = cursor.read_u8()?;
            let tag = AttributeTag::from_tag(raw)
                .ok_or_else(|| EncodingError::invalid("attribute tag", format!("unknown tag {raw}")))?;
            let value = cursor.read_string(LengthPrefix::U8, "attribute value")?;
            revealed_attributes.insert(tag, AttributeValue(value));
        }
        Ok(Self {
            valid_to,
            created_at,
            revealed_attributes,
        })
    }
}

// ---------------------------------------------------------------------------
// CredentialDeploymentInfo
// ---------------------------------------------------------------------------

/// A signed credential ready to be attached to an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDeploymentInfo {
    pub credential_public_keys: CredentialPublicKeys,
    pub cred_id: CredentialRegistrationId,
    pub ip_identity: u32,
    pub revocation_threshold: u8,
    pub ar_data: BTreeMap<u32, ChainArData>,
    pub policy: Policy,
    #[serde(with = "hex_bytes")]
    pub proofs: Vec<u8>,
}

impl CredentialDeploymentInfo {
    /// Number of keys on the credential; drives its deployment cost.
    pub fn key_count(&self) -> u64 {
        self.credential_public_keys.keys.len() as u64
    }
}

impl Serial for CredentialDeploymentInfo {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.credential_public_keys.serial(out)?;
        self.cred_id.serial(out)?;
        self.ip_identity.serial(out)?;
        out.push(self.revocation_threshold);
        write_count(out, self.ar_data.len(), LengthPrefix::U16)?;
        for (ar_id, data) in &self.ar_data {
            ar_id.serial(out)?;
            out.extend_from_slice(&data.enc_id_cred_pub_share);
        }
        self.policy.serial(out)?;
        write_prefixed(out, &self.proofs, LengthPrefix::U32)
    }
}

impl Deserial for CredentialDeploymentInfo {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let credential_public_keys = CredentialPublicKeys::deserial(cursor)?;
        let cred_id = CredentialRegistrationId::deserial(cursor)?;
        let ip_identity = cursor.read_u32()?;
        let revocation_threshold = cursor.read_u8()?;
        let ar_count = cursor.read_u16()?;
        let mut ar_data = BTreeMap::new();
        for _ in 0..ar_count {
            let ar_id = cursor.read_u32()?;
            let enc_id_cred_pub_share = cursor.read_array()?;
            ar_data.insert(ar_id, ChainArData { enc_id_cred_pub_share });
        }
        let policy = Policy::deserial(cursor)?;
        let proofs = cursor.read_prefixed(LengthPrefix::U32)?.to_vec();
        Ok(Self {
            credential_public_keys,
            cred_id,
            ip_identity,
            revocation_threshold,
            ar_data,
            policy,
            proofs,
        })
    }
}
