//! Signature maps and their wire encoding.
//!
//! ```text
//! credCount(u8) { credIdx(u8) keyCount(u8) { keyIdx(u8) sigLen(u16) sig }* }*
//! ```
//!
//! A plain transaction carries one map, which must be non-empty. A
//! sponsored transaction carries the sender map followed by the sponsor
//! section: a single `0x00` when nobody sponsored, otherwise the sponsor map
//! itself, whose nonzero credential count doubles as the presence marker.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MAX_SIGNATURE_SIZE;
use crate::encoding::{
    write_count, write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial,
};
use crate::types::json::hex_bytes;
use crate::types::TypeError;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Raw signature bytes, normally a 64-byte Ed25519 signature. At most
/// 65535 bytes, the reach of its u16 length prefix.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HexSignature", into = "HexSignature")]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TypeError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_SIGNATURE_SIZE {
            return Err(TypeError::TooLong {
                what: "signature",
                len: bytes.len(),
                max: MAX_SIGNATURE_SIZE,
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

impl Serial for Signature {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, &self.0, LengthPrefix::U16)
    }
}

impl Deserial for Signature {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_prefixed(LengthPrefix::U16)?.to_vec()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct HexSignature(#[serde(with = "hex_bytes")] Vec<u8>);

impl TryFrom<HexSignature> for Signature {
    type Error = TypeError;

    fn try_from(sig: HexSignature) -> Result<Self, Self::Error> {
        Self::new(sig.0)
    }
}

impl From<Signature> for HexSignature {
    fn from(sig: Signature) -> Self {
        HexSignature(sig.0)
    }
}

// ---------------------------------------------------------------------------
// SignatureMap
// ---------------------------------------------------------------------------

/// Signatures of one account: credential index, then key index.
///
/// Ordered maps keep the encoding canonical regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureMap(BTreeMap<u8, BTreeMap<u8, Signature>>);

impl SignatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with a single signature at credential 0, key 0.
    pub fn single(signature: Signature) -> Self {
        let mut map = Self::new();
        map.insert(0, 0, signature);
        map
    }

    /// Inserts a signature, returning the one it replaced.
    pub fn insert(&mut self, credential: u8, key: u8, signature: Signature) -> Option<Signature> {
        self.0.entry(credential).or_default().insert(key, signature)
    }

    pub fn get(&self, credential: u8, key: u8) -> Option<&Signature> {
        self.0.get(&credential).and_then(|keys| keys.get(&key))
    }

    /// Total number of signatures across all credentials.
    pub fn count(&self) -> u64 {
        self.0.values().map(|keys| keys.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Credentials in ascending index order.
    pub fn credentials(&self) -> impl Iterator<Item = (u8, &BTreeMap<u8, Signature>)> {
        self.0.iter().map(|(idx, keys)| (*idx, keys))
    }

    /// Every `(credential, key, signature)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8, &Signature)> {
        self.0
            .iter()
            .flat_map(|(cred, keys)| keys.iter().map(move |(key, sig)| (*cred, *key, sig)))
    }
}

impl FromIterator<(u8, u8, Signature)> for SignatureMap {
    fn from_iter<I: IntoIterator<Item = (u8, u8, Signature)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (cred, key, sig) in iter {
            map.insert(cred, key, sig);
        }
        map
    }
}

impl Serial for SignatureMap {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        // Credentials without keys carry no information and are skipped.
        let creds: Vec<_> = self.0.iter().filter(|(_, keys)| !keys.is_empty()).collect();
        write_count(out, creds.len(), LengthPrefix::U8)?;
        for (cred, keys) in creds {
            out.push(*cred);
            write_count(out, keys.len(), LengthPrefix::U8)?;
            for (key, sig) in keys {
                out.push(*key);
                sig.serial(out)?;
            }
        }
        Ok(())
    }
}

impl Deserial for SignatureMap {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let cred_count = cursor.read_u8()?;
        let mut map = Self::new();
        for _ in 0..cred_count {
            let cred = cursor.read_u8()?;
            let key_count = cursor.read_u8()?;
            if key_count == 0 {
                return Err(EncodingError::invalid(
                    "signature map",
                    format!("credential {cred} has no signatures"),
                ));
            }
            for _ in 0..key_count {
                let key = cursor.read_u8()?;
                let sig = Signature::deserial(cursor)?;
                if map.insert(cred, key, sig).is_some() {
                    return Err(EncodingError::invalid(
                        "signature map",
                        format!("duplicate signature for credential {cred} key {key}"),
                    ));
                }
            }
        }
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Signatures (sponsored)
// ---------------------------------------------------------------------------

/// Signatures of a sponsored transaction.
///
/// `sponsor` is `None` until the sponsor has signed. `Some` of an empty map
/// cannot be told apart from `None` on the wire and is treated as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatures {
    pub sender: SignatureMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<SignatureMap>,
}

impl Signatures {
    /// The sponsor map if it holds any signatures.
    pub fn sponsor_map(&self) -> Option<&SignatureMap> {
        self.sponsor.as_ref().filter(|m| !m.is_empty())
    }

    pub fn sponsor_count(&self) -> u64 {
        self.sponsor_map().map_or(0, SignatureMap::count)
    }
}

impl Serial for Signatures {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.sender.serial(out)?;
        match self.sponsor_map() {
            Some(sponsor) => sponsor.serial(out),
            None => {
                out.push(0);
                Ok(())
            }
        }
    }
}

impl Deserial for Signatures {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let sender = SignatureMap::deserial(cursor)?;
        let sponsor = SignatureMap::deserial(cursor)?;
        Ok(Self {
            sender,
            sponsor: (!sponsor.is_empty()).then_some(sponsor),
        })
    }
}

/// Decodes a plain transaction's map, which must not be empty.
pub fn deserial_v0_signatures(cursor: &mut Cursor<'_>) -> Result<SignatureMap, EncodingError> {
    let map = SignatureMap::deserial(cursor)?;
    if map.is_empty() {
        return Err(EncodingError::invalid(
            "signatures",
            "No signatures were provided",
        ));
    }
    Ok(map)
}
