//! Signable transactions: built, not yet finalized.
//!
//! A [`Signable`] carries the configured header, the payload and whatever
//! signatures have been collected so far. Parties sign independently and
//! their partial transactions are combined with [`merge_signatures`]; once
//! every signature is in, [`Signable::finalize`] produces the wire-ready
//! [`Finalized`].
//!
//! The sign digest depends only on the header and payload, never on the
//! signatures, so all parties sign the same 32 bytes:
//!
//! ```text
//! digest = sha256(wireHeader || payload)
//! ```
//!
//! `wireHeader` is the v0 header for plain transactions and the v1 header
//! (with the sponsor account) for sponsored ones. Its energy is computed
//! from the declared signature counts.
//!
//! JSON form:
//!
//! ```text
//! { "version": 0, "header": {..}, "payload": {..}, "signature": {..} }
//! { "version": 1, "header": {..}, "payload": {..}, "signatures": { "sender": {..}, "sponsor"?: {..} } }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{SignerRole, TransactionError};
use super::finalized::{AccountTransactionV0, AccountTransactionV1, Finalized};
use super::header::TransactionHeader;
use super::payload::Payload;
use super::signature::{SignatureMap, Signatures};
use super::signing::{verify_signature_map, AccountInfo, AccountSigner};
use crate::crypto::sha256_parts;
use crate::encoding::Serial;
use crate::types::{Energy, TypeError};

/// A plain transaction collecting sender signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableV0 {
    pub header: TransactionHeader,
    pub payload: Payload,
    pub signature: SignatureMap,
}

/// A sponsored transaction collecting sender and sponsor signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableV1 {
    pub header: TransactionHeader,
    pub payload: Payload,
    pub signatures: Signatures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignableRepr", into = "SignableRepr")]
pub enum Signable {
    V0(SignableV0),
    V1(SignableV1),
}

impl Signable {
    /// 0 for plain, 1 for sponsored.
    pub fn pre_version(&self) -> u8 {
        match self {
            Self::V0(_) => 0,
            Self::V1(_) => 1,
        }
    }

    pub fn header(&self) -> &TransactionHeader {
        match self {
            Self::V0(tx) => &tx.header,
            Self::V1(tx) => &tx.header,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            Self::V0(tx) => &tx.payload,
            Self::V1(tx) => &tx.payload,
        }
    }

    /// Total energy the finalized transaction will declare.
    pub fn energy(&self) -> Result<Energy, TransactionError> {
        let size = self.payload().size()?;
        match self {
            Self::V0(tx) => tx.header.energy_v0(size),
            Self::V1(tx) => tx.header.energy_v1(size),
        }
    }

    /// The digest every party signs.
    pub fn sign_digest(&self) -> Result<[u8; 32], TransactionError> {
        let payload = self.payload().to_bytes()?;
        let size = payload.len() as u64;
        let header = match self {
            Self::V0(tx) => tx.header.to_v0(size)?.to_bytes()?,
            Self::V1(tx) => tx.header.to_v1(size)?.to_bytes()?,
        };
        Ok(sha256_parts(&[&header, &payload]))
    }

    /// Adds pre-computed sender signatures.
    pub fn add_signature(self, signature: SignatureMap) -> Result<Self, TransactionError> {
        let other = match &self {
            Self::V0(tx) => Self::V0(SignableV0 {
                signature,
                ..tx.clone()
            }),
            Self::V1(tx) => Self::V1(SignableV1 {
                signatures: Signatures {
                    sender: signature,
                    sponsor: None,
                },
                ..tx.clone()
            }),
        };
        merge_signatures(self, other)
    }

    /// Signs as the sender.
    pub async fn sign(self, signer: &dyn AccountSigner) -> Result<Self, TransactionError> {
        let digest = self.sign_digest()?;
        let signature = signer.sign(&digest).await?;
        debug!(
            sender = %self.header().sender,
            signatures = signature.count(),
            "signed transaction as sender"
        );
        self.add_signature(signature)
    }

    /// Adds pre-computed sponsor signatures. Sponsored transactions only.
    pub fn add_sponsor_signature(self, signature: SignatureMap) -> Result<Self, TransactionError> {
        let Self::V1(tx) = &self else {
            return Err(TransactionError::SponsorOnPlainTransaction);
        };
        let other = Self::V1(SignableV1 {
            signatures: Signatures {
                sender: SignatureMap::new(),
                sponsor: Some(signature),
            },
            ..tx.clone()
        });
        merge_signatures(self, other)
    }

    /// Signs as the sponsor. Sponsored transactions only.
    pub async fn sponsor(self, signer: &dyn AccountSigner) -> Result<Self, TransactionError> {
        let Self::V1(tx) = &self else {
            return Err(TransactionError::SponsorOnPlainTransaction);
        };
        let sponsor = tx.header.sponsor.map(|s| s.account);
        let digest = self.sign_digest()?;
        let signature = signer.sign(&digest).await?;
        debug!(
            sponsor = ?sponsor.map(|a| a.to_string()),
            signatures = signature.count(),
            "signed transaction as sponsor"
        );
        self.add_sponsor_signature(signature)
    }

    /// Checks `signature` over this transaction's digest against `account`.
    pub fn verify_signature(
        &self,
        signature: &SignatureMap,
        account: &AccountInfo,
    ) -> Result<bool, TransactionError> {
        verify_signature_map(&self.sign_digest()?, signature, account)
    }

    /// Computes the wire header and seals the collected signatures.
    pub fn finalize(self) -> Result<Finalized, TransactionError> {
        let size = self.payload().size()?;
        let finalized = match self {
            Self::V0(tx) => {
                if tx.signature.is_empty() {
                    return Err(TransactionError::NoSignatures);
                }
                Finalized::V0(AccountTransactionV0 {
                    header: tx.header.to_v0(size)?,
                    signature: tx.signature,
                    payload: tx.payload,
                })
            }
            Self::V1(tx) => Finalized::V1(AccountTransactionV1 {
                header: tx.header.to_v1(size)?,
                signatures: tx.signatures,
                payload: tx.payload,
            }),
        };
        let hash = finalized.account_transaction_hash()?;
        info!(
            kind = %finalized.payload().kind(),
            hash = %hex::encode(hash),
            "finalized transaction"
        );
        Ok(finalized)
    }

    /// `sign` followed by `finalize`.
    pub async fn sign_and_finalize(
        self,
        signer: &dyn AccountSigner,
    ) -> Result<Finalized, TransactionError> {
        self.sign(signer).await?.finalize()
    }

    pub fn to_json_string(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_string(json: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Combines the signatures of two copies of the same transaction.
///
/// The result keeps `a`'s header and payload. Signing the same
/// credential/key slot twice is an error, as is ending up with more
/// signatures than either role declared.
pub fn merge_signatures(a: Signable, b: Signable) -> Result<Signable, TransactionError> {
    let merged = merge_inner(a, b);
    if let Err(err) = &merged {
        warn!(error = %err, "failed to merge transaction signatures");
    }
    merged
}

fn merge_inner(a: Signable, b: Signable) -> Result<Signable, TransactionError> {
    match (a, b) {
        (Signable::V0(a), Signable::V0(b)) => {
            let signature = union(&a.signature, &b.signature)?;
            check_count(&signature, a.header.num_signatures, SignerRole::Sender)?;
            Ok(Signable::V0(SignableV0 { signature, ..a }))
        }
        (Signable::V1(a), Signable::V1(b)) => {
            let sender = union(&a.signatures.sender, &b.signatures.sender)?;
            let sponsor = match (&a.signatures.sponsor, &b.signatures.sponsor) {
                (Some(x), Some(y)) => Some(union(x, y)?),
                (x, y) => x.clone().or_else(|| y.clone()),
            };
            check_count(&sender, a.header.num_signatures, SignerRole::Sender)?;
            let sponsor_allowed = a.header.sponsor.map_or(0, |s| s.num_signatures);
            if let Some(sponsor) = &sponsor {
                check_count(sponsor, sponsor_allowed, SignerRole::Sponsor)?;
            }
            Ok(Signable::V1(SignableV1 {
                signatures: Signatures { sender, sponsor },
                ..a
            }))
        }
        (a, b) => Err(TransactionError::IncompatibleTransactions {
            left: a.pre_version(),
            right: b.pre_version(),
        }),
    }
}

fn union(a: &SignatureMap, b: &SignatureMap) -> Result<SignatureMap, TransactionError> {
    let mut merged = a.clone();
    for (credential, key, signature) in b.iter() {
        if merged.insert(credential, key, signature.clone()).is_some() {
            return Err(TransactionError::DuplicateSignature { credential, key });
        }
    }
    Ok(merged)
}

fn check_count(map: &SignatureMap, allowed: u64, role: SignerRole) -> Result<(), TransactionError> {
    let counted = map.count();
    if counted > allowed {
        return Err(TransactionError::TooManySignatures {
            role,
            counted,
            allowed,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct SignableRepr {
    version: u8,
    header: TransactionHeader,
    payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<SignatureMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signatures: Option<Signatures>,
}

impl TryFrom<SignableRepr> for Signable {
    type Error = TypeError;

    fn try_from(repr: SignableRepr) -> Result<Self, Self::Error> {
        match (repr.version, repr.signature, repr.signatures) {
            (0, Some(signature), None) => Ok(Self::V0(SignableV0 {
                header: repr.header,
                payload: repr.payload,
                signature,
            })),
            (1, None, Some(signatures)) => Ok(Self::V1(SignableV1 {
                header: repr.header,
                payload: repr.payload,
                signatures,
            })),
            (0, ..) => Err(TypeError::invalid(
                "signable transaction",
                "version 0 carries exactly one `signature` map",
            )),
            (1, ..) => Err(TypeError::invalid(
                "signable transaction",
                "version 1 carries a `signatures` object",
            )),
            (v, ..) => Err(TypeError::invalid(
                "signable transaction",
                format!("unknown version {v}"),
            )),
        }
    }
}

impl From<Signable> for SignableRepr {
    fn from(signable: Signable) -> Self {
        match signable {
            Signable::V0(tx) => Self {
                version: 0,
                header: tx.header,
                payload: tx.payload,
                signature: Some(tx.signature),
                signatures: None,
            },
            Signable::V1(tx) => Self {
                version: 1,
                header: tx.header,
                payload: tx.payload,
                signature: None,
                signatures: Some(tx.signatures),
            },
        }
    }
}
