//! Finalized, wire-ready account transactions.
//!
//! ```text
//! transaction  = signatures || header || payload
//! block item   = kind(u8) || transaction
//! hash         = sha256(block item)
//! ```
//!
//! The kind byte is 0 for plain and 3 for sponsored transactions. Values
//! here are immutable: everything that could change the bytes was settled
//! by the time the transaction was finalized.

use serde::Serialize;

use super::error::TransactionError;
use super::header::{HeaderV0, HeaderV1};
use super::payload::Payload;
use super::signature::{deserial_v0_signatures, SignatureMap, Signatures};
use super::types::BlockItemKind;
use crate::crypto::sha256_parts;
use crate::encoding::{Cursor, Deserial, EncodingError, Serial};

/// A plain account transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTransactionV0 {
    pub signature: SignatureMap,
    pub header: HeaderV0,
    pub payload: Payload,
}

/// A sponsored account transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTransactionV1 {
    pub signatures: Signatures,
    pub header: HeaderV1,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Finalized {
    V0(AccountTransactionV0),
    V1(AccountTransactionV1),
}

impl Finalized {
    pub fn block_item_kind(&self) -> BlockItemKind {
        match self {
            Self::V0(_) => BlockItemKind::AccountTransaction,
            Self::V1(_) => BlockItemKind::AccountTransactionV1,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            Self::V0(tx) => &tx.payload,
            Self::V1(tx) => &tx.payload,
        }
    }

    /// `signatures || header || payload`, without the kind byte.
    pub fn serialize(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::new();
        match self {
            Self::V0(tx) => {
                tx.signature.serial(&mut out)?;
                tx.header.serial(&mut out)?;
                tx.payload.serial(&mut out)?;
            }
            Self::V1(tx) => {
                tx.signatures.serial(&mut out)?;
                tx.header.serial(&mut out)?;
                tx.payload.serial(&mut out)?;
            }
        }
        Ok(out)
    }

    /// The transaction hash a node reports for this block item.
    pub fn account_transaction_hash(&self) -> Result<[u8; 32], EncodingError> {
        Ok(sha256_parts(&[
            &[self.block_item_kind().tag()],
            &self.serialize()?,
        ]))
    }

    /// The bytes submitted to a node.
    pub fn serialize_block_item(&self) -> Result<Vec<u8>, EncodingError> {
        let body = self.serialize()?;
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(self.block_item_kind().tag());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes a block item holding an account transaction of either
    /// version.
    pub fn deserialize_block_item(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut cursor = Cursor::new(bytes);
        let tag = cursor.read_u8()?;
        let tx = match BlockItemKind::from_tag(tag) {
            Some(BlockItemKind::AccountTransaction) => Self::V0(read_v0(&mut cursor)?),
            Some(BlockItemKind::AccountTransactionV1) => Self::V1(read_v1(&mut cursor)?),
            _ => return Err(TransactionError::UnsupportedBlockItemKind(tag)),
        };
        cursor.finish()?;
        Ok(tx)
    }

    /// Decodes a bare plain transaction (no kind byte).
    pub fn from_bytes_v0(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut cursor = Cursor::new(bytes);
        let tx = read_v0(&mut cursor)?;
        cursor.finish()?;
        Ok(Self::V0(tx))
    }

    /// Decodes a bare sponsored transaction (no kind byte).
    pub fn from_bytes_v1(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut cursor = Cursor::new(bytes);
        let tx = read_v1(&mut cursor)?;
        cursor.finish()?;
        Ok(Self::V1(tx))
    }
}

fn read_v0(cursor: &mut Cursor<'_>) -> Result<AccountTransactionV0, TransactionError> {
    let signature = deserial_v0_signatures(cursor)?;
    let header = HeaderV0::deserial(cursor)?;
    let payload = read_payload(cursor, header.payload_size)?;
    Ok(AccountTransactionV0 {
        signature,
        header,
        payload,
    })
}

fn read_v1(cursor: &mut Cursor<'_>) -> Result<AccountTransactionV1, TransactionError> {
    let signatures = Signatures::deserial(cursor)?;
    let header = HeaderV1::deserial(cursor)?;
    let payload = read_payload(cursor, header.base.payload_size)?;
    Ok(AccountTransactionV1 {
        signatures,
        header,
        payload,
    })
}

fn read_payload(cursor: &mut Cursor<'_>, declared: u32) -> Result<Payload, TransactionError> {
    let start = cursor.position();
    let payload = Payload::deserial(cursor)?;
    let actual = (cursor.position() - start) as u64;
    if actual != u64::from(declared) {
        return Err(TransactionError::PayloadSizeMismatch { declared, actual });
    }
    Ok(payload)
}
