//! CCD transfers, with and without a memo.

use serde::{Deserialize, Serialize};

use crate::encoding::{Cursor, Deserial, EncodingError, Serial};
use crate::types::{AccountAddress, CcdAmount, DataBlob};

/// `to(32) amount(u64)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub to_address: AccountAddress,
    pub amount: CcdAmount,
}

impl TransferPayload {
    pub fn new(to_address: AccountAddress, amount: CcdAmount) -> Self {
        Self { to_address, amount }
    }

    /// Attaches a memo, turning this into a memo transfer.
    pub fn with_memo(self, memo: DataBlob) -> TransferWithMemoPayload {
        TransferWithMemoPayload {
            to_address: self.to_address,
            memo,
            amount: self.amount,
        }
    }
}

impl Serial for TransferPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.to_address.serial(out)?;
        self.amount.serial(out)
    }
}

impl Deserial for TransferPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            to_address: AccountAddress::deserial(cursor)?,
            amount: CcdAmount::deserial(cursor)?,
        })
    }
}

/// `to(32) memo(u16 len + bytes) amount(u64)`. Note the memo sits between
/// the address and the amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferWithMemoPayload {
    pub to_address: AccountAddress,
    pub memo: DataBlob,
    pub amount: CcdAmount,
}

impl Serial for TransferWithMemoPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.to_address.serial(out)?;
        self.memo.serial(out)?;
        self.amount.serial(out)
    }
}

impl Deserial for TransferWithMemoPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            to_address: AccountAddress::deserial(cursor)?,
            memo: DataBlob::deserial(cursor)?,
            amount: CcdAmount::deserial(cursor)?,
        })
    }
}
