//! Core type definitions shared by every transaction stage.
//!
//! [`TransactionType`] is the one-byte tag that opens every serialized
//! payload. [`BlockItemKind`] is the one-byte tag that opens every block
//! item. Both are closed enums: an unknown byte is an error, never a
//! pass-through.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{
    BLOCK_ITEM_ACCOUNT_TRANSACTION, BLOCK_ITEM_ACCOUNT_TRANSACTION_V1,
    BLOCK_ITEM_CREDENTIAL_DEPLOYMENT, BLOCK_ITEM_UPDATE_INSTRUCTION,
};
use crate::encoding::EncodingError;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Discriminant for the operation an account transaction performs.
///
/// The numeric values are the on-chain tags. Gaps are kinds that are either
/// retired (encrypted transfers, scheduled transfers) or not constructible
/// through this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum TransactionType {
    /// Deploy a Wasm module.
    DeployModule = 0,
    /// Instantiate a contract from a deployed module.
    InitContract = 1,
    /// Invoke a receive function on a contract instance.
    Update = 2,
    /// Move CCD between accounts.
    Transfer = 3,
    /// Add or remove account credentials, or change the threshold.
    UpdateCredentials = 20,
    /// Put up to 256 bytes on chain.
    RegisterData = 21,
    /// Transfer with an attached memo.
    TransferWithMemo = 22,
    /// Register, update or remove a validator.
    ConfigureBaker = 25,
    /// Start, update or stop delegating stake.
    ConfigureDelegation = 26,
    /// Operations on a protocol-level token.
    TokenUpdate = 27,
}

impl TransactionType {
    pub const ALL: [TransactionType; 10] = [
        Self::DeployModule,
        Self::InitContract,
        Self::Update,
        Self::Transfer,
        Self::UpdateCredentials,
        Self::RegisterData,
        Self::TransferWithMemo,
        Self::ConfigureBaker,
        Self::ConfigureDelegation,
        Self::TokenUpdate,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// The JSON `type` string.
    pub fn kind_str(self) -> &'static str {
        match self {
            Self::DeployModule => "deployModule",
            Self::InitContract => "initContract",
            Self::Update => "update",
            Self::Transfer => "transfer",
            Self::UpdateCredentials => "updateCredentials",
            Self::RegisterData => "registerData",
            Self::TransferWithMemo => "transferWithMemo",
            Self::ConfigureBaker => "configureBaker",
            Self::ConfigureDelegation => "configureDelegation",
            Self::TokenUpdate => "tokenUpdate",
        }
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = EncodingError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.tag() == tag)
            .ok_or(EncodingError::UnknownTransactionType(tag))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_str())
    }
}

// ---------------------------------------------------------------------------
// BlockItemKind
// ---------------------------------------------------------------------------

/// The leading byte of a block item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockItemKind {
    /// A plain (v0) account transaction.
    AccountTransaction,
    /// A credential deployment creating a new account.
    CredentialDeployment,
    /// A chain-parameter update instruction.
    UpdateInstruction,
    /// A sponsored (v1) account transaction.
    AccountTransactionV1,
}

impl BlockItemKind {
    pub fn tag(self) -> u8 {
        match self {
            Self::AccountTransaction => BLOCK_ITEM_ACCOUNT_TRANSACTION,
            Self::CredentialDeployment => BLOCK_ITEM_CREDENTIAL_DEPLOYMENT,
            Self::UpdateInstruction => BLOCK_ITEM_UPDATE_INSTRUCTION,
            Self::AccountTransactionV1 => BLOCK_ITEM_ACCOUNT_TRANSACTION_V1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            BLOCK_ITEM_ACCOUNT_TRANSACTION => Some(Self::AccountTransaction),
            BLOCK_ITEM_CREDENTIAL_DEPLOYMENT => Some(Self::CredentialDeployment),
            BLOCK_ITEM_UPDATE_INSTRUCTION => Some(Self::UpdateInstruction),
            BLOCK_ITEM_ACCOUNT_TRANSACTION_V1 => Some(Self::AccountTransactionV1),
            _ => None,
        }
    }
}

impl fmt::Display for BlockItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountTransaction => write!(f, "AccountTransaction"),
            Self::CredentialDeployment => write!(f, "CredentialDeployment"),
            Self::UpdateInstruction => write!(f, "UpdateInstruction"),
            Self::AccountTransactionV1 => write!(f, "AccountTransactionV1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_the_chain() {
        assert_eq!(TransactionType::DeployModule.tag(), 0);
        assert_eq!(TransactionType::Transfer.tag(), 3);
        assert_eq!(TransactionType::UpdateCredentials.tag(), 20);
        assert_eq!(TransactionType::TokenUpdate.tag(), 27);
    }

    #[test]
    fn every_tag_parses_back() {
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::try_from(t.tag()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        // 4 is the retired encrypted transfer; 16 the retired scheduled one.
        for tag in [4u8, 16, 255] {
            assert_eq!(
                TransactionType::try_from(tag).unwrap_err(),
                EncodingError::UnknownTransactionType(tag)
            );
        }
    }

    #[test]
    fn json_names_are_camel_case() {
        for t in TransactionType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.kind_str()));
        }
    }

    #[test]
    fn block_item_kinds() {
        assert_eq!(BlockItemKind::AccountTransaction.tag(), 0);
        assert_eq!(BlockItemKind::AccountTransactionV1.tag(), 3);
        assert_eq!(BlockItemKind::from_tag(2), Some(BlockItemKind::UpdateInstruction));
        assert_eq!(BlockItemKind::from_tag(4), None);
    }
}
