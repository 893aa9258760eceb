//! # Domain Value Types
//!
//! The nouns of an account transaction: who sends, how much, to which
//! contract, with what data. Every type here validates on construction, so
//! once you hold one it is guaranteed to encode.
//!
//! ```text
//! address.rs    — AccountAddress (base58check, aliases)
//! values.rs     — CcdAmount, Energy, SequenceNumber, TransactionExpiry, DataBlob, TokenId
//! contract.rs   — ModuleReference, ContractAddress, names, Parameter
//! credential.rs — CredentialDeploymentInfo and its parts
//! json.rs       — serde adapters (u64-as-string, hex)
//! ```

pub mod address;
pub mod contract;
pub mod credential;
pub mod json;
pub mod values;

use thiserror::Error;

pub use address::{AccountAddress, AddressError};
pub use contract::{ContractAddress, ContractName, InitName, ModuleReference, Parameter, ReceiveName};
pub use credential::{
    AttributeTag, AttributeValue, ChainArData, CredentialDeploymentInfo, CredentialPublicKeys,
    CredentialRegistrationId, CredentialVerifyKey, Policy, SchemeId, YearMonth,
};
pub use values::{CcdAmount, DataBlob, Energy, SequenceNumber, TokenId, TransactionExpiry};

/// Validation failures for domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error(transparent)]
    Address(#[from] AddressError),

    /// A bounded field exceeds its maximum size.
    #[error("{what} is too long: {len} bytes, at most {max} allowed")]
    TooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// A fixed-size field has the wrong size.
    #[error("invalid {what} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Anything else the format forbids.
    #[error("invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },
}

impl TypeError {
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            reason: reason.into(),
        }
    }
}
