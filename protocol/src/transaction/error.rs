//! Errors raised while building, signing, merging and finalizing
//! transactions.

use thiserror::Error;

use super::signing::SignerError;
use super::types::TransactionType;
use crate::encoding::EncodingError;

/// Which party a signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerRole {
    Sender,
    Sponsor,
}

impl std::fmt::Display for SignerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Sponsor => write!(f, "sponsor"),
        }
    }
}

/// Errors that can occur anywhere in the transaction pipeline.
///
/// One-shot builder violations, signature bookkeeping failures and decode
/// errors all land here; a caller driving the whole flow handles a single
/// type.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// `add_metadata` on a builder that already has sender, nonce and expiry.
    #[error("Number of transaction metadata has already been specified.")]
    MetadataAlreadySpecified,

    /// `add_multi_sig` on a builder whose signature count is already set.
    #[error("Number of transaction sender signatures has already been specified.")]
    SignatureCountAlreadySpecified,

    /// `add_sponsor` on a builder that already has a sponsor.
    #[error("Number of transaction sponsor details have already been specified.")]
    SponsorAlreadySpecified,

    /// `build` on a builder missing sender, nonce or expiry.
    #[error("transaction is not configured: sender, nonce and expiry must all be set")]
    NotConfigured,

    /// Merging a plain transaction with a sponsored one.
    #[error("cannot merge signatures of transactions with different versions ({left} and {right})")]
    IncompatibleTransactions {
        left: u8,
        right: u8,
    },

    /// The same credential/key slot was signed twice.
    #[error("Duplicate signature found for credential index {credential} at key index {key}")]
    DuplicateSignature {
        credential: u8,
        key: u8,
    },

    /// More signatures than the header declared.
    #[error(
        "Too many {role} signatures added to the transaction. Counted {counted}, but transaction specifies {allowed} allowed number of signatures."
    )]
    TooManySignatures {
        role: SignerRole,
        counted: u64,
        allowed: u64,
    },

    /// Finalizing a plain transaction with no sender signatures.
    #[error("No signatures were provided")]
    NoSignatures,

    /// Sponsor operations on a plain (v0) transaction.
    #[error("sponsor signatures can only be added to sponsored (v1) transactions")]
    SponsorOnPlainTransaction,

    /// `create` was given an input that does not match the requested kind.
    #[error("payload input of kind {got} does not match requested transaction type {expected}")]
    PayloadKindMismatch {
        expected: TransactionType,
        got: TransactionType,
    },

    /// A signature names a credential the account does not have.
    #[error("signature refers to unknown credential index {0}")]
    UnknownCredential(u8),

    /// A signature names a key the credential does not have.
    #[error("signature refers to unknown key index {key} of credential {credential}")]
    UnknownKey {
        credential: u8,
        key: u8,
    },

    /// Block items other than account transactions.
    #[error("unsupported block item kind {0}")]
    UnsupportedBlockItemKind(u8),

    /// The header's payload size disagrees with the payload that follows.
    #[error("header declares a payload of {declared} bytes, but {actual} bytes were decoded")]
    PayloadSizeMismatch {
        declared: u32,
        actual: u64,
    },

    /// The energy total does not fit in a `u64`.
    #[error("transaction energy overflows u64")]
    EnergyOverflow,

    /// JSON transport failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The signer could not produce a signature.
    #[error("signer failed: {0}")]
    Signer(#[from] SignerError),

    /// Wire encoding or decoding failed.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_callers_grep_for() {
        let dup = TransactionError::DuplicateSignature {
            credential: 0,
            key: 1,
        };
        assert_eq!(
            dup.to_string(),
            "Duplicate signature found for credential index 0 at key index 1"
        );

        let too_many = TransactionError::TooManySignatures {
            role: SignerRole::Sponsor,
            counted: 2,
            allowed: 1,
        };
        assert_eq!(
            too_many.to_string(),
            "Too many sponsor signatures added to the transaction. Counted 2, but transaction specifies 1 allowed number of signatures."
        );
    }

    #[test]
    fn encoding_errors_convert() {
        let err: TransactionError = EncodingError::UnknownTransactionType(9).into();
        assert!(matches!(err, TransactionError::Encoding(_)));
    }
}
