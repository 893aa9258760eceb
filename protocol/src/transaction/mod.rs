//! # Transaction Module
//!
//! Construction, signing and finalization of account transactions. Every
//! transfer, contract call, validator or delegation change and token
//! operation an account performs goes through the stages in here.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      — TransactionType and BlockItemKind tags
//! payload/      — one struct per payload family, the Payload enum, base costs
//! header.rs     — builder header, configured header, v0/v1 wire headers
//! energy.rs     — energy formulas and energy-to-microCCD conversion
//! signature.rs  — signature maps and their wire encoding
//! builder.rs    — Builder with one-shot setters and stage views
//! signable.rs   — Signable, sign digest, signature merging
//! signing.rs    — AccountSigner, verification, message signing
//! finalized.rs  — Finalized transactions, block items, hashes
//! error.rs      — TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: pick a payload with a [`Builder`] constructor, add
//!    metadata, optionally declare extra signatures or a sponsor, then
//!    `build()`.
//! 2. **Sign**: each party signs the [`Signable`]'s digest, either directly
//!    through an [`AccountSigner`] or by adding pre-computed maps. Partial
//!    transactions from different parties are combined with
//!    [`merge_signatures`].
//! 3. **Finalize**: `finalize()` computes the wire header and yields a
//!    [`Finalized`] transaction.
//! 4. **Submit**: `serialize_block_item()` gives the bytes for the node and
//!    `account_transaction_hash()` the hash to track it by.
//!
//! ## Design Decisions
//!
//! - The energy is fixed from the *declared* signature counts, so the sign
//!   digest is known before anyone signs and does not move while
//!   signatures are collected.
//! - A sponsored transaction (block item kind 3) carries a second signature
//!   map and a header bitmap. Everything else is shared with plain
//!   transactions.
//! - Stages move by value. A finalized transaction cannot be modified.

pub mod builder;
pub mod energy;
pub mod error;
pub mod finalized;
pub mod header;
pub mod payload;
pub mod signable;
pub mod signature;
pub mod signing;
pub mod types;

pub use builder::{Builder, Configured, Metadata, MultiSig, Sponsorable};
pub use energy::{calculate_energy_v0, calculate_energy_v1, energy_to_micro_ccd, ExchangeRate, Ratio};
pub use error::{SignerRole, TransactionError};
pub use finalized::{AccountTransactionV0, AccountTransactionV1, Finalized};
pub use header::{Header, HeaderV0, HeaderV1, SponsorDetails, TransactionHeader};
pub use payload::{CostParameters, Payload, PayloadInput};
pub use signable::{merge_signatures, Signable, SignableV0, SignableV1};
pub use signature::{Signature, SignatureMap, Signatures};
pub use signing::{
    message_digest, sign_message, verify_message_signature, verify_signature_map, AccountInfo,
    AccountKeys, AccountKeysSigner, AccountSigner, BasicAccountSigner, CredentialKeys, SignerError,
};
pub use types::{BlockItemKind, TransactionType};
