// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ccd-transactions
//!
//! Building, serializing and signing Concordium account transactions,
//! byte for byte the way the chain expects them.
//!
//! The library covers the whole client-side path of a transaction: pick a
//! payload, fill in the header, collect signatures from one or more
//! parties (optionally including a sponsor who pays), and hand back the
//! block item bytes and the transaction hash. Talking to a node is someone
//! else's job.
//!
//! ## Architecture
//!
//! - **encoding**: the binary wire primitives. Big-endian, length-prefixed,
//!   strict on decode.
//! - **types**: the domain values (addresses, amounts, names, credentials),
//!   validated on construction.
//! - **crypto**: SHA-256 and Ed25519, thinly wrapped.
//! - **transaction**: payloads, headers, energy, the builder, signing and
//!   finalization.
//! - **config**: protocol constants.
//!
//! ## Design Philosophy
//!
//! 1. The bytes are the contract. Every encoder has a decoder and a test
//!    pinning its output.
//! 2. Invalid values are rejected where they are created. What slips
//!    through (a map too big for its count byte) makes encoding fail
//!    rather than write a truncated length.
//! 3. No unsafe code.
//! 4. Signing is async and pluggable; keys never have to live in this
//!    process.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod transaction;
pub mod types;
