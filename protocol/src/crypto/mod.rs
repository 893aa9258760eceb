//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited implementations: SHA-256 from `sha2`
//! and Ed25519 from `ed25519-dalek`. Nothing in here is clever, and that is
//! the point.

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_parts};
pub use keys::{KeyError, KeyPair, VerifyKey};
