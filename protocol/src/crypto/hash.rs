//! # Hashing Utilities
//!
//! SHA-256, and nothing else. The chain hashes transactions, sign digests
//! and message digests with SHA-256, so that is the only hash function this
//! crate needs.
//!
//! The multi-part variant exists because almost every digest here is a
//! concatenation (`kind || signatures || header || payload`, or
//! `header || payload`). Feeding the parts straight into the hasher saves
//! building the concatenated buffer first.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ccd_transactions::crypto::sha256;
///
/// let hash = sha256(b"");
/// assert_eq!(
///     hex::encode(hash),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256_parts(&[data])
}

/// Compute SHA-256 over the concatenation of `parts`, without concatenating.
pub fn sha256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn parts_equal_concatenation() {
        let joined = sha256(b"headerpayload");
        let parts = sha256_parts(&[b"header", b"payload"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn empty_parts_hash_to_empty_digest() {
        assert_eq!(sha256_parts(&[]), sha256(b""));
    }
}
