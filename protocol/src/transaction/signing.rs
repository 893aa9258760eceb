//! Signers and signature verification.
//!
//! Signing is a separate step from building because the keys may not be
//! available where the transaction is assembled (hardware wallet, remote
//! signer, a co-signer on another machine). Everything that can sign
//! implements [`AccountSigner`]: given the 32-byte sign digest it returns a
//! [`SignatureMap`] for the account it represents.
//!
//! Verification is the mirror image and needs the account's public side,
//! [`AccountInfo`]: the account threshold (how many credentials must sign)
//! and, per credential, its keys and key threshold.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::error::TransactionError;
use super::signature::{Signature, SignatureMap};
use crate::crypto::{sha256_parts, KeyError, KeyPair};
use crate::types::{AccountAddress, CredentialPublicKeys, CredentialVerifyKey};

/// Errors a signer can report.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The signer holds no keys at all.
    #[error("signer has no keys")]
    NoKeys,

    #[error(transparent)]
    Key(#[from] KeyError),

    /// A signer backed by something outside this process failed.
    #[error("external signer failed: {0}")]
    External(String),
}

// ---------------------------------------------------------------------------
// AccountSigner
// ---------------------------------------------------------------------------

/// Produces signatures for one account.
#[async_trait]
pub trait AccountSigner: Send + Sync {
    /// Signs a 32-byte digest with every key this signer controls.
    async fn sign(&self, digest: &[u8; 32]) -> Result<SignatureMap, SignerError>;

    /// How many signatures `sign` returns.
    fn signature_count(&self) -> u64;
}

/// A signer holding a single key at credential 0, key 0. The common case
/// for wallets with one key per account.
#[derive(Debug, Clone)]
pub struct BasicAccountSigner {
    key: KeyPair,
}

impl BasicAccountSigner {
    pub fn new(key: KeyPair) -> Self {
        Self { key }
    }

    /// Builds a signer from a hex-encoded 32-byte Ed25519 secret key.
    pub fn from_hex(secret: &str) -> Result<Self, KeyError> {
        Ok(Self::new(KeyPair::from_hex(secret)?))
    }
}

#[async_trait]
impl AccountSigner for BasicAccountSigner {
    async fn sign(&self, digest: &[u8; 32]) -> Result<SignatureMap, SignerError> {
        Ok(SignatureMap::single(Signature::from(self.key.sign(digest))))
    }

    fn signature_count(&self) -> u64 {
        1
    }
}

/// Secret keys of one credential.
#[derive(Debug, Clone)]
pub struct CredentialKeys {
    pub keys: BTreeMap<u8, KeyPair>,
    pub threshold: u8,
}

impl CredentialKeys {
    pub fn public_keys(&self) -> CredentialPublicKeys {
        CredentialPublicKeys {
            keys: self
                .keys
                .iter()
                .map(|(idx, kp)| (*idx, CredentialVerifyKey::ed25519(kp.verify_key())))
                .collect(),
            threshold: self.threshold,
        }
    }
}

/// Secret keys of a whole account.
#[derive(Debug, Clone)]
pub struct AccountKeys {
    pub keys: BTreeMap<u8, CredentialKeys>,
    /// How many credentials must sign.
    pub threshold: u8,
}

impl AccountKeys {
    /// An account with one credential holding one key.
    pub fn single(key: KeyPair) -> Self {
        let credential = CredentialKeys {
            keys: BTreeMap::from([(0, key)]),
            threshold: 1,
        };
        Self {
            keys: BTreeMap::from([(0, credential)]),
            threshold: 1,
        }
    }

    /// The public view of these keys, as a node would report it.
    pub fn account_info(&self, address: AccountAddress) -> AccountInfo {
        AccountInfo {
            address,
            threshold: self.threshold,
            credentials: self
                .keys
                .iter()
                .map(|(idx, cred)| (*idx, cred.public_keys()))
                .collect(),
        }
    }
}

/// Signs with every key of every credential in an [`AccountKeys`].
#[derive(Debug, Clone)]
pub struct AccountKeysSigner {
    keys: AccountKeys,
}

impl AccountKeysSigner {
    pub fn new(keys: AccountKeys) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl AccountSigner for AccountKeysSigner {
    async fn sign(&self, digest: &[u8; 32]) -> Result<SignatureMap, SignerError> {
        let map: SignatureMap = self
            .keys
            .keys
            .iter()
            .flat_map(|(cred, cred_keys)| {
                cred_keys
                    .keys
                    .iter()
                    .map(move |(key, kp)| (*cred, *key, Signature::from(kp.sign(digest))))
            })
            .collect();
        if map.is_empty() {
            return Err(SignerError::NoKeys);
        }
        Ok(map)
    }

    fn signature_count(&self) -> u64 {
        self.keys.keys.values().map(|c| c.keys.len() as u64).sum()
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Public key material of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: AccountAddress,
    /// How many credentials must sign.
    pub threshold: u8,
    pub credentials: BTreeMap<u8, CredentialPublicKeys>,
}

/// Checks a signature map over `digest` against an account.
///
/// Returns `Ok(false)` when thresholds are not met or a signature does not
/// verify. Signatures naming credentials or keys the account does not have
/// are errors, since no amount of re-signing can fix those.
pub fn verify_signature_map(
    digest: &[u8; 32],
    signatures: &SignatureMap,
    account: &AccountInfo,
) -> Result<bool, TransactionError> {
    let signing_credentials = signatures.credentials().filter(|(_, k)| !k.is_empty()).count();
    if signing_credentials < usize::from(account.threshold) {
        debug!(
            signing_credentials,
            threshold = account.threshold,
            "account threshold not met"
        );
        return Ok(false);
    }

    for (cred, keys) in signatures.credentials() {
        let public = account
            .credentials
            .get(&cred)
            .ok_or(TransactionError::UnknownCredential(cred))?;
        if keys.len() < usize::from(public.threshold) {
            debug!(credential = cred, "credential threshold not met");
            return Ok(false);
        }
        for (key, sig) in keys {
            let verify_key = public.keys.get(key).ok_or(TransactionError::UnknownKey {
                credential: cred,
                key: *key,
            })?;
            if !verify_key.verify_key.verify(digest, sig.as_bytes()) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

// ---------------------------------------------------------------------------
// Message signing
// ---------------------------------------------------------------------------

/// Digest for signing an arbitrary message as an account.
///
/// The eight zero bytes after the address can never start a valid
/// transaction header, so a message signature is never a transaction
/// signature.
pub fn message_digest(account: &AccountAddress, message: &[u8]) -> [u8; 32] {
    sha256_parts(&[account.as_bytes().as_slice(), &[0u8; 8], message])
}

/// Signs `message` on behalf of `account`.
pub async fn sign_message(
    account: &AccountAddress,
    message: &[u8],
    signer: &dyn AccountSigner,
) -> Result<SignatureMap, SignerError> {
    signer.sign(&message_digest(account, message)).await
}

/// Verifies a message signature produced by [`sign_message`].
pub fn verify_message_signature(
    message: &[u8],
    signatures: &SignatureMap,
    account: &AccountInfo,
) -> Result<bool, TransactionError> {
    verify_signature_map(&message_digest(&account.address, message), signatures, account)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "e1cf504954663e49f4fe884c7c35415b09632cccd82d3d2a62ab2825e67d785d";

    fn address() -> AccountAddress {
        "3eP94feEdmhYiPC1333F9VoV31KGMswonuHk5tqmZrzf761zK5".parse().unwrap()
    }

    fn multi_keys() -> AccountKeys {
        let cred = |seed: u8| CredentialKeys {
            keys: BTreeMap::from([
                (0, KeyPair::from_bytes(&[seed; 32])),
                (1, KeyPair::from_bytes(&[seed + 1; 32])),
            ]),
            threshold: 2,
        };
        AccountKeys {
            keys: BTreeMap::from([(0, cred(1)), (1, cred(10))]),
            threshold: 2,
        }
    }

    #[tokio::test]
    async fn basic_signer_uses_slot_zero() {
        let signer = BasicAccountSigner::from_hex(SECRET).unwrap();
        let map = signer.sign(&[7u8; 32]).await.unwrap();
        assert_eq!(map.count(), 1);
        assert_eq!(map.get(0, 0).unwrap().as_bytes().len(), 64);
        assert_eq!(signer.signature_count(), 1);
    }

    #[tokio::test]
    async fn keys_signer_signs_with_everything() {
        let signer = AccountKeysSigner::new(multi_keys());
        let map = signer.sign(&[1u8; 32]).await.unwrap();
        assert_eq!(map.count(), 4);
        assert_eq!(signer.signature_count(), 4);
        let info = multi_keys().account_info(address());
        assert!(verify_signature_map(&[1u8; 32], &map, &info).unwrap());
    }

    #[tokio::test]
    async fn thresholds_are_enforced() {
        let info = multi_keys().account_info(address());
        let full = AccountKeysSigner::new(multi_keys()).sign(&[2u8; 32]).await.unwrap();

        // Only one credential signs: account threshold is two.
        let one_cred: SignatureMap = full
            .iter()
            .filter(|(c, _, _)| *c == 0)
            .map(|(c, k, s)| (c, k, s.clone()))
            .collect();
        assert!(!verify_signature_map(&[2u8; 32], &one_cred, &info).unwrap());

        // Both credentials, but one key short on credential 1.
        let short: SignatureMap = full
            .iter()
            .filter(|(c, k, _)| !(*c == 1 && *k == 1))
            .map(|(c, k, s)| (c, k, s.clone()))
            .collect();
        assert!(!verify_signature_map(&[2u8; 32], &short, &info).unwrap());
    }

    #[tokio::test]
    async fn unknown_credential_and_key_are_errors() {
        let info = AccountKeys::single(KeyPair::from_hex(SECRET).unwrap()).account_info(address());
        let sig = Signature::from([0u8; 64]);

        let mut map = SignatureMap::new();
        map.insert(5, 0, sig.clone());
        assert!(matches!(
            verify_signature_map(&[0u8; 32], &map, &info),
            Err(TransactionError::UnknownCredential(5))
        ));

        let mut map = SignatureMap::new();
        map.insert(0, 3, sig);
        assert!(matches!(
            verify_signature_map(&[0u8; 32], &map, &info),
            Err(TransactionError::UnknownKey { credential: 0, key: 3 })
        ));
    }

    #[tokio::test]
    async fn wrong_digest_fails_verification() {
        let signer = BasicAccountSigner::from_hex(SECRET).unwrap();
        let info = AccountKeys::single(KeyPair::from_hex(SECRET).unwrap()).account_info(address());
        let map = signer.sign(&[3u8; 32]).await.unwrap();
        assert!(verify_signature_map(&[3u8; 32], &map, &info).unwrap());
        assert!(!verify_signature_map(&[4u8; 32], &map, &info).unwrap());
    }

    #[tokio::test]
    async fn message_signatures_verify_against_the_account() {
        let signer = BasicAccountSigner::from_hex(SECRET).unwrap();
        let info = AccountKeys::single(KeyPair::from_hex(SECRET).unwrap()).account_info(address());
        let map = sign_message(&address(), b"hello", &signer).await.unwrap();
        assert!(verify_message_signature(b"hello", &map, &info).unwrap());
        assert!(!verify_message_signature(b"hellO", &map, &info).unwrap());
    }

    #[test]
    fn message_digest_prefixes_address_and_zeros() {
        let digest = message_digest(&address(), b"m");
        let mut manual = address().as_bytes().to_vec();
        manual.extend_from_slice(&[0u8; 8]);
        manual.push(b'm');
        assert_eq!(digest, crate::crypto::sha256(&manual));
    }
}
