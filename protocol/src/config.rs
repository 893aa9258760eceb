//! # Protocol Configuration & Constants
//!
//! Every number the chain cares about lives here. If a transaction hash or
//! an energy figure ever disagrees with the node, this file is the first
//! suspect, and ideally the only one.
//!
//! None of these are tunables. They mirror consensus rules, so changing one
//! locally just means producing transactions the node will reject.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Energy Accounting
// ---------------------------------------------------------------------------

/// Energy charged per signature the transaction declares (`A`).
pub const ENERGY_PER_SIGNATURE: u64 = 100;

/// Energy charged per byte of header plus payload (`B`).
pub const ENERGY_PER_BYTE: u64 = 1;

/// Base cost of the "simple" kinds: transfers, memo transfers, data
/// registration, delegation configuration, validator configuration without
/// keys, and the floor of every token update.
pub const SIMPLE_TRANSACTION_COST: u64 = 300;

/// Base cost of a validator configuration that (re)registers its keys. Key
/// proofs are verified on chain, hence the premium.
pub const CONFIGURE_VALIDATOR_WITH_KEYS_COST: u64 = 4050;

/// Module deployment costs one unit per this many bytes of Wasm.
pub const DEPLOY_MODULE_BYTES_PER_ENERGY: u64 = 10;

/// Unversioned module sources embed `version(u32) len(u32)`, which is not
/// charged for.
pub const UNVERSIONED_MODULE_PREFIX_LEN: usize = 8;

/// Fixed part of an `UpdateCredentials` cost.
pub const UPDATE_CREDENTIALS_BASE_COST: u64 = 500;

/// Charged per credential the account already has.
pub const UPDATE_CREDENTIALS_PER_EXISTING: u64 = 500;

/// Charged per newly deployed credential, before its keys.
pub const UPDATE_CREDENTIALS_PER_NEW: u64 = 54_000;

/// Charged per key on each newly deployed credential.
pub const UPDATE_CREDENTIALS_PER_KEY: u64 = 100;

/// Token operation surcharges on top of [`SIMPLE_TRANSACTION_COST`].
pub const TOKEN_TRANSFER_COST: u64 = 100;
pub const TOKEN_SUPPLY_UPDATE_COST: u64 = 50;
pub const TOKEN_LIST_UPDATE_COST: u64 = 50;
pub const TOKEN_PAUSE_COST: u64 = 50;

// ---------------------------------------------------------------------------
// Wire Layout
// ---------------------------------------------------------------------------

/// Plain (v0) header: sender(32) nonce(8) energy(8) payloadSize(4) expiry(8).
pub const HEADER_V0_SIZE: u64 = 60;

/// The presence bitmap leading a sponsored (v1) header.
pub const HEADER_BITMAP_SIZE: u64 = 2;

/// Account addresses are 32 raw bytes on the wire.
pub const ACCOUNT_ADDRESS_SIZE: usize = 32;

/// Bit in the v1 header bitmap that announces a sponsor address.
pub const SPONSOR_BITMAP_BIT: usize = 0;

/// Number of optional fields the v1 header knows about.
pub const HEADER_V1_KNOWN_FIELDS: usize = 1;

/// Block item kind bytes. Only the account-transaction kinds are produced
/// here; the other two exist so decoders can name what they refuse.
pub const BLOCK_ITEM_ACCOUNT_TRANSACTION: u8 = 0;
pub const BLOCK_ITEM_CREDENTIAL_DEPLOYMENT: u8 = 1;
pub const BLOCK_ITEM_UPDATE_INSTRUCTION: u8 = 2;
pub const BLOCK_ITEM_ACCOUNT_TRANSACTION_V1: u8 = 3;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Version byte prepended before base58check encoding.
pub const ADDRESS_VERSION_BYTE: u8 = 1;

/// Aliases of one account share this many leading bytes.
pub const ALIAS_PREFIX_LEN: usize = 29;

// ---------------------------------------------------------------------------
// Field Limits
// ---------------------------------------------------------------------------

/// Memos and registered data blobs are capped at 256 bytes.
pub const MAX_MEMO_SIZE: usize = 256;
pub const MAX_REGISTERED_DATA_SIZE: usize = 256;

/// Contract parameters carry a u16 length.
pub const MAX_PARAMETER_SIZE: usize = u16::MAX as usize;

/// Init and receive names, prefix included.
pub const MAX_FUNCTION_NAME_LEN: usize = 100;

/// Contract names exclude the `init_` prefix, so five characters shorter.
pub const MAX_CONTRACT_NAME_LEN: usize = 95;

pub const INIT_NAME_PREFIX: &str = "init_";

/// Token symbols are u8-length-prefixed.
pub const MAX_TOKEN_ID_LEN: usize = u8::MAX as usize;

/// Signatures and validator metadata URLs carry a u16 length.
pub const MAX_SIGNATURE_SIZE: usize = u16::MAX as usize;
pub const MAX_METADATA_URL_LEN: usize = u16::MAX as usize;

/// Credential registration ids are compressed BLS12-381 G1 points.
pub const CREDENTIAL_ID_SIZE: usize = 48;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Expiry applied by `add_metadata` when the caller does not pick one.
pub const DEFAULT_EXPIRY_WINDOW: Duration = Duration::from_secs(5 * 60);
