//! Protocol-level token operations.
//!
//! The operations travel as an opaque CBOR blob: an array of single-entry
//! maps, each keyed by the operation name. The payload never interprets the
//! operation bodies, but it does need the names to price the transaction,
//! so the blob is checked for that shape whenever a payload is built or
//! decoded.

use minicbor as cbor;
use serde::{Deserialize, Serialize};

use crate::config::{
    SIMPLE_TRANSACTION_COST, TOKEN_LIST_UPDATE_COST, TOKEN_PAUSE_COST, TOKEN_SUPPLY_UPDATE_COST,
    TOKEN_TRANSFER_COST,
};
use crate::encoding::{write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial};
use crate::types::json::hex_bytes;
use crate::types::{Energy, TokenId};

// ---------------------------------------------------------------------------
// TokenOperationKind
// ---------------------------------------------------------------------------

/// The operation names the cost schedule knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOperationKind {
    Transfer,
    Mint,
    Burn,
    AddAllowList,
    RemoveAllowList,
    AddDenyList,
    RemoveDenyList,
    Pause,
    Unpause,
    /// Anything else. Priced at zero; the chain decides whether it is valid.
    Other(String),
}

impl TokenOperationKind {
    fn from_name(name: &str) -> Self {
        match name {
            "transfer" => Self::Transfer,
            "mint" => Self::Mint,
            "burn" => Self::Burn,
            "addAllowList" => Self::AddAllowList,
            "removeAllowList" => Self::RemoveAllowList,
            "addDenyList" => Self::AddDenyList,
            "removeDenyList" => Self::RemoveDenyList,
            "pause" => Self::Pause,
            "unpause" => Self::Unpause,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn energy_cost(&self) -> u64 {
        match self {
            Self::Transfer => TOKEN_TRANSFER_COST,
            Self::Mint | Self::Burn => TOKEN_SUPPLY_UPDATE_COST,
            Self::AddAllowList
            | Self::RemoveAllowList
            | Self::AddDenyList
            | Self::RemoveDenyList => TOKEN_LIST_UPDATE_COST,
            Self::Pause | Self::Unpause => TOKEN_PAUSE_COST,
            Self::Other(_) => 0,
        }
    }
}

impl<'b, C> cbor::Decode<'b, C> for TokenOperationKind {
    fn decode(d: &mut cbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        match d.map()? {
            Some(1) => {}
            _ => {
                return Err(cbor::decode::Error::message(
                    "token operation must be a map with exactly one entry",
                ))
            }
        }
        let name = d.str()?;
        d.skip()?;
        Ok(Self::from_name(name))
    }
}

/// Reads the operation names out of an encoded operation list.
pub fn decode_operation_kinds(operations: &[u8]) -> Result<Vec<TokenOperationKind>, EncodingError> {
    let invalid = |e: cbor::decode::Error| EncodingError::invalid("token operations", e.to_string());
    let mut d = cbor::Decoder::new(operations);
    let mut kinds = Vec::new();
    for kind in d.array_iter::<TokenOperationKind>().map_err(invalid)? {
        kinds.push(kind.map_err(invalid)?);
    }
    if d.position() != operations.len() {
        return Err(EncodingError::invalid(
            "token operations",
            "trailing bytes after the operation list",
        ));
    }
    Ok(kinds)
}

// ---------------------------------------------------------------------------
// TokenUpdatePayload
// ---------------------------------------------------------------------------

/// `tokenId(u8 len + utf8) operations(u32 len + cbor)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TokenUpdateRepr")]
pub struct TokenUpdatePayload {
    token_id: TokenId,
    #[serde(with = "hex_bytes")]
    operations: Vec<u8>,
}

impl TokenUpdatePayload {
    pub fn new(token_id: TokenId, operations: Vec<u8>) -> Result<Self, EncodingError> {
        decode_operation_kinds(&operations)?;
        Ok(Self {
            token_id,
            operations,
        })
    }

    pub fn token_id(&self) -> &TokenId {
        &self.token_id
    }

    /// The raw CBOR operation list.
    pub fn operations(&self) -> &[u8] {
        &self.operations
    }

    pub fn operation_kinds(&self) -> Vec<TokenOperationKind> {
        // Validated on construction.
        decode_operation_kinds(&self.operations).unwrap_or_default()
    }

    pub fn base_energy_cost(&self) -> Energy {
        let ops = self
            .operation_kinds()
            .iter()
            .map(TokenOperationKind::energy_cost)
            .fold(0u64, u64::saturating_add);
        Energy::new(SIMPLE_TRANSACTION_COST.saturating_add(ops))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenUpdateRepr {
    token_id: TokenId,
    #[serde(with = "hex_bytes")]
    operations: Vec<u8>,
}

impl TryFrom<TokenUpdateRepr> for TokenUpdatePayload {
    type Error = EncodingError;

    fn try_from(repr: TokenUpdateRepr) -> Result<Self, Self::Error> {
        Self::new(repr.token_id, repr.operations)
    }
}

impl Serial for TokenUpdatePayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.token_id.serial(out)?;
        write_prefixed(out, &self.operations, LengthPrefix::U32)
    }
}

impl Deserial for TokenUpdatePayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let token_id = TokenId::deserial(cursor)?;
        let operations = cursor.read_prefixed(LengthPrefix::U32)?.to_vec();
        Self::new(token_id, operations)
    }
}
