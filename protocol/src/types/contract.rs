//! Smart-contract identifiers: module references, contract addresses,
//! function names and raw parameters.
//!
//! Name rules match what the chain enforces: printable ASCII only, init
//! names carry the `init_` prefix and no dot, receive names carry exactly the
//! `contract.entrypoint` shape (at least one dot). Anything the node would
//! reject is rejected here first.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::json::{hex_array, hex_bytes, u64_string};
use super::TypeError;
use crate::config::{
    INIT_NAME_PREFIX, MAX_CONTRACT_NAME_LEN, MAX_FUNCTION_NAME_LEN, MAX_PARAMETER_SIZE,
};
use crate::encoding::{write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial};

/// Printable ASCII, space through tilde.
fn is_ascii_alphanumeric_punctuation(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

// ---------------------------------------------------------------------------
// ModuleReference
// ---------------------------------------------------------------------------

/// SHA-256 of a deployed Wasm module. Hex in JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleReference(#[serde(with = "hex_array")] [u8; 32]);

impl ModuleReference {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::invalid("module reference", e.to_string()))?;
        let got = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| TypeError::InvalidLength {
                what: "module reference",
                expected: 32,
                got,
            })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleReference({self})")
    }
}

impl Serial for ModuleReference {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

impl Deserial for ModuleReference {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self(cursor.read_array()?))
    }
}

// ---------------------------------------------------------------------------
// ContractAddress
// ---------------------------------------------------------------------------

/// `<index, subindex>` of a contract instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractAddress {
    #[serde(with = "u64_string")]
    pub index: u64,
    #[serde(with = "u64_string")]
    pub subindex: u64,
}

impl ContractAddress {
    pub const fn new(index: u64, subindex: u64) -> Self {
        Self { index, subindex }
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.index, self.subindex)
    }
}

impl Serial for ContractAddress {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.index.serial(out)?;
        self.subindex.serial(out)
    }
}

impl Deserial for ContractAddress {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            index: cursor.read_u64()?,
            subindex: cursor.read_u64()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// A contract name, without the `init_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractName(String);

impl ContractName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.len() > MAX_CONTRACT_NAME_LEN {
            return Err(TypeError::TooLong {
                what: "contract name",
                len: name.len(),
                max: MAX_CONTRACT_NAME_LEN,
            });
        }
        if name.contains('.') {
            return Err(TypeError::invalid("contract name", "must not contain a '.' character"));
        }
        if !is_ascii_alphanumeric_punctuation(&name) {
            return Err(TypeError::invalid(
                "contract name",
                "must only contain ASCII alpha, numeric and punctuation characters",
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The init function name that instantiates this contract.
    pub fn init_name(&self) -> InitName {
        InitName(format!("{INIT_NAME_PREFIX}{}", self.0))
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContractName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContractName> for String {
    fn from(n: ContractName) -> Self {
        n.0
    }
}

/// An init function name: `init_` followed by a contract name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitName(String);

impl InitName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.len() > MAX_FUNCTION_NAME_LEN {
            return Err(TypeError::TooLong {
                what: "init name",
                len: name.len(),
                max: MAX_FUNCTION_NAME_LEN,
            });
        }
        if !name.starts_with(INIT_NAME_PREFIX) {
            return Err(TypeError::invalid("init name", "must be prefixed with 'init_'"));
        }
        if name.contains('.') {
            return Err(TypeError::invalid("init name", "must not contain a '.' character"));
        }
        if !is_ascii_alphanumeric_punctuation(&name) {
            return Err(TypeError::invalid(
                "init name",
                "must only contain ASCII alpha, numeric and punctuation characters",
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contract_name(&self) -> ContractName {
        // Validation on construction guarantees the prefix and the rules on
        // the remainder.
        ContractName(self.0[INIT_NAME_PREFIX.len()..].to_owned())
    }
}

impl Serial for InitName {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, self.0.as_bytes(), LengthPrefix::U16)
    }
}

impl Deserial for InitName {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let s = cursor.read_string(LengthPrefix::U16, "init name")?;
        Self::new(s).map_err(|e| EncodingError::invalid("init name", e.to_string()))
    }
}

/// A receive function name, `contract.entrypoint`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiveName(String);

impl ReceiveName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.len() > MAX_FUNCTION_NAME_LEN {
            return Err(TypeError::TooLong {
                what: "receive name",
                len: name.len(),
                max: MAX_FUNCTION_NAME_LEN,
            });
        }
        if !name.contains('.') {
            return Err(TypeError::invalid(
                "receive name",
                "must contain at least one '.' character",
            ));
        }
        if !is_ascii_alphanumeric_punctuation(&name) {
            return Err(TypeError::invalid(
                "receive name",
                "must only contain ASCII alpha, numeric and punctuation characters",
            ));
        }
        Ok(Self(name))
    }

    /// `contract.entrypoint` from its parts.
    pub fn from_parts(contract: &ContractName, entrypoint: &str) -> Result<Self, TypeError> {
        Self::new(format!("{contract}.{entrypoint}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contract_name(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(c, _)| c)
    }

    pub fn entrypoint(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, e)| e)
    }
}

impl fmt::Display for ReceiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReceiveName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ReceiveName> for String {
    fn from(n: ReceiveName) -> Self {
        n.0
    }
}

impl Serial for ReceiveName {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, self.0.as_bytes(), LengthPrefix::U16)
    }
}

impl Deserial for ReceiveName {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let s = cursor.read_string(LengthPrefix::U16, "receive name")?;
        Self::new(s).map_err(|e| EncodingError::invalid("receive name", e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Parameter
// ---------------------------------------------------------------------------

/// Serialized contract parameter. Opaque at this layer; schemas live
/// elsewhere. Hex in JSON.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "HexParameter", into = "HexParameter")]
pub struct Parameter(Vec<u8>);

impl Parameter {
    pub fn new(bytes: Vec<u8>) -> Result<Self, TypeError> {
        if bytes.len() > MAX_PARAMETER_SIZE {
            return Err(TypeError::TooLong {
                what: "parameter",
                len: bytes.len(),
                max: MAX_PARAMETER_SIZE,
            });
        }
        Ok(Self(bytes))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({})", hex::encode(&self.0))
    }
}

impl Serial for Parameter {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_prefixed(out, &self.0, LengthPrefix::U16)
    }
}

impl Deserial for Parameter {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        // A u16 prefix cannot exceed the limit, so no re-validation needed.
        Ok(Self(cursor.read_prefixed(LengthPrefix::U16)?.to_vec()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct HexParameter(#[serde(with = "hex_bytes")] Vec<u8>);

impl TryFrom<HexParameter> for Parameter {
    type Error = TypeError;

    fn try_from(p: HexParameter) -> Result<Self, Self::Error> {
        Self::new(p.0)
    }
}

impl From<Parameter> for HexParameter {
    fn from(p: Parameter) -> Self {
        HexParameter(p.0)
    }
}
