//! Wasm module deployment.
//!
//! A module source comes in two shapes. Versioned sources carry the raw
//! Wasm and the version separately, and the payload writes
//! `version(u32) len(u32) source`. Unversioned sources already embed those
//! eight bytes at the front and are written as-is. Both produce the same
//! bytes on the wire, which is why decoding always yields the versioned form.

use serde::{Deserialize, Serialize};

use crate::config::{DEPLOY_MODULE_BYTES_PER_ENERGY, UNVERSIONED_MODULE_PREFIX_LEN};
use crate::encoding::{write_prefixed, Cursor, Deserial, EncodingError, LengthPrefix, Serial};
use crate::types::json::hex_bytes;
use crate::types::Energy;

/// A module to deploy.
///
/// The two shapes are distinct values that share one wire form. Decoding
/// always yields the versioned shape, so an unversioned payload only
/// compares equal to its decoded self after [`into_versioned`].
///
/// [`into_versioned`]: DeployModulePayload::into_versioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployModulePayload {
    #[serde(with = "hex_bytes")]
    pub source: Vec<u8>,
    /// `None` means `source` already embeds version and length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl DeployModulePayload {
    pub fn versioned(version: u32, source: Vec<u8>) -> Self {
        Self {
            source,
            version: Some(version),
        }
    }

    pub fn unversioned(source: Vec<u8>) -> Self {
        Self {
            source,
            version: None,
        }
    }

    /// The versioned shape of this payload, reading the embedded version and
    /// length out of an unversioned source. Fails if that prefix does not
    /// describe exactly the rest of the source.
    pub fn into_versioned(self) -> Result<Self, EncodingError> {
        match self.version {
            Some(_) => Ok(self),
            None => Self::from_bytes(&self.source),
        }
    }

    /// One energy per ten bytes of Wasm, excluding any embedded prefix.
    pub fn base_energy_cost(&self) -> Energy {
        let len = match self.version {
            Some(_) => self.source.len(),
            None => self.source.len().saturating_sub(UNVERSIONED_MODULE_PREFIX_LEN),
        };
        Energy::new(len as u64 / DEPLOY_MODULE_BYTES_PER_ENERGY)
    }
}

impl Serial for DeployModulePayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        match self.version {
            Some(version) => {
                version.serial(out)?;
                write_prefixed(out, &self.source, LengthPrefix::U32)
            }
            None => {
                out.extend_from_slice(&self.source);
                Ok(())
            }
        }
    }
}

impl Deserial for DeployModulePayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let version = cursor.read_u32()?;
        let source = cursor.read_prefixed(LengthPrefix::U32)?.to_vec();
        Ok(Self::versioned(version, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WASM_HEADER: [u8; 8] = [0, 97, 115, 109, 1, 0, 0, 0];

    #[test]
    fn versioned_writes_version_and_length() {
        let p = DeployModulePayload::versioned(1, WASM_HEADER.to_vec());
        assert_eq!(
            hex::encode(p.to_bytes().unwrap()),
            "00000001000000080061736d01000000"
        );
    }

    #[test]
    fn unversioned_is_written_verbatim_and_decodes_versioned() {
        let versioned = DeployModulePayload::versioned(1, WASM_HEADER.to_vec());
        let raw = DeployModulePayload::unversioned(versioned.to_bytes().unwrap());
        assert_eq!(raw.to_bytes().unwrap(), versioned.to_bytes().unwrap());
        assert_eq!(DeployModulePayload::from_bytes(&raw.to_bytes().unwrap()).unwrap(), versioned);
    }

    #[test]
    fn decoded_unversioned_payload_equals_its_versioned_shape() {
        let mut source = vec![0, 0, 0, 1, 0, 0, 0, 8];
        source.extend_from_slice(&WASM_HEADER);
        let raw = DeployModulePayload::unversioned(source);
        let decoded = DeployModulePayload::from_bytes(&raw.to_bytes().unwrap()).unwrap();
        assert_ne!(decoded, raw);
        assert_eq!(decoded.version, Some(1));
        assert_eq!(decoded.source, WASM_HEADER.to_vec());
        assert_eq!(raw.into_versioned().unwrap(), decoded);
    }

    #[test]
    fn into_versioned_needs_a_consistent_prefix() {
        // Declares 9 bytes of Wasm but carries 8.
        let mut source = vec![0, 0, 0, 1, 0, 0, 0, 9];
        source.extend_from_slice(&WASM_HEADER);
        assert!(DeployModulePayload::unversioned(source).into_versioned().is_err());
        assert!(DeployModulePayload::unversioned(vec![1, 2]).into_versioned().is_err());

        let versioned = DeployModulePayload::versioned(1, WASM_HEADER.to_vec());
        assert_eq!(versioned.clone().into_versioned().unwrap(), versioned);
    }

    #[test]
    fn cost_ignores_embedded_prefix() {
        let versioned = DeployModulePayload::versioned(1, vec![0; 100]);
        assert_eq!(versioned.base_energy_cost(), Energy::new(10));
        let raw = DeployModulePayload::unversioned(versioned.to_bytes().unwrap());
        assert_eq!(raw.base_energy_cost(), Energy::new(10));
        assert_eq!(
            DeployModulePayload::unversioned(vec![1, 2]).base_energy_cost(),
            Energy::new(0)
        );
    }

    #[test]
    fn json_omits_missing_version() {
        let p = DeployModulePayload::unversioned(vec![0xab]);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"source":"ab"}"#);
        let back: DeployModulePayload = serde_json::from_str(r#"{"source":"ab"}"#).unwrap();
        assert_eq!(back, p);
    }
}
