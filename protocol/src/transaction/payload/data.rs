//! Registering raw data on chain.

use serde::{Deserialize, Serialize};

use crate::encoding::{Cursor, Deserial, EncodingError, Serial};
use crate::types::DataBlob;

/// `data(u16 len + bytes)`, at most 256 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDataPayload {
    pub data: DataBlob,
}

impl RegisterDataPayload {
    pub fn new(data: DataBlob) -> Self {
        Self { data }
    }
}

impl Serial for RegisterDataPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.data.serial(out)
    }
}

impl Deserial for RegisterDataPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self::new(DataBlob::deserial(cursor)?))
    }
}
