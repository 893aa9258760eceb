//! Delegation configuration.
//!
//! Every field is optional. A `u16` bitmap says which ones follow, in the
//! order stake, restake flag, target.

use serde::{Deserialize, Serialize};

use crate::encoding::{Bitmap, Cursor, Deserial, EncodingError, Serial};
use crate::types::json::u64_string;
use crate::types::CcdAmount;

const DELEGATION_FIELDS: usize = 3;

const TARGET_PASSIVE: u8 = 0;
const TARGET_BAKER: u8 = 1;

/// Where delegated stake goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "delegateType")]
pub enum DelegationTarget {
    /// The passive pool.
    Passive,
    /// A specific validator pool.
    Baker {
        #[serde(rename = "bakerId", with = "u64_string")]
        baker_id: u64,
    },
}

impl Serial for DelegationTarget {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        match self {
            Self::Passive => {
                out.push(TARGET_PASSIVE);
                Ok(())
            }
            Self::Baker { baker_id } => {
                out.push(TARGET_BAKER);
                baker_id.serial(out)
            }
        }
    }
}

impl Deserial for DelegationTarget {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        match cursor.read_u8()? {
            TARGET_PASSIVE => Ok(Self::Passive),
            TARGET_BAKER => Ok(Self::Baker {
                baker_id: cursor.read_u64()?,
            }),
            other => Err(EncodingError::invalid(
                "delegation target",
                format!("unknown tag {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureDelegationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<CcdAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restake_earnings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_target: Option<DelegationTarget>,
}

impl ConfigureDelegationPayload {
    fn bitmap(&self) -> Bitmap {
        Bitmap::from_fields(&[
            self.stake.is_some(),
            self.restake_earnings.is_some(),
            self.delegation_target.is_some(),
        ])
    }
}

impl Serial for ConfigureDelegationPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.bitmap().serial(out)?;
        if let Some(stake) = &self.stake {
            stake.serial(out)?;
        }
        if let Some(restake) = &self.restake_earnings {
            restake.serial(out)?;
        }
        if let Some(target) = &self.delegation_target {
            target.serial(out)?;
        }
        Ok(())
    }
}

impl Deserial for ConfigureDelegationPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let bitmap = Bitmap::read(cursor, DELEGATION_FIELDS)?;
        let stake = bitmap.is_set(0).then(|| CcdAmount::deserial(cursor)).transpose()?;
        let restake_earnings = bitmap.is_set(1).then(|| cursor.read_bool()).transpose()?;
        let delegation_target = bitmap
            .is_set(2)
            .then(|| DelegationTarget::deserial(cursor))
            .transpose()?;
        Ok(Self {
            stake,
            restake_earnings,
            delegation_target,
        })
    }
}
