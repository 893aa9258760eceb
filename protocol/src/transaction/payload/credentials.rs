//! Credential management on an existing account.
//!
//! ```text
//! u8 count  { index(u8) CredentialDeploymentInfo }*
//! u8 count  { credId(48) }*
//! threshold(u8)
//! ```
//!
//! The deployment cost of a new credential scales with its key count, and
//! every credential the account already has adds a fixed surcharge. The
//! latter is not part of the payload, so callers pass it in through
//! [`super::CostParameters`].

use serde::{Deserialize, Serialize};

use crate::config::{
    UPDATE_CREDENTIALS_BASE_COST, UPDATE_CREDENTIALS_PER_EXISTING,
    UPDATE_CREDENTIALS_PER_KEY, UPDATE_CREDENTIALS_PER_NEW,
};
use crate::encoding::{write_count, Cursor, Deserial, EncodingError, LengthPrefix, Serial};
use crate::transaction::TransactionError;
use crate::types::{CredentialDeploymentInfo, CredentialRegistrationId, Energy};

/// A credential to attach, together with the index it should occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCredential {
    pub index: u8,
    pub cdi: CredentialDeploymentInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsPayload {
    pub new_credentials: Vec<IndexedCredential>,
    pub remove_credential_ids: Vec<CredentialRegistrationId>,
    /// Signature threshold for the account after the update.
    pub threshold: u8,
}

impl UpdateCredentialsPayload {
    pub fn base_energy_cost(
        &self,
        current_number_of_credentials: u64,
    ) -> Result<Energy, TransactionError> {
        let new = self.new_credentials.iter().try_fold(0u64, |total, c| {
            UPDATE_CREDENTIALS_PER_KEY
                .checked_mul(c.cdi.key_count())
                .and_then(|keys| keys.checked_add(UPDATE_CREDENTIALS_PER_NEW))
                .and_then(|cost| total.checked_add(cost))
        });
        UPDATE_CREDENTIALS_PER_EXISTING
            .checked_mul(current_number_of_credentials)
            .and_then(|existing| existing.checked_add(UPDATE_CREDENTIALS_BASE_COST))
            .zip(new)
            .and_then(|(fixed, new)| fixed.checked_add(new))
            .map(Energy::new)
            .ok_or(TransactionError::EnergyOverflow)
    }
}

impl Serial for UpdateCredentialsPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        write_count(out, self.new_credentials.len(), LengthPrefix::U8)?;
        for cred in &self.new_credentials {
            out.push(cred.index);
            cred.cdi.serial(out)?;
        }
        write_count(out, self.remove_credential_ids.len(), LengthPrefix::U8)?;
        for id in &self.remove_credential_ids {
            id.serial(out)?;
        }
        out.push(self.threshold);
        Ok(())
    }
}

impl Deserial for UpdateCredentialsPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let new_count = cursor.read_u8()?;
        let mut new_credentials = Vec::with_capacity(usize::from(new_count));
        for _ in 0..new_count {
            let index = cursor.read_u8()?;
            let cdi = CredentialDeploymentInfo::deserial(cursor)?;
            new_credentials.push(IndexedCredential { index, cdi });
        }
        let remove_count = cursor.read_u8()?;
        let mut remove_credential_ids = Vec::with_capacity(usize::from(remove_count));
        for _ in 0..remove_count {
            remove_credential_ids.push(CredentialRegistrationId::deserial(cursor)?);
        }
        let threshold = cursor.read_u8()?;
        Ok(Self {
            new_credentials,
            remove_credential_ids,
            threshold,
        })
    }
}
