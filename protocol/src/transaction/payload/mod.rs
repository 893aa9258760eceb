//! # Transaction Payloads
//!
//! One struct per payload family, gathered into the closed [`Payload`] enum.
//! A serialized payload is always `tag(u8) || fields`; the tag picks the
//! variant on decode and an unknown tag is a hard error.
//!
//! ```text
//! transfer.rs    — Transfer, TransferWithMemo
//! module.rs      — DeployModule
//! contract.rs    — InitContract, Update
//! credentials.rs — UpdateCredentials
//! data.rs        — RegisterData
//! delegation.rs  — ConfigureDelegation
//! validator.rs   — ConfigureBaker
//! token.rs       — TokenUpdate
//! ```
//!
//! Each family also knows its base energy cost. Two of them depend on
//! values that are not part of the payload (the contract energy budget and
//! the account's current credential count); those come in through
//! [`CostParameters`].

pub mod contract;
pub mod credentials;
pub mod data;
pub mod delegation;
pub mod module;
pub mod token;
pub mod transfer;
pub mod validator;

use serde::{Deserialize, Serialize};

pub use contract::{InitContractPayload, UpdateContractPayload};
pub use credentials::{IndexedCredential, UpdateCredentialsPayload};
pub use data::RegisterDataPayload;
pub use delegation::{ConfigureDelegationPayload, DelegationTarget};
pub use module::DeployModulePayload;
pub use token::{TokenOperationKind, TokenUpdatePayload};
pub use transfer::{TransferPayload, TransferWithMemoPayload};
pub use validator::{ConfigureValidatorPayload, MetadataUrl, OpenStatus, ValidatorKeys};

use super::error::TransactionError;
use super::types::TransactionType;
use crate::config::SIMPLE_TRANSACTION_COST;
use crate::encoding::{Cursor, Deserial, EncodingError, Serial};
use crate::types::Energy;

// ---------------------------------------------------------------------------
// CostParameters
// ---------------------------------------------------------------------------

/// Inputs to the base energy cost that live outside the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostParameters {
    /// Energy budget for contract init/update. It *is* the base cost.
    pub max_contract_execution_energy: Energy,
    /// Credentials already on the sending account.
    pub current_number_of_credentials: u64,
}

impl CostParameters {
    pub fn contract(max_contract_execution_energy: Energy) -> Self {
        Self {
            max_contract_execution_energy,
            ..Self::default()
        }
    }

    pub fn credentials(current_number_of_credentials: u64) -> Self {
        Self {
            current_number_of_credentials,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Every payload this crate can build, sign and decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Payload {
    DeployModule(DeployModulePayload),
    InitContract(InitContractPayload),
    #[serde(rename = "update")]
    UpdateContract(UpdateContractPayload),
    Transfer(TransferPayload),
    UpdateCredentials(UpdateCredentialsPayload),
    RegisterData(RegisterDataPayload),
    TransferWithMemo(TransferWithMemoPayload),
    #[serde(rename = "configureBaker")]
    ConfigureValidator(ConfigureValidatorPayload),
    ConfigureDelegation(ConfigureDelegationPayload),
    TokenUpdate(TokenUpdatePayload),
}

impl Payload {
    pub fn kind(&self) -> TransactionType {
        match self {
            Self::DeployModule(_) => TransactionType::DeployModule,
            Self::InitContract(_) => TransactionType::InitContract,
            Self::UpdateContract(_) => TransactionType::Update,
            Self::Transfer(_) => TransactionType::Transfer,
            Self::UpdateCredentials(_) => TransactionType::UpdateCredentials,
            Self::RegisterData(_) => TransactionType::RegisterData,
            Self::TransferWithMemo(_) => TransactionType::TransferWithMemo,
            Self::ConfigureValidator(_) => TransactionType::ConfigureBaker,
            Self::ConfigureDelegation(_) => TransactionType::ConfigureDelegation,
            Self::TokenUpdate(_) => TransactionType::TokenUpdate,
        }
    }

    /// Serialized length in bytes, tag included. This is the header's
    /// `payloadSize`.
    pub fn size(&self) -> Result<u64, EncodingError> {
        Ok(self.to_bytes()?.len() as u64)
    }

    /// The cost of executing the payload, before size and signature costs.
    pub fn base_energy_cost(&self, params: &CostParameters) -> Result<Energy, TransactionError> {
        Ok(match self {
            Self::Transfer(_)
            | Self::TransferWithMemo(_)
            | Self::RegisterData(_)
            | Self::ConfigureDelegation(_) => Energy::new(SIMPLE_TRANSACTION_COST),
            Self::DeployModule(p) => p.base_energy_cost(),
            Self::InitContract(_) | Self::UpdateContract(_) => {
                params.max_contract_execution_energy
            }
            Self::UpdateCredentials(p) => {
                p.base_energy_cost(params.current_number_of_credentials)?
            }
            Self::ConfigureValidator(p) => p.base_energy_cost(),
            Self::TokenUpdate(p) => p.base_energy_cost(),
        })
    }
}

impl Serial for Payload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.push(self.kind().tag());
        match self {
            Self::DeployModule(p) => p.serial(out),
            Self::InitContract(p) => p.serial(out),
            Self::UpdateContract(p) => p.serial(out),
            Self::Transfer(p) => p.serial(out),
            Self::UpdateCredentials(p) => p.serial(out),
            Self::RegisterData(p) => p.serial(out),
            Self::TransferWithMemo(p) => p.serial(out),
            Self::ConfigureValidator(p) => p.serial(out),
            Self::ConfigureDelegation(p) => p.serial(out),
            Self::TokenUpdate(p) => p.serial(out),
        }
    }
}

impl Deserial for Payload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let kind = TransactionType::try_from(cursor.read_u8()?)?;
        Ok(match kind {
            TransactionType::DeployModule => Self::DeployModule(Deserial::deserial(cursor)?),
            TransactionType::InitContract => Self::InitContract(Deserial::deserial(cursor)?),
            TransactionType::Update => Self::UpdateContract(Deserial::deserial(cursor)?),
            TransactionType::Transfer => Self::Transfer(Deserial::deserial(cursor)?),
            TransactionType::UpdateCredentials => {
                Self::UpdateCredentials(Deserial::deserial(cursor)?)
            }
            TransactionType::RegisterData => Self::RegisterData(Deserial::deserial(cursor)?),
            TransactionType::TransferWithMemo => {
                Self::TransferWithMemo(Deserial::deserial(cursor)?)
            }
            TransactionType::ConfigureBaker => {
                Self::ConfigureValidator(Deserial::deserial(cursor)?)
            }
            TransactionType::ConfigureDelegation => {
                Self::ConfigureDelegation(Deserial::deserial(cursor)?)
            }
            TransactionType::TokenUpdate => Self::TokenUpdate(Deserial::deserial(cursor)?),
        })
    }
}

macro_rules! payload_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {$(
        impl From<$ty> for Payload {
            fn from(p: $ty) -> Self {
                Self::$variant(p)
            }
        }
    )*};
}

payload_from!(
    DeployModule(DeployModulePayload),
    InitContract(InitContractPayload),
    UpdateContract(UpdateContractPayload),
    Transfer(TransferPayload),
    UpdateCredentials(UpdateCredentialsPayload),
    RegisterData(RegisterDataPayload),
    TransferWithMemo(TransferWithMemoPayload),
    ConfigureValidator(ConfigureValidatorPayload),
    ConfigureDelegation(ConfigureDelegationPayload),
    TokenUpdate(TokenUpdatePayload),
);

// ---------------------------------------------------------------------------
// PayloadInput
// ---------------------------------------------------------------------------

/// A payload together with whatever its base cost needs, as accepted by the
/// generic `create` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadInput {
    Transfer(TransferPayload),
    TransferWithMemo(TransferWithMemoPayload),
    DeployModule(DeployModulePayload),
    InitContract {
        payload: InitContractPayload,
        max_contract_execution_energy: Energy,
    },
    UpdateContract {
        payload: UpdateContractPayload,
        max_contract_execution_energy: Energy,
    },
    UpdateCredentials {
        payload: UpdateCredentialsPayload,
        current_number_of_credentials: u64,
    },
    RegisterData(RegisterDataPayload),
    ConfigureDelegation(ConfigureDelegationPayload),
    ConfigureValidator(ConfigureValidatorPayload),
    TokenUpdate(TokenUpdatePayload),
}

impl PayloadInput {
    pub fn kind(&self) -> TransactionType {
        match self {
            Self::Transfer(_) => TransactionType::Transfer,
            Self::TransferWithMemo(_) => TransactionType::TransferWithMemo,
            Self::DeployModule(_) => TransactionType::DeployModule,
            Self::InitContract { .. } => TransactionType::InitContract,
            Self::UpdateContract { .. } => TransactionType::Update,
            Self::UpdateCredentials { .. } => TransactionType::UpdateCredentials,
            Self::RegisterData(_) => TransactionType::RegisterData,
            Self::ConfigureDelegation(_) => TransactionType::ConfigureDelegation,
            Self::ConfigureValidator(_) => TransactionType::ConfigureBaker,
            Self::TokenUpdate(_) => TransactionType::TokenUpdate,
        }
    }

    /// Splits the input into the payload and its cost parameters.
    pub fn into_parts(self) -> (Payload, CostParameters) {
        match self {
            Self::Transfer(p) => (p.into(), CostParameters::default()),
            Self::TransferWithMemo(p) => (p.into(), CostParameters::default()),
            Self::DeployModule(p) => (p.into(), CostParameters::default()),
            Self::InitContract {
                payload,
                max_contract_execution_energy,
            } => (
                payload.into(),
                CostParameters::contract(max_contract_execution_energy),
            ),
            Self::UpdateContract {
                payload,
                max_contract_execution_energy,
            } => (
                payload.into(),
                CostParameters::contract(max_contract_execution_energy),
            ),
            Self::UpdateCredentials {
                payload,
                current_number_of_credentials,
            } => (
                payload.into(),
                CostParameters::credentials(current_number_of_credentials),
            ),
            Self::RegisterData(p) => (p.into(), CostParameters::default()),
            Self::ConfigureDelegation(p) => (p.into(), CostParameters::default()),
            Self::ConfigureValidator(p) => (p.into(), CostParameters::default()),
            Self::TokenUpdate(p) => (p.into(), CostParameters::default()),
        }
    }
}
