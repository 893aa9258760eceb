//! Contract instantiation and invocation payloads.
//!
//! Neither payload knows how much energy it may burn; that figure is chosen
//! by the caller and carried by the builder header as the base cost.

use serde::{Deserialize, Serialize};

use crate::encoding::{Cursor, Deserial, EncodingError, Serial};
use crate::types::{
    CcdAmount, ContractAddress, ContractName, InitName, ModuleReference, Parameter, ReceiveName,
};

/// `amount(u64) moduleRef(32) initName(u16 len) param(u16 len)`.
///
/// `init_name` holds the bare contract name; the `init_` prefix is added on
/// the wire and stripped again on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitContractPayload {
    pub amount: CcdAmount,
    pub module_ref: ModuleReference,
    pub init_name: ContractName,
    pub param: Parameter,
}

impl Serial for InitContractPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.amount.serial(out)?;
        self.module_ref.serial(out)?;
        self.init_name.init_name().serial(out)?;
        self.param.serial(out)
    }
}

impl Deserial for InitContractPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        let amount = CcdAmount::deserial(cursor)?;
        let module_ref = ModuleReference::deserial(cursor)?;
        let init_name = InitName::deserial(cursor)?.contract_name();
        let param = Parameter::deserial(cursor)?;
        Ok(Self {
            amount,
            module_ref,
            init_name,
            param,
        })
    }
}

/// `amount(u64) index(u64) subindex(u64) receiveName(u16 len) message(u16 len)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractPayload {
    pub amount: CcdAmount,
    pub address: ContractAddress,
    pub receive_name: ReceiveName,
    pub message: Parameter,
}

impl Serial for UpdateContractPayload {
    fn serial(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.amount.serial(out)?;
        self.address.serial(out)?;
        self.receive_name.serial(out)?;
        self.message.serial(out)
    }
}

impl Deserial for UpdateContractPayload {
    fn deserial(cursor: &mut Cursor<'_>) -> Result<Self, EncodingError> {
        Ok(Self {
            amount: CcdAmount::deserial(cursor)?,
            address: ContractAddress::deserial(cursor)?,
            receive_name: ReceiveName::deserial(cursor)?,
            message: Parameter::deserial(cursor)?,
        })
    }
}
