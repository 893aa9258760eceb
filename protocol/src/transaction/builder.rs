//! Transaction construction via the builder pattern.
//!
//! A [`Builder`] starts from a payload, with the payload's base energy cost
//! already fixed in the header. Metadata (sender, nonce, expiry), the
//! number of sender signatures and an optional sponsor are then added, each
//! exactly once. `build()` turns a configured builder into a [`Signable`].
//!
//! The builder does not sign. That happens on the [`Signable`] so that
//! construction stays testable without key material, and so the built
//! transaction can travel (as JSON) to whoever holds the keys.
//!
//! Builders survive a JSON round trip in any stage. The stage is recovered
//! with [`Builder::configured`], [`Builder::multi_sig`] and
//! [`Builder::sponsorable`], which hand back typed views that only exist
//! when the corresponding fields are present.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::TransactionError;
use super::header::{Header, SponsorDetails, TransactionHeader};
use super::payload::{
    ConfigureDelegationPayload, ConfigureValidatorPayload, CostParameters, DeployModulePayload,
    InitContractPayload, Payload, PayloadInput, RegisterDataPayload, TokenUpdatePayload,
    TransferPayload, TransferWithMemoPayload, UpdateContractPayload, UpdateCredentialsPayload,
};
use super::signable::{Signable, SignableV0, SignableV1};
use super::signature::{SignatureMap, Signatures};
use super::types::TransactionType;
use crate::config::{DEFAULT_EXPIRY_WINDOW, SIMPLE_TRANSACTION_COST};
use crate::types::{AccountAddress, Energy, SequenceNumber, TransactionExpiry};

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Who sends the transaction, at which nonce, and until when it is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub sender: AccountAddress,
    pub nonce: SequenceNumber,
    /// Defaults to five minutes from the moment the metadata is added.
    pub expiry: Option<TransactionExpiry>,
}

impl Metadata {
    pub fn new(sender: AccountAddress, nonce: SequenceNumber) -> Self {
        Self {
            sender,
            nonce,
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: TransactionExpiry) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

fn default_expiry() -> TransactionExpiry {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    TransactionExpiry::from_epoch_seconds(now.saturating_add(DEFAULT_EXPIRY_WINDOW.as_secs()))
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// An account transaction under construction.
///
/// # Usage
///
/// ```rust,no_run
/// use ccd_transactions::transaction::builder::{Builder, Metadata};
/// use ccd_transactions::transaction::payload::TransferPayload;
/// use ccd_transactions::types::{CcdAmount, SequenceNumber};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt".parse()?;
/// let receiver = "4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M".parse()?;
///
/// let signable = Builder::transfer(TransferPayload::new(receiver, CcdAmount::from_ccd(10)?))
///     .add_metadata(Metadata::new(sender, SequenceNumber::new(1)?))?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builder {
    header: Header,
    payload: Payload,
}

impl Builder {
    fn with_base_cost(payload: Payload, base: Energy) -> Self {
        Self {
            header: Header::new(base),
            payload,
        }
    }

    fn from_parts(payload: Payload, params: CostParameters) -> Result<Self, TransactionError> {
        let base = payload.base_energy_cost(&params)?;
        Ok(Self::with_base_cost(payload, base))
    }

    pub fn transfer(payload: TransferPayload) -> Self {
        Self::with_base_cost(payload.into(), Energy::new(SIMPLE_TRANSACTION_COST))
    }

    pub fn transfer_with_memo(payload: TransferWithMemoPayload) -> Self {
        Self::with_base_cost(payload.into(), Energy::new(SIMPLE_TRANSACTION_COST))
    }

    pub fn deploy_module(payload: DeployModulePayload) -> Self {
        let base = payload.base_energy_cost();
        Self::with_base_cost(payload.into(), base)
    }

    /// `max_contract_execution_energy` is the energy budget of the init
    /// function and becomes the base cost.
    pub fn init_contract(payload: InitContractPayload, max_contract_execution_energy: Energy) -> Self {
        Self::with_base_cost(payload.into(), max_contract_execution_energy)
    }

    /// `max_contract_execution_energy` is the energy budget of the receive
    /// function and becomes the base cost.
    pub fn update_contract(
        payload: UpdateContractPayload,
        max_contract_execution_energy: Energy,
    ) -> Self {
        Self::with_base_cost(payload.into(), max_contract_execution_energy)
    }

    /// The cost depends on how many credentials the account holds before
    /// the update. Fails if that cost does not fit in a `u64`.
    pub fn update_credentials(
        payload: UpdateCredentialsPayload,
        current_number_of_credentials: u64,
    ) -> Result<Self, TransactionError> {
        Self::from_parts(
            payload.into(),
            CostParameters::credentials(current_number_of_credentials),
        )
    }

    pub fn register_data(payload: RegisterDataPayload) -> Self {
        Self::with_base_cost(payload.into(), Energy::new(SIMPLE_TRANSACTION_COST))
    }

    pub fn configure_delegation(payload: ConfigureDelegationPayload) -> Self {
        Self::with_base_cost(payload.into(), Energy::new(SIMPLE_TRANSACTION_COST))
    }

    pub fn configure_validator(payload: ConfigureValidatorPayload) -> Self {
        let base = payload.base_energy_cost();
        Self::with_base_cost(payload.into(), base)
    }

    pub fn token_update(payload: TokenUpdatePayload) -> Self {
        let base = payload.base_energy_cost();
        Self::with_base_cost(payload.into(), base)
    }

    /// Generic entry point: `input` must be of the requested `kind`.
    pub fn create(kind: TransactionType, input: PayloadInput) -> Result<Self, TransactionError> {
        if input.kind() != kind {
            return Err(TransactionError::PayloadKindMismatch {
                expected: kind,
                got: input.kind(),
            });
        }
        let (payload, params) = input.into_parts();
        Self::from_parts(payload, params)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    // -- one-shot setters ---------------------------------------------------

    /// Sets sender, nonce and expiry.
    pub fn add_metadata(mut self, metadata: Metadata) -> Result<Self, TransactionError> {
        if self.header.is_configured() {
            return Err(TransactionError::MetadataAlreadySpecified);
        }
        self.header.sender = Some(metadata.sender);
        self.header.nonce = Some(metadata.nonce);
        self.header.expiry = Some(metadata.expiry.unwrap_or_else(default_expiry));
        Ok(self)
    }

    /// Declares how many sender signatures the transaction will carry.
    pub fn add_multi_sig(mut self, num_signatures: u64) -> Result<Self, TransactionError> {
        if self.header.num_signatures.is_some() {
            return Err(TransactionError::SignatureCountAlreadySpecified);
        }
        self.header.num_signatures = Some(num_signatures);
        Ok(self)
    }

    /// Names a sponsor account and how many of its keys will sign.
    pub fn add_sponsor(
        mut self,
        account: AccountAddress,
        num_signatures: u64,
    ) -> Result<Self, TransactionError> {
        if self.header.sponsor.is_some() {
            return Err(TransactionError::SponsorAlreadySpecified);
        }
        self.header.num_signatures.get_or_insert(1);
        self.header.sponsor = Some(SponsorDetails {
            account,
            num_signatures,
        });
        Ok(self)
    }

    /// [`Builder::add_sponsor`] with a single sponsor signature.
    pub fn add_sponsor_single(self, account: AccountAddress) -> Result<Self, TransactionError> {
        self.add_sponsor(account, 1)
    }

    // -- stage checks -------------------------------------------------------

    pub fn is_configured(&self) -> bool {
        self.header.is_configured()
    }

    pub fn is_multi_sig(&self) -> bool {
        self.header.num_signatures.is_some_and(|n| n > 1)
    }

    pub fn is_sponsorable(&self) -> bool {
        self.header.sponsor.is_some()
    }

    pub fn configured(self) -> Option<Configured> {
        Configured::try_from(self).ok()
    }

    pub fn multi_sig(self) -> Option<MultiSig> {
        match self.header.num_signatures {
            Some(num_signatures) if num_signatures > 1 => Some(MultiSig {
                num_signatures,
                builder: self,
            }),
            _ => None,
        }
    }

    pub fn sponsorable(self) -> Option<Sponsorable> {
        let sponsor = self.header.sponsor?;
        Some(Sponsorable {
            sponsor,
            builder: self,
        })
    }

    /// Total energy with the signature counts declared so far (one sender
    /// signature when none is declared).
    pub fn energy(&self) -> Result<Energy, TransactionError> {
        let size = self.payload.size()?;
        let sender = self.header.num_signatures.unwrap_or(1);
        let base = self.header.execution_energy_amount;
        match self.header.sponsor {
            Some(sponsor) => super::energy::calculate_energy_v1(
                sender,
                Some(sponsor.num_signatures),
                size,
                base,
            ),
            None => super::energy::calculate_energy_v0(sender, size, base),
        }
    }

    /// Moves the transaction to the signable stage. Fails when the
    /// metadata is missing or the total energy does not fit in a `u64`.
    pub fn build(self) -> Result<Signable, TransactionError> {
        Ok(Configured::try_from(self)?.build())
    }

    pub fn to_json_string(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_string(json: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Stage views
// ---------------------------------------------------------------------------

/// A builder with sender, nonce and expiry set, whose energy fits in a
/// `u64`. Building cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configured {
    header: TransactionHeader,
    payload: Payload,
}

impl Configured {
    pub fn header(&self) -> &TransactionHeader {
        &self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Sponsored when a sponsor is declared, plain otherwise. No signatures
    /// yet.
    pub fn build(self) -> Signable {
        debug!(
            kind = %self.payload.kind(),
            sender = %self.header.sender,
            nonce = self.header.nonce.value(),
            sponsored = self.header.sponsor.is_some(),
            "built transaction"
        );
        match self.header.sponsor {
            Some(_) => Signable::V1(SignableV1 {
                header: self.header,
                payload: self.payload,
                signatures: Signatures {
                    sender: SignatureMap::new(),
                    sponsor: None,
                },
            }),
            None => Signable::V0(SignableV0 {
                header: self.header,
                payload: self.payload,
                signature: SignatureMap::new(),
            }),
        }
    }

    pub fn into_builder(self) -> Builder {
        Builder {
            header: self.header.into(),
            payload: self.payload,
        }
    }
}

impl TryFrom<Builder> for Configured {
    type Error = TransactionError;

    fn try_from(builder: Builder) -> Result<Self, Self::Error> {
        let header = TransactionHeader::try_from(builder.header.clone())?;
        builder.energy()?;
        Ok(Self {
            header,
            payload: builder.payload,
        })
    }
}

/// A builder declaring more than one sender signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSig {
    num_signatures: u64,
    builder: Builder,
}

impl MultiSig {
    pub fn num_signatures(&self) -> u64 {
        self.num_signatures
    }

    pub fn into_builder(self) -> Builder {
        self.builder
    }
}

/// A builder with a sponsor declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sponsorable {
    sponsor: SponsorDetails,
    builder: Builder,
}

impl Sponsorable {
    pub fn sponsor(&self) -> &SponsorDetails {
        &self.sponsor
    }

    pub fn into_builder(self) -> Builder {
        self.builder
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CcdAmount, DataBlob};

    const SENDER: &str = "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt";
    const RECEIVER: &str = "4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M";

    fn transfer() -> Builder {
        Builder::transfer(TransferPayload::new(
            RECEIVER.parse().unwrap(),
            CcdAmount::from_micro_ccd(1_000_000),
        ))
    }

    fn metadata() -> Metadata {
        Metadata::new(SENDER.parse().unwrap(), SequenceNumber::new(1).unwrap())
            .with_expiry(TransactionExpiry::from_epoch_seconds(1_700_000_000))
    }

    #[test]
    fn constructors_fix_the_base_cost() {
        assert_eq!(transfer().header().execution_energy_amount, Energy::new(300));
        assert_eq!(transfer().energy().unwrap(), Energy::new(501));
    }

    #[test]
    fn typed_constructors_agree_with_the_payload_cost_table() {
        use crate::transaction::payload::validator::tests::sample_registration;
        use crate::transaction::payload::IndexedCredential;
        use crate::types::credential::tests::sample_credential;
        use crate::types::{ContractAddress, ContractName, ModuleReference, Parameter, ReceiveName, TokenId};

        let receiver: AccountAddress = RECEIVER.parse().unwrap();
        let budget = Energy::new(1000);
        let credentials = UpdateCredentialsPayload {
            new_credentials: vec![IndexedCredential {
                index: 1,
                cdi: sample_credential(2),
            }],
            remove_credential_ids: vec![],
            threshold: 1,
        };
        let cases = [
            (transfer(), CostParameters::default()),
            (
                Builder::transfer_with_memo(
                    TransferPayload::new(receiver, CcdAmount::zero())
                        .with_memo(DataBlob::new(b"m".to_vec()).unwrap()),
                ),
                CostParameters::default(),
            ),
            (
                Builder::deploy_module(DeployModulePayload::versioned(1, vec![0; 100])),
                CostParameters::default(),
            ),
            (
                Builder::init_contract(
                    InitContractPayload {
                        amount: CcdAmount::zero(),
                        module_ref: ModuleReference::new([0; 32]),
                        init_name: ContractName::new("c").unwrap(),
                        param: Parameter::empty(),
                    },
                    budget,
                ),
                CostParameters::contract(budget),
            ),
            (
                Builder::update_contract(
                    UpdateContractPayload {
                        amount: CcdAmount::zero(),
                        address: ContractAddress::new(0, 0),
                        receive_name: ReceiveName::new("c.f").unwrap(),
                        message: Parameter::empty(),
                    },
                    budget,
                ),
                CostParameters::contract(budget),
            ),
            (
                Builder::update_credentials(credentials, 2).unwrap(),
                CostParameters::credentials(2),
            ),
            (
                Builder::register_data(RegisterDataPayload::new(
                    DataBlob::new(b"d".to_vec()).unwrap(),
                )),
                CostParameters::default(),
            ),
            (
                Builder::configure_delegation(ConfigureDelegationPayload::default()),
                CostParameters::default(),
            ),
            (
                Builder::configure_validator(sample_registration(true)),
                CostParameters::default(),
            ),
            (
                Builder::token_update(
                    TokenUpdatePayload::new(
                        TokenId::new("TEST").unwrap(),
                        hex::decode("81a1657061757365a0").unwrap(),
                    )
                    .unwrap(),
                ),
                CostParameters::default(),
            ),
        ];
        for (builder, params) in cases {
            assert_eq!(
                builder.header().execution_energy_amount,
                builder.payload().base_energy_cost(&params).unwrap(),
                "{}",
                builder.payload().kind()
            );
        }
    }

    #[test]
    fn a_budget_near_u64_max_fails_to_price_and_build() {
        let payload = UpdateContractPayload {
            amount: CcdAmount::zero(),
            address: crate::types::ContractAddress::new(0, 0),
            receive_name: crate::types::ReceiveName::new("c.f").unwrap(),
            message: crate::types::Parameter::empty(),
        };
        let builder = Builder::update_contract(payload, Energy::new(u64::MAX - 10));
        assert!(matches!(builder.energy(), Err(TransactionError::EnergyOverflow)));
        let with_metadata = builder.add_metadata(metadata()).unwrap();
        assert!(with_metadata.clone().configured().is_none());
        assert!(matches!(
            with_metadata.build(),
            Err(TransactionError::EnergyOverflow)
        ));
    }

    #[test]
    fn credential_updates_with_an_absurd_count_are_refused() {
        let payload = UpdateCredentialsPayload {
            new_credentials: vec![],
            remove_credential_ids: vec![],
            threshold: 1,
        };
        assert!(Builder::update_credentials(payload.clone(), 3).is_ok());
        assert!(matches!(
            Builder::update_credentials(payload, u64::MAX),
            Err(TransactionError::EnergyOverflow)
        ));
    }

    #[test]
    fn metadata_is_one_shot() {
        let builder = transfer().add_metadata(metadata()).unwrap();
        assert!(builder.is_configured());
        assert!(matches!(
            builder.add_metadata(metadata()),
            Err(TransactionError::MetadataAlreadySpecified)
        ));
    }

    #[test]
    fn expiry_defaults_to_five_minutes_out() {
        let before = Utc::now().timestamp() as u64;
        let builder = transfer()
            .add_metadata(Metadata::new(
                SENDER.parse().unwrap(),
                SequenceNumber::new(1).unwrap(),
            ))
            .unwrap();
        let after = Utc::now().timestamp() as u64;
        let expiry = builder.header().expiry.unwrap().epoch_seconds();
        assert!(expiry >= before + 300 && expiry <= after + 300);
    }

    #[test]
    fn multi_sig_is_one_shot() {
        let builder = transfer().add_multi_sig(3).unwrap();
        assert!(builder.is_multi_sig());
        assert_eq!(builder.energy().unwrap(), Energy::new(701));
        assert!(matches!(
            builder.add_multi_sig(2),
            Err(TransactionError::SignatureCountAlreadySpecified)
        ));
        assert!(!transfer().add_multi_sig(1).unwrap().is_multi_sig());
    }

    #[test]
    fn sponsor_is_one_shot_and_fixes_the_sender_count() {
        let builder = transfer().add_sponsor_single(RECEIVER.parse().unwrap()).unwrap();
        assert!(builder.is_sponsorable());
        assert_eq!(builder.header().num_signatures, Some(1));
        assert_eq!(builder.energy().unwrap(), Energy::new(635));
        assert!(matches!(
            builder.add_sponsor(RECEIVER.parse().unwrap(), 2),
            Err(TransactionError::SponsorAlreadySpecified)
        ));
    }

    #[test]
    fn build_requires_metadata() {
        assert!(matches!(transfer().build(), Err(TransactionError::NotConfigured)));
    }

    #[test]
    fn build_picks_the_version() {
        let plain = transfer().add_metadata(metadata()).unwrap().build().unwrap();
        assert_eq!(plain.pre_version(), 0);
        assert_eq!(plain.header().num_signatures, 1);

        let sponsored = transfer()
            .add_metadata(metadata())
            .unwrap()
            .add_sponsor(RECEIVER.parse().unwrap(), 2)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(sponsored.pre_version(), 1);
        let Signable::V1(tx) = sponsored else { panic!("expected v1") };
        assert!(tx.signatures.sender.is_empty());
        assert!(tx.signatures.sponsor.is_none());
    }

    #[test]
    fn stage_views_after_json_transport() {
        let builder = transfer()
            .add_metadata(metadata())
            .unwrap()
            .add_multi_sig(2)
            .unwrap()
            .add_sponsor_single(RECEIVER.parse().unwrap())
            .unwrap();
        let back = Builder::from_json_string(&builder.to_json_string().unwrap()).unwrap();
        assert_eq!(back, builder);

        assert_eq!(back.clone().multi_sig().unwrap().num_signatures(), 2);
        assert_eq!(back.clone().sponsorable().unwrap().sponsor().num_signatures, 1);
        let configured = back.configured().unwrap();
        assert_eq!(configured.header().num_signatures, 2);
        assert_eq!(configured.build().pre_version(), 1);

        assert!(transfer().configured().is_none());
        assert!(transfer().multi_sig().is_none());
        assert!(transfer().sponsorable().is_none());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(transfer().add_metadata(metadata()).unwrap()).unwrap();
        assert_eq!(json["header"]["sender"], SENDER);
        assert_eq!(json["header"]["executionEnergyAmount"], "300");
        assert_eq!(json["payload"]["type"], "transfer");
    }

    #[test]
    fn create_checks_the_kind() {
        let memo = TransferPayload::new(RECEIVER.parse().unwrap(), CcdAmount::zero())
            .with_memo(DataBlob::new(b"test".to_vec()).unwrap());
        let builder = Builder::create(
            TransactionType::TransferWithMemo,
            PayloadInput::TransferWithMemo(memo.clone()),
        )
        .unwrap();
        assert_eq!(builder, Builder::transfer_with_memo(memo.clone()));

        assert!(matches!(
            Builder::create(TransactionType::Transfer, PayloadInput::TransferWithMemo(memo)),
            Err(TransactionError::PayloadKindMismatch {
                expected: TransactionType::Transfer,
                got: TransactionType::TransferWithMemo
            })
        ));
    }

    #[test]
    fn configured_round_trips_to_builder() {
        let configured = transfer().add_metadata(metadata()).unwrap().configured().unwrap();
        let builder = configured.clone().into_builder();
        assert_eq!(builder.header().num_signatures, Some(1));
        assert_eq!(builder.configured().unwrap(), configured);
    }
}
