//! Energy amounts for every payload family, checked against known-good
//! values. The header of a finalized transaction must declare exactly these
//! numbers or the node rejects it.

use ccd_transactions::transaction::payload::{
    ConfigureDelegationPayload, ConfigureValidatorPayload, DelegationTarget, DeployModulePayload,
    InitContractPayload, MetadataUrl, OpenStatus, RegisterDataPayload, TokenUpdatePayload,
    TransferPayload, UpdateContractPayload, ValidatorKeys,
};
use ccd_transactions::transaction::{
    calculate_energy_v0, calculate_energy_v1, energy_to_micro_ccd, Builder, ExchangeRate,
    Metadata, Ratio, TransactionError,
};
use ccd_transactions::types::{
    AccountAddress, CcdAmount, ContractAddress, ContractName, DataBlob, Energy, ModuleReference,
    Parameter, ReceiveName, SequenceNumber, TokenId,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const SENDER: &str = "3VwCfvVskERFAJ3GeJy2mNFrzfChqUymSJJCvoLAP9rtAwMGYt";
const RECEIVER: &str = "4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M";

fn address(s: &str) -> AccountAddress {
    s.parse().unwrap()
}

fn transfer() -> Builder {
    Builder::transfer(TransferPayload::new(
        address(RECEIVER),
        CcdAmount::from_micro_ccd(1_000_000),
    ))
}

fn array<const N: usize>(hex_str: &str) -> [u8; N] {
    hex::decode(hex_str).unwrap().try_into().unwrap()
}

fn validator_keys() -> ValidatorKeys {
    ValidatorKeys {
        election_verify_key: array("adbf30d103c08cd4960b6e559ef9bd97427f5160d611eeba4507a116e0aa8cb3"),
        proof_election: array("d9102e9eb0e6d527df37a576fd09e218d3f2c5ff28a656f49fd02d81bec58a0dcfbb79be0ef9bad74cbc73522e769e912cc8541e058be0d8b654e1e7bed9780e"),
        signature_verify_key: array("e278cf4ae4f354833732c27aa2649559c450da1c73b2a29d50d258d9c3459727"),
        proof_sig: array("e033f3293c388b7388bcb7db01d6052c8ba869d6c8aa6ddba0d3b6dca288f30748ce47e87e368cd323e787fc5e2f48f34311d80bb39a9915551c09c81d97e80d"),
        aggregation_verify_key: array("ad8e519b6a7f869780a547b6aade0aeb112a7364160b391fc179d68792388cd99d3b60c2037964abbadaf22bfded67b913eed9ac246f2fc39c3eff7c7060838e320fea1419c9282159e56ae5aef1291d31ba34ad389c9571e4d83cf65509bb57"),
        proof_aggregation: array("c9c98d80869b56e51c57ea668aec00a62280268b595f113f801bcf205d996d22056b2779ce547874829f41dd81c267979ee5576aa8e5c0d090b3ad68752fb74b"),
    }
}

fn validator(with_keys: bool) -> ConfigureValidatorPayload {
    ConfigureValidatorPayload {
        stake: Some(CcdAmount::from_micro_ccd(10_000_000_000)),
        restake_earnings: Some(false),
        open_for_delegation: Some(OpenStatus::ClosedForAll),
        keys: with_keys.then(validator_keys),
        metadata_url: Some(MetadataUrl::new("https://validator.example.com").unwrap()),
        transaction_fee_commission: Some(10),
        baking_reward_commission: Some(5),
        finalization_reward_commission: Some(5),
        suspended: None,
    }
}

// ---------------------------------------------------------------------------
// Signature and header accounting
// ---------------------------------------------------------------------------

#[test]
fn simple_transfer() {
    assert_eq!(transfer().energy().unwrap(), Energy::new(501));
}

#[test]
fn each_declared_signature_costs_one_hundred() {
    assert_eq!(transfer().add_multi_sig(3).unwrap().energy().unwrap(), Energy::new(701));
}

#[test]
fn sponsored_header_formulas() {
    let base = Energy::new(300);
    assert_eq!(calculate_energy_v1(1, None, 41, base).unwrap(), Energy::new(503));
    assert_eq!(calculate_energy_v1(1, Some(1), 41, base).unwrap(), Energy::new(635));
    assert_eq!(calculate_energy_v0(1, 41, base).unwrap(), Energy::new(501));

    let sponsored = transfer().add_sponsor_single(address(RECEIVER)).unwrap();
    assert_eq!(sponsored.energy().unwrap(), Energy::new(635));
}

#[test]
fn built_headers_carry_the_same_energy() {
    let metadata = Metadata::new(address(SENDER), SequenceNumber::new(1).unwrap());
    let plain = transfer().add_metadata(metadata).unwrap().build().unwrap();
    assert_eq!(plain.energy().unwrap(), Energy::new(501));

    let sponsored = transfer()
        .add_metadata(metadata)
        .unwrap()
        .add_sponsor(address(RECEIVER), 2)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(sponsored.energy().unwrap(), Energy::new(735));
}

#[test]
fn base_cost_near_u64_max_is_an_error_not_a_cap() {
    let payload = InitContractPayload {
        amount: CcdAmount::zero(),
        module_ref: ModuleReference::from_hex(&"aabbccdd".repeat(8)).unwrap(),
        init_name: ContractName::new("my_contract").unwrap(),
        param: Parameter::empty(),
    };
    let builder = Builder::init_contract(payload, Energy::new(u64::MAX - 10));
    assert!(matches!(builder.energy(), Err(TransactionError::EnergyOverflow)));
    let metadata = Metadata::new(address(SENDER), SequenceNumber::new(1).unwrap());
    assert!(matches!(
        builder.add_metadata(metadata).unwrap().build(),
        Err(TransactionError::EnergyOverflow)
    ));
}

// ---------------------------------------------------------------------------
// Per-payload base costs
// ---------------------------------------------------------------------------

#[test]
fn transfer_with_memo() {
    let payload = TransferPayload::new(address(RECEIVER), CcdAmount::from_micro_ccd(1_000_000))
        .with_memo(DataBlob::new(b"test".to_vec()).unwrap());
    assert_eq!(Builder::transfer_with_memo(payload).energy().unwrap(), Energy::new(507));
}

#[test]
fn deploy_module() {
    let payload = DeployModulePayload::versioned(1, vec![0, 97, 115, 109, 1, 0, 0, 0]);
    assert_eq!(Builder::deploy_module(payload).energy().unwrap(), Energy::new(177));
}

#[test]
fn register_data() {
    let payload = RegisterDataPayload::new(DataBlob::new(b"test data".to_vec()).unwrap());
    assert_eq!(Builder::register_data(payload).energy().unwrap(), Energy::new(472));
}

#[test]
fn init_contract_uses_the_energy_budget() {
    let payload = InitContractPayload {
        amount: CcdAmount::zero(),
        module_ref: ModuleReference::from_hex(&"aabbccdd".repeat(8)).unwrap(),
        init_name: ContractName::new("my_contract").unwrap(),
        param: Parameter::empty(),
    };
    assert_eq!(
        Builder::init_contract(payload, Energy::new(1000)).energy().unwrap(),
        Energy::new(1221)
    );
}

#[test]
fn update_contract_uses_the_energy_budget() {
    let payload = UpdateContractPayload {
        amount: CcdAmount::from_micro_ccd(100),
        address: ContractAddress {
            index: 0,
            subindex: 0,
        },
        receive_name: ReceiveName::new("my_contract.receive").unwrap(),
        message: Parameter::empty(),
    };
    assert_eq!(
        Builder::update_contract(payload, Energy::new(2000)).energy().unwrap(),
        Energy::new(2208)
    );
}

#[test]
fn configure_delegation() {
    let payload = ConfigureDelegationPayload {
        stake: Some(CcdAmount::from_micro_ccd(5_000_000_000)),
        restake_earnings: Some(true),
        delegation_target: Some(DelegationTarget::Passive),
    };
    assert_eq!(Builder::configure_delegation(payload).energy().unwrap(), Energy::new(473));
}

#[test]
fn configure_validator_with_and_without_keys() {
    assert_eq!(
        Builder::configure_validator(validator(true)).energy().unwrap(),
        Energy::new(4618)
    );
    assert_eq!(
        Builder::configure_validator(validator(false)).energy().unwrap(),
        Energy::new(516)
    );
}

#[test]
fn token_update() {
    // A single `pause` operation.
    let payload = TokenUpdatePayload::new(
        TokenId::new("TEST").unwrap(),
        hex::decode("81a1657061757365a0").unwrap(),
    )
    .unwrap();
    assert_eq!(Builder::token_update(payload).energy().unwrap(), Energy::new(529));
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

#[test]
fn energy_converts_to_micro_ccd_rounding_up() {
    let rate = ExchangeRate {
        euro_per_energy: Ratio::new(1, 50_000).unwrap(),
        micro_ccd_per_euro: Ratio::new(100_000_000, 3).unwrap(),
    };
    // 501 * 100_000_000 / 150_000 = 334_000
    assert_eq!(
        energy_to_micro_ccd(Energy::new(501), &rate).unwrap(),
        CcdAmount::from_micro_ccd(334_000)
    );
    // 1 * 100_000_000 / 150_000 = 666.67, rounded up
    assert_eq!(
        energy_to_micro_ccd(Energy::new(1), &rate).unwrap(),
        CcdAmount::from_micro_ccd(667)
    );
}
