// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ccd-tx
//!
//! Entry point for the `ccd-tx` binary. Parses CLI arguments, initializes
//! logging and runs one of:
//!
//! - `decode`  — block item hex to transaction JSON and hash
//! - `hash`    — block item hex to transaction hash
//! - `energy`  — payload JSON to energy
//! - `version` — print build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use ccd_transactions::transaction::{
    calculate_energy_v0, calculate_energy_v1, CostParameters, Finalized, Payload,
};
use ccd_transactions::types::Energy;

use cli::{BlockItemArgs, CcdTxCli, Commands, EnergyArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CcdTxCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    let output = match cli.command {
        Commands::Decode(args) => decode(&args)?,
        Commands::Hash(args) => hash(&args)?,
        Commands::Energy(args) => energy(&args)?.value().to_string(),
        Commands::Version => version(),
    };
    println!("{output}");
    Ok(())
}

fn read_block_item(args: &BlockItemArgs) -> Result<Finalized> {
    let trimmed = args.hex.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).context("block item is not valid hex")?;
    let tx = Finalized::deserialize_block_item(&bytes).context("failed to decode block item")?;
    tracing::info!(
        kind = ?tx.block_item_kind(),
        payload = %tx.payload().kind(),
        bytes = bytes.len(),
        "decoded block item"
    );
    Ok(tx)
}

/// Pretty JSON of the transaction followed by a `hash:` line.
fn decode(args: &BlockItemArgs) -> Result<String> {
    let tx = read_block_item(args)?;
    let json = serde_json::to_string_pretty(&tx).context("failed to render transaction")?;
    let hash = tx
        .account_transaction_hash()
        .context("failed to hash transaction")?;
    Ok(format!("{json}\nhash: {}", hex::encode(hash)))
}

fn hash(args: &BlockItemArgs) -> Result<String> {
    let tx = read_block_item(args)?;
    let hash = tx
        .account_transaction_hash()
        .context("failed to hash transaction")?;
    Ok(hex::encode(hash))
}

fn energy(args: &EnergyArgs) -> Result<Energy> {
    let payload: Payload =
        serde_json::from_str(&args.payload).context("payload is not a valid payload JSON")?;
    let params = CostParameters {
        max_contract_execution_energy: Energy::new(args.max_contract_energy),
        current_number_of_credentials: args.current_credentials,
    };
    let base = payload.base_energy_cost(&params)?;
    let size = payload.size().context("payload does not fit its wire encoding")?;

    let energy = match args.sponsor_signatures {
        Some(sponsor) => calculate_energy_v1(args.signatures, Some(sponsor), size, base)?,
        None => calculate_energy_v0(args.signatures, size, base)?,
    };
    tracing::debug!(
        kind = %payload.kind(),
        size,
        base = base.value(),
        energy = energy.value(),
        "priced payload"
    );
    Ok(energy)
}

fn version() -> String {
    format!("ccd-tx {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER_ITEM: &str = "00010001000040542a87b1e62ad7b64f80b33845f1a6813d05d368f95efa574f662a6899d1d9c5da273d4138e4a7112c1590385aa779b8284293fa5a7b1ee338f90024ea715c0649176df18432686c93c61ca89dafbe1cb383bfe6eb3a301ef8907f852643d98d000000000000000100000000000001f500000029000000006553f10003d46bbc5fbbbbabb07752d4acb86892d7a2479856d414182f703e21065dad046d00000000000f4240";
    const TRANSFER_HASH: &str = "51607da072d8654d7a9afd183ae56b556b4ce5737ab0c9047655466e768e21c6";
    const TRANSFER_JSON: &str = r#"{"type":"transfer","toAddress":"4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M","amount":"1000000"}"#;

    fn item(hex: &str) -> BlockItemArgs {
        BlockItemArgs {
            hex: hex.to_string(),
        }
    }

    fn energy_args(signatures: u64, sponsor_signatures: Option<u64>) -> EnergyArgs {
        EnergyArgs {
            payload: TRANSFER_JSON.to_string(),
            signatures,
            sponsor_signatures,
            max_contract_energy: 0,
            current_credentials: 0,
        }
    }

    #[test]
    fn hash_of_a_transfer() {
        assert_eq!(hash(&item(TRANSFER_ITEM)).unwrap(), TRANSFER_HASH);
        assert_eq!(
            hash(&item(&format!("0x{TRANSFER_ITEM}"))).unwrap(),
            TRANSFER_HASH
        );
    }

    #[test]
    fn decode_prints_json_then_hash() {
        let out = decode(&item(TRANSFER_ITEM)).unwrap();
        assert!(out.contains("\"toAddress\": \"4ZJBYQbVp3zVZyjCXfZAAYBVkJMyVj8UKUNj9ox5YqTCBdBq2M\""));
        assert!(out.ends_with(&format!("hash: {TRANSFER_HASH}")));
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(hash(&item("zz")).is_err());
        assert!(hash(&item("01")).is_err());
    }

    #[test]
    fn transfer_energy() {
        assert_eq!(energy(&energy_args(1, None)).unwrap(), Energy::new(501));
        assert_eq!(energy(&energy_args(3, None)).unwrap(), Energy::new(701));
        assert_eq!(energy(&energy_args(1, Some(1))).unwrap(), Energy::new(635));
    }

    #[test]
    fn energy_past_u64_is_reported() {
        let err = energy(&energy_args(u64::MAX, None)).unwrap_err();
        assert_eq!(err.to_string(), "transaction energy overflows u64");
        assert!(energy(&energy_args(1, Some(u64::MAX))).is_err());
    }
}
