//! # CLI Interface
//!
//! Command-line argument structure for `ccd-tx`, built with `clap` derive.
//! Four subcommands: `decode`, `hash`, `energy` and `version`.

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

/// Inspect Concordium account transactions.
///
/// Reads block items as hex, decodes them and computes their hashes, and
/// prices payloads in energy before they are built.
#[derive(Parser, Debug)]
#[command(
    name = "ccd-tx",
    about = "Decode, hash and price account transactions",
    version,
    propagate_version = true
)]
pub struct CcdTxCli {
    /// Log output format on stderr.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "CCD_TX_LOG_FORMAT",
        default_value = "pretty"
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a block item and print the transaction as JSON with its hash.
    Decode(BlockItemArgs),
    /// Print the transaction hash of a block item.
    Hash(BlockItemArgs),
    /// Print the energy a payload costs.
    Energy(EnergyArgs),
    /// Print version information and exit.
    Version,
}

/// A block item given on the command line.
#[derive(Parser, Debug)]
pub struct BlockItemArgs {
    /// Hex-encoded block item, `0x` prefix optional.
    pub hex: String,
}

/// Arguments for the `energy` subcommand.
#[derive(Parser, Debug)]
pub struct EnergyArgs {
    /// Payload as JSON, e.g. `{"type":"transfer","toAddress":"...","amount":"1000000"}`.
    #[arg(long)]
    pub payload: String,

    /// Sender signatures the transaction will carry.
    #[arg(long, default_value_t = 1)]
    pub signatures: u64,

    /// Sponsor signatures. Prices a sponsored transaction when present.
    #[arg(long)]
    pub sponsor_signatures: Option<u64>,

    /// Energy budget for contract init and update payloads.
    #[arg(long, default_value_t = 0)]
    pub max_contract_energy: u64,

    /// Credentials already on the sending account, for credential updates.
    #[arg(long, default_value_t = 0)]
    pub current_credentials: u64,
}
