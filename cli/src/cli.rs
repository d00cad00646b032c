//! # CLI Interface
//!
//! Defines the command-line argument structure for the `icx` binary using
//! `clap` derive. Five subcommands: `create`, `show`, `balance`,
//! `transfer`, and `block`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use icx_sdk::config::DEFAULT_ENDPOINT;

/// ICX wallet command-line interface.
///
/// Creates and opens password-encrypted keystore files, queries balances
/// and blocks over JSON-RPC, and signs and submits value transfers.
#[derive(Parser, Debug)]
#[command(
    name = "icx",
    about = "ICX wallet command-line interface",
    version,
    propagate_version = true
)]
pub struct IcxCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `icx` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new wallet — generates a key and writes a keystore file.
    Create(CreateArgs),
    /// Show the address recorded in a keystore file. No password needed.
    Show(ShowArgs),
    /// Query the balance of a wallet or an arbitrary address.
    Balance(BalanceArgs),
    /// Sign and submit a value transfer from a keystore wallet.
    Transfer(TransferArgs),
    /// Query blocks: the latest, by hash, or by height.
    Block(BlockArgs),
}

/// Options shared by every subcommand that talks to the network.
#[derive(Args, Debug)]
pub struct EndpointArgs {
    /// API base URL; the version path is appended automatically.
    #[arg(long, env = "ICX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Destination path for the new keystore file. Refuses to overwrite.
    #[arg(long, short = 'k')]
    pub keystore: PathBuf,

    /// Keystore password: 8+ characters with at least one letter, one
    /// digit, and one special character.
    ///
    /// **Prefer the environment variable** — a flag value lands in shell
    /// history.
    #[arg(long, short = 'p', env = "ICX_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the keystore file.
    #[arg(long, short = 'k')]
    pub keystore: PathBuf,
}

/// Arguments for the `balance` subcommand.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Address to query, in `hx` text form.
    pub address: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

/// Arguments for the `transfer` subcommand.
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Path to the sender's keystore file.
    #[arg(long, short = 'k')]
    pub keystore: PathBuf,

    /// Keystore password.
    #[arg(long, short = 'p', env = "ICX_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Destination address, in `hx` text form.
    #[arg(long)]
    pub to: String,

    /// Amount in ICX, as a decimal (e.g. `1.5`). The fixed 0.01 ICX fee
    /// is added on top.
    #[arg(long)]
    pub amount: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

/// Arguments for the `block` subcommand.
#[derive(Args, Debug)]
pub struct BlockArgs {
    /// Block hash in lowercase hex. Mutually exclusive with --height.
    #[arg(long, conflicts_with = "height")]
    pub hash: Option<String>,

    /// Block height. Mutually exclusive with --hash.
    #[arg(long)]
    pub height: Option<u64>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}
