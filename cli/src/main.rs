// Copyright (c) 2026 ICX SDK Authors. MIT License.
// See LICENSE for details.

//! # ICX Wallet CLI
//!
//! Entry point for the `icx` binary. Parses CLI arguments, initializes
//! logging, and drives the SDK's wallet lifecycle.
//!
//! The binary supports five subcommands:
//!
//! - `create`   — generate a key and write a password-encrypted keystore
//! - `show`     — print the address recorded in a keystore file
//! - `balance`  — query the balance of an address
//! - `transfer` — sign and submit a value transfer
//! - `block`    — fetch the latest block, or one by hash or height

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use icx_sdk::config::TRANSFER_FEE;
use icx_sdk::keystore::Keystore;
use icx_sdk::rpc::RpcClient;
use icx_sdk::units::{format_icx, parse_icx};
use icx_sdk::wallet::{Wallet, WalletConfig};

use cli::{Commands, IcxCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = IcxCli::parse();

    let format = std::env::var("ICX_LOG_FORMAT")
        .map(|v| LogFormat::from_str_lossy(&v))
        .unwrap_or(LogFormat::Pretty);
    logging::init_logging("icx_cli=info,icx_sdk=info", format);

    match cli.command {
        Commands::Create(args) => create_wallet(args),
        Commands::Show(args) => show_keystore(args),
        Commands::Balance(args) => query_balance(args),
        Commands::Transfer(args) => submit_transfer(args),
        Commands::Block(args) => query_block(args),
    }
}

/// Generates a fresh key and writes the keystore file.
fn create_wallet(args: cli::CreateArgs) -> Result<()> {
    let config = WalletConfig {
        endpoint: args.endpoint.endpoint,
    };
    let wallet = Wallet::create(&args.password, &args.keystore, &config)
        .with_context(|| format!("failed to create wallet at {}", args.keystore.display()))?;

    println!("Wallet created.");
    println!("  Keystore : {}", args.keystore.display());
    println!("  Address  : {}", wallet.address());
    Ok(())
}

/// Prints the address recorded in a keystore file, without decrypting it.
fn show_keystore(args: cli::ShowArgs) -> Result<()> {
    let keystore = Keystore::load(&args.keystore)
        .with_context(|| format!("failed to read keystore {}", args.keystore.display()))?;

    println!("  Keystore : {}", args.keystore.display());
    println!("  Address  : {}", keystore.address());
    println!("  Id       : {}", keystore.id());
    Ok(())
}

/// Queries and prints the balance of an arbitrary address.
fn query_balance(args: cli::BalanceArgs) -> Result<()> {
    let address = args
        .address
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid address: {}", args.address))?;

    let client = RpcClient::new(&args.endpoint.endpoint)?;
    let balance = client
        .get_balance(&address)
        .context("balance query failed")?;

    println!("{} ICX ({} loop)", format_icx(balance), balance);
    Ok(())
}

/// Signs and submits a transfer from a keystore wallet.
fn submit_transfer(args: cli::TransferArgs) -> Result<()> {
    let amount = parse_icx(&args.amount)
        .ok_or_else(|| anyhow::anyhow!("invalid ICX amount: {}", args.amount))?;

    let config = WalletConfig {
        endpoint: args.endpoint.endpoint,
    };
    let wallet = Wallet::open(&args.keystore, &args.password, &config)
        .with_context(|| format!("failed to open keystore {}", args.keystore.display()))?;

    let signed = wallet
        .transfer(&args.to, amount)
        .context("transfer failed")?;

    println!("Transfer submitted.");
    println!("  From    : {}", wallet.address());
    println!("  To      : {}", args.to);
    println!("  Amount  : {} ICX", format_icx(amount));
    println!("  Fee     : {} ICX", format_icx(TRANSFER_FEE));
    println!("  Tx hash : {}", signed.tx_hash_hex());
    Ok(())
}

/// Fetches a block and prints it as pretty JSON on stdout.
fn query_block(args: cli::BlockArgs) -> Result<()> {
    let client = RpcClient::new(&args.endpoint.endpoint)?;

    let block = match (&args.hash, args.height) {
        (Some(hash), _) => client.get_block_by_hash(hash),
        (None, Some(height)) => client.get_block_by_height(height),
        (None, None) => client.get_last_block(),
    }
    .context("block query failed")?;

    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}
