// Copyright (c) 2026 ICX SDK Authors. MIT License.
// See LICENSE for details.

//! # ICX SDK — Core Library
//!
//! A signing and keystore SDK for the ICX ledger. The hard part of this crate
//! is not the networking — it is producing, byte for byte, the same canonical
//! transaction phrase, the same SHA3-256 digest, and the same recoverable
//! secp256k1 signature as every other deployed implementation. If we diverge
//! by a single byte, peers reject the signature and funds do not move.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the signing pipeline:
//!
//! - **crypto** — SHA3/Keccak hashing, secp256k1 recoverable signing, and
//!   `hx` address derivation. The pipeline's pure core.
//! - **transaction** — canonical parameter phrases, local validation rules,
//!   and the signed-transfer params builder.
//! - **keystore** — the password-encrypted on-disk key format (eth_keyfile
//!   v3 layout plus the ICX `address`/`coinType` extras).
//! - **wallet** — lifecycle orchestration: create / open / transfer.
//! - **rpc** — a thin blocking JSON-RPC 2.0 client. No algorithmic risk
//!   lives here; it posts payloads and parses response bodies.
//! - **config** — protocol constants. Every magic number lives there.
//! - **units** — loop ↔ ICX display conversion.
//!
//! ## Design Philosophy
//!
//! 1. The signing path (params → phrase → digest → signature) is a pure,
//!    stateless pipeline. It does no I/O and cannot fail for valid inputs.
//! 2. Private keys are held transiently, zeroed on drop, and never logged.
//! 3. The only stateful artifact is the keystore file: created once, read
//!    many times, never mutated in place.

pub mod config;
pub mod crypto;
pub mod keystore;
pub mod rpc;
pub mod transaction;
pub mod units;
pub mod wallet;

// Re-export the things people actually need so a caller can sign a transfer
// without memorizing the module hierarchy.
pub use crypto::address::Address;
pub use crypto::signer::IcxSigner;
pub use keystore::{Keystore, KeystoreError};
pub use transaction::builder::{SignedTransfer, TransferBuilder};
pub use transaction::canonical::{ParamMap, ParamValue};
pub use wallet::{Wallet, WalletConfig, WalletError, WalletInfo};
