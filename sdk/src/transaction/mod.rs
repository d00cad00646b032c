//! # Transaction Module
//!
//! Everything between "the caller wants to move value" and "here is a
//! signed JSON-RPC `params` object":
//!
//! ```text
//! canonical.rs  — ParamValue/ParamMap and the deterministic phrase
//! validation.rs — local precondition gates (address, amount, fee, balance)
//! builder.rs    — assembles, hashes, and signs the transfer params
//! ```
//!
//! ## The pipeline
//!
//! 1. **Build** — compose the parameter map (`from`, `to`, `value`, `fee`,
//!    `timestamp`).
//! 2. **Canonicalize** — derive the unique phrase; this is where map
//!    ordering nondeterminism dies.
//! 3. **Digest** — SHA3-256 over the phrase's UTF-8 bytes.
//! 4. **Sign** — recoverable secp256k1 over the digest; attach `tx_hash`
//!    and the base64 `signature` to the params.
//!
//! The pipeline is pure and stateless. Every validation failure happens
//! before step 4, and all of them happen before any network call.

pub mod builder;
pub mod canonical;
pub mod validation;

pub use builder::{SignedTransfer, TransferBuilder};
pub use canonical::{params_phrase, tx_hash, tx_phrase, ParamMap, ParamValue};
pub use validation::{
    check_balance, validate_address_text, validate_amount_and_fee, validate_distinct_addresses,
    validate_password, ValidationError,
};
