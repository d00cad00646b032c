//! # Cryptographic Primitives
//!
//! The pure core of the signing pipeline: hashing, recoverable signing, and
//! address derivation. Everything here is a thin, type-safe wrapper around
//! audited implementations — `sha3` for the digests and libsecp256k1 (via
//! the `secp256k1` crate) for the curve arithmetic.
//!
//! Two hash functions, deliberately:
//!
//! - **SHA3-256** (the standardized SHA3) for transaction digests and
//!   address derivation. Not Keccak — the padding differs, and the wrong
//!   choice produces digests no peer will verify.
//! - **Keccak-256** only for the keystore MAC, because that file format is
//!   inherited from Ethereum's secret-storage definition.
//!
//! All functions in this module are stateless and safe to call concurrently
//! from multiple threads.

pub mod address;
pub mod hash;
pub mod signer;

pub use address::Address;
pub use hash::{keccak256, sha3_256};
pub use signer::{IcxSigner, SignerError};
