//! # Hashing Utilities
//!
//! The two fixed-output hash functions the SDK needs, and no more:
//!
//! - **SHA3-256** — digests the canonical transaction phrase and derives
//!   account addresses. This is FIPS-202 SHA3, with the `0x06` domain
//!   padding. Using Keccak here produces valid-looking 32-byte values that
//!   no deployed verifier will ever accept, which is the worst kind of bug.
//!
//! - **Keccak-256** — the pre-standardization variant, used exclusively for
//!   the keystore MAC because the on-disk format inherits Ethereum's
//!   secret-storage definition and must round-trip with its tooling.
//!
//! Inputs are single transactions or a derived-key half plus a 32-byte
//! ciphertext, so there is no streaming API — one shot in, 32 bytes out.

use sha3::{Digest, Keccak256, Sha3_256};

/// Compute the SHA3-256 hash of the input data.
///
/// Returns the digest as a fixed-size 32-byte array. Pure function:
/// identical input yields identical output across calls and processes.
///
/// # Example
///
/// ```
/// use icx_sdk::crypto::sha3_256;
///
/// let digest = sha3_256(b"method.param1.1");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Sha3_256::digest(data));
    output
}

/// Compute the Keccak-256 hash of the input data.
///
/// Only the keystore codec should call this. If you are hashing a
/// transaction phrase or a public key, you want [`sha3_256`].
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Keccak256::digest(data));
    output
}

/// Keccak-256 over multiple byte slices fed sequentially into the hasher.
///
/// Equivalent to hashing the concatenation, without the temporary buffer.
/// Used for the keystore MAC: `keccak256(dk[16..32] ‖ ciphertext)`.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}
