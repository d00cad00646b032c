//! # Recoverable secp256k1 Signing
//!
//! [`IcxSigner`] wraps a secp256k1 private scalar and produces the 65-byte
//! recoverable signatures the ledger verifies: 64 compact bytes of `r ‖ s`
//! plus the recovery id as a single trailing byte. The recovery id lets a
//! verifier reconstruct the signer's public key from the signature and
//! digest alone — no key lookup needed.
//!
//! ## Determinism
//!
//! Nonces are RFC 6979 deterministic (libsecp256k1's default), so signing
//! the same digest with the same key twice yields byte-identical output.
//! That property is load-bearing: the reference test vectors pin exact
//! signature bytes, and a randomized nonce would be an interop bug, not a
//! hardening measure.
//!
//! ## Security considerations
//!
//! - The caller has already hashed; the digest is signed directly and is
//!   NOT re-hashed by the signing primitive.
//! - Malformed scalars (wrong length, zero, ≥ curve order) are rejected
//!   with [`SignerError::MalformedKey`] before any signing happens.
//! - Key bytes are erased on drop and never appear in `Debug` output.
//!   If you add logging to this module, log the address.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use std::fmt;
use thiserror::Error;

use super::address::Address;
use crate::config::{PRIVATE_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors from key handling.
///
/// Deliberately terse: error messages about key material should not narrate
/// which structural check failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The private key is not a valid 32-byte scalar below the curve order.
    #[error("malformed private key: not a valid 32-byte secp256k1 scalar")]
    MalformedKey,

    /// A 65-byte signature could not be parsed for recovery.
    #[error("malformed signature: not a 65-byte recoverable signature")]
    MalformedSignature,
}

/// A signing identity: one secp256k1 private scalar.
///
/// This is the only type in the crate that holds unencrypted key material.
/// It exists transiently — decrypted from a keystore for the duration of a
/// signing call, or generated fresh for a new wallet — and erases its scalar
/// when dropped.
///
/// # Examples
///
/// ```
/// use icx_sdk::crypto::signer::IcxSigner;
/// use icx_sdk::crypto::sha3_256;
///
/// let signer = IcxSigner::generate();
/// let digest = sha3_256(b"icx_sendTransaction.from.hx...");
/// let signature = signer.sign_recoverable(&digest);
/// assert_eq!(signature.len(), 65);
/// ```
pub struct IcxSigner {
    secret_key: SecretKey,
}

impl IcxSigner {
    /// Generate a fresh signer from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            secret_key: SecretKey::new(&mut OsRng),
        }
    }

    /// Construct a signer from raw 32-byte private key material.
    ///
    /// Rejects scalars that are zero or not below the curve order. There is
    /// no clamping and no wrapping — an out-of-range key is an error, not a
    /// different key.
    pub fn from_bytes(private_key: &[u8; PRIVATE_KEY_LENGTH]) -> Result<Self, SignerError> {
        let secret_key =
            SecretKey::from_slice(private_key).map_err(|_| SignerError::MalformedKey)?;
        Ok(Self { secret_key })
    }

    /// Construct a signer from a hex-encoded private key.
    ///
    /// The input must decode to exactly 32 bytes; no leading or trailing
    /// byte is ever discarded.
    pub fn from_hex(hex_key: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(hex_key).map_err(|_| SignerError::MalformedKey)?;
        let array: [u8; PRIVATE_KEY_LENGTH] =
            bytes.try_into().map_err(|_| SignerError::MalformedKey)?;
        Self::from_bytes(&array)
    }

    /// Export the raw 32-byte private scalar.
    ///
    /// **Handle with extreme care.** The only legitimate consumers are the
    /// keystore codec (which encrypts it immediately) and tests.
    pub fn secret_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.secret_key.secret_bytes()
    }

    /// The uncompressed public key: `0x04` ‖ X ‖ Y, 65 bytes.
    pub fn public_key_bytes(&self) -> [u8; 65] {
        PublicKey::from_secret_key(SECP256K1, &self.secret_key).serialize_uncompressed()
    }

    /// The account address derived from this signer's public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&PublicKey::from_secret_key(SECP256K1, &self.secret_key))
    }

    /// Sign a 32-byte digest, returning `r ‖ s ‖ recovery_id` (65 bytes).
    ///
    /// The digest is used directly as the message representative. Nonces
    /// are RFC 6979 deterministic, so this function is a pure mapping from
    /// `(key, digest)` to signature bytes.
    pub fn sign_recoverable(&self, digest: &[u8; 32]) -> [u8; SIGNATURE_LENGTH] {
        let message = Message::from_digest(*digest);
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.secret_key);
        serialize_recoverable(&signature)
    }

    /// Sign a 32-byte digest and return the wire-ready base64 string form.
    pub fn sign_base64(&self, digest: &[u8; 32]) -> String {
        BASE64.encode(self.sign_recoverable(digest))
    }
}

/// Recover the uncompressed public key from a 65-byte recoverable signature
/// and the digest it signed.
///
/// This is what verifiers do on the other side of the wire; it exists here
/// so signatures can be checked end to end without knowing the key.
pub fn recover_public_key(
    digest: &[u8; 32],
    signature: &[u8; SIGNATURE_LENGTH],
) -> Result<[u8; 65], SignerError> {
    let recovery_id = RecoveryId::from_i32(i32::from(signature[64]))
        .map_err(|_| SignerError::MalformedSignature)?;
    let compact: &[u8] = &signature[..64];
    let recoverable = RecoverableSignature::from_compact(compact, recovery_id)
        .map_err(|_| SignerError::MalformedSignature)?;
    let message = Message::from_digest(*digest);
    let public_key = SECP256K1
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| SignerError::MalformedSignature)?;
    Ok(public_key.serialize_uncompressed())
}

fn serialize_recoverable(signature: &RecoverableSignature) -> [u8; SIGNATURE_LENGTH] {
    let (recovery_id, compact) = signature.serialize_compact();
    let mut out = [0u8; SIGNATURE_LENGTH];
    out[..64].copy_from_slice(&compact);
    // libsecp256k1 recovery ids are 0..=3; without pathological X overflow
    // only 0 and 1 occur, and deployed verifiers expect exactly that byte.
    out[64] = recovery_id.to_i32() as u8;
    out
}

impl Clone for IcxSigner {
    /// Cloning a signer is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to erase.
    fn clone(&self) -> Self {
        Self {
            secret_key: self.secret_key,
        }
    }
}

impl Drop for IcxSigner {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

impl fmt::Debug for IcxSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print scalar material, not even partially.
        write!(f, "IcxSigner(address={})", self.address())
    }
}
