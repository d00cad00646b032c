//! # Account Addresses
//!
//! An [`Address`] is the low-order 20 bytes of the SHA3-256 digest of an
//! uncompressed public key with its `0x04` prefix stripped. In text it is
//! the two-character `hx` tag followed by 40 lowercase hex characters —
//! 42 characters total, always.
//!
//! Losing an address is inconvenient but not catastrophic: it re-derives
//! from the public key, which re-derives from the private key. The
//! derivation is stable by construction; there is no network or version
//! input to it.

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::sha3_256;
use crate::config::{ADDRESS_LENGTH, ADDRESS_PREFIX, ADDRESS_TEXT_LENGTH};

/// Errors from address parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The text form is not `hx` + 40 lowercase hex characters.
    #[error("invalid address: expected \"hx\" followed by 40 lowercase hex characters")]
    InvalidFormat,
}

/// A 20-byte account address.
///
/// Rendered as `"hx" + lowercase_hex` via `Display`; parsed and validated
/// via `FromStr`. Serde goes through the text form so addresses appear in
/// JSON payloads exactly as the wire format defines them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Derive the address of a public key.
    ///
    /// The `0x04` prefix byte is stripped, the remaining 64 bytes of X ‖ Y
    /// are hashed with SHA3-256, and the low-order 20 bytes of the digest
    /// become the address.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let digest = sha3_256(&uncompressed[1..]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[32 - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Construct from raw address bytes. No validation possible or needed;
    /// every 20-byte value is a well-formed address.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse and validate the text form: exactly 42 characters, the `hx`
    /// tag, then 40 lowercase hex characters. Uppercase hex is rejected —
    /// the wire format is lowercase and we do not normalize on behalf of
    /// callers who may have corrupted an address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_TEXT_LENGTH || !s.starts_with(ADDRESS_PREFIX) {
            return Err(AddressError::InvalidFormat);
        }
        let body = &s[ADDRESS_PREFIX.len()..];
        if !body
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(AddressError::InvalidFormat);
        }
        let decoded = hex::decode(body).map_err(|_| AddressError::InvalidFormat)?;
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}
