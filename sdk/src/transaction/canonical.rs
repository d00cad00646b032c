//! # Canonical Transaction Phrases
//!
//! Turns an unordered parameter map into the one byte string every
//! implementation must agree on before hashing. The rules are small but
//! absolute:
//!
//! - Keys sort lexicographically, byte-wise ascending. That single rule is
//!   what removes insertion-order nondeterminism.
//! - A scalar entry contributes `key.value` (integers in decimal, strings
//!   verbatim — amounts arrive pre-formatted as `0x` hex strings).
//! - A nested non-empty map contributes `key.` followed by its own phrase,
//!   computed recursively.
//! - A nested **empty** map contributes just `key`, with no trailing dot.
//!   This quirk is consensus: reproducing it wrong shifts every following
//!   byte and ruins the digest.
//! - Entries are joined with `.`, and the full phrase is
//!   `method.params-phrase` — or exactly `method` when the map is empty.
//!
//! These functions are pure and total: no I/O, no failure path for any
//! well-formed map.

use std::collections::BTreeMap;

use crate::crypto::hash::sha3_256;

/// A parameter map with irrelevant insertion order.
///
/// `BTreeMap` keeps keys in byte-wise lexicographic order, which is exactly
/// the canonical order — so iteration *is* canonicalization and there is no
/// separate sort step to forget.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single parameter value: string, integer, or nested map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// Passed through verbatim. Callers pre-format hex amounts (`0x...`)
    /// and decimal timestamp strings before insertion.
    String(String),
    /// Rendered in decimal.
    Int(i128),
    /// A nested map, canonicalized recursively.
    Map(ParamMap),
}

impl ParamValue {
    /// The canonical text of a scalar value.
    ///
    /// Maps have no scalar text; [`params_phrase`] handles them before this
    /// is consulted.
    fn scalar_text(&self) -> String {
        match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Map(_) => unreachable!("maps are canonicalized structurally"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<i128> for ParamValue {
    fn from(i: i128) -> Self {
        ParamValue::Int(i)
    }
}

impl From<u64> for ParamValue {
    fn from(i: u64) -> Self {
        ParamValue::Int(i128::from(i))
    }
}

impl From<ParamMap> for ParamValue {
    fn from(m: ParamMap) -> Self {
        ParamValue::Map(m)
    }
}

/// Canonicalize `(method, params)` into the unique transaction phrase.
///
/// An empty map yields exactly `method`, with no separator.
pub fn tx_phrase(method: &str, params: &ParamMap) -> String {
    if params.is_empty() {
        return method.to_string();
    }
    format!("{method}.{}", params_phrase(params))
}

/// The params half of the phrase, computed recursively over nested maps.
pub fn params_phrase(params: &ParamMap) -> String {
    params
        .iter()
        .map(|(key, value)| match value {
            ParamValue::Map(nested) if nested.is_empty() => key.clone(),
            ParamValue::Map(nested) => format!("{key}.{}", params_phrase(nested)),
            scalar => format!("{key}.{}", scalar.scalar_text()),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// The transaction digest: SHA3-256 over the phrase's UTF-8 bytes.
pub fn tx_hash(method: &str, params: &ParamMap) -> [u8; 32] {
    sha3_256(tx_phrase(method, params).as_bytes())
}
