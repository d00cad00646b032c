//! # Transfer Builder
//!
//! Assembles the `icx_sendTransaction` parameter map, derives its canonical
//! digest, and attaches the recoverable signature. The builder only shapes
//! data; the policy gates live in [`validation`](super::validation) and are
//! the caller's responsibility to run first.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::config::METHOD_SEND_TRANSACTION;
use crate::crypto::address::Address;
use crate::crypto::signer::IcxSigner;
use crate::transaction::canonical::{tx_hash, ParamMap, ParamValue};

/// Staged parameters for a value transfer.
///
/// `value` and `fee` are in loop. The timestamp defaults to the current
/// wall clock in microseconds; tests pin it with [`timestamp_us`] so the
/// digest is reproducible.
///
/// [`timestamp_us`]: TransferBuilder::timestamp_us
#[derive(Debug, Clone)]
pub struct TransferBuilder {
    from: Address,
    to: Address,
    value: u128,
    fee: u128,
    timestamp_us: Option<i64>,
}

impl TransferBuilder {
    /// Start a transfer of `value` loop from `from` to `to`, paying `fee`.
    pub fn new(from: Address, to: Address, value: u128, fee: u128) -> Self {
        Self {
            from,
            to,
            value,
            fee,
            timestamp_us: None,
        }
    }

    /// Pin the timestamp instead of sampling the clock at build time.
    pub fn timestamp_us(mut self, micros: i64) -> Self {
        self.timestamp_us = Some(micros);
        self
    }

    /// The unsigned parameter map, exactly the five fields the network
    /// hashes: addresses in text form, amounts as `0x` hex, the timestamp
    /// as a decimal string of microseconds.
    pub fn build(&self) -> ParamMap {
        let micros = self
            .timestamp_us
            .unwrap_or_else(|| Utc::now().timestamp_micros());

        let mut params = ParamMap::new();
        params.insert("from".to_string(), ParamValue::from(self.from.to_string()));
        params.insert("to".to_string(), ParamValue::from(self.to.to_string()));
        params.insert(
            "value".to_string(),
            ParamValue::from(format!("{:#x}", self.value)),
        );
        params.insert(
            "fee".to_string(),
            ParamValue::from(format!("{:#x}", self.fee)),
        );
        params.insert(
            "timestamp".to_string(),
            ParamValue::from(micros.to_string()),
        );
        params
    }

    /// Build, digest, and sign in one step.
    ///
    /// The digest covers only the five transfer fields; `tx_hash` and
    /// `signature` are attached afterwards and are not part of the phrase.
    pub fn sign(&self, signer: &IcxSigner) -> SignedTransfer {
        let mut params = self.build();
        let digest = tx_hash(METHOD_SEND_TRANSACTION, &params);

        params.insert(
            "tx_hash".to_string(),
            ParamValue::from(hex::encode(digest)),
        );
        params.insert(
            "signature".to_string(),
            ParamValue::from(signer.sign_base64(&digest)),
        );

        SignedTransfer {
            params,
            tx_hash: digest,
        }
    }
}

/// A transfer ready for submission: the full parameter map including
/// `tx_hash` and `signature`, plus the digest for receipt tracking.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    /// The complete `icx_sendTransaction` params.
    pub params: ParamMap,
    /// The SHA3-256 digest the signature covers.
    pub tx_hash: [u8; 32],
}

impl SignedTransfer {
    /// The digest in lowercase hex, as recorded in the `tx_hash` field.
    pub fn tx_hash_hex(&self) -> String {
        hex::encode(self.tx_hash)
    }

    /// The params as a JSON object for the RPC request body.
    pub fn to_json(&self) -> Value {
        params_to_json(&self.params)
    }
}

/// Render a parameter map as JSON. Strings stay strings, integers become
/// JSON numbers when they fit `i64` and decimal strings otherwise, maps
/// recurse.
pub fn params_to_json(params: &ParamMap) -> Value {
    let mut object = Map::new();
    for (key, value) in params {
        let rendered = match value {
            ParamValue::String(s) => json!(s),
            ParamValue::Int(i) => match i64::try_from(*i) {
                Ok(n) => json!(n),
                Err(_) => json!(i.to_string()),
            },
            ParamValue::Map(nested) => params_to_json(nested),
        };
        object.insert(key.clone(), rendered);
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::canonical::tx_phrase;
    use std::str::FromStr;

    const FROM: &str = "hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d";
    const TO: &str = "hx68bc6f60ea01bc033504a217631c601386be26b7";

    fn builder() -> TransferBuilder {
        TransferBuilder::new(
            Address::from_str(FROM).unwrap(),
            Address::from_str(TO).unwrap(),
            2_000_000_000_000_000_000,
            10_000_000_000_000_000,
        )
        .timestamp_us(1_519_709_385_120_909)
    }

    #[test]
    fn build_produces_the_five_transfer_fields() {
        let params = builder().build();
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["fee", "from", "timestamp", "to", "value"]);
        assert_eq!(
            params.get("value"),
            Some(&ParamValue::from("0x1bc16d674ec80000"))
        );
        assert_eq!(
            params.get("fee"),
            Some(&ParamValue::from("0x2386f26fc10000"))
        );
        assert_eq!(
            params.get("timestamp"),
            Some(&ParamValue::from("1519709385120909"))
        );
    }

    #[test]
    fn phrase_covers_only_unsigned_fields() {
        let unsigned = builder().build();
        let expected = tx_phrase(METHOD_SEND_TRANSACTION, &unsigned);

        let signer = IcxSigner::generate();
        let signed = builder().sign(&signer);

        let mut stripped = signed.params.clone();
        stripped.remove("tx_hash");
        stripped.remove("signature");
        assert_eq!(tx_phrase(METHOD_SEND_TRANSACTION, &stripped), expected);
    }

    #[test]
    fn signed_transfer_carries_hash_and_signature() {
        let signer = IcxSigner::generate();
        let signed = builder().sign(&signer);

        assert_eq!(
            signed.params.get("tx_hash"),
            Some(&ParamValue::from(signed.tx_hash_hex()))
        );
        assert!(matches!(
            signed.params.get("signature"),
            Some(ParamValue::String(_))
        ));
    }

    #[test]
    fn pinned_timestamp_makes_the_digest_deterministic() {
        let signer = IcxSigner::generate();
        let a = builder().sign(&signer);
        let b = builder().sign(&signer);
        assert_eq!(a.tx_hash, b.tx_hash);
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn json_rendering_keeps_strings_and_recurses() {
        let signer = IcxSigner::generate();
        let json = builder().sign(&signer).to_json();
        assert_eq!(json["from"], FROM);
        assert_eq!(json["value"], "0x1bc16d674ec80000");
        assert!(json["signature"].is_string());
    }
}
