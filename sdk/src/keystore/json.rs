//! # Keystore JSON Schema
//!
//! The serde shape of a version-3 secret-storage file, and nothing else:
//! no key derivation, no cipher, no MAC checks. Keeping the schema inert
//! means a malformed file fails in deserialization with a field-level
//! error, and the crypto code only ever sees well-formed structures.
//!
//! The format is the Ethereum secret-storage definition with two
//! additions: the `address` field carries an `hx` account address, and a
//! `coinType` field tags the file as ours. Files written by other wallet
//! tooling omit `coinType`; we still open them.

use serde::{Deserialize, Serialize};

use crate::crypto::address::Address;

/// Raw bytes stored as lowercase hex in the JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        HexBytes(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        HexBytes(bytes.to_vec())
    }
}

impl Serialize for HexBytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        // Some writers prefix hex fields with 0x; tolerate both.
        let stripped = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(stripped)
            .map(HexBytes)
            .map_err(serde::de::Error::custom)
    }
}

/// A complete keystore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreJson {
    pub version: u32,
    pub id: String,
    pub address: Address,
    pub crypto: CryptoModule,
    /// `"icx"` on files we write; absent on files other tooling wrote.
    #[serde(rename = "coinType", skip_serializing_if = "Option::is_none")]
    pub coin_type: Option<String>,
}

/// The `crypto` object: cipher, KDF, and integrity MAC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoModule {
    pub cipher: String,
    pub cipherparams: CipherParams,
    pub ciphertext: HexBytes,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: HexBytes,
}

/// Cipher parameters. AES-128-CTR needs only the initialization vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: HexBytes,
}

/// KDF parameters, discriminated structurally: the two variants share no
/// complete field set, so untagged deserialization is unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    Scrypt {
        dklen: u32,
        n: u32,
        r: u32,
        p: u32,
        salt: HexBytes,
    },
    Pbkdf2 {
        c: u32,
        dklen: u32,
        prf: String,
        salt: HexBytes,
    },
}

impl KdfParams {
    /// The `kdf` field value this variant corresponds to.
    pub fn function_name(&self) -> &'static str {
        match self {
            KdfParams::Scrypt { .. } => "scrypt",
            KdfParams::Pbkdf2 { .. } => "pbkdf2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes_round_trip_and_0x_tolerance() {
        let bytes = HexBytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let text = serde_json::to_string(&bytes).unwrap();
        assert_eq!(text, "\"deadbeef\"");

        let plain: HexBytes = serde_json::from_str("\"deadbeef\"").unwrap();
        let prefixed: HexBytes = serde_json::from_str("\"0xdeadbeef\"").unwrap();
        assert_eq!(plain, bytes);
        assert_eq!(prefixed, bytes);

        assert!(serde_json::from_str::<HexBytes>("\"not hex\"").is_err());
    }

    #[test]
    fn kdf_params_discriminate_structurally() {
        let pbkdf2 = r#"{"c":262144,"dklen":32,"prf":"hmac-sha256","salt":"00"}"#;
        let scrypt = r#"{"dklen":32,"n":262144,"r":1,"p":8,"salt":"00"}"#;

        let parsed: KdfParams = serde_json::from_str(pbkdf2).unwrap();
        assert_eq!(parsed.function_name(), "pbkdf2");

        let parsed: KdfParams = serde_json::from_str(scrypt).unwrap();
        assert_eq!(parsed.function_name(), "scrypt");
    }

    #[test]
    fn coin_type_is_optional_on_read_and_omitted_when_absent() {
        let document = r#"{
            "version": 3,
            "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
            "address": "hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d",
            "crypto": {
                "cipher": "aes-128-ctr",
                "cipherparams": {"iv": "6087dab2f9fdbbfaddc31a909735c1e6"},
                "ciphertext": "5318b4d5bcd28de64ee5559e671353e16f075ecae9f99c7a79a38af5f869aa46",
                "kdf": "pbkdf2",
                "kdfparams": {"c": 262144, "dklen": 32, "prf": "hmac-sha256",
                              "salt": "ae3cd4e7013836a3df6bd7241b12db061dbe2c6785853cce422d148a624ce0bd"},
                "mac": "517ead924a9d0dc3124507e3393d175ce3ff7c1e96529c6c555ce9e51205e9b2"
            }
        }"#;

        let parsed: KeystoreJson = serde_json::from_str(document).unwrap();
        assert_eq!(parsed.coin_type, None);

        let rendered = serde_json::to_string(&parsed).unwrap();
        assert!(!rendered.contains("coinType"));
    }
}
