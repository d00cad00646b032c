//! # Encrypted Keystore
//!
//! Password-encrypted private key storage in the version-3 secret-storage
//! format, with the two ICX extras: the account `address` in `hx` text
//! form and a `coinType` tag.
//!
//! The construction is the standard one:
//!
//! 1. Stretch the password into a 32-byte key (PBKDF2-HMAC-SHA256 on
//!    write; PBKDF2 or scrypt accepted on read).
//! 2. Encrypt the 32-byte secret with AES-128-CTR keyed by the first half
//!    of the derived key.
//! 3. MAC with Keccak-256 over the second half of the derived key followed
//!    by the ciphertext. A wrong password surfaces as a MAC mismatch, not
//!    as garbage key material.
//!
//! Keystore files are write-once: `save` refuses to overwrite, and the
//! write itself goes through a temporary file in the destination directory
//! so a crash can never leave a half-written keystore behind.

use std::fs;
use std::path::{Path, PathBuf};

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tempfile::NamedTempFile;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{
    COIN_TYPE, DKLEN, IV_LENGTH, KDF_ITERATIONS, KEYSTORE_CIPHER, KEYSTORE_VERSION,
    PRIVATE_KEY_LENGTH, SALT_LENGTH,
};
use crate::crypto::address::Address;
use crate::crypto::hash::keccak256_multi;
use crate::crypto::signer::{IcxSigner, SignerError};
use crate::transaction::validation::validate_password;

pub mod json;
mod kdf;

use json::{CipherParams, CryptoModule, HexBytes, KdfParams, KeystoreJson};
use kdf::derive_key;

use ctr::cipher::{KeyIvInit, StreamCipher};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Everything that can go wrong between a password and a usable key.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// The password fails the strength rule (8+ characters with at least
    /// one letter, one digit, and one special character).
    #[error("password does not meet the strength rule")]
    InvalidPassword,

    /// The MAC did not verify. With a well-formed file this means the
    /// password is wrong.
    #[error("wrong password")]
    WrongPassword,

    /// The file is not a version-3 keystore document.
    #[error("not a keystore file")]
    NotAKeystore,

    /// The document declares a cipher this reader does not implement.
    #[error("unsupported cipher: {0:?}")]
    UnsupportedCipher(String),

    /// The document declares a KDF this reader does not implement, or its
    /// parameters are out of range.
    #[error("unsupported kdf: {0:?}")]
    UnsupportedKdf(String),

    /// The destination already exists. Keystore files are never
    /// overwritten; pick a new path or delete the old file deliberately.
    #[error("keystore file already exists: {0}")]
    FileAlreadyExists(PathBuf),

    /// The destination's parent directory does not exist.
    #[error("keystore path is invalid: {0}")]
    PathInvalid(PathBuf),

    /// The destination directory exists but refuses writes.
    #[error("keystore path is not writable: {0}")]
    PathNotWritable(PathBuf),

    /// The decrypted bytes are not a valid secp256k1 secret key.
    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("keystore i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed, not-yet-decrypted keystore document.
#[derive(Debug, Clone)]
pub struct Keystore {
    document: KeystoreJson,
}

impl Keystore {
    /// Encrypt a signer's secret under `password`.
    ///
    /// Always writes PBKDF2-HMAC-SHA256 at the deployed iteration count;
    /// scrypt appears only on the read side. Salt and IV are fresh random
    /// bytes, and the id is a random UUID, so encrypting the same key
    /// twice yields two different documents that decrypt identically.
    pub fn encrypt(signer: &IcxSigner, password: &str) -> Result<Self, KeystoreError> {
        Self::encrypt_with_iterations(signer, password, KDF_ITERATIONS)
    }

    /// [`encrypt`](Self::encrypt) with an explicit PBKDF2 iteration count.
    /// Lower counts are for tests; interoperable files use the default.
    pub fn encrypt_with_iterations(
        signer: &IcxSigner,
        password: &str,
        iterations: u32,
    ) -> Result<Self, KeystoreError> {
        if !validate_password(password) {
            return Err(KeystoreError::InvalidPassword);
        }

        let mut salt = [0u8; SALT_LENGTH];
        let mut iv = [0u8; IV_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        rand::thread_rng().fill_bytes(&mut iv);

        let mut derived = Zeroizing::new([0u8; DKLEN]);
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut *derived);

        let mut ciphertext = Zeroizing::new(signer.secret_bytes());
        let mut cipher = Aes128Ctr::new_from_slices(&derived[..16], &iv)
            .map_err(|_| KeystoreError::NotAKeystore)?;
        cipher.apply_keystream(&mut *ciphertext);

        let mac = keccak256_multi(&[&derived[16..32], ciphertext.as_slice()]);

        let document = KeystoreJson {
            version: KEYSTORE_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            address: signer.address(),
            crypto: CryptoModule {
                cipher: KEYSTORE_CIPHER.to_string(),
                cipherparams: CipherParams {
                    iv: HexBytes::from(iv.as_slice()),
                },
                ciphertext: HexBytes::from(ciphertext.as_slice()),
                kdf: "pbkdf2".to_string(),
                kdfparams: KdfParams::Pbkdf2 {
                    c: iterations,
                    dklen: DKLEN as u32,
                    prf: "hmac-sha256".to_string(),
                    salt: HexBytes::from(salt.as_slice()),
                },
                mac: HexBytes::from(mac.as_slice()),
            },
            coin_type: Some(COIN_TYPE.to_string()),
        };

        Ok(Keystore { document })
    }

    /// Recover the signer by running the document's KDF and checking the
    /// MAC before touching the ciphertext.
    pub fn decrypt(&self, password: &str) -> Result<IcxSigner, KeystoreError> {
        let crypto = &self.document.crypto;

        if self.document.version != KEYSTORE_VERSION {
            return Err(KeystoreError::NotAKeystore);
        }
        if crypto.cipher != KEYSTORE_CIPHER {
            return Err(KeystoreError::UnsupportedCipher(crypto.cipher.clone()));
        }
        if crypto.kdf != crypto.kdfparams.function_name() {
            return Err(KeystoreError::UnsupportedKdf(crypto.kdf.clone()));
        }
        let iv: &[u8] = crypto.cipherparams.iv.as_slice();
        if iv.len() != IV_LENGTH || crypto.ciphertext.as_slice().len() != PRIVATE_KEY_LENGTH {
            return Err(KeystoreError::NotAKeystore);
        }

        let derived = derive_key(password, &crypto.kdfparams)?;

        let mac = keccak256_multi(&[&derived[16..32], crypto.ciphertext.as_slice()]);
        // Constant-time compare; ct_eq on slices yields false for a length
        // mismatch, so a truncated mac falls into the same arm.
        if !bool::from(mac.as_slice().ct_eq(crypto.mac.as_slice())) {
            return Err(KeystoreError::WrongPassword);
        }

        let mut secret = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
        secret.copy_from_slice(crypto.ciphertext.as_slice());
        let mut cipher = Aes128Ctr::new_from_slices(&derived[..16], iv)
            .map_err(|_| KeystoreError::NotAKeystore)?;
        cipher.apply_keystream(&mut *secret);

        Ok(IcxSigner::from_bytes(&secret)?)
    }

    /// The account address recorded in the document. Available without the
    /// password; trust it for display only, the authoritative address is
    /// the one [`decrypt`](Self::decrypt) derives.
    pub fn address(&self) -> &Address {
        &self.document.address
    }

    /// The document's random UUID.
    pub fn id(&self) -> &str {
        &self.document.id
    }

    /// Parse a document from JSON text. Anything that does not fit the
    /// version-3 schema is [`KeystoreError::NotAKeystore`].
    pub fn from_json_str(text: &str) -> Result<Self, KeystoreError> {
        let document: KeystoreJson =
            serde_json::from_str(text).map_err(|_| KeystoreError::NotAKeystore)?;
        Ok(Keystore { document })
    }

    /// Render the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> String {
        // KeystoreJson has no map keys or non-string-keyed content that
        // could fail serialization.
        serde_json::to_string_pretty(&self.document).unwrap_or_default()
    }

    /// Read and parse a keystore file.
    pub fn load(path: &Path) -> Result<Self, KeystoreError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write the document to `path`, atomically and at most once.
    ///
    /// The bytes land in a temporary file in the destination directory
    /// first and are renamed into place with a no-clobber rename, so the
    /// write-once rule holds even against a concurrent writer.
    pub fn save(&self, path: &Path) -> Result<(), KeystoreError> {
        if path.exists() {
            return Err(KeystoreError::FileAlreadyExists(path.to_path_buf()));
        }
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => return Err(KeystoreError::PathInvalid(path.to_path_buf())),
        };
        if !parent.is_dir() {
            return Err(KeystoreError::PathInvalid(path.to_path_buf()));
        }

        let temp = NamedTempFile::new_in(&parent).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                KeystoreError::PathNotWritable(path.to_path_buf())
            } else {
                KeystoreError::Io(e)
            }
        })?;
        fs::write(temp.path(), self.to_json_string())?;

        temp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                KeystoreError::FileAlreadyExists(path.to_path_buf())
            } else {
                KeystoreError::Io(e.error)
            }
        })?;
        Ok(())
    }
}

/// Check that a JSON value has the keystore key structure, without judging
/// any of the values. Useful for telling "wrong password territory" apart
/// from "this is not even a keystore" before committing to a KDF run.
pub fn validate_structure(value: &serde_json::Value) -> bool {
    let crypto = match value.get("crypto") {
        Some(crypto) => crypto,
        None => return false,
    };
    let top_level = ["version", "id", "address"]
        .iter()
        .all(|key| value.get(key).is_some());
    let crypto_keys = ["ciphertext", "cipherparams", "cipher", "kdf", "kdfparams", "mac"]
        .iter()
        .all(|key| crypto.get(key).is_some());
    let iv = crypto
        .get("cipherparams")
        .and_then(|p| p.get("iv"))
        .is_some();

    let kdfparams = match crypto.get("kdfparams") {
        Some(params) => params,
        None => return false,
    };
    let kdf_keys = match crypto.get("kdf").and_then(serde_json::Value::as_str) {
        Some("pbkdf2") => ["dklen", "salt", "c", "prf"]
            .iter()
            .all(|key| kdfparams.get(key).is_some()),
        Some("scrypt") => ["dklen", "salt", "n", "r", "p"]
            .iter()
            .all(|key| kdfparams.get(key).is_some()),
        _ => false,
    };

    top_level && crypto_keys && iv && kdf_keys
}

#[cfg(test)]
mod tests {
    use super::*;

    // The secret-storage definition's published test vectors, both KDFs.
    // Password "testpassword", secret
    // 7a28b5ba57c53603b0b07b56bba752f7784bf506fa95edc395f5cf6c7514fe9d.
    const VECTOR_PASSWORD: &str = "testpassword";
    const VECTOR_SECRET: &str =
        "7a28b5ba57c53603b0b07b56bba752f7784bf506fa95edc395f5cf6c7514fe9d";

    const PBKDF2_VECTOR: &str = r#"{
        "version": 3,
        "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
        "address": "hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d",
        "crypto": {
            "cipher": "aes-128-ctr",
            "cipherparams": {"iv": "6087dab2f9fdbbfaddc31a909735c1e6"},
            "ciphertext": "5318b4d5bcd28de64ee5559e671353e16f075ecae9f99c7a79a38af5f869aa46",
            "kdf": "pbkdf2",
            "kdfparams": {
                "c": 262144,
                "dklen": 32,
                "prf": "hmac-sha256",
                "salt": "ae3cd4e7013836a3df6bd7241b12db061dbe2c6785853cce422d148a624ce0bd"
            },
            "mac": "517ead924a9d0dc3124507e3393d175ce3ff7c1e96529c6c555ce9e51205e9b2"
        }
    }"#;

    const SCRYPT_VECTOR: &str = r#"{
        "version": 3,
        "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
        "address": "hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d",
        "crypto": {
            "cipher": "aes-128-ctr",
            "cipherparams": {"iv": "83dbcc02d8ccb40e466191a123791e0e"},
            "ciphertext": "d172bf743a674da9cdad04534d56926ef8358534d458fffccd4e6ad2fbde479c",
            "kdf": "scrypt",
            "kdfparams": {
                "dklen": 32,
                "n": 262144,
                "r": 1,
                "p": 8,
                "salt": "ab0c7876052600dd703518d6fc3fe8984592145b591fc8fb5c6d43190334ba19"
            },
            "mac": "2103ac29920d71da29f15d75b4a16dbe95cfd7ff8faea1056c33131d846e3097"
        }
    }"#;

    #[test]
    fn decrypts_the_pbkdf2_reference_vector() {
        let keystore = Keystore::from_json_str(PBKDF2_VECTOR).unwrap();
        let signer = keystore.decrypt(VECTOR_PASSWORD).unwrap();
        assert_eq!(hex::encode(signer.secret_bytes()), VECTOR_SECRET);
    }

    #[test]
    fn decrypts_the_scrypt_reference_vector() {
        let keystore = Keystore::from_json_str(SCRYPT_VECTOR).unwrap();
        let signer = keystore.decrypt(VECTOR_PASSWORD).unwrap();
        assert_eq!(hex::encode(signer.secret_bytes()), VECTOR_SECRET);
    }

    #[test]
    fn wrong_password_is_a_mac_mismatch() {
        let keystore = Keystore::from_json_str(PBKDF2_VECTOR).unwrap();
        assert!(matches!(
            keystore.decrypt("nottestpassword"),
            Err(KeystoreError::WrongPassword)
        ));
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let signer = IcxSigner::generate();
        let keystore = Keystore::encrypt(&signer, "Adas21312**").unwrap();

        assert_eq!(keystore.address(), &signer.address());

        let recovered = keystore.decrypt("Adas21312**").unwrap();
        assert_eq!(recovered.secret_bytes(), signer.secret_bytes());
    }

    #[test]
    fn encrypt_rejects_weak_passwords() {
        let signer = IcxSigner::generate();
        assert!(matches!(
            Keystore::encrypt(&signer, "123 4"),
            Err(KeystoreError::InvalidPassword)
        ));
    }

    #[test]
    fn fresh_documents_differ_but_decrypt_identically() {
        let signer = IcxSigner::generate();
        let a = Keystore::encrypt(&signer, "Adas21312**").unwrap();
        let b = Keystore::encrypt(&signer, "Adas21312**").unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(
            a.decrypt("Adas21312**").unwrap().secret_bytes(),
            b.decrypt("Adas21312**").unwrap().secret_bytes()
        );
    }

    #[test]
    fn written_documents_carry_the_coin_type_tag() {
        let signer = IcxSigner::generate();
        let keystore = Keystore::encrypt(&signer, "Adas21312**").unwrap();
        let rendered = keystore.to_json_string();
        assert!(rendered.contains("\"coinType\": \"icx\""));

        // And survive a parse round trip.
        let reparsed = Keystore::from_json_str(&rendered).unwrap();
        assert_eq!(reparsed.address(), keystore.address());
    }

    #[test]
    fn structure_check_is_presence_only() {
        let document: serde_json::Value = serde_json::from_str(PBKDF2_VECTOR).unwrap();
        assert!(validate_structure(&document));

        let scrypt: serde_json::Value = serde_json::from_str(SCRYPT_VECTOR).unwrap();
        assert!(validate_structure(&scrypt));

        let mut missing_mac = document.clone();
        missing_mac["crypto"].as_object_mut().unwrap().remove("mac");
        assert!(!validate_structure(&missing_mac));

        assert!(!validate_structure(&serde_json::json!({"hello": "world"})));

        // Values are not judged: a nonsense version still passes.
        let mut odd_version = document;
        odd_version["version"] = serde_json::json!("vegetable");
        assert!(validate_structure(&odd_version));
    }

    #[test]
    fn custom_iteration_count_round_trips() {
        let signer = IcxSigner::generate();
        let keystore = Keystore::encrypt_with_iterations(&signer, "Adas21312**", 1024).unwrap();
        let recovered = keystore.decrypt("Adas21312**").unwrap();
        assert_eq!(recovered.secret_bytes(), signer.secret_bytes());
    }

    #[test]
    fn non_keystore_json_is_rejected_as_such() {
        assert!(matches!(
            Keystore::from_json_str(r#"{"hello": "world"}"#),
            Err(KeystoreError::NotAKeystore)
        ));
        assert!(matches!(
            Keystore::from_json_str("definitely not json"),
            Err(KeystoreError::NotAKeystore)
        ));
    }

    #[test]
    fn decrypt_rejects_foreign_ciphers_and_kdfs() {
        let mut document: serde_json::Value = serde_json::from_str(PBKDF2_VECTOR).unwrap();
        document["crypto"]["cipher"] = serde_json::json!("aes-256-gcm");
        let keystore = Keystore::from_json_str(&document.to_string()).unwrap();
        assert!(matches!(
            keystore.decrypt(VECTOR_PASSWORD),
            Err(KeystoreError::UnsupportedCipher(_))
        ));

        let mut document: serde_json::Value = serde_json::from_str(PBKDF2_VECTOR).unwrap();
        document["crypto"]["kdf"] = serde_json::json!("argon2id");
        let keystore = Keystore::from_json_str(&document.to_string()).unwrap();
        assert!(matches!(
            keystore.decrypt(VECTOR_PASSWORD),
            Err(KeystoreError::UnsupportedKdf(_))
        ));
    }
}
