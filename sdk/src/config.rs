//! # Protocol Configuration & Constants
//!
//! Every magic number in the SDK lives here. Most of these are consensus
//! constants: changing them does not break compilation, it breaks signature
//! verification against the deployed network, which is considerably worse.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Two-character tag prefixing every account address in text form.
pub const ADDRESS_PREFIX: &str = "hx";

/// Raw address length in bytes: the low-order 20 bytes of a SHA3-256 digest.
pub const ADDRESS_LENGTH: usize = 20;

/// Text address length: `"hx"` plus 40 lowercase hex characters.
pub const ADDRESS_TEXT_LENGTH: usize = 42;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 private keys are 32-byte scalars, strictly less than the curve
/// order. Anything else is rejected before signing — no clamping, no wrapping.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Uncompressed public key length: one `0x04` prefix byte plus X ‖ Y.
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Recoverable signature length: 32-byte `r` ‖ 32-byte `s` ‖ 1 recovery byte.
pub const SIGNATURE_LENGTH: usize = 65;

/// Transaction digests are SHA3-256 — the standardized SHA3, not Keccak.
/// The keystore MAC is the one place Keccak-256 appears, because the file
/// format is inherited from the Ethereum secret-storage definition.
pub const DIGEST_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Keystore Parameters
// ---------------------------------------------------------------------------

/// Keystore schema version. Version 3 is the only one deployed wallets read.
pub const KEYSTORE_VERSION: u32 = 3;

/// Value of the `coinType` field stamped into every keystore we write.
pub const COIN_TYPE: &str = "icx";

/// Cipher name recorded in the keystore. AES-128-CTR keyed with the first
/// half of the derived key.
pub const KEYSTORE_CIPHER: &str = "aes-128-ctr";

/// Derived key length in bytes. The first 16 key the cipher, the second 16
/// feed the MAC.
pub const DKLEN: usize = 32;

/// Default PBKDF2-HMAC-SHA256 iteration count. 262,144 (2^18) is the value
/// the rest of the ecosystem writes; keystores we produce must open in
/// third-party wallet tooling and vice versa.
pub const KDF_ITERATIONS: u32 = 262_144;

/// Salt length for freshly generated keystores.
pub const SALT_LENGTH: usize = 16;

/// AES-CTR initialization vector length.
pub const IV_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Transfer Policy
// ---------------------------------------------------------------------------

/// The fixed transfer fee in loop (the smallest unit), 10^16. The network
/// rejects any other value, so we reject it locally before signing.
pub const TRANSFER_FEE: u128 = 10_000_000_000_000_000;

/// Decimal places of the ICX unit: 1 ICX = 10^18 loop.
pub const ICX_DECIMALS: u32 = 18;

/// Punctuation characters accepted by the keystore password strength rule.
/// A valid password needs at least one of these, plus a letter and a digit.
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+{}:<>?";

/// Minimum keystore password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

/// Historical default API endpoint. Callers should treat this as a starting
/// point for explicit configuration, not as ambient global state.
pub const DEFAULT_ENDPOINT: &str = "https://testwallet.icon.foundation/api/";

/// API version path segment appended to the endpoint once, at client
/// construction.
pub const API_VERSION_PATH: &str = "v2";

/// HTTP timeout for JSON-RPC calls. No retry or backoff policy lives in
/// this crate; callers that want one wrap the client.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC method names the SDK issues.
pub const METHOD_SEND_TRANSACTION: &str = "icx_sendTransaction";
pub const METHOD_GET_BALANCE: &str = "icx_getBalance";
pub const METHOD_GET_LAST_BLOCK: &str = "icx_getLastBlock";
pub const METHOD_GET_BLOCK_BY_HASH: &str = "icx_getBlockByHash";
pub const METHOD_GET_BLOCK_BY_HEIGHT: &str = "icx_getBlockByHeight";
