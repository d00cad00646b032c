//! # Wallet Lifecycle
//!
//! The orchestration layer that ties keys, keystores, validation, and the
//! RPC client together into the three things a caller actually does:
//! create a wallet, open a wallet, move value. All policy gates run here,
//! in a fixed order, before anything irreversible happens — the last local
//! check always precedes the first network write.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::config::{DEFAULT_ENDPOINT, TRANSFER_FEE};
use crate::crypto::address::Address;
use crate::crypto::signer::{IcxSigner, SignerError};
use crate::keystore::{Keystore, KeystoreError};
use crate::rpc::{RpcClient, RpcError};
use crate::transaction::builder::{SignedTransfer, TransferBuilder};
use crate::transaction::validation::{
    check_balance, validate_address_text, validate_amount_and_fee, validate_distinct_addresses,
    ValidationError,
};

/// Wallet construction settings. Only the endpoint for now; explicit
/// rather than ambient so two wallets can talk to two networks.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// API base URL; the version path is appended by the client.
    pub endpoint: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Anything a wallet operation can fail with, local or remote.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// An address-plus-balance snapshot of a wallet.
#[derive(Debug, Clone)]
pub struct WalletInfo {
    pub address: Address,
    /// Balance in loop at the time of the query.
    pub balance: u128,
    /// The keystore document id, when the wallet was opened from a file.
    pub keystore_id: Option<String>,
}

/// An unlocked wallet: a signer plus a client.
///
/// Holding a `Wallet` means holding the private key. Drop it when done;
/// the key zeroes itself on the way out.
#[derive(Debug)]
pub struct Wallet {
    signer: IcxSigner,
    client: RpcClient,
    keystore: Option<Keystore>,
}

impl Wallet {
    /// Generate a fresh key, encrypt it under `password`, and write the
    /// keystore to `path`. The file write is atomic and refuses to
    /// overwrite; if it fails, no wallet exists anywhere.
    pub fn create(
        password: &str,
        path: &Path,
        config: &WalletConfig,
    ) -> Result<Self, WalletError> {
        let signer = IcxSigner::generate();
        let keystore = Keystore::encrypt(&signer, password)?;
        keystore.save(path)?;
        info!(address = %signer.address(), path = %path.display(), "wallet created");
        Self::from_signer(signer, Some(keystore), config)
    }

    /// Open an existing keystore file and unlock it with `password`.
    pub fn open(path: &Path, password: &str, config: &WalletConfig) -> Result<Self, WalletError> {
        let keystore = Keystore::load(path)?;
        let signer = keystore.decrypt(password)?;
        info!(address = %signer.address(), path = %path.display(), "wallet opened");
        Self::from_signer(signer, Some(keystore), config)
    }

    /// Build a wallet directly from a hex private key. No keystore file
    /// is involved; nothing touches disk.
    pub fn from_private_key(hex_key: &str, config: &WalletConfig) -> Result<Self, WalletError> {
        let signer = IcxSigner::from_hex(hex_key)?;
        Self::from_signer(signer, None, config)
    }

    fn from_signer(
        signer: IcxSigner,
        keystore: Option<Keystore>,
        config: &WalletConfig,
    ) -> Result<Self, WalletError> {
        let client = RpcClient::new(&config.endpoint)?;
        Ok(Wallet {
            signer,
            client,
            keystore,
        })
    }

    /// The wallet's account address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Current balance in loop, straight from the network.
    pub fn balance(&self) -> Result<u128, WalletError> {
        Ok(self.client.get_balance(&self.address())?)
    }

    /// The underlying RPC client, for block queries and anything else
    /// that does not need the key.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// A combined snapshot: address, live balance, and the keystore id if
    /// the wallet came from a keystore file.
    pub fn info(&self) -> Result<WalletInfo, WalletError> {
        Ok(WalletInfo {
            address: self.address(),
            balance: self.balance()?,
            keystore_id: self.keystore.as_ref().map(|k| k.id().to_string()),
        })
    }

    /// Transfer `amount` loop to `to`, paying the fixed fee.
    ///
    /// Gates run in a fixed order: destination address format, distinct
    /// addresses, amount/fee policy, then a balance fetch and coverage
    /// check. Only after all of them pass is the transfer signed and
    /// submitted. Returns the signed transfer; its `tx_hash` is the
    /// receipt handle.
    pub fn transfer(&self, to: &str, amount: u128) -> Result<SignedTransfer, WalletError> {
        let from = self.address();
        let to = validate_address_text(to)?;
        validate_distinct_addresses(&from, &to)?;
        validate_amount_and_fee(amount, TRANSFER_FEE)?;

        let balance = self.client.get_balance(&from)?;
        check_balance(balance, amount, TRANSFER_FEE)?;

        let signed = TransferBuilder::new(from, to, amount, TRANSFER_FEE).sign(&self.signer);
        let response = self.client.send_transaction(&signed)?;
        info!(
            tx_hash = %signed.tx_hash_hex(),
            amount,
            response = %response,
            "transfer submitted"
        );
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_the_default_endpoint() {
        assert_eq!(WalletConfig::default().endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn from_private_key_derives_the_reference_address() {
        let wallet = Wallet::from_private_key(
            "71fc378d3a3fb92b57474af156f376711a8a89d277c9b60a923a1db75575b1cc",
            &WalletConfig::default(),
        )
        .unwrap();
        assert_eq!(
            wallet.address().to_string(),
            "hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d"
        );
    }

    #[test]
    fn transfer_rejects_bad_destinations_before_any_network_call() {
        let wallet = Wallet::from_private_key(
            "71fc378d3a3fb92b57474af156f376711a8a89d277c9b60a923a1db75575b1cc",
            &WalletConfig::default(),
        )
        .unwrap();

        assert!(matches!(
            wallet.transfer("hx0nothex", TRANSFER_FEE * 2),
            Err(WalletError::Validation(ValidationError::InvalidAddress(_)))
        ));
        assert!(matches!(
            wallet.transfer(&wallet.address().to_string(), TRANSFER_FEE * 2),
            Err(WalletError::Validation(ValidationError::SameAddress))
        ));
        assert!(matches!(
            wallet.transfer("hx68bc6f60ea01bc033504a217631c601386be26b7", 0),
            Err(WalletError::Validation(ValidationError::InvalidAmount))
        ));
    }
}
