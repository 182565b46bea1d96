//! Secure wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are derived from the caller's mnemonic for one execution call
//! - Keys are never serialized to JSON
//! - Keys are never logged

use super::keys::{self, Account, DerivedKey};
use crate::{Error, Result};
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::tx::{Raw, SignDoc};
use secrecy::{ExposeSecret, SecretString};

/// Secure wallet that protects private keys
///
/// The private key is:
/// - Held in cosmrs' `SigningKey` (zeroized on drop)
/// - Never serialized (no Serialize impl)
/// - Only accessible via signing operations
pub struct SecureWallet {
    /// The signer
    signing_key: SigningKey,
    /// Public account (safe to expose)
    account: Account,
}

impl SecureWallet {
    /// Derive a wallet from a mnemonic
    ///
    /// # Arguments
    /// * `mnemonic` - BIP-39 phrase; validated for word count and checksum
    /// * `prefix` - bech32 account prefix (`osmo`)
    /// * `account_index` - HD account index
    pub fn from_mnemonic(mnemonic: &SecretString, prefix: &str, account_index: u32) -> Result<Self> {
        let DerivedKey {
            signing_key,
            public_key,
        } = keys::derive_key(mnemonic.expose_secret(), account_index)?;
        let address = keys::address_from_public_key(&public_key, prefix)?;
        let signing_key = SigningKey::from_slice(signing_key.to_bytes().as_slice())
            .map_err(|e| Error::DerivationFailed(e.to_string()))?;

        Ok(Self {
            signing_key,
            account: Account {
                address,
                public_key,
            },
        })
    }

    /// Get the bech32 address (safe to share)
    pub fn address(&self) -> &str {
        &self.account.address
    }

    /// Compressed secp256k1 public key
    pub fn public_key(&self) -> &[u8] {
        &self.account.public_key
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Public key in the form `SignerInfo` carries
    pub fn cosmos_public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }

    /// Sign a SIGN_MODE_DIRECT document.
    ///
    /// This is the ONLY way to use the private key.
    pub fn sign(&self, sign_doc: SignDoc) -> Result<Raw> {
        sign_doc
            .sign(&self.signing_key)
            .map_err(|e| Error::Transaction(format!("Signing failed: {}", e)))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.account.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn wallet() -> SecureWallet {
        SecureWallet::from_mnemonic(&SecretString::from(TEST_MNEMONIC.to_string()), "osmo", 0)
            .unwrap()
    }

    #[test]
    fn test_wallet_matches_derived_account() {
        let wallet = wallet();
        let account = keys::derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        assert_eq!(wallet.account(), &account);
    }

    #[test]
    fn test_cosmos_public_key_matches_account() {
        let wallet = wallet();
        assert_eq!(wallet.cosmos_public_key().to_bytes(), wallet.public_key());
        assert_eq!(
            wallet.cosmos_public_key().account_id("osmo").unwrap().to_string(),
            wallet.address()
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug_str = format!("{:?}", wallet());

        assert!(!debug_str.contains("abandon"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
