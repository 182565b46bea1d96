//! Wallet tools
//!
//! Key generation, restoration and address checks. None of these touch the
//! network.
//!
//! SECURITY NOTE:
//! - Mnemonics passed in are used for one derivation and dropped
//! - Only `generate-wallet` ever returns a mnemonic, and only a fresh one
//! - Private keys are never returned

use super::types::{deserialize_secret, opt_u64_from_any};
use super::Tool;
use crate::config::NetworkConfig;
use crate::wallet::keys::{word_count, COMPRESSED_PUBKEY_LEN, VALID_WORD_COUNTS};
use crate::wallet::{
    address_from_public_key, derive_account, generate_mnemonic, validate_address, validate_mnemonic,
};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use schemars::JsonSchema;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_WORD_COUNT: usize = 24;

const BACKUP_WARNING: &str = "Store this mnemonic offline. Anyone who has it controls the wallet, \
     and it cannot be recovered if lost.";

fn prefix_or_default(prefix: Option<String>, network: &NetworkConfig) -> String {
    prefix
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| network.address_prefix.clone())
}

fn account_index(index: Option<u64>) -> Result<u32> {
    u32::try_from(index.unwrap_or(0))
        .map_err(|_| Error::InvalidArgument("accountIndex is out of range".to_string()))
}

fn checked_mnemonic(mnemonic: &SecretString) -> Result<&str> {
    let phrase = mnemonic.expose_secret();
    if validate_mnemonic(phrase) {
        Ok(phrase)
    } else {
        Err(Error::InvalidMnemonic)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWalletInput {
    /// 12, 15, 18, 21 or 24 (default 24)
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    #[schemars(with = "Option<u64>")]
    word_count: Option<u64>,
    /// Bech32 prefix (default: the network's)
    #[serde(default)]
    prefix: Option<String>,
}

/// Create a brand new wallet
pub struct GenerateWalletTool {
    network: Arc<NetworkConfig>,
}

impl GenerateWalletTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GenerateWalletTool {
    const NAME: &'static str = super::TOOL_GENERATE_WALLET;
    type Input = GenerateWalletInput;

    fn description(&self) -> &'static str {
        "Generate a new wallet. Returns the address, public key and the new mnemonic."
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let words = match input.word_count {
            None => DEFAULT_WORD_COUNT,
            Some(n) if VALID_WORD_COUNTS.iter().any(|valid| *valid as u64 == n) => n as usize,
            Some(n) => {
                return Err(Error::InvalidArgument(format!(
                    "wordCount must be one of {:?}, got {}",
                    VALID_WORD_COUNTS, n
                )))
            }
        };
        let prefix = prefix_or_default(input.prefix, &self.network);

        let mnemonic = SecretString::from(generate_mnemonic(words)?);
        let account = derive_account(mnemonic.expose_secret(), &prefix, 0)?;
        tracing::info!(address = %account.address, words, "Generated wallet");

        Ok(json!({
            "address": account.address,
            "publicKey": account.public_key_hex(),
            "mnemonic": mnemonic.expose_secret(),
            "warning": BACKUP_WARNING,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreWalletInput {
    #[serde(deserialize_with = "deserialize_secret")]
    #[schemars(with = "String")]
    mnemonic: SecretString,
    #[serde(default)]
    prefix: Option<String>,
    /// HD account index (default 0)
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    #[schemars(with = "Option<u64>")]
    account_index: Option<u64>,
}

/// Re-derive address and public key from an existing mnemonic
pub struct RestoreWalletTool {
    network: Arc<NetworkConfig>,
}

impl RestoreWalletTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for RestoreWalletTool {
    const NAME: &'static str = super::TOOL_RESTORE_WALLET;
    type Input = RestoreWalletInput;

    fn description(&self) -> &'static str {
        "Restore a wallet from its mnemonic. Returns the address and public key."
    }

    fn required(&self) -> &'static [&'static str] {
        &["mnemonic"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let phrase = checked_mnemonic(&input.mnemonic)?;
        let prefix = prefix_or_default(input.prefix, &self.network);
        let account = derive_account(phrase, &prefix, account_index(input.account_index)?)?;

        Ok(json!({
            "address": account.address,
            "publicKey": account.public_key_hex(),
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddressInput {
    #[serde(deserialize_with = "deserialize_secret")]
    #[schemars(with = "String")]
    mnemonic: SecretString,
    #[serde(default)]
    prefix: Option<String>,
}

pub struct GetWalletAddressTool {
    network: Arc<NetworkConfig>,
}

impl GetWalletAddressTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GetWalletAddressTool {
    const NAME: &'static str = super::TOOL_GET_WALLET_ADDRESS;
    type Input = WalletAddressInput;

    fn description(&self) -> &'static str {
        "Get the address controlled by a mnemonic"
    }

    fn required(&self) -> &'static [&'static str] {
        &["mnemonic"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let phrase = checked_mnemonic(&input.mnemonic)?;
        let prefix = prefix_or_default(input.prefix, &self.network);
        let account = derive_account(phrase, &prefix, 0)?;
        Ok(json!({ "address": account.address }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateMnemonicInput {
    #[serde(deserialize_with = "deserialize_secret")]
    #[schemars(with = "String")]
    mnemonic: SecretString,
}

pub struct ValidateMnemonicTool;

#[async_trait]
impl Tool for ValidateMnemonicTool {
    const NAME: &'static str = super::TOOL_VALIDATE_MNEMONIC;
    type Input = ValidateMnemonicInput;

    fn description(&self) -> &'static str {
        "Check whether a phrase is a valid BIP-39 mnemonic"
    }

    fn required(&self) -> &'static [&'static str] {
        &["mnemonic"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let phrase = input.mnemonic.expose_secret();
        Ok(json!({
            "valid": validate_mnemonic(phrase),
            "wordCount": word_count(phrase),
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateAddressInput {
    address: String,
    /// Expected bech32 prefix (default: the network's)
    #[serde(default)]
    prefix: Option<String>,
}

pub struct ValidateAddressTool {
    network: Arc<NetworkConfig>,
}

impl ValidateAddressTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for ValidateAddressTool {
    const NAME: &'static str = super::TOOL_VALIDATE_ADDRESS;
    type Input = ValidateAddressInput;

    fn description(&self) -> &'static str {
        "Check that an address is valid bech32 with the expected prefix"
    }

    fn required(&self) -> &'static [&'static str] {
        &["address"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let prefix = prefix_or_default(input.prefix, &self.network);
        Ok(json!({
            "valid": validate_address(&input.address, &prefix),
            "address": input.address,
            "expectedPrefix": prefix,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivePubkeyInput {
    /// Compressed secp256k1 public key, hex or base64
    public_key: String,
    #[serde(default)]
    prefix: Option<String>,
}

pub struct DeriveAddressFromPubkeyTool {
    network: Arc<NetworkConfig>,
}

impl DeriveAddressFromPubkeyTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

/// A 66-char hex key is also valid base64, so a key-sized hex decode wins
fn decode_public_key(encoded: &str) -> Result<Vec<u8>> {
    let trimmed = encoded.trim();
    let hex_body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let from_hex = hex::decode(hex_body).ok();
    if let Some(bytes) = from_hex.as_ref().filter(|b| b.len() == COMPRESSED_PUBKEY_LEN) {
        return Ok(bytes.clone());
    }
    match base64::engine::general_purpose::STANDARD.decode(trimmed) {
        Ok(bytes) => Ok(bytes),
        Err(_) => from_hex
            .ok_or_else(|| Error::InvalidArgument("publicKey must be hex or base64".to_string())),
    }
}

#[async_trait]
impl Tool for DeriveAddressFromPubkeyTool {
    const NAME: &'static str = super::TOOL_DERIVE_ADDRESS_FROM_PUBKEY;
    type Input = DerivePubkeyInput;

    fn description(&self) -> &'static str {
        "Derive an address from a compressed secp256k1 public key"
    }

    fn required(&self) -> &'static [&'static str] {
        &["publicKey"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let bytes = decode_public_key(&input.public_key)?;
        let prefix = prefix_or_default(input.prefix, &self.network);
        let address = address_from_public_key(&bytes, &prefix)?;
        Ok(json!({
            "address": address,
            "publicKey": hex::encode(&bytes),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::parse_args;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const ADDRESS: &str = "osmo19rl4cm2hmr8afy4kldpxz3fka4jguq0a5m7df8";

    fn network() -> Arc<NetworkConfig> {
        Arc::new(NetworkConfig::testnet())
    }

    async fn run<T: Tool>(tool: T, args: Value) -> Result<Value> {
        tool.execute(parse_args(args)?).await
    }

    #[tokio::test]
    async fn test_generate_returns_fresh_mnemonic() {
        let value = run(GenerateWalletTool::new(network()), json!({ "wordCount": 12 }))
            .await
            .unwrap();
        let mnemonic = value["mnemonic"].as_str().unwrap();
        assert_eq!(mnemonic.split_whitespace().count(), 12);
        assert!(validate_mnemonic(mnemonic));
        assert!(value["address"].as_str().unwrap().starts_with("osmo1"));
        assert_eq!(value["publicKey"].as_str().unwrap().len(), 66);
        assert!(value["warning"].is_string());
    }

    #[tokio::test]
    async fn test_generate_defaults_to_24_words() {
        let value = run(GenerateWalletTool::new(network()), json!({})).await.unwrap();
        assert_eq!(value["mnemonic"].as_str().unwrap().split_whitespace().count(), 24);
    }

    #[tokio::test]
    async fn test_generate_rejects_odd_word_count() {
        let err = run(GenerateWalletTool::new(network()), json!({ "wordCount": 13 }))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_restore_known_vector() {
        let value = run(RestoreWalletTool::new(network()), json!({ "mnemonic": MNEMONIC }))
            .await
            .unwrap();
        assert_eq!(value["address"], ADDRESS);
        assert!(value.get("mnemonic").is_none());
    }

    #[tokio::test]
    async fn test_restore_with_other_prefix() {
        let value = run(
            RestoreWalletTool::new(network()),
            json!({ "mnemonic": MNEMONIC, "prefix": "cosmos" }),
        )
        .await
        .unwrap();
        assert_eq!(value["address"], "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4");
    }

    #[tokio::test]
    async fn test_restore_rejects_bad_mnemonic() {
        let err = run(
            RestoreWalletTool::new(network()),
            json!({ "mnemonic": "abandon abandon abandon" }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidMnemonic));
    }

    #[tokio::test]
    async fn test_wallet_address() {
        let value = run(GetWalletAddressTool::new(network()), json!({ "mnemonic": MNEMONIC }))
            .await
            .unwrap();
        assert_eq!(value, json!({ "address": ADDRESS }));
    }

    #[tokio::test]
    async fn test_validate_mnemonic_does_not_echo() {
        let value = run(ValidateMnemonicTool, json!({ "mnemonic": MNEMONIC })).await.unwrap();
        assert_eq!(value, json!({ "valid": true, "wordCount": 12 }));

        let eleven = MNEMONIC.rsplit_once(' ').unwrap().0;
        let value = run(ValidateMnemonicTool, json!({ "mnemonic": eleven })).await.unwrap();
        assert_eq!(value, json!({ "valid": false, "wordCount": 11 }));
    }

    #[tokio::test]
    async fn test_validate_address_reports_prefix() {
        let value = run(ValidateAddressTool::new(network()), json!({ "address": ADDRESS }))
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({ "address": ADDRESS, "valid": true, "expectedPrefix": "osmo" })
        );

        let value = run(
            ValidateAddressTool::new(network()),
            json!({ "address": ADDRESS, "prefix": "cosmos" }),
        )
        .await
        .unwrap();
        assert_eq!(value["valid"], false);

        // prefixes compare exactly
        let value = run(
            ValidateAddressTool::new(network()),
            json!({ "address": ADDRESS, "prefix": "OSMO" }),
        )
        .await
        .unwrap();
        assert_eq!(value["valid"], false);
    }

    #[tokio::test]
    async fn test_pubkey_hex_and_base64_agree() {
        let restored = run(RestoreWalletTool::new(network()), json!({ "mnemonic": MNEMONIC }))
            .await
            .unwrap();
        let hex_key = restored["publicKey"].as_str().unwrap().to_string();
        let b64_key =
            base64::engine::general_purpose::STANDARD.encode(hex::decode(&hex_key).unwrap());

        for key in [hex_key.clone(), b64_key] {
            let value = run(
                DeriveAddressFromPubkeyTool::new(network()),
                json!({ "publicKey": key }),
            )
            .await
            .unwrap();
            assert_eq!(value, json!({ "address": ADDRESS, "publicKey": hex_key }));
        }
    }

    #[tokio::test]
    async fn test_pubkey_garbage_rejected() {
        let err = run(
            DeriveAddressFromPubkeyTool::new(network()),
            json!({ "publicKey": "***" }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
