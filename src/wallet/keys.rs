//! Mnemonic validation and Cosmos key derivation
//!
//! Accounts follow the Cosmos HD layout `m/44'/118'/0'/0/{index}` and encode
//! their address as bech32(prefix, RIPEMD160(SHA256(compressed pubkey))).
//! Everything here is pure: no I/O, no randomness except [`generate_mnemonic`].

use crate::{Error, Result};
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::SigningKey;
use rand::{rngs::OsRng, RngCore};
use ripemd::Ripemd160;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

/// Word counts accepted by BIP-39
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Cosmos SLIP-44 coin type
const COSMOS_COIN_TYPE: u32 = 118;

/// Length of a compressed secp256k1 public key
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// Account addresses carry a 20-byte key hash; module and contract accounts 32
const ADDRESS_PAYLOAD_LENS: [usize; 2] = [20, 32];

/// Public half of a derived key: safe to return to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    #[serde(serialize_with = "serialize_hex")]
    pub public_key: Vec<u8>,
}

impl Account {
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

/// Parse a phrase, enforcing word count and checksum against the English list
fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    let word_count = phrase.split_whitespace().count();
    if !VALID_WORD_COUNTS.contains(&word_count) {
        return Err(Error::InvalidMnemonic);
    }
    Mnemonic::parse_in_normalized(Language::English, phrase).map_err(|_| Error::InvalidMnemonic)
}

/// True if `phrase` is a well-formed BIP-39 English mnemonic
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

/// Number of whitespace-separated words in a phrase
pub fn word_count(phrase: &str) -> usize {
    phrase.split_whitespace().count()
}

fn derivation_path(account_index: u32) -> Result<DerivationPath> {
    let path = format!("m/44'/{}'/0'/0/{}", COSMOS_COIN_TYPE, account_index);
    DerivationPath::from_str(&path)
        .map_err(|e| Error::DerivationFailed(format!("Invalid path '{}': {}", path, e)))
}

/// Signing key together with its compressed public key
pub(crate) struct DerivedKey {
    pub signing_key: SigningKey,
    pub public_key: Vec<u8>,
}

/// Derive the secp256k1 key pair for `account_index`
pub(crate) fn derive_key(phrase: &str, account_index: u32) -> Result<DerivedKey> {
    let mnemonic = parse_mnemonic(phrase)?;
    let seed = Zeroizing::new(mnemonic.to_seed(""));
    let path = derivation_path(account_index)?;

    let xprv = XPrv::derive_from_path(&*seed, &path)
        .map_err(|e| Error::DerivationFailed(format!("Child derivation failed: {}", e)))?;

    Ok(DerivedKey {
        public_key: xprv.public_key().to_bytes().to_vec(),
        signing_key: xprv.private_key().clone(),
    })
}

fn check_prefix(prefix: &str) -> Result<Hrp> {
    if prefix.is_empty() {
        return Err(Error::InvalidArgument("Address prefix must not be empty".to_string()));
    }
    Hrp::parse(prefix)
        .map_err(|e| Error::InvalidArgument(format!("Invalid address prefix '{}': {}", prefix, e)))
}

/// Encode a compressed public key as a bech32 account address
pub fn address_from_public_key(public_key: &[u8], prefix: &str) -> Result<String> {
    if public_key.len() != COMPRESSED_PUBKEY_LEN {
        return Err(Error::InvalidArgument(format!(
            "Invalid public key length. Expected {} bytes for compressed secp256k1 public key, got {}",
            COMPRESSED_PUBKEY_LEN,
            public_key.len()
        )));
    }
    let hrp = check_prefix(prefix)?;
    let hash = Ripemd160::digest(Sha256::digest(public_key));

    bech32::encode::<Bech32>(hrp, &hash)
        .map_err(|e| Error::DerivationFailed(format!("Bech32 encoding failed: {}", e)))
}

/// Same as [`address_from_public_key`] for a hex-encoded key
pub fn address_from_public_key_hex(public_key_hex: &str, prefix: &str) -> Result<String> {
    let trimmed = public_key_hex.strip_prefix("0x").unwrap_or(public_key_hex);
    let bytes = hex::decode(trimmed)
        .map_err(|e| Error::InvalidArgument(format!("Invalid hex string: {}", e)))?;
    address_from_public_key(&bytes, prefix)
}

/// Derive the account for (mnemonic, prefix, index)
pub fn derive_account(phrase: &str, prefix: &str, account_index: u32) -> Result<Account> {
    check_prefix(prefix)?;
    let DerivedKey { public_key, .. } = derive_key(phrase, account_index)?;
    let address = address_from_public_key(&public_key, prefix)?;

    Ok(Account {
        address,
        public_key,
    })
}

/// Address only; identical to `derive_account(..).address`
pub fn address_from_mnemonic(phrase: &str, prefix: &str, account_index: u32) -> Result<String> {
    derive_account(phrase, prefix, account_index).map(|account| account.address)
}

/// Human-readable part of a well-formed account address.
///
/// Requires a classic bech32 checksum (bech32m is rejected) and a 20 or 32
/// byte payload. The prefix is returned exactly as written.
pub fn address_prefix(address: &str) -> Option<String> {
    let checked = CheckedHrpstring::new::<Bech32>(address).ok()?;
    if !ADDRESS_PAYLOAD_LENS.contains(&checked.byte_iter().count()) {
        return None;
    }
    Some(checked.hrp().as_str().to_string())
}

/// Check that `address` is a bech32 account address under `expected_prefix`.
///
/// The prefix must match exactly, case included. Malformed input is
/// reported as `false`, never as an error.
pub fn validate_address(address: &str, expected_prefix: &str) -> bool {
    address_prefix(address).is_some_and(|prefix| prefix == expected_prefix)
}

/// Fresh mnemonic from OS entropy. Unsupported counts fall back to 24 words.
pub fn generate_mnemonic(word_count: usize) -> Result<String> {
    let word_count = if VALID_WORD_COUNTS.contains(&word_count) {
        word_count
    } else {
        24
    };
    // 32 bits of entropy per 3 words
    let entropy_len = word_count / 3 * 4;

    let mut entropy = [0u8; 32];
    OsRng.fill_bytes(&mut entropy[..entropy_len]);
    let mnemonic = Mnemonic::from_entropy(&entropy[..entropy_len])
        .map_err(|e| Error::DerivationFailed(format!("Failed to generate mnemonic: {}", e)));
    entropy.zeroize();

    Ok(mnemonic?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        let b = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        assert_eq!(a, b);
        assert!(a.address.starts_with("osmo1"));
        assert_eq!(a.public_key.len(), COMPRESSED_PUBKEY_LEN);
    }

    #[test]
    fn test_known_cosmos_vector() {
        let account = derive_account(TEST_MNEMONIC, "cosmos", 0).unwrap();
        assert_eq!(account.address, "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4");
    }

    #[test]
    fn test_prefix_changes_only_hrp() {
        let osmo = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        let cosmos = derive_account(TEST_MNEMONIC, "cosmos", 0).unwrap();
        let (_, osmo_data) = bech32::decode(&osmo.address).unwrap();
        let (_, cosmos_data) = bech32::decode(&cosmos.address).unwrap();
        assert_eq!(osmo_data, cosmos_data);
        assert_eq!(osmo.public_key, cosmos.public_key);
    }

    #[test]
    fn test_account_index_changes_address() {
        let first = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        let second = derive_account(TEST_MNEMONIC, "osmo", 1).unwrap();
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn test_rejects_bad_word_count() {
        let eleven = TEST_MNEMONIC.rsplit_once(' ').unwrap().0;
        assert_eq!(word_count(eleven), 11);
        assert!(!validate_mnemonic(eleven));
        assert!(matches!(
            derive_account(eleven, "osmo", 0),
            Err(Error::InvalidMnemonic)
        ));
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(!validate_mnemonic(bad));
        assert!(matches!(derive_account(bad, "osmo", 0), Err(Error::InvalidMnemonic)));
    }

    #[test]
    fn test_rejects_unknown_words() {
        let bad = "foo abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(!validate_mnemonic(bad));
    }

    #[test]
    fn test_rejects_empty_prefix() {
        assert!(matches!(
            derive_account(TEST_MNEMONIC, "", 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_address_from_mnemonic_matches_derivation() {
        let account = derive_account(TEST_MNEMONIC, "osmo", 3).unwrap();
        let address = address_from_mnemonic(TEST_MNEMONIC, "osmo", 3).unwrap();
        assert_eq!(account.address, address);
    }

    #[test]
    fn test_address_from_public_key_roundtrip() {
        let account = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        let address = address_from_public_key_hex(&account.public_key_hex(), "osmo").unwrap();
        assert_eq!(address, account.address);
        assert!(address_from_public_key(&[2u8; 20], "osmo").is_err());
    }

    #[test]
    fn test_validate_address() {
        let account = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        assert!(validate_address(&account.address, "osmo"));
        assert!(!validate_address(&account.address, "cosmos"));
        assert!(!validate_address("osmo1notanaddress", "osmo"));
        assert!(!validate_address("", "osmo"));
    }

    #[test]
    fn test_validate_address_prefix_is_case_sensitive() {
        let account = derive_account(TEST_MNEMONIC, "osmo", 0).unwrap();
        assert!(!validate_address(&account.address, "OSMO"));

        // all-caps is valid bech32, but its prefix is "OSMO"
        let upper = account.address.to_uppercase();
        assert_eq!(address_prefix(&upper).as_deref(), Some("OSMO"));
        assert!(!validate_address(&upper, "osmo"));
    }

    #[test]
    fn test_validate_address_rejects_bech32m() {
        // same payload, bech32m checksum
        assert!(validate_address("osmo1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5helwsw", "osmo"));
        assert!(!validate_address("osmo1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z90z4v", "osmo"));
    }

    #[test]
    fn test_validate_address_payload_length() {
        // 32-byte module account
        assert!(validate_address(
            "osmo1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7rusq4z5ese",
            "osmo"
        ));
        // 10-byte payload
        assert!(!validate_address("osmo1qypqxpq9qcrsszg23smkme", "osmo"));
        assert_eq!(address_prefix("osmo1qypqxpq9qcrsszg23smkme"), None);
    }

    #[test]
    fn test_generate_mnemonic_word_counts() {
        for count in VALID_WORD_COUNTS {
            let phrase = generate_mnemonic(count).unwrap();
            assert_eq!(word_count(&phrase), count);
            assert!(validate_mnemonic(&phrase));
        }
        assert_eq!(word_count(&generate_mnemonic(13).unwrap()), 24);
    }
}
