//! Wallet key handling
//!
//! This module derives keys from caller-supplied mnemonics and signs
//! transactions. Private keys NEVER leave this module.

pub mod keys;
mod signer;

pub use keys::{
    address_from_mnemonic, address_from_public_key, address_from_public_key_hex, address_prefix,
    derive_account, generate_mnemonic, validate_address, validate_mnemonic, Account,
};
pub use signer::SecureWallet;
