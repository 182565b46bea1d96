//! Osmosis transaction execution tools
//!
//! Exposes Osmosis chain operations (bank, staking, governance, IBC, lockup,
//! pools, superfluid, tokenfactory) as tools an LLM host can call:
//! - Derive a wallet from the caller's mnemonic for a single call
//! - Build, sign and broadcast the transaction
//! - Normalize the outcome into a `{success, txHash, ...}` envelope
//!
//! # Security Model
//!
//! - Mnemonics arrive per call and are dropped when the call ends
//! - Private keys never leave the `wallet` module
//! - Every tool call can be written to a redacted audit trail

pub mod config;
pub mod interceptors;
pub mod runner;
pub mod tools;
pub mod tx;
pub mod wallet;

mod error;

pub use config::{Config, Network, NetworkConfig};
pub use error::{Error, Result};
pub use runner::ToolServer;
pub use tools::ToolRegistry;
pub use tx::{ExecutionResult, SigningClient};
