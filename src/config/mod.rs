//! Configuration for the Osmosis execution tools

pub mod rpc;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export endpoint overrides
pub use rpc::EndpointOverrides;

/// Selects mainnet or testnet
pub const NETWORK_ENV: &str = "OSMOSIS_NETWORK";

/// Path of the JSONL audit log (unset disables auditing)
pub const AUDIT_LOG_ENV: &str = "OSMOSIS_AUDIT_LOG";

/// Chain id of the public Osmosis testnet
pub const TESTNET_CHAIN_ID: &str = "osmo-test-5";

/// Chain id of Osmosis mainnet
pub const MAINNET_CHAIN_ID: &str = "osmosis-1";

/// Bech32 prefix for Osmosis accounts
pub const DEFAULT_PREFIX: &str = "osmo";

/// Native staking/fee denom
pub const DEFAULT_DENOM: &str = "uosmo";

/// Chain minimum gas price
pub const DEFAULT_GAS_PRICE: &str = "0.025uosmo";

/// Supported Osmosis networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_CHAIN_ID,
            Network::Testnet => TESTNET_CHAIN_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(Error::Config(format!("Unknown network: {}", other))),
        }
    }
}

/// Immutable description of the chain every component talks to.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub network: Network,
    pub chain_id: String,
    pub rpc_endpoint: String,
    pub rest_endpoint: String,
    pub default_denom: String,
    pub explorer_url: String,
    pub address_prefix: String,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            chain_id: MAINNET_CHAIN_ID.to_string(),
            rpc_endpoint: "https://rpc.osmosis.zone".to_string(),
            rest_endpoint: "https://lcd.osmosis.zone".to_string(),
            default_denom: DEFAULT_DENOM.to_string(),
            explorer_url: "https://www.mintscan.io/osmosis".to_string(),
            address_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            chain_id: TESTNET_CHAIN_ID.to_string(),
            rpc_endpoint: "https://rpc.testnet.osmosis.zone".to_string(),
            rest_endpoint: "https://lcd.testnet.osmosis.zone".to_string(),
            default_denom: DEFAULT_DENOM.to_string(),
            explorer_url: "https://testnet.mintscan.io/osmosis-testnet".to_string(),
            address_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    /// Faucet and other testnet-only helpers key off the chain id, not the
    /// configured network name, so endpoint overrides can't fool them.
    pub fn is_testnet(&self) -> bool {
        self.chain_id == TESTNET_CHAIN_ID
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network to execute against
    #[serde(default)]
    pub network: Network,
    /// Optional RPC/REST endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointOverrides,
    /// Path to audit log file (JSONL)
    #[serde(default)]
    pub audit_log_path: Option<String>,
    /// HTTP request timeout applied by the transport (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            endpoints: EndpointOverrides::default(),
            audit_log_path: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Build configuration from environment variables
    ///
    /// `OSMOSIS_NETWORK` defaults to testnet; any value other than
    /// `mainnet`/`testnet` is rejected rather than silently defaulted.
    pub fn from_env() -> Result<Self> {
        let network = match std::env::var(NETWORK_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => Network::Testnet,
        };

        Ok(Self {
            network,
            endpoints: EndpointOverrides::from_env()?,
            audit_log_path: std::env::var(AUDIT_LOG_ENV).ok().filter(|p| !p.is_empty()),
            request_timeout_secs: default_request_timeout(),
        })
    }

    /// Resolve the concrete network description, endpoint overrides applied
    pub fn network_config(&self) -> NetworkConfig {
        self.endpoints.apply(NetworkConfig::for_network(self.network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parses_case_insensitively() {
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_testnet_is_default() {
        let config = Config::default();
        let network = config.network_config();
        assert_eq!(network.chain_id, TESTNET_CHAIN_ID);
        assert!(network.is_testnet());
        assert_eq!(network.default_denom, "uosmo");
    }

    #[test]
    fn test_mainnet_is_not_testnet() {
        let network = NetworkConfig::mainnet();
        assert_eq!(network.chain_id, "osmosis-1");
        assert!(!network.is_testnet());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let value = serde_json::json!({ "network": "mainnet" });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.network, Network::Mainnet);
        assert!(parsed.audit_log_path.is_none());
        assert_eq!(parsed.request_timeout_secs, 30);
        assert_eq!(parsed.network_config().rpc_endpoint, "https://rpc.osmosis.zone");
    }
}
