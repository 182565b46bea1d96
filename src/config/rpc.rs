//! RPC/REST endpoint overrides
//!
//! The built-in public endpoints are rate limited. Operators can point the
//! tools at their own nodes:
//!
//! ```bash
//! export OSMOSIS_RPC_ENDPOINT="https://my-node.example.com:26657"
//! export OSMOSIS_REST_ENDPOINT="https://my-node.example.com:1317"
//! ```

use super::NetworkConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable names
mod env_vars {
    pub const RPC_ENDPOINT: &str = "OSMOSIS_RPC_ENDPOINT";
    pub const REST_ENDPOINT: &str = "OSMOSIS_REST_ENDPOINT";
}

/// Optional replacements for the network's default endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    pub rpc: Option<String>,
    pub rest: Option<String>,
}

impl EndpointOverrides {
    /// Read overrides from the environment, validating that each is a URL
    pub fn from_env() -> Result<Self> {
        let rpc = read_url(env_vars::RPC_ENDPOINT)?;
        if rpc.is_some() {
            tracing::debug!("Using OSMOSIS_RPC_ENDPOINT for RPC");
        }
        let rest = read_url(env_vars::REST_ENDPOINT)?;
        if rest.is_some() {
            tracing::debug!("Using OSMOSIS_REST_ENDPOINT for REST");
        }
        Ok(Self { rpc, rest })
    }

    /// Create with explicit endpoints
    pub fn with_urls(rpc: Option<String>, rest: Option<String>) -> Self {
        Self { rpc, rest }
    }

    /// Overlay the overrides onto a network description
    pub fn apply(&self, mut network: NetworkConfig) -> NetworkConfig {
        if let Some(rpc) = &self.rpc {
            network.rpc_endpoint = trim_slash(rpc);
        }
        if let Some(rest) = &self.rest {
            network.rest_endpoint = trim_slash(rest);
        }
        network
    }
}

fn read_url(var: &str) -> Result<Option<String>> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            let value = value.trim().to_string();
            url::Url::parse(&value)
                .map_err(|e| Error::Config(format!("{} is not a valid URL: {}", var, e)))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
