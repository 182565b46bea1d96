//! Testnet helpers: faucet access and network status

use super::Tool;
use crate::config::{NetworkConfig, DEFAULT_DENOM};
use crate::wallet::validate_address;
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Official Osmosis testnet faucet
pub const FAUCET_URL: &str = "https://faucet.testnet.osmosis.zone";

const DEFAULT_FAUCET_AMOUNT: &str = "10000000";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TestnetTokensInput {
    /// Address to fund (optional)
    #[serde(default)]
    address: Option<String>,
    /// Amount needed, for reference only
    #[serde(default)]
    amount: Option<String>,
}

/// Lists faucet sources; never calls them
pub struct GetTestnetTokensTool {
    network: Arc<NetworkConfig>,
}

impl GetTestnetTokensTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GetTestnetTokensTool {
    const NAME: &'static str = super::TOOL_GET_TESTNET_TOKENS;
    type Input = TestnetTokensInput;

    fn description(&self) -> &'static str {
        "Get instructions and links to obtain Osmosis testnet tokens"
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let is_testnet = self.network.is_testnet();
        let official_instructions = match &input.address {
            Some(address) => format!("Visit the faucet and enter your address: {}", address),
            None => "Visit the faucet and enter your Osmosis testnet address".to_string(),
        };

        Ok(json!({
            "tool": Self::NAME,
            "network": self.network.network.name(),
            "isTestnet": is_testnet,
            "address": input.address.unwrap_or_else(|| "Not specified".to_string()),
            "amount": input.amount.unwrap_or_else(|| format!("1000000 {}", DEFAULT_DENOM)),
            "message": if is_testnet {
                "Here are the available sources for Osmosis testnet tokens:"
            } else {
                "Current network is MAINNET. Switch to testnet to use faucets."
            },
            "faucetSources": [
                {
                    "name": "Official Osmosis Testnet Faucet",
                    "url": FAUCET_URL,
                    "description": "Primary faucet for OSMO testnet tokens",
                    "instructions": official_instructions,
                },
                {
                    "name": "Cosmos Testnet Faucet",
                    "url": "https://faucet.cosmos.network",
                    "description": "Multi-chain faucet including Osmosis testnet",
                    "instructions": "Select Osmosis testnet and request tokens",
                },
            ],
            "instructions": [
                "1. Generate or use an existing Osmosis testnet address",
                "2. Request tokens with testnet-faucet or one of the sources above",
                "3. Wait for the transaction to confirm (1-2 minutes)",
                "4. Start testing execution tools with your funded wallet",
            ],
            "note": if is_testnet {
                "You're on testnet - safe to test execution tools"
            } else {
                "Set OSMOSIS_NETWORK=testnet to access faucets"
            },
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FaucetInput {
    /// Osmosis testnet address to receive tokens
    address: String,
    /// Amount in uosmo, for reference (the faucet decides)
    #[serde(default)]
    amount: Option<String>,
}

/// Normalized faucet outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FaucetResult {
    fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: None,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Requests tokens from the testnet faucet
pub struct TestnetFaucetTool {
    network: Arc<NetworkConfig>,
    faucet_url: String,
    timeout: Duration,
}

impl TestnetFaucetTool {
    pub fn new(network: Arc<NetworkConfig>, timeout: Duration) -> Self {
        Self {
            network,
            faucet_url: FAUCET_URL.to_string(),
            timeout,
        }
    }

    pub fn with_faucet_url(mut self, url: impl Into<String>) -> Self {
        self.faucet_url = url.into();
        self
    }

    /// One POST to `{faucet}/credit`. Only ever called on testnet.
    async fn request_tokens(&self, address: &str, amount: &str) -> FaucetResult {
        let url = format!("{}/credit", self.faucet_url.trim_end_matches('/'));
        let client = match reqwest::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => return FaucetResult::failed(e.to_string(), "Failed to connect to testnet faucet"),
        };

        tracing::info!(address = %address, "Requesting testnet tokens");
        let response = match client
            .post(&url)
            .json(&json!({ "address": address, "denom": DEFAULT_DENOM }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Faucet unreachable");
                return FaucetResult::failed(e.to_string(), "Failed to connect to testnet faucet");
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Faucet rejected request");
            return FaucetResult::failed(
                format!("Faucet request failed: {}", status.as_u16()),
                format!("Faucet returned error: {}", body),
            );
        }

        // The faucet answers with the credit tx; a body we can't read is still a credit
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let tx_hash = ["txhash", "txHash", "tx_hash"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        FaucetResult {
            success: true,
            tx_hash,
            message: format!(
                "Successfully requested {} {} from testnet faucet",
                amount, DEFAULT_DENOM
            ),
            error: None,
        }
    }
}

#[async_trait]
impl Tool for TestnetFaucetTool {
    const NAME: &'static str = super::TOOL_TESTNET_FAUCET;
    type Input = FaucetInput;

    fn description(&self) -> &'static str {
        "Get Osmosis testnet tokens from the official faucet"
    }

    fn required(&self) -> &'static [&'static str] {
        &["address"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let amount = input
            .amount
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAUCET_AMOUNT.to_string());

        let result = if !self.network.is_testnet() {
            FaucetResult::failed(
                "Faucet only available on testnet",
                "Current network is not testnet. Set OSMOSIS_NETWORK=testnet to use faucet.",
            )
        } else if !validate_address(&input.address, &self.network.address_prefix) {
            return Err(Error::InvalidAddress(input.address));
        } else {
            self.request_tokens(&input.address, &amount).await
        };

        let next_steps = if result.success {
            json!([
                "Wait 1-2 minutes for transaction confirmation",
                "Start testing execution tools with your funded wallet",
            ])
        } else {
            json!([
                "Try again in a few minutes",
                "Use an alternative faucet source from get-testnet-tokens",
            ])
        };

        let mut response = json!({
            "tool": Self::NAME,
            "address": input.address,
            "amount": amount,
            "nextSteps": next_steps,
        });
        if let (Value::Object(map), Value::Object(fields)) = (&mut response, serde_json::to_value(&result)?) {
            map.extend(fields);
        }
        Ok(response)
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatusInput {}

pub struct CheckTestnetStatusTool {
    network: Arc<NetworkConfig>,
}

impl CheckTestnetStatusTool {
    pub fn new(network: Arc<NetworkConfig>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for CheckTestnetStatusTool {
    const NAME: &'static str = super::TOOL_CHECK_TESTNET_STATUS;
    type Input = StatusInput;

    fn description(&self) -> &'static str {
        "Report the configured network, chain id, endpoints and faucet availability"
    }

    async fn execute(&self, _input: Self::Input) -> Result<Value> {
        let is_testnet = self.network.is_testnet();
        Ok(json!({
            "tool": Self::NAME,
            "network": if is_testnet { "testnet" } else { "mainnet" },
            "chainId": self.network.chain_id,
            "isTestnet": is_testnet,
            "faucetAvailable": is_testnet,
            "endpoints": {
                "rpc": self.network.rpc_endpoint,
                "rest": self.network.rest_endpoint,
            },
            "explorer": self.network.explorer_url,
            "recommendation": if is_testnet {
                "Execution tools are safe to test on this network."
            } else {
                "Execution tools move real funds. Set OSMOSIS_NETWORK=testnet for testing."
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::parse_args;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const ADDRESS: &str = "osmo19rl4cm2hmr8afy4kldpxz3fka4jguq0a5m7df8";

    /// Serve one canned HTTP response and hand back the raw request
    async fn one_shot_server(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    fn faucet(network: NetworkConfig, url: &str) -> TestnetFaucetTool {
        TestnetFaucetTool::new(Arc::new(network), Duration::from_secs(5)).with_faucet_url(url)
    }

    #[tokio::test]
    async fn test_faucet_refuses_mainnet_without_network_call() {
        // nothing listens on port 9; a network call would fail differently
        let tool = faucet(NetworkConfig::mainnet(), "http://127.0.0.1:9");
        let value = tool
            .execute(parse_args(json!({ "address": ADDRESS })).unwrap())
            .await
            .unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Faucet only available on testnet");
        assert!(value.get("txHash").is_none());
    }

    #[tokio::test]
    async fn test_faucet_success_normalized() {
        let (url, server) = one_shot_server("200 OK", r#"{"txhash":"ABC123"}"#).await;
        let value = faucet(NetworkConfig::testnet(), &url)
            .execute(parse_args(json!({ "address": ADDRESS })).unwrap())
            .await
            .unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["txHash"], "ABC123");
        assert_eq!(value["amount"], "10000000");
        assert!(value.get("error").is_none());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /credit"));
        assert!(request.contains(ADDRESS));
        assert!(request.contains("\"denom\":\"uosmo\""));
    }

    #[tokio::test]
    async fn test_faucet_http_error_normalized() {
        let (url, _server) = one_shot_server("429 Too Many Requests", r#"{"error":"slow down"}"#).await;
        let value = faucet(NetworkConfig::testnet(), &url)
            .execute(parse_args(json!({ "address": ADDRESS })).unwrap())
            .await
            .unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Faucet request failed: 429");
        assert!(value["message"].as_str().unwrap().contains("slow down"));
    }

    #[tokio::test]
    async fn test_faucet_rejects_foreign_address() {
        let tool = faucet(NetworkConfig::testnet(), "http://127.0.0.1:9");
        let err = tool
            .execute(parse_args(json!({ "address": "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4" })).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_status_reports_network() {
        let tool = CheckTestnetStatusTool::new(Arc::new(NetworkConfig::testnet()));
        let value = tool.execute(StatusInput::default()).await.unwrap();
        assert_eq!(value["chainId"], "osmo-test-5");
        assert_eq!(value["isTestnet"], true);
        assert_eq!(value["faucetAvailable"], true);
        assert_eq!(value["endpoints"]["rpc"], "https://rpc.testnet.osmosis.zone");

        let tool = CheckTestnetStatusTool::new(Arc::new(NetworkConfig::mainnet()));
        let value = tool.execute(StatusInput::default()).await.unwrap();
        assert_eq!(value["network"], "mainnet");
        assert_eq!(value["faucetAvailable"], false);
    }

    #[tokio::test]
    async fn test_token_sources_mention_address() {
        let tool = GetTestnetTokensTool::new(Arc::new(NetworkConfig::testnet()));
        let value = tool
            .execute(parse_args(json!({ "address": ADDRESS })).unwrap())
            .await
            .unwrap();
        assert_eq!(value["address"], ADDRESS);
        assert!(value["faucetSources"][0]["instructions"]
            .as_str()
            .unwrap()
            .contains(ADDRESS));
        assert_eq!(value["amount"], "1000000 uosmo");
    }
}
