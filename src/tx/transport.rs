//! Chain I/O: account lookup, simulation and broadcast
//!
//! [`HttpTransport`] talks to the REST (LCD) endpoint for account state and
//! simulation, and to the CometBFT JSON-RPC endpoint for broadcast. Every
//! call builds its own client; nothing is pooled or retried.

use super::result::BroadcastOutcome;
use crate::config::NetworkConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// On-chain numbers needed to sign for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

/// The network operations the signing client depends on
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// `None` when the chain has never seen the address
    async fn account(&self, address: &str) -> Result<Option<AccountInfo>>;

    /// Dry-run a transaction, returning gas used
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64>;

    /// Broadcast and wait for the block result
    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastOutcome>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    network: Arc<NetworkConfig>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(network: Arc<NetworkConfig>, timeout: Duration) -> Self {
        Self { network, timeout }
    }

    fn client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

/// Turn a non-2xx response into a transport error carrying the node's message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(Error::Transport(format!("HTTP {}: {}", status, message)))
}

#[async_trait]
impl ChainTransport for HttpTransport {
    async fn account(&self, address: &str) -> Result<Option<AccountInfo>> {
        let url = format!(
            "{}/cosmos/auth/v1beta1/accounts/{}",
            self.network.rest_endpoint, address
        );
        let response = self.client()?.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = check_status(response).await?.json().await?;
        parse_account(&body).map(Some)
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64> {
        let url = format!("{}/cosmos/tx/v1beta1/simulate", self.network.rest_endpoint);
        let request = SimulateRequest {
            tx_bytes: STANDARD.encode(tx_bytes),
        };
        let response = self.client()?.post(&url).json(&request).send().await?;
        let body: SimulateResponse = check_status(response).await?.json().await?;
        Ok(body.gas_info.gas_used)
    }

    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastOutcome> {
        let request = JsonRpcRequest::new(
            "broadcast_tx_commit",
            serde_json::json!({ "tx": STANDARD.encode(tx_bytes) }),
        );
        let response = self
            .client()?
            .post(&self.network.rpc_endpoint)
            .json(&request)
            .send()
            .await?;
        let body: JsonRpcResponse<BroadcastCommit> = check_status(response).await?.json().await?;

        match (body.result, body.error) {
            (_, Some(error)) => Err(Error::Transport(error.to_string())),
            (Some(result), None) => Ok(result.into_outcome()),
            (None, None) => Err(Error::Transport(
                "Empty response from broadcast_tx_commit".to_string(),
            )),
        }
    }
}

/// Pull account number and sequence out of whichever account wrapper the
/// chain returns (base, vesting, module...).
fn parse_account(body: &Value) -> Result<AccountInfo> {
    let account = body
        .get("account")
        .ok_or_else(|| Error::Transport("Account response missing 'account'".to_string()))?;

    let base = [
        account,
        &account["base_account"],
        &account["base_vesting_account"]["base_account"],
    ]
    .into_iter()
    .find(|candidate| candidate.get("account_number").is_some())
    .ok_or_else(|| Error::Transport("Account response missing 'account_number'".to_string()))?;

    Ok(AccountInfo {
        account_number: value_as_u64(&base["account_number"])?,
        sequence: value_as_u64(&base["sequence"]).unwrap_or(0),
    })
}

fn value_as_u64(value: &Value) -> Result<u64> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| Error::Transport(format!("Expected integer, got '{}'", s))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| Error::Transport(format!("Expected unsigned integer, got {}", n))),
        other => Err(Error::Transport(format!("Expected integer, got {}", other))),
    }
}

/// Chain JSON encodes 64-bit integers as strings, older nodes as numbers
fn u64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => value_as_u64(&v).map_err(de::Error::custom),
    }
}

#[derive(Serialize)]
struct SimulateRequest {
    tx_bytes: String,
}

#[derive(Deserialize)]
struct SimulateResponse {
    gas_info: GasInfo,
}

#[derive(Deserialize)]
struct GasInfo {
    #[serde(default, deserialize_with = "u64_from_any")]
    gas_used: u64,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    fn new(method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        }
    }
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(Value::String(data)) if !data.is_empty() => {
                write!(f, "RPC error {}: {}: {}", self.code, self.message, data)
            }
            Some(data) if !data.is_null() && !data.is_string() => {
                write!(f, "RPC error {}: {}: {}", self.code, self.message, data)
            }
            _ => write!(f, "RPC error {}: {}", self.code, self.message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TxPhaseResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default, deserialize_with = "u64_from_any")]
    gas_wanted: u64,
    #[serde(default, deserialize_with = "u64_from_any")]
    gas_used: u64,
}

#[derive(Debug, Deserialize)]
struct BroadcastCommit {
    #[serde(default)]
    check_tx: TxPhaseResult,
    #[serde(default, alias = "deliver_tx")]
    tx_result: TxPhaseResult,
    #[serde(default)]
    hash: String,
    #[serde(default, deserialize_with = "u64_from_any")]
    height: u64,
}

impl BroadcastCommit {
    /// A CheckTx rejection never reaches a block, so its height is zero
    fn into_outcome(self) -> BroadcastOutcome {
        let phase = if self.check_tx.code != 0 {
            self.check_tx
        } else {
            self.tx_result
        };
        BroadcastOutcome {
            code: phase.code,
            raw_log: phase.log,
            tx_hash: self.hash,
            gas_used: phase.gas_used,
            gas_wanted: phase.gas_wanted,
            height: self.height,
        }
    }
}

/// In-process transport for tests
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct MockTransport {
        pub account: Option<AccountInfo>,
        pub simulate_gas: Option<u64>,
        pub outcome: Option<BroadcastOutcome>,
        pub broadcasts: Mutex<Vec<Vec<u8>>>,
        /// When set, each broadcast waits for one notification
        pub hold: Option<Arc<Notify>>,
    }

    impl MockTransport {
        pub fn with_outcome(outcome: BroadcastOutcome) -> Self {
            Self {
                account: Some(AccountInfo {
                    account_number: 42,
                    sequence: 7,
                }),
                outcome: Some(outcome),
                ..Default::default()
            }
        }

        pub fn broadcast_count(&self) -> usize {
            self.broadcasts.lock().map(|b| b.len()).unwrap_or(0)
        }

        pub fn last_broadcast(&self) -> Option<Vec<u8>> {
            self.broadcasts.lock().ok().and_then(|b| b.last().cloned())
        }
    }

    #[async_trait]
    impl ChainTransport for MockTransport {
        async fn account(&self, _address: &str) -> Result<Option<AccountInfo>> {
            Ok(self.account)
        }

        async fn simulate(&self, _tx_bytes: &[u8]) -> Result<u64> {
            self.simulate_gas
                .ok_or_else(|| Error::Transport("simulation unavailable".to_string()))
        }

        async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastOutcome> {
            if let Ok(mut sent) = self.broadcasts.lock() {
                sent.push(tx_bytes.to_vec());
            }
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            self.outcome
                .clone()
                .ok_or_else(|| Error::Transport("connection refused".to_string()))
        }
    }
}
