//! Tool implementations exposed to the LLM host
//!
//! Tools implement the [`Tool`] trait and are collected in a [`ToolRegistry`],
//! which validates required arguments, runs interceptors and turns every
//! failure into the `{tool, success:false, error}` envelope.

mod execution;
mod testnet;
mod types;
mod wallet;

use crate::config::{Config, NetworkConfig};
use crate::interceptors::{AuditLogInterceptor, ToolCallContext, ToolInterceptor};
use crate::tx::{SigningClient, ToolResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::{JsonSchema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use execution::{register_execution_tools, Operation, SimulateTransactionTool};
pub use testnet::{CheckTestnetStatusTool, GetTestnetTokensTool, TestnetFaucetTool, FAUCET_URL};
pub use types::{check_required, is_missing, AnyJson, CommonArgs};
pub use wallet::{
    DeriveAddressFromPubkeyTool, GenerateWalletTool, GetWalletAddressTool, RestoreWalletTool,
    ValidateAddressTool, ValidateMnemonicTool,
};

pub const TOOL_SEND: &str = "send";
pub const TOOL_MULTI_SEND: &str = "multi-send";
pub const TOOL_DELEGATE: &str = "delegate";
pub const TOOL_UNDELEGATE: &str = "undelegate";
pub const TOOL_REDELEGATE: &str = "redelegate";
pub const TOOL_CLAIM_REWARDS: &str = "claim-rewards";
pub const TOOL_SUBMIT_PROPOSAL: &str = "submit-proposal";
pub const TOOL_VOTE_PROPOSAL: &str = "vote-proposal";
pub const TOOL_DEPOSIT_PROPOSAL: &str = "deposit-proposal";
pub const TOOL_IBC_TRANSFER: &str = "ibc-transfer";
pub const TOOL_LOCK_TOKENS: &str = "lock-tokens";
pub const TOOL_BEGIN_UNLOCKING: &str = "begin-unlocking";
pub const TOOL_BEGIN_UNLOCKING_ALL: &str = "begin-unlocking-all";
pub const TOOL_SWAP_EXACT_AMOUNT_IN: &str = "swap-exact-amount-in";
pub const TOOL_JOIN_POOL: &str = "join-pool";
pub const TOOL_EXIT_POOL: &str = "exit-pool";
pub const TOOL_SUPERFLUID_DELEGATE: &str = "superfluid-delegate";
pub const TOOL_SUPERFLUID_UNDELEGATE: &str = "superfluid-undelegate";
pub const TOOL_CREATE_DENOM: &str = "create-denom";
pub const TOOL_MINT_TOKENS: &str = "mint-tokens";
pub const TOOL_BURN_TOKENS: &str = "burn-tokens";
pub const TOOL_SIMULATE_TRANSACTION: &str = "simulate-transaction";

pub const TOOL_GENERATE_WALLET: &str = "generate-wallet";
pub const TOOL_RESTORE_WALLET: &str = "restore-wallet-from-mnemonic";
pub const TOOL_GET_WALLET_ADDRESS: &str = "get-wallet-address";
pub const TOOL_VALIDATE_MNEMONIC: &str = "validate-mnemonic";
pub const TOOL_VALIDATE_ADDRESS: &str = "validate-address";
pub const TOOL_DERIVE_ADDRESS_FROM_PUBKEY: &str = "derive-address-from-pubkey";

pub const TOOL_GET_TESTNET_TOKENS: &str = "get-testnet-tokens";
pub const TOOL_TESTNET_FAUCET: &str = "testnet-faucet";
pub const TOOL_CHECK_TESTNET_STATUS: &str = "check-testnet-status";

/// A typed tool. Arguments arrive as JSON and are decoded into `Input`.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    const NAME: &'static str;
    type Input: DeserializeOwned + JsonSchema + Send;

    fn description(&self) -> &'static str;

    /// Fields checked for presence before `Input` is decoded
    fn required(&self) -> &'static [&'static str] {
        &[]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value>;
}

/// Object-safe view of a [`Tool`] used by the registry
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    async fn call(&self, args: Value) -> Result<Value>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn description(&self) -> &'static str {
        Tool::description(self)
    }

    fn input_schema(&self) -> Value {
        let mut schema: Value = SchemaGenerator::default()
            .into_root_schema_for::<T::Input>()
            .into();
        if let Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
            if !self.required().is_empty() {
                map.insert("required".to_string(), json!(self.required()));
            }
        }
        schema
    }

    async fn call(&self, args: Value) -> Result<Value> {
        check_required(&args, self.required())?;
        let input: T::Input = types::parse_args(args)?;
        self.execute(input).await
    }
}

/// Routes `(tool name, args)` to the matching tool
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn DynTool>>,
    interceptors: Vec<Arc<dyn ToolInterceptor>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            interceptors: Vec::new(),
        }
    }

    /// Every wallet, execution and testnet tool against one network
    pub fn standard(network: Arc<NetworkConfig>, client: SigningClient, http_timeout: Duration) -> Self {
        let mut registry = Self::new();

        registry.register(GenerateWalletTool::new(network.clone()));
        registry.register(RestoreWalletTool::new(network.clone()));
        registry.register(GetWalletAddressTool::new(network.clone()));
        registry.register(ValidateMnemonicTool);
        registry.register(ValidateAddressTool::new(network.clone()));
        registry.register(DeriveAddressFromPubkeyTool::new(network.clone()));

        register_execution_tools(&mut registry, &client);
        registry.register(SimulateTransactionTool::new(client));

        registry.register(GetTestnetTokensTool::new(network.clone()));
        registry.register(TestnetFaucetTool::new(network.clone(), http_timeout));
        registry.register(CheckTestnetStatusTool::new(network));

        registry
    }

    /// Registry backed by the live chain endpoints, audited when configured
    pub fn from_config(config: &Config) -> Self {
        let network = Arc::new(config.network_config());
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = SigningClient::http(network.clone(), timeout);

        tracing::info!(
            network = network.network.name(),
            chain_id = %network.chain_id,
            rpc = %network.rpc_endpoint,
            "Tool registry configured"
        );
        let registry = Self::standard(network, client, timeout);
        match &config.audit_log_path {
            Some(path) => registry.with_interceptor(AuditLogInterceptor::new(path.as_str())),
            None => registry,
        }
    }

    pub fn register<T: Tool>(&mut self, tool: T) {
        self.tools.insert(T::NAME, Arc::new(tool));
    }

    pub fn with_interceptor(mut self, interceptor: impl ToolInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// `{name, description, inputSchema}` for each tool, sorted by name
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Run a tool. Always yields a JSON value; failures use the error envelope.
    pub async fn call(&self, name: &str, args: Value) -> Value {
        let context = ToolCallContext {
            tool_name: name.to_string(),
            args,
        };
        for interceptor in &self.interceptors {
            interceptor.intercept_tool_call(&context).await;
        }

        let started = Instant::now();
        let result = match self.tools.get(name) {
            Some(tool) => tool.call(context.args.clone()).await,
            None => Err(Error::NotImplemented(name.to_string())),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(value) => value,
            Err(e) => {
                if e.is_validation() {
                    tracing::info!(tool = %name, error = %e, "Tool call rejected");
                } else {
                    tracing::warn!(tool = %name, error = %e, "Tool call failed");
                }
                ToolResponse::error(name, e.to_string()).to_value()
            }
        };

        for interceptor in &self.interceptors {
            interceptor
                .on_tool_call_complete(&context, &response, duration_ms)
                .await;
        }
        response
    }
}
